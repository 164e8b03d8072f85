//! # healix-core
//!
//! The intake pipeline of the Healix symptom-intake assistant.
//!
//! This crate provides:
//! - The trait seams (`SymptomExtractor`, `ClassicalModel`, `SequenceModel`,
//!   `LabelLookup`, `ReportStore`, `DocumentWriter`)
//! - The predictor adapters, the reconciler and the report assembler
//! - The per-session conversation state machine
//! - `IntakePipeline`, which wires them together for one message at a time
//! - `HealixConfig`, the TOML runtime configuration
//!
//! ## Usage
//!
//! ```rust,ignore
//! use healix_core::{IntakePipeline, traits::{SymptomExtractor, ReportStore, DocumentWriter}};
//! ```

pub mod adapters;
pub mod assembler;
pub mod config;
pub mod conversation;
mod guard;
pub mod pipeline;
pub mod reconcile;
pub mod sessions;
pub mod traits;

pub use adapters::{ClassicalAdapter, SequenceAdapter, DEFAULT_MODEL_TIMEOUT};
pub use assembler::ReportAssembler;
pub use config::{ExtractorMode, HealixConfig};
pub use pipeline::IntakePipeline;
pub use reconcile::reconcile;

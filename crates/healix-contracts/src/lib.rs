//! # healix-contracts
//!
//! Shared types, the symptom vocabulary, and the error type for the Healix
//! symptom-intake assistant.
//!
//! All crates in the workspace import from here. Apart from the vocabulary's
//! construction-time validation, no business logic lives in this crate.

pub mod conversation;
pub mod error;
pub mod prediction;
pub mod report;
pub mod symptom;
pub mod timestamp;
pub mod vocabulary;

pub use error::{HealixError, HealixResult};

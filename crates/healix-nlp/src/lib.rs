//! # healix-nlp
//!
//! Symptom vocabulary loading and the two `SymptomExtractor` variants.
//!
//! ## Overview
//!
//! - [`catalog`] loads the ordered vocabulary from TOML (built-in or a file).
//! - [`LemmaOverlapExtractor`] matches free text against every vocabulary
//!   label by lemma overlap.
//! - [`KeywordExtractor`] matches a short list of common symptoms and falls
//!   back to raw text fragments.
//! - [`build_extractor`] picks one at startup from `[extractor] mode`.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use healix_nlp::{build_extractor, catalog};
//!
//! let vocabulary = catalog::builtin()?;
//! let extractor = build_extractor(&config.extractor, &vocabulary)?;
//! let symptoms = extractor.extract("I have a fever and a bad cough.");
//! ```

pub mod catalog;
pub mod keyword;
pub mod lemma;
pub mod normalize;
pub mod provider;
pub mod rich;

pub use keyword::KeywordExtractor;
pub use provider::build_extractor;
pub use rich::LemmaOverlapExtractor;

//! # healix-models
//!
//! Concrete implementations of the `ClassicalModel`, `SequenceModel` and
//! `LabelLookup` traits, loaded from JSON/CSV artifacts.
//!
//! Artifacts are validated against a JSON Schema before use; see
//! [`classical::schema`] and [`sequence::schema`]. [`load_models`] reads all
//! three artifacts named in `[models]` and reports which ones are available.

pub mod artifact;
pub mod classical;
pub mod labels;
pub mod loader;
pub mod sequence;

pub use classical::TextPipelineModel;
pub use labels::CsvLabelLookup;
pub use loader::{load_models, ModelSet};
pub use sequence::DenseSoftmaxModel;

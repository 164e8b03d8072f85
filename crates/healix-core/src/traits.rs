//! Trait seams of the intake pipeline.
//!
//! - `SymptomExtractor`: free text to a symptom set (rich or keyword variant)
//! - `ClassicalModel`: text-in / label-out pre-trained model
//! - `SequenceModel`: one-hot-vector-in / probabilities-out pre-trained model
//! - `LabelLookup`: class index to disease name side table
//! - `ReportStore`: append-only report persistence
//! - `DocumentWriter`: per-patient report documents, addressed by handle
//!
//! The pipeline only talks to these traits; concrete implementations live in
//! `healix-nlp`, `healix-models` and `healix-store`.

use healix_contracts::{
    error::HealixResult,
    report::{DocumentHandle, PatientSnapshot, Report},
    symptom::SymptomSet,
};

/// Maps free text to a set of symptom labels.
///
/// Implementations must be deterministic and must never fail on string
/// input: an empty set is the "could not find anything" answer.
pub trait SymptomExtractor: Send + Sync {
    /// Short name for logs (e.g. "lemma-overlap", "keyword").
    fn name(&self) -> &'static str;

    fn extract(&self, text: &str) -> SymptomSet;
}

/// A pre-trained model that takes raw text samples and emits one label each.
pub trait ClassicalModel: Send + Sync {
    /// Predict labels for `samples`. The adapter always sends one sample.
    fn predict(&self, samples: &[String]) -> HealixResult<Vec<String>>;
}

/// A pre-trained model over fixed-length one-hot symptom vectors.
pub trait SequenceModel: Send + Sync {
    /// Expected input vector length; equals the vocabulary size it was trained on.
    fn input_size(&self) -> usize;

    /// Return one probability per class for a single input vector.
    fn predict(&self, input: &[f32]) -> HealixResult<Vec<f32>>;
}

/// Resolves a sequence-model class index to a human-readable disease name.
pub trait LabelLookup: Send + Sync {
    fn label_for(&self, class_index: usize) -> Option<String>;
}

/// Durable, insertion-ordered storage for finished reports.
pub trait ReportStore: Send + Sync {
    /// Append one report. Stored reports are never modified.
    fn append(&self, report: &Report) -> HealixResult<()>;

    /// All stored reports, oldest first.
    fn list(&self) -> HealixResult<Vec<Report>>;
}

/// Writes the per-patient report document.
pub trait DocumentWriter: Send + Sync {
    /// Create the document scaffold and return the handle used for appends.
    fn create(&self, patient: &PatientSnapshot) -> HealixResult<DocumentHandle>;

    /// Append one entry to the document named by `handle`.
    fn append(&self, handle: &DocumentHandle, entry: &serde_json::Value) -> HealixResult<()>;
}

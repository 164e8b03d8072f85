//! Predictor outcomes and the reconciled prediction.
//!
//! Each adapter returns `Result<T, Unavailable>`: a missing model, a bad
//! input, an inference failure, or a timeout are all typed `Unavailable`
//! values rather than errors, so the reconciler can always produce an answer.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Why an adapter produced no prediction for this turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    /// The model artifact was never loaded.
    ModelMissing,
    /// The symptom set was empty.
    EmptyInput,
    /// No one-hot vector could be built for the sequence model.
    NoVector,
    /// The model returned an output of the wrong shape.
    InvalidOutput,
    /// The model returned an error or panicked.
    ModelFailed,
    /// The model did not answer within the configured timeout.
    TimedOut,
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UnavailableReason::ModelMissing => "model missing",
            UnavailableReason::EmptyInput => "empty input",
            UnavailableReason::NoVector => "no input vector",
            UnavailableReason::InvalidOutput => "invalid model output",
            UnavailableReason::ModelFailed => "model failed",
            UnavailableReason::TimedOut => "timed out",
        };
        f.write_str(s)
    }
}

/// An adapter could not produce a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unavailable {
    pub reason: UnavailableReason,
    /// Free-form detail for logs; never shown to the patient.
    pub detail: String,
}

impl Unavailable {
    pub fn new(reason: UnavailableReason, detail: impl Into<String>) -> Self {
        Self { reason, detail: detail.into() }
    }
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.detail.is_empty() {
            write!(f, "{}", self.reason)
        } else {
            write!(f, "{}: {}", self.reason, self.detail)
        }
    }
}

/// The classical model's hard label. Its confidence is always treated as 1.0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassicalPrediction {
    pub label: String,
}

impl ClassicalPrediction {
    pub const CONFIDENCE: f32 = 1.0;
}

/// The sequence model's arg-max class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequencePrediction {
    pub class_index: usize,
    /// Probability of `class_index`, in [0, 1].
    pub confidence: f32,
    /// Human-readable name from the label lookup, when one resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl SequencePrediction {
    /// The label to display: the resolved name or a class placeholder.
    pub fn display_label(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => format!("Class {} (model)", self.class_index),
        }
    }
}

pub type ClassicalOutcome = Result<ClassicalPrediction, Unavailable>;
pub type SequenceOutcome = Result<SequencePrediction, Unavailable>;

/// Label → confidence percentage, in insertion order.
///
/// Serializes as a JSON object whose keys keep insertion order. Inserting an
/// existing label replaces its score in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictionScores(Vec<(String, f64)>);

impl PredictionScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: impl Into<String>, percent: f64) {
        let label = label.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == label) {
            Some(entry) => entry.1 = percent,
            None => self.0.push((label, percent)),
        }
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.0.iter().find(|(l, _)| l == label).map(|(_, p)| *p)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(l, p)| (l.as_str(), *p))
    }
}

impl Serialize for PredictionScores {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, percent) in &self.0 {
            map.serialize_entry(label, percent)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PredictionScores {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ScoresVisitor;

        impl<'de> Visitor<'de> for ScoresVisitor {
            type Value = PredictionScores;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of label to confidence percentage")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut scores = PredictionScores::new();
                while let Some((label, percent)) = access.next_entry::<String, f64>()? {
                    scores.insert(label, percent);
                }
                Ok(scores)
            }
        }

        deserializer.deserialize_map(ScoresVisitor)
    }
}

/// The merged answer produced from both adapters' outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledPrediction {
    pub scores: PredictionScores,
    /// Resolved sequence label, else the classical label, else none.
    pub primary: Option<String>,
    /// Raw sequence-model confidence in [0, 1], when that adapter answered.
    pub confidence: Option<f32>,
    /// Natural-language sentence(s) describing the suggestions.
    pub summary: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_label_falls_back_to_placeholder() {
        let named = SequencePrediction { class_index: 4, confidence: 0.5, label: Some("Flu".into()) };
        let unnamed = SequencePrediction { class_index: 4, confidence: 0.5, label: None };

        assert_eq!(named.display_label(), "Flu");
        assert_eq!(unnamed.display_label(), "Class 4 (model)");
    }

    #[test]
    fn scores_keep_insertion_order_when_serialized() {
        let mut scores = PredictionScores::new();
        scores.insert("Zika", 100.0);
        scores.insert("Asthma", 83.3);

        let json = serde_json::to_string(&scores).unwrap();
        assert_eq!(json, r#"{"Zika":100.0,"Asthma":83.3}"#);
    }

    #[test]
    fn deserializing_keeps_document_order() {
        let scores: PredictionScores =
            serde_json::from_str(r#"{"Zika":100.0,"Asthma":83.3}"#).unwrap();
        assert_eq!(scores.iter().next(), Some(("Zika", 100.0)));
    }

    #[test]
    fn reinserting_a_label_replaces_score_in_place() {
        let mut scores = PredictionScores::new();
        scores.insert("Flu", 100.0);
        scores.insert("Cold", 40.0);
        scores.insert("Flu", 72.5);

        let entries: Vec<_> = scores.iter().collect();
        assert_eq!(entries, vec![("Flu", 72.5), ("Cold", 40.0)]);
    }

    #[test]
    fn unavailable_display_includes_detail() {
        let u = Unavailable::new(UnavailableReason::TimedOut, "after 2000 ms");
        assert_eq!(u.to_string(), "timed out: after 2000 ms");
    }
}

//! The fixed, ordered catalog of recognized symptom labels.
//!
//! Index positions are part of the sequence-model artifact contract: a model
//! trained against one ordering silently mispredicts against another, so the
//! vocabulary is validated once at startup and never mutated afterwards.

use std::collections::HashMap;

use crate::error::{HealixError, HealixResult};

/// An immutable, duplicate-free, ordered list of symptom labels.
#[derive(Debug, Clone)]
pub struct SymptomVocabulary {
    labels: Vec<String>,
    index: HashMap<String, usize>,
}

impl SymptomVocabulary {
    /// Build a vocabulary from `labels`, preserving their order.
    ///
    /// Returns `VocabularyInvalid` if any label is empty (after trimming) or
    /// appears more than once.
    pub fn new<I, S>(labels: I) -> HealixResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        let mut index = HashMap::with_capacity(labels.len());

        for (position, label) in labels.iter().enumerate() {
            if label.trim().is_empty() {
                return Err(HealixError::VocabularyInvalid {
                    reason: format!("label at position {position} is empty"),
                });
            }
            if let Some(first) = index.insert(label.clone(), position) {
                return Err(HealixError::VocabularyInvalid {
                    reason: format!(
                        "label '{label}' appears at positions {first} and {position}"
                    ),
                });
            }
        }

        Ok(Self { labels, index })
    }

    /// Number of labels; also the length of every sequence-model input vector.
    pub fn size(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Position of `label`, if it is part of the vocabulary.
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    /// Label at `index`, or `None` when out of range.
    pub fn label_at(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    /// All labels in vocabulary order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trips_for_every_label() {
        let vocab = SymptomVocabulary::new(["fever", "cough", "sore throat"]).unwrap();

        assert_eq!(vocab.size(), 3);
        for i in 0..vocab.size() {
            let label = vocab.label_at(i).unwrap();
            assert_eq!(vocab.index_of(label), Some(i));
        }
    }

    #[test]
    fn duplicate_label_is_rejected() {
        let err = SymptomVocabulary::new(["fever", "cough", "fever"]).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("fever"), "message should name the duplicate: {msg}");
        assert!(msg.contains("0") && msg.contains("2"));
    }

    #[test]
    fn blank_label_is_rejected() {
        let err = SymptomVocabulary::new(["fever", "   "]).unwrap_err();
        assert!(matches!(err, HealixError::VocabularyInvalid { .. }));
    }

    #[test]
    fn unknown_label_and_out_of_range_index_are_none() {
        let vocab = SymptomVocabulary::new(["fever"]).unwrap();
        assert_eq!(vocab.index_of("chills"), None);
        assert_eq!(vocab.label_at(1), None);
        assert!(!vocab.contains("chills"));
    }
}

//! Lemma-overlap symptom extraction against the full vocabulary.
//!
//! Each vocabulary label is reduced to its lemma set once, at construction.
//! A label matches an input when either
//!
//! - the share of its lemmas present in the input is at least `threshold`, or
//! - at least `min_overlap` of its lemmas are present.
//!
//! Labels are tested independently, so one input can match many labels.
//! Matches are returned in vocabulary order.

use std::collections::BTreeSet;

use tracing::debug;

use healix_contracts::{symptom::SymptomSet, vocabulary::SymptomVocabulary};
use healix_core::traits::SymptomExtractor;

use crate::lemma::lemma_set;

#[derive(Debug, Clone)]
struct LabelLemmas {
    label: String,
    lemmas: BTreeSet<String>,
}

/// The rich extractor.
#[derive(Debug, Clone)]
pub struct LemmaOverlapExtractor {
    labels: Vec<LabelLemmas>,
    threshold: f64,
    min_overlap: usize,
}

impl LemmaOverlapExtractor {
    pub fn new(vocabulary: &SymptomVocabulary, threshold: f64, min_overlap: usize) -> Self {
        let labels = vocabulary
            .labels()
            .iter()
            .map(|label| LabelLemmas { label: label.clone(), lemmas: lemma_set(label) })
            .collect();
        Self { labels, threshold, min_overlap: min_overlap.max(1) }
    }

    /// Number of labels that can ever match (non-empty lemma set).
    pub fn matchable_labels(&self) -> usize {
        self.labels.iter().filter(|l| !l.lemmas.is_empty()).count()
    }

    /// True when at least one label can match.
    pub fn is_capable(&self) -> bool {
        self.matchable_labels() > 0
    }

    fn matches(&self, entry: &LabelLemmas, input: &BTreeSet<String>) -> bool {
        if entry.lemmas.is_empty() {
            return false;
        }
        let overlap = entry.lemmas.intersection(input).count();
        let ratio = overlap as f64 / entry.lemmas.len() as f64;
        ratio >= self.threshold || overlap >= self.min_overlap
    }
}

impl SymptomExtractor for LemmaOverlapExtractor {
    fn name(&self) -> &'static str {
        "lemma-overlap"
    }

    fn extract(&self, text: &str) -> SymptomSet {
        let input = lemma_set(text);
        if input.is_empty() {
            return SymptomSet::new();
        }

        let found: SymptomSet = self
            .labels
            .iter()
            .filter(|entry| self.matches(entry, &input))
            .map(|entry| entry.label.clone())
            .collect();

        debug!(lemmas = input.len(), matched = found.len(), "lemma-overlap extraction");
        found
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog;

    use super::*;

    fn small() -> LemmaOverlapExtractor {
        let vocab = SymptomVocabulary::new([
            "shortness of breath",
            "sharp chest pain",
            "cough",
            "coughing up sputum",
            "fever",
            "sore throat",
            "symptoms of the face",
        ])
        .unwrap();
        LemmaOverlapExtractor::new(&vocab, 0.55, 2)
    }

    #[test]
    fn fever_and_cough_against_builtin_catalog() {
        let vocab = catalog::builtin().unwrap();
        let extractor = LemmaOverlapExtractor::new(&vocab, 0.55, 2);

        let found = extractor.extract("I have a fever and a bad cough.");
        assert_eq!(found.as_slice(), ["cough".to_string(), "fever".to_string()]);
    }

    #[test]
    fn ratio_gate_matches_inflected_input() {
        let found = small().extract("I've been coughing all night");
        assert!(found.contains("cough"));
        // Half of {cough, sputum} is below the threshold.
        assert!(!found.contains("coughing up sputum"));
    }

    #[test]
    fn overlap_gate_matches_partial_multiword_label() {
        // {chest, pain} overlaps "sharp chest pain" by 2 of 3.
        let found = small().extract("my chest pain is awful");
        assert!(found.contains("sharp chest pain"));
    }

    #[test]
    fn results_follow_vocabulary_order() {
        let found = small().extract("fever, sore throat and a cough");
        assert_eq!(
            found.as_slice(),
            ["cough".to_string(), "fever".to_string(), "sore throat".to_string()]
        );
    }

    #[test]
    fn filler_only_input_matches_nothing() {
        assert!(small().extract("I have been feeling with the").is_empty());
        assert!(small().extract("").is_empty());
    }

    #[test]
    fn extraction_is_deterministic() {
        let extractor = small();
        let text = "short of breath, fever and a sore throat";
        assert_eq!(extractor.extract(text), extractor.extract(text));
    }

    #[test]
    fn capability_requires_a_matchable_label() {
        let empty = SymptomVocabulary::new(Vec::<String>::new()).unwrap();
        assert!(!LemmaOverlapExtractor::new(&empty, 0.55, 2).is_capable());

        let filler = SymptomVocabulary::new(["the", "with my"]).unwrap();
        assert!(!LemmaOverlapExtractor::new(&filler, 0.55, 2).is_capable());

        assert_eq!(small().matchable_labels(), 7);
    }
}

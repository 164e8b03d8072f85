//! Merge the two adapters' outcomes into one ranked answer.
//!
//! Reconciliation is total: every combination of value / unavailable yields
//! a well-formed `ReconciledPrediction`. When both adapters are unavailable
//! the map is empty and the summary says no reliable prediction was made.

use healix_contracts::prediction::{
    ClassicalOutcome, ClassicalPrediction, PredictionScores, ReconciledPrediction, SequenceOutcome,
};

/// Reported percentage for the classical model's hard label.
const CLASSICAL_PERCENT: f64 = ClassicalPrediction::CONFIDENCE as f64 * 100.0;

const NO_CLASSICAL_CLAUSE: &str = "I recorded your symptoms, but the classical model could not \
                                   produce a reliable prediction for this description.";

/// Round a [0, 1] confidence to a percentage with one decimal place.
///
/// Exact ties round to even: 6.25 becomes 6.2 and 18.75 becomes 18.8.
pub fn to_percent(confidence: f32) -> f64 {
    let percent = f64::from(confidence) * 100.0;
    (percent * 10.0).round_ties_even() / 10.0
}

pub fn reconcile(classical: &ClassicalOutcome, sequence: &SequenceOutcome) -> ReconciledPrediction {
    let mut scores = PredictionScores::new();
    if let Ok(c) = classical {
        scores.insert(c.label.clone(), CLASSICAL_PERCENT);
    }
    if let Ok(s) = sequence {
        scores.insert(s.display_label(), to_percent(s.confidence));
    }

    let primary = match (classical, sequence) {
        (_, Ok(s)) if s.label.is_some() => s.label.clone(),
        (Ok(c), _) => Some(c.label.clone()),
        _ => None,
    };

    let mut clauses = Vec::with_capacity(2);
    match classical {
        Ok(c) => clauses.push(format!(
            "Based on your symptoms, the classical model suggests: {}.",
            c.label
        )),
        Err(_) => clauses.push(NO_CLASSICAL_CLAUSE.to_string()),
    }
    if let Ok(s) = sequence {
        clauses.push(match &s.label {
            Some(label) => format!(
                "The sequence model also suggests: {label} (confidence {:.2}).",
                s.confidence
            ),
            None => format!(
                "The sequence model's top prediction index is {} (confidence {:.2}).",
                s.class_index, s.confidence
            ),
        });
    }

    ReconciledPrediction {
        scores,
        primary,
        confidence: sequence.as_ref().ok().map(|s| s.confidence),
        summary: clauses.join(" "),
    }
}

#[cfg(test)]
mod tests {
    use healix_contracts::prediction::{
        ClassicalPrediction, SequencePrediction, Unavailable, UnavailableReason,
    };

    use super::*;

    fn classical(label: &str) -> ClassicalOutcome {
        Ok(ClassicalPrediction { label: label.to_string() })
    }

    fn sequence(index: usize, confidence: f32, label: Option<&str>) -> SequenceOutcome {
        Ok(SequencePrediction { class_index: index, confidence, label: label.map(String::from) })
    }

    fn missing() -> Unavailable {
        Unavailable::new(UnavailableReason::ModelMissing, "")
    }

    #[test]
    fn both_values_named_sequence_is_primary() {
        let r = reconcile(&classical("Influenza"), &sequence(3, 0.8333, Some("Common Cold")));

        let entries: Vec<_> = r.scores.iter().collect();
        assert_eq!(entries, vec![("Influenza", 100.0), ("Common Cold", 83.3)]);
        assert_eq!(r.primary.as_deref(), Some("Common Cold"));
        assert_eq!(r.confidence, Some(0.8333));
        assert_eq!(
            r.summary,
            "Based on your symptoms, the classical model suggests: Influenza. \
             The sequence model also suggests: Common Cold (confidence 0.83)."
        );
    }

    #[test]
    fn unnamed_sequence_uses_placeholder_and_classical_primary() {
        let r = reconcile(&classical("Migraine"), &sequence(7, 0.5, None));

        assert_eq!(r.scores.get("Class 7 (model)"), Some(50.0));
        assert_eq!(r.primary.as_deref(), Some("Migraine"));
        assert!(r.summary.ends_with("The sequence model's top prediction index is 7 (confidence 0.50)."));
    }

    #[test]
    fn only_sequence_available() {
        let r = reconcile(&Err(missing()), &sequence(0, 0.91, Some("Asthma")));

        assert_eq!(r.scores.len(), 1);
        assert_eq!(r.primary.as_deref(), Some("Asthma"));
        assert!(r.summary.starts_with(NO_CLASSICAL_CLAUSE));
        assert!(r.summary.contains("Asthma (confidence 0.91)"));
    }

    #[test]
    fn unnamed_sequence_alone_has_no_primary() {
        let r = reconcile(&Err(missing()), &sequence(2, 0.4, None));
        assert!(r.primary.is_none());
        assert_eq!(r.scores.get("Class 2 (model)"), Some(40.0));
    }

    #[test]
    fn only_classical_available_omits_sequence_clause() {
        let r = reconcile(&classical("Gastroenteritis"), &Err(missing()));

        assert_eq!(r.scores.get("Gastroenteritis"), Some(100.0));
        assert_eq!(r.primary.as_deref(), Some("Gastroenteritis"));
        assert!(r.confidence.is_none());
        assert!(!r.summary.contains("sequence model"));
    }

    #[test]
    fn both_unavailable_is_a_valid_empty_answer() {
        let r = reconcile(&Err(missing()), &Err(missing()));

        assert!(r.scores.is_empty());
        assert!(r.primary.is_none());
        assert!(r.confidence.is_none());
        assert_eq!(r.summary, NO_CLASSICAL_CLAUSE);
    }

    #[test]
    fn same_label_from_both_models_keeps_one_entry() {
        let r = reconcile(&classical("Flu"), &sequence(1, 0.6, Some("Flu")));
        let entries: Vec<_> = r.scores.iter().collect();
        assert_eq!(entries, vec![("Flu", 60.0)]);
    }

    #[test]
    fn percent_rounds_to_one_decimal() {
        assert_eq!(to_percent(0.8333), 83.3);
        assert_eq!(to_percent(1.0), 100.0);
        assert_eq!(to_percent(0.0), 0.0);
        assert_eq!(to_percent(0.12345), 12.3);
    }

    #[test]
    fn percent_ties_round_to_even() {
        assert_eq!(to_percent(0.0625), 6.2);
        assert_eq!(to_percent(0.1875), 18.8);
        assert_eq!(to_percent(0.5625), 56.2);
    }
}

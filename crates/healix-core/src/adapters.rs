//! Predictor adapters: the only place the pipeline touches model objects.
//!
//! Both adapters return `Result<_, Unavailable>`. A model that failed to load
//! at startup stays unavailable for the life of the process; a model that
//! errors, panics, returns a malformed answer, or exceeds the timeout is
//! unavailable for that turn only.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use healix_contracts::{
    prediction::{
        ClassicalOutcome, ClassicalPrediction, SequenceOutcome, SequencePrediction, Unavailable,
        UnavailableReason,
    },
    symptom::SymptomSet,
    vocabulary::SymptomVocabulary,
};

use crate::{
    guard::invoke_bounded,
    traits::{ClassicalModel, LabelLookup, SequenceModel},
};

/// Default upper bound on a single model invocation.
pub const DEFAULT_MODEL_TIMEOUT: Duration = Duration::from_secs(5);

// ── Classical ─────────────────────────────────────────────────────────────────

/// Wraps a text-in / label-out model.
pub struct ClassicalAdapter {
    model: Option<Arc<dyn ClassicalModel>>,
    timeout: Duration,
}

impl ClassicalAdapter {
    pub fn new(model: Option<Arc<dyn ClassicalModel>>, timeout: Duration) -> Self {
        Self { model, timeout }
    }

    pub fn is_available(&self) -> bool {
        self.model.is_some()
    }

    /// Predict one label from the comma-joined symptom set.
    pub fn predict(&self, symptoms: &SymptomSet) -> ClassicalOutcome {
        let model = self.model.as_ref().ok_or_else(|| {
            Unavailable::new(UnavailableReason::ModelMissing, "classical model not loaded")
        })?;
        if symptoms.is_empty() {
            return Err(Unavailable::new(UnavailableReason::EmptyInput, "no symptoms to classify"));
        }

        let samples = vec![symptoms.joined()];
        debug!(input = %samples[0], "invoking classical model");

        let model = Arc::clone(model);
        let output = invoke_bounded("classical", self.timeout, move || model.predict(&samples))?;

        label_from_output(output).map(|label| ClassicalPrediction { label })
    }
}

/// Unwrap a single-element output; pass any longer output through as an
/// opaque label. An empty output carries no prediction at all.
fn label_from_output(mut output: Vec<String>) -> Result<String, Unavailable> {
    match output.len() {
        0 => Err(Unavailable::new(
            UnavailableReason::InvalidOutput,
            "classical model returned no labels",
        )),
        1 => Ok(output.remove(0)),
        _ => Ok(format!("[{}]", output.join(", "))),
    }
}

// ── Sequence ──────────────────────────────────────────────────────────────────

/// Build the one-hot input vector for `symptoms` over `vocabulary`.
///
/// Returns `None` for an empty symptom set or an empty vocabulary. Symptoms
/// that are not vocabulary members are ignored.
pub fn one_hot(vocabulary: &SymptomVocabulary, symptoms: &SymptomSet) -> Option<Vec<f32>> {
    if symptoms.is_empty() || vocabulary.is_empty() {
        return None;
    }

    let mut vector = vec![0.0_f32; vocabulary.size()];
    for symptom in symptoms.iter() {
        if let Some(index) = vocabulary.index_of(symptom) {
            vector[index] = 1.0;
        }
    }
    Some(vector)
}

/// Wraps a fixed-vocabulary one-hot model plus its optional label table.
pub struct SequenceAdapter {
    model: Option<Arc<dyn SequenceModel>>,
    vocabulary: Arc<SymptomVocabulary>,
    labels: Option<Arc<dyn LabelLookup>>,
    timeout: Duration,
}

impl SequenceAdapter {
    pub fn new(
        model: Option<Arc<dyn SequenceModel>>,
        vocabulary: Arc<SymptomVocabulary>,
        labels: Option<Arc<dyn LabelLookup>>,
        timeout: Duration,
    ) -> Self {
        Self { model, vocabulary, labels, timeout }
    }

    pub fn is_available(&self) -> bool {
        self.model.is_some()
    }

    /// Predict the arg-max class, its probability, and its resolved name.
    pub fn predict(&self, symptoms: &SymptomSet) -> SequenceOutcome {
        let model = self.model.as_ref().ok_or_else(|| {
            Unavailable::new(UnavailableReason::ModelMissing, "sequence model not loaded")
        })?;

        // The model is never invoked without a vector.
        let vector = one_hot(&self.vocabulary, symptoms).ok_or_else(|| {
            Unavailable::new(UnavailableReason::NoVector, "no symptoms to vectorize")
        })?;
        debug!(
            active = vector.iter().filter(|v| **v > 0.0).count(),
            width = vector.len(),
            "invoking sequence model"
        );

        let model = Arc::clone(model);
        let probabilities =
            invoke_bounded("sequence", self.timeout, move || model.predict(&vector))?;

        let (class_index, confidence) = arg_max(&probabilities)?;
        let label = self.labels.as_ref().and_then(|lookup| lookup.label_for(class_index));

        Ok(SequencePrediction { class_index, confidence, label })
    }
}

/// Index and value of the largest probability; the first one wins ties.
fn arg_max(probabilities: &[f32]) -> Result<(usize, f32), Unavailable> {
    if probabilities.iter().any(|p| !p.is_finite()) {
        return Err(Unavailable::new(
            UnavailableReason::InvalidOutput,
            "sequence model returned a non-finite probability",
        ));
    }

    let (index, confidence) = probabilities
        .iter()
        .copied()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (i, p)| match best {
            Some((_, bp)) if bp >= p => best,
            _ => Some((i, p)),
        })
        .ok_or_else(|| {
            Unavailable::new(UnavailableReason::InvalidOutput, "sequence model returned no classes")
        })?;

    if !(0.0..=1.0).contains(&confidence) {
        return Err(Unavailable::new(
            UnavailableReason::InvalidOutput,
            format!("probability {confidence} is outside [0, 1]"),
        ));
    }
    Ok((index, confidence))
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use healix_contracts::{
        error::{HealixError, HealixResult},
        prediction::UnavailableReason,
        symptom::SymptomSet,
        vocabulary::SymptomVocabulary,
    };

    use super::*;

    // ── Mock helpers ─────────────────────────────────────────────────────────

    struct FixedClassical {
        output: HealixResult<Vec<String>>,
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl FixedClassical {
        fn returning(labels: &[&str]) -> Self {
            Self {
                output: Ok(labels.iter().map(|s| s.to_string()).collect()),
                seen: Arc::new(Mutex::new(vec![])),
            }
        }
    }

    impl ClassicalModel for FixedClassical {
        fn predict(&self, samples: &[String]) -> HealixResult<Vec<String>> {
            self.seen.lock().unwrap().extend(samples.iter().cloned());
            match &self.output {
                Ok(v) => Ok(v.clone()),
                Err(e) => Err(HealixError::ModelFailure { reason: e.to_string() }),
            }
        }
    }

    /// Returns fixed probabilities and counts calls.
    struct FixedSequence {
        probabilities: Vec<f32>,
        calls: Arc<Mutex<u32>>,
        delay: Duration,
    }

    impl FixedSequence {
        fn new(probabilities: Vec<f32>) -> Self {
            Self { probabilities, calls: Arc::new(Mutex::new(0)), delay: Duration::ZERO }
        }
    }

    impl SequenceModel for FixedSequence {
        fn input_size(&self) -> usize {
            3
        }

        fn predict(&self, _input: &[f32]) -> HealixResult<Vec<f32>> {
            *self.calls.lock().unwrap() += 1;
            std::thread::sleep(self.delay);
            Ok(self.probabilities.clone())
        }
    }

    struct MapLookup(HashMap<usize, String>);

    impl LabelLookup for MapLookup {
        fn label_for(&self, class_index: usize) -> Option<String> {
            self.0.get(&class_index).cloned()
        }
    }

    fn vocab() -> Arc<SymptomVocabulary> {
        Arc::new(SymptomVocabulary::new(["fever", "cough", "headache"]).unwrap())
    }

    fn set(items: &[&str]) -> SymptomSet {
        items.iter().copied().collect()
    }

    // ── Classical ────────────────────────────────────────────────────────────

    #[test]
    fn classical_joins_symptoms_and_unwraps_single_label() {
        let model = FixedClassical::returning(&["Influenza"]);
        let seen = model.seen.clone();
        let adapter = ClassicalAdapter::new(Some(Arc::new(model)), DEFAULT_MODEL_TIMEOUT);

        let out = adapter.predict(&set(&["fever", "cough"])).unwrap();

        assert_eq!(out.label, "Influenza");
        assert_eq!(*seen.lock().unwrap(), vec!["fever, cough".to_string()]);
    }

    #[test]
    fn classical_multi_label_output_is_passed_through() {
        let adapter = ClassicalAdapter::new(
            Some(Arc::new(FixedClassical::returning(&["Flu", "Cold"]))),
            DEFAULT_MODEL_TIMEOUT,
        );
        assert_eq!(adapter.predict(&set(&["fever"])).unwrap().label, "[Flu, Cold]");
    }

    #[test]
    fn classical_empty_output_is_unavailable() {
        let adapter = ClassicalAdapter::new(
            Some(Arc::new(FixedClassical::returning(&[]))),
            DEFAULT_MODEL_TIMEOUT,
        );
        let err = adapter.predict(&set(&["fever"])).unwrap_err();
        assert_eq!(err.reason, UnavailableReason::InvalidOutput);
    }

    #[test]
    fn classical_model_error_is_unavailable() {
        let model = FixedClassical {
            output: Err(HealixError::ModelFailure { reason: "vectorizer mismatch".into() }),
            seen: Arc::new(Mutex::new(vec![])),
        };
        let adapter = ClassicalAdapter::new(Some(Arc::new(model)), DEFAULT_MODEL_TIMEOUT);

        let err = adapter.predict(&set(&["fever"])).unwrap_err();
        assert_eq!(err.reason, UnavailableReason::ModelFailed);
        assert!(err.detail.contains("vectorizer mismatch"));
    }

    #[test]
    fn classical_without_model_is_unavailable() {
        let adapter = ClassicalAdapter::new(None, DEFAULT_MODEL_TIMEOUT);
        assert!(!adapter.is_available());
        let err = adapter.predict(&set(&["fever"])).unwrap_err();
        assert_eq!(err.reason, UnavailableReason::ModelMissing);
    }

    // ── Vectorization ────────────────────────────────────────────────────────

    #[test]
    fn one_hot_marks_exactly_the_vocabulary_members() {
        let v = vocab();
        let vector = one_hot(&v, &set(&["headache", "fever", "itchy elbow"])).unwrap();

        assert_eq!(vector, vec![1.0, 0.0, 1.0]);
        assert_eq!(vector.iter().filter(|x| **x == 1.0).count(), 2);
    }

    #[test]
    fn one_hot_of_empty_set_is_none() {
        assert!(one_hot(&vocab(), &SymptomSet::new()).is_none());
    }

    #[test]
    fn one_hot_with_empty_vocabulary_is_none() {
        let empty = SymptomVocabulary::new(Vec::<String>::new()).unwrap();
        assert!(one_hot(&empty, &set(&["fever"])).is_none());
    }

    // ── Sequence ─────────────────────────────────────────────────────────────

    #[test]
    fn sequence_resolves_label_and_confidence() {
        let lookup = MapLookup(HashMap::from([(1, "Common Cold".to_string())]));
        let adapter = SequenceAdapter::new(
            Some(Arc::new(FixedSequence::new(vec![0.1, 0.8333, 0.0667]))),
            vocab(),
            Some(Arc::new(lookup)),
            DEFAULT_MODEL_TIMEOUT,
        );

        let out = adapter.predict(&set(&["fever"])).unwrap();
        assert_eq!(out.class_index, 1);
        assert!((out.confidence - 0.8333).abs() < 1e-6);
        assert_eq!(out.label.as_deref(), Some("Common Cold"));
    }

    #[test]
    fn sequence_without_lookup_match_has_no_label() {
        let adapter = SequenceAdapter::new(
            Some(Arc::new(FixedSequence::new(vec![0.2, 0.2, 0.6]))),
            vocab(),
            Some(Arc::new(MapLookup(HashMap::new()))),
            DEFAULT_MODEL_TIMEOUT,
        );
        let out = adapter.predict(&set(&["cough"])).unwrap();
        assert_eq!(out.class_index, 2);
        assert!(out.label.is_none());
        assert_eq!(out.display_label(), "Class 2 (model)");
    }

    #[test]
    fn sequence_ties_pick_first_index() {
        let adapter = SequenceAdapter::new(
            Some(Arc::new(FixedSequence::new(vec![0.4, 0.4, 0.2]))),
            vocab(),
            None,
            DEFAULT_MODEL_TIMEOUT,
        );
        assert_eq!(adapter.predict(&set(&["cough"])).unwrap().class_index, 0);
    }

    #[test]
    fn sequence_empty_set_never_invokes_model() {
        let model = FixedSequence::new(vec![1.0, 0.0, 0.0]);
        let calls = model.calls.clone();
        let adapter = SequenceAdapter::new(Some(Arc::new(model)), vocab(), None, DEFAULT_MODEL_TIMEOUT);

        let err = adapter.predict(&SymptomSet::new()).unwrap_err();
        assert_eq!(err.reason, UnavailableReason::NoVector);
        assert_eq!(*calls.lock().unwrap(), 0, "model must not run without a vector");
    }

    #[test]
    fn sequence_malformed_probabilities_are_unavailable() {
        for probs in [vec![], vec![f32::NAN, 0.5, 0.5], vec![0.1, 1.7, 0.0]] {
            let adapter = SequenceAdapter::new(
                Some(Arc::new(FixedSequence::new(probs.clone()))),
                vocab(),
                None,
                DEFAULT_MODEL_TIMEOUT,
            );
            let err = adapter.predict(&set(&["fever"])).unwrap_err();
            assert_eq!(err.reason, UnavailableReason::InvalidOutput, "probs = {probs:?}");
        }
    }

    #[test]
    fn sequence_slow_model_times_out() {
        let mut model = FixedSequence::new(vec![1.0, 0.0, 0.0]);
        model.delay = Duration::from_millis(300);
        let adapter =
            SequenceAdapter::new(Some(Arc::new(model)), vocab(), None, Duration::from_millis(20));

        let err = adapter.predict(&set(&["fever"])).unwrap_err();
        assert_eq!(err.reason, UnavailableReason::TimedOut);
    }
}

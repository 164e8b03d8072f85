//! Startup loading of every model artifact named in `[models]`.
//!
//! Each artifact loads independently. An unset or empty path disables that
//! model. A load failure disables it too, unless `strict` is set, in which
//! case it aborts startup.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use healix_contracts::{
    error::{HealixError, HealixResult},
    vocabulary::SymptomVocabulary,
};
use healix_core::{
    adapters::{ClassicalAdapter, SequenceAdapter},
    config::ModelSettings,
    traits::{ClassicalModel, LabelLookup, SequenceModel},
};

use crate::{classical::TextPipelineModel, labels::CsvLabelLookup, sequence::DenseSoftmaxModel};

/// Whatever loaded successfully.
#[derive(Default)]
pub struct ModelSet {
    pub classical: Option<Arc<dyn ClassicalModel>>,
    pub sequence: Option<Arc<dyn SequenceModel>>,
    pub labels: Option<Arc<dyn LabelLookup>>,
}

impl ModelSet {
    /// Wrap the loaded models in their adapters.
    pub fn into_adapters(
        self,
        vocabulary: Arc<SymptomVocabulary>,
        settings: &ModelSettings,
    ) -> (ClassicalAdapter, SequenceAdapter) {
        let timeout = settings.timeout();
        (
            ClassicalAdapter::new(self.classical, timeout),
            SequenceAdapter::new(self.sequence, vocabulary, self.labels, timeout),
        )
    }
}

/// Load the classical model, sequence model, and label table.
///
/// # Errors
///
/// Only in strict mode: the first artifact that fails to load, or a sequence
/// model whose `input_size` differs from the vocabulary size.
pub fn load_models(settings: &ModelSettings, vocabulary: &SymptomVocabulary) -> HealixResult<ModelSet> {
    let classical = load_one("classical", settings.classical.as_deref(), settings.strict, |path| {
        let model = TextPipelineModel::from_file(path)?;
        info!(path = %path.display(), classes = model.class_count(), "classical model loaded");
        Ok(Arc::new(model) as Arc<dyn ClassicalModel>)
    })?;

    let sequence = load_one("sequence", settings.sequence.as_deref(), settings.strict, |path| {
        let model = DenseSoftmaxModel::from_file(path)?;
        if model.input_size() != vocabulary.size() {
            return Err(HealixError::ArtifactLoad {
                path: path.display().to_string(),
                reason: format!(
                    "input_size {} does not match the symptom vocabulary size {}",
                    model.input_size(),
                    vocabulary.size()
                ),
            });
        }
        info!(
            path = %path.display(),
            input_size = model.input_size(),
            classes = model.class_count(),
            "sequence model loaded"
        );
        Ok(Arc::new(model) as Arc<dyn SequenceModel>)
    })?;

    let labels = load_one("labels", settings.labels.as_deref(), settings.strict, |path| {
        let lookup = CsvLabelLookup::from_file(path)?;
        info!(path = %path.display(), labels = lookup.len(), "label table loaded");
        Ok(Arc::new(lookup) as Arc<dyn LabelLookup>)
    })?;

    Ok(ModelSet { classical, sequence, labels })
}

fn load_one<T>(
    name: &str,
    path: Option<&Path>,
    strict: bool,
    load: impl FnOnce(&Path) -> HealixResult<T>,
) -> HealixResult<Option<T>> {
    let path = match path {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => {
            info!(model = name, "no artifact configured; model disabled");
            return Ok(None);
        }
    };

    match load(path) {
        Ok(model) => Ok(Some(model)),
        Err(e) if strict => Err(e),
        Err(e) => {
            warn!(model = name, error = %e, "artifact failed to load; model unavailable");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use healix_contracts::symptom::SymptomSet;
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    fn vocab() -> SymptomVocabulary {
        SymptomVocabulary::new(["fever", "cough", "headache"]).unwrap()
    }

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn artifacts(dir: &TempDir, input_size: usize) -> ModelSettings {
        let classical = json!({
            "kind": "text-pipeline",
            "classes": [{ "label": "Influenza", "weights": { "fever": 1.0 } }]
        });
        let sequence = json!({
            "kind": "dense-softmax",
            "input_size": input_size,
            "classes": [
                { "weights": [{ "index": 0, "weight": 3.0 }] },
                { "weights": [{ "index": 1, "weight": 3.0 }] }
            ]
        });
        ModelSettings {
            classical: Some(write(dir, "classical.json", &classical.to_string())),
            sequence: Some(write(dir, "sequence.json", &sequence.to_string())),
            labels: Some(write(dir, "labels.csv", "Encoded,Disease\n0,Influenza\n1,Bronchitis\n")),
            ..Default::default()
        }
    }

    #[test]
    fn all_artifacts_load_and_drive_the_adapters() {
        let dir = TempDir::new().unwrap();
        let settings = artifacts(&dir, 3);
        let vocabulary = Arc::new(vocab());

        let set = load_models(&settings, &vocabulary).unwrap();
        assert!(set.classical.is_some() && set.sequence.is_some() && set.labels.is_some());

        let (classical, sequence) = set.into_adapters(vocabulary, &settings);
        let symptoms: SymptomSet = ["cough"].into_iter().collect();
        assert_eq!(classical.predict(&symptoms).unwrap().label, "Influenza");

        let prediction = sequence.predict(&symptoms).unwrap();
        assert_eq!(prediction.class_index, 1);
        assert_eq!(prediction.label.as_deref(), Some("Bronchitis"));
    }

    #[test]
    fn vocabulary_size_mismatch_disables_sequence_model() {
        let dir = TempDir::new().unwrap();
        let settings = artifacts(&dir, 5);

        let set = load_models(&settings, &vocab()).unwrap();
        assert!(set.sequence.is_none());
        assert!(set.classical.is_some());
    }

    #[test]
    fn strict_mode_makes_failures_fatal() {
        let dir = TempDir::new().unwrap();
        let settings = ModelSettings { strict: true, ..artifacts(&dir, 5) };

        let err = load_models(&settings, &vocab()).err().unwrap();
        assert!(err.to_string().contains("vocabulary size"));
    }

    #[test]
    fn missing_files_leave_models_unavailable() {
        let settings = ModelSettings {
            classical: Some("no/such/classical.json".into()),
            sequence: Some("no/such/sequence.json".into()),
            labels: Some("no/such/labels.csv".into()),
            ..Default::default()
        };
        let set = load_models(&settings, &vocab()).unwrap();
        assert!(set.classical.is_none() && set.sequence.is_none() && set.labels.is_none());
    }

    #[test]
    fn empty_or_unset_path_disables_without_error_even_when_strict() {
        let settings = ModelSettings {
            classical: Some(PathBuf::new()),
            sequence: None,
            labels: None,
            strict: true,
            ..Default::default()
        };
        let set = load_models(&settings, &vocab()).unwrap();
        assert!(set.classical.is_none() && set.sequence.is_none());
    }

    #[test]
    fn bundled_artifacts_match_the_builtin_vocabulary() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../artifacts");
        let settings = ModelSettings {
            classical: Some(root.join("classical.json")),
            sequence: Some(root.join("sequence.json")),
            labels: Some(root.join("disease_mapping.csv")),
            strict: true,
            ..Default::default()
        };
        let vocabulary = Arc::new(healix_nlp::catalog::builtin().unwrap());

        let set = load_models(&settings, &vocabulary).unwrap();
        let (classical, sequence) = set.into_adapters(vocabulary, &settings);

        let symptoms: SymptomSet = ["cough", "fever"].into_iter().collect();
        assert_eq!(classical.predict(&symptoms).unwrap().label, "Common Cold");
        assert_eq!(sequence.predict(&symptoms).unwrap().label.as_deref(), Some("Common Cold"));
    }
}

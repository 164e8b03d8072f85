//! The `dense-softmax` sequence model over one-hot symptom vectors.
//!
//! ```json
//! {
//!   "kind": "dense-softmax",
//!   "input_size": 378,
//!   "classes": [
//!     { "bias": -0.2, "weights": [ { "index": 15, "weight": 1.4 } ] }
//!   ]
//! }
//! ```
//!
//! Weights are sparse: an input position with no entry contributes nothing
//! to that class. Output is `softmax(bias + W·x)`, one probability per class
//! in declaration order.

use std::path::Path;

use serde::Deserialize;
use serde_json::{json, Value};

use healix_contracts::error::{HealixError, HealixResult};
use healix_core::traits::SequenceModel;

use crate::artifact;

pub const KIND: &str = "dense-softmax";

#[derive(Debug, Clone, Copy, Deserialize)]
struct SparseWeight {
    index: usize,
    weight: f32,
}

#[derive(Debug, Clone, Deserialize)]
struct DenseClass {
    #[serde(default)]
    bias: f32,
    #[serde(default)]
    weights: Vec<SparseWeight>,
}

#[derive(Debug, Clone, Deserialize)]
struct DenseSoftmaxArtifact {
    input_size: usize,
    classes: Vec<DenseClass>,
}

/// JSON Schema for the `dense-softmax` artifact.
pub fn schema() -> Value {
    json!({
        "type": "object",
        "required": ["kind", "input_size", "classes"],
        "properties": {
            "kind": { "const": KIND },
            "input_size": { "type": "integer", "minimum": 1 },
            "classes": {
                "type": "array",
                "minItems": 1,
                "items": {
                    "type": "object",
                    "properties": {
                        "bias": { "type": "number" },
                        "weights": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "required": ["index", "weight"],
                                "properties": {
                                    "index": { "type": "integer", "minimum": 0 },
                                    "weight": { "type": "number" }
                                }
                            }
                        }
                    }
                }
            }
        }
    })
}

#[derive(Debug, Clone)]
pub struct DenseSoftmaxModel {
    input_size: usize,
    classes: Vec<DenseClass>,
}

impl DenseSoftmaxModel {
    pub fn from_file(path: &Path) -> HealixResult<Self> {
        let artifact: DenseSoftmaxArtifact = artifact::load(path, &schema())?;
        Self::build(&path.display().to_string(), artifact)
    }

    pub fn from_value(source: &str, document: Value) -> HealixResult<Self> {
        let artifact: DenseSoftmaxArtifact = artifact::from_value(source, document, &schema())?;
        Self::build(source, artifact)
    }

    fn build(source: &str, artifact: DenseSoftmaxArtifact) -> HealixResult<Self> {
        let out_of_range = artifact
            .classes
            .iter()
            .enumerate()
            .flat_map(|(c, class)| class.weights.iter().map(move |w| (c, w.index)))
            .find(|(_, index)| *index >= artifact.input_size);
        if let Some((class, index)) = out_of_range {
            return Err(HealixError::ArtifactLoad {
                path: source.to_string(),
                reason: format!(
                    "class {class} has a weight at index {index}, beyond input_size {}",
                    artifact.input_size
                ),
            });
        }
        Ok(Self { input_size: artifact.input_size, classes: artifact.classes })
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }
}

impl SequenceModel for DenseSoftmaxModel {
    fn input_size(&self) -> usize {
        self.input_size
    }

    fn predict(&self, input: &[f32]) -> HealixResult<Vec<f32>> {
        if input.len() != self.input_size {
            return Err(HealixError::ModelFailure {
                reason: format!(
                    "expected an input of length {}, got {}",
                    self.input_size,
                    input.len()
                ),
            });
        }

        let logits: Vec<f32> = self
            .classes
            .iter()
            .map(|class| class.bias + class.weights.iter().map(|w| w.weight * input[w.index]).sum::<f32>())
            .collect();
        Ok(softmax(&logits))
    }
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
    let total: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

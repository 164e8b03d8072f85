//! The `text-pipeline` classical model: bag-of-tokens linear scoring.
//!
//! ```json
//! {
//!   "kind": "text-pipeline",
//!   "classes": [
//!     { "label": "Influenza", "bias": 0.1, "weights": { "fever": 1.2, "chills": 0.8 } }
//!   ]
//! }
//! ```
//!
//! A sample is scored per class as `bias + Σ weights[token]` over its
//! normalized tokens (repeated tokens count once). The highest score wins;
//! on a tie the class declared first wins.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use serde::Deserialize;
use serde_json::{json, Value};

use healix_contracts::error::HealixResult;
use healix_core::traits::ClassicalModel;
use healix_nlp::normalize::tokens;

use crate::artifact;

pub const KIND: &str = "text-pipeline";

#[derive(Debug, Clone, Deserialize)]
struct TextClass {
    label: String,
    #[serde(default)]
    bias: f64,
    #[serde(default)]
    weights: HashMap<String, f64>,
}

#[derive(Debug, Clone, Deserialize)]
struct TextPipelineArtifact {
    classes: Vec<TextClass>,
}

/// JSON Schema for the `text-pipeline` artifact.
pub fn schema() -> Value {
    json!({
        "type": "object",
        "required": ["kind", "classes"],
        "properties": {
            "kind": { "const": KIND },
            "classes": {
                "type": "array",
                "minItems": 1,
                "items": {
                    "type": "object",
                    "required": ["label"],
                    "properties": {
                        "label": { "type": "string", "minLength": 1 },
                        "bias": { "type": "number" },
                        "weights": {
                            "type": "object",
                            "additionalProperties": { "type": "number" }
                        }
                    }
                }
            }
        }
    })
}

#[derive(Debug, Clone)]
pub struct TextPipelineModel {
    classes: Vec<TextClass>,
}

impl TextPipelineModel {
    pub fn from_file(path: &Path) -> HealixResult<Self> {
        let artifact: TextPipelineArtifact = artifact::load(path, &schema())?;
        Ok(Self { classes: artifact.classes })
    }

    pub fn from_value(source: &str, document: Value) -> HealixResult<Self> {
        let artifact: TextPipelineArtifact = artifact::from_value(source, document, &schema())?;
        Ok(Self { classes: artifact.classes })
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    fn classify(&self, sample: &str) -> &str {
        let present: BTreeSet<String> = tokens(sample).collect();

        let mut best: Option<(&TextClass, f64)> = None;
        for class in &self.classes {
            let score = class.bias
                + present.iter().filter_map(|t| class.weights.get(t)).sum::<f64>();
            match best {
                Some((_, top)) if top >= score => {}
                _ => best = Some((class, score)),
            }
        }
        // The schema guarantees at least one class.
        best.map(|(class, _)| class.label.as_str()).unwrap_or_default()
    }
}

impl ClassicalModel for TextPipelineModel {
    fn predict(&self, samples: &[String]) -> HealixResult<Vec<String>> {
        Ok(samples.iter().map(|s| self.classify(s).to_string()).collect())
    }
}

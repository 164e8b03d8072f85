//! Reading model artifacts and validating them against their JSON Schema.
//!
//! Every artifact is a JSON document with a `kind` discriminator. Structural
//! validation runs before deserialization so a malformed artifact reports
//! every violation at once instead of the first serde error.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use healix_contracts::error::{HealixError, HealixResult};

/// Read `path`, validate it against `schema`, and deserialize it as `T`.
pub fn load<T: DeserializeOwned>(path: &Path, schema: &Value) -> HealixResult<T> {
    let display = path.display().to_string();
    let contents = std::fs::read_to_string(path).map_err(|e| HealixError::ArtifactLoad {
        path: display.clone(),
        reason: format!("failed to read file: {e}"),
    })?;
    let document: Value = serde_json::from_str(&contents).map_err(|e| HealixError::ArtifactLoad {
        path: display.clone(),
        reason: format!("not valid JSON: {e}"),
    })?;
    from_value(&display, document, schema)
}

/// Validate an in-memory document and deserialize it as `T`.
///
/// `source` names the document in error messages.
pub fn from_value<T: DeserializeOwned>(source: &str, document: Value, schema: &Value) -> HealixResult<T> {
    validate(&document, schema).map_err(|reason| HealixError::ArtifactLoad {
        path: source.to_string(),
        reason,
    })?;
    debug!(source, "artifact passed schema validation");

    serde_json::from_value(document).map_err(|e| HealixError::ArtifactLoad {
        path: source.to_string(),
        reason: format!("does not match the artifact layout: {e}"),
    })
}

/// Collect every schema violation in `document` into one message.
fn validate(document: &Value, schema: &Value) -> Result<(), String> {
    let validator = jsonschema::validator_for(schema)
        .map_err(|e| format!("invalid artifact schema: {e}"))?;

    let violations: Vec<String> = validator
        .iter_errors(document)
        .map(|error| format!("at '{}': {}", error.instance_path, error))
        .collect();
    if violations.is_empty() {
        return Ok(());
    }

    for message in &violations {
        warn!(%message, "artifact schema violation");
    }
    Err(format!("schema violations: {}", violations.join("; ")))
}

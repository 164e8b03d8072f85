//! Loading the symptom vocabulary from TOML.
//!
//! A catalog document is a single array:
//!
//! ```toml
//! symptoms = ["shortness of breath", "cough", "fever"]
//! ```
//!
//! The built-in catalog is compiled into the binary; `[vocabulary] path`
//! replaces it with a file on disk.

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use healix_contracts::{
    error::{HealixError, HealixResult},
    vocabulary::SymptomVocabulary,
};
use healix_core::config::VocabularySettings;

/// The catalog shipped with the crate, in sequence-model training order.
pub const BUILTIN_CATALOG: &str = include_str!("../vocabulary/symptoms.toml");

#[derive(Debug, Deserialize)]
struct CatalogFile {
    symptoms: Vec<String>,
}

/// Parse a catalog document and validate it into a vocabulary.
///
/// Returns `ConfigError` for malformed TOML and `VocabularyInvalid` for
/// duplicate or empty labels.
pub fn from_toml_str(s: &str) -> HealixResult<SymptomVocabulary> {
    let catalog: CatalogFile = toml::from_str(s).map_err(|e| HealixError::ConfigError {
        reason: format!("failed to parse vocabulary TOML: {e}"),
    })?;
    SymptomVocabulary::new(catalog.symptoms)
}

pub fn from_file(path: &Path) -> HealixResult<SymptomVocabulary> {
    let contents = std::fs::read_to_string(path).map_err(|e| HealixError::ConfigError {
        reason: format!("failed to read vocabulary file '{}': {}", path.display(), e),
    })?;
    from_toml_str(&contents)
}

pub fn builtin() -> HealixResult<SymptomVocabulary> {
    from_toml_str(BUILTIN_CATALOG)
}

/// Resolve the vocabulary named by `settings`.
pub fn load(settings: &VocabularySettings) -> HealixResult<SymptomVocabulary> {
    let vocabulary = match &settings.path {
        Some(path) => from_file(path)?,
        None => builtin()?,
    };
    let source = match &settings.path {
        Some(path) => path.display().to_string(),
        None => "builtin".to_string(),
    };
    info!(size = vocabulary.size(), source = %source, "symptom vocabulary loaded");
    Ok(vocabulary)
}

//! Runtime configuration, resolved once at startup.
//!
//! `HealixConfig` is read from a TOML file. Every section and field has a
//! default, so an empty document (or no file at all) is a valid config.
//!
//! ```toml
//! [extractor]
//! mode = "auto"          # "auto" | "rich" | "keyword"
//! threshold = 0.55
//!
//! [models]
//! classical = "artifacts/classical.json"
//! sequence = "artifacts/sequence.json"
//! labels = "artifacts/disease_mapping.csv"
//! timeout_ms = 5000
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use healix_contracts::{
    error::{HealixError, HealixResult},
    report::DoctorRecommendation,
};

/// Which symptom extractor to build at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractorMode {
    /// Probe the rich capability; fall back to keyword matching if absent.
    #[default]
    Auto,
    /// Require the rich lemma-overlap extractor; fail startup without it.
    Rich,
    /// Always use the keyword extractor.
    Keyword,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabularySettings {
    /// TOML file with a `symptoms = [...]` array. `None` uses the built-in catalog.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorSettings {
    pub mode: ExtractorMode,
    /// Minimum share of a label's lemmas that must appear in the input.
    pub threshold: f64,
    /// A label also matches when at least this many of its lemmas appear.
    pub min_overlap: usize,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self { mode: ExtractorMode::Auto, threshold: 0.55, min_overlap: 2 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub classical: Option<PathBuf>,
    pub sequence: Option<PathBuf>,
    /// CSV with `Encoded,Disease` columns.
    pub labels: Option<PathBuf>,
    /// Upper bound on one model invocation.
    pub timeout_ms: u64,
    /// When true a missing or invalid artifact aborts startup instead of
    /// leaving that adapter unavailable.
    pub strict: bool,
}

impl ModelSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            classical: Some(PathBuf::from("artifacts/classical.json")),
            sequence: Some(PathBuf::from("artifacts/sequence.json")),
            labels: Some(PathBuf::from("artifacts/disease_mapping.csv")),
            timeout_ms: 5_000,
            strict: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Holds `reports.json` and `users.json`.
    pub data_dir: PathBuf,
    /// Holds the per-patient report documents.
    pub reports_dir: PathBuf,
}

impl StorageSettings {
    pub fn reports_file(&self) -> PathBuf {
        self.data_dir.join("reports.json")
    }

    pub fn users_file(&self) -> PathBuf {
        self.data_dir.join("users.json")
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self { data_dir: PathBuf::from("data"), reports_dir: PathBuf::from("reports") }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Conversations untouched for this long are forgotten.
    pub idle_timeout_secs: u64,
}

impl SessionSettings {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self { idle_timeout_secs: 30 * 60 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// HMAC key for bearer tokens.
    pub secret: String,
    pub token_ttl_minutes: i64,
    /// PBKDF2 rounds for newly hashed passwords.
    pub password_iterations: u32,
}

impl AuthSettings {
    pub const DEFAULT_SECRET: &'static str = "change-me-in-production";
    /// One year.
    pub const MAX_TOKEN_TTL_MINUTES: i64 = 525_600;
    pub const MIN_PASSWORD_ITERATIONS: u32 = 10_000;
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            secret: Self::DEFAULT_SECRET.to_string(),
            token_ttl_minutes: 60,
            password_iterations: 600_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub disclaimer: String,
    pub doctors: Vec<DoctorRecommendation>,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            disclaimer: "This report is generated by AI and is not a medical diagnosis. \
                         Please consult a licensed physician."
                .to_string(),
            doctors: vec![
                DoctorRecommendation {
                    id: "featured-1".to_string(),
                    name: "Dr. Ahmed Hassan".to_string(),
                    specialty: "Cardiologist".to_string(),
                    experience: "12+ years experience".to_string(),
                },
                DoctorRecommendation {
                    id: "featured-2".to_string(),
                    name: "Dr. Fatima Ali".to_string(),
                    specialty: "Pediatrician".to_string(),
                    experience: "8+ years experience".to_string(),
                },
            ],
        }
    }
}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HealixConfig {
    pub vocabulary: VocabularySettings,
    pub extractor: ExtractorSettings,
    pub models: ModelSettings,
    pub storage: StorageSettings,
    pub sessions: SessionSettings,
    pub auth: AuthSettings,
    pub report: ReportSettings,
}

impl HealixConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> HealixResult<Self> {
        let config: HealixConfig = toml::from_str(s).map_err(|e| HealixError::ConfigError {
            reason: format!("failed to parse config TOML: {e}"),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse the TOML file at `path`.
    pub fn from_file(path: &Path) -> HealixResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| HealixError::ConfigError {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Load `path` if it exists, otherwise fall back to the defaults.
    pub fn load_or_default(path: &Path) -> HealixResult<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Reject values that would make the pipeline misbehave silently.
    pub fn validate(&self) -> HealixResult<()> {
        let threshold = self.extractor.threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(HealixError::ConfigError {
                reason: format!("extractor.threshold must be in (0, 1], got {threshold}"),
            });
        }
        if self.extractor.min_overlap == 0 {
            return Err(HealixError::ConfigError {
                reason: "extractor.min_overlap must be at least 1".to_string(),
            });
        }
        if self.models.timeout_ms == 0 {
            return Err(HealixError::ConfigError {
                reason: "models.timeout_ms must be greater than zero".to_string(),
            });
        }
        if self.sessions.idle_timeout_secs == 0 {
            return Err(HealixError::ConfigError {
                reason: "sessions.idle_timeout_secs must be greater than zero".to_string(),
            });
        }
        if self.auth.secret.is_empty() {
            return Err(HealixError::ConfigError {
                reason: "auth.secret must not be empty".to_string(),
            });
        }
        let ttl = self.auth.token_ttl_minutes;
        if !(1..=AuthSettings::MAX_TOKEN_TTL_MINUTES).contains(&ttl) {
            return Err(HealixError::ConfigError {
                reason: format!(
                    "auth.token_ttl_minutes must be in 1..={}, got {ttl}",
                    AuthSettings::MAX_TOKEN_TTL_MINUTES
                ),
            });
        }
        if self.auth.password_iterations < AuthSettings::MIN_PASSWORD_ITERATIONS {
            return Err(HealixError::ConfigError {
                reason: format!(
                    "auth.password_iterations must be at least {}",
                    AuthSettings::MIN_PASSWORD_ITERATIONS
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = HealixConfig::from_toml_str("").unwrap();

        assert_eq!(config.extractor.mode, ExtractorMode::Auto);
        assert_eq!(config.extractor.threshold, 0.55);
        assert_eq!(config.extractor.min_overlap, 2);
        assert_eq!(config.models.timeout(), Duration::from_secs(5));
        assert_eq!(config.report.doctors.len(), 2);
        assert_eq!(config.storage.reports_file(), PathBuf::from("data/reports.json"));
    }

    #[test]
    fn sections_override_individual_fields() {
        let toml = r#"
            [extractor]
            mode = "keyword"

            [models]
            sequence = "models/cnn.json"
            timeout_ms = 250
            strict = true

            [[report.doctors]]
            id = "gp-1"
            name = "Dr. Lee"
            specialty = "General Practice"
            experience = "5 years"
        "#;

        let config = HealixConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.extractor.mode, ExtractorMode::Keyword);
        assert_eq!(config.extractor.threshold, 0.55);
        assert_eq!(config.models.sequence, Some(PathBuf::from("models/cnn.json")));
        assert_eq!(config.models.classical, Some(PathBuf::from("artifacts/classical.json")));
        assert!(config.models.strict);
        assert_eq!(config.report.doctors.len(), 1);
        assert_eq!(config.report.doctors[0].name, "Dr. Lee");
    }

    #[test]
    fn unknown_mode_is_a_config_error() {
        let err = HealixConfig::from_toml_str("[extractor]\nmode = \"fancy\"").unwrap_err();
        assert!(matches!(err, HealixError::ConfigError { .. }));
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let err = HealixConfig::from_toml_str("[extractor]\nthreshold = 1.5").unwrap_err();
        assert!(err.to_string().contains("threshold"));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = HealixConfig::load_or_default(Path::new("does/not/exist.toml")).unwrap();
        assert_eq!(config.auth.token_ttl_minutes, 60);
    }

    #[test]
    fn session_idle_timeout_defaults_and_overrides() {
        assert_eq!(HealixConfig::default().sessions.idle_timeout(), Duration::from_secs(1800));
        let config = HealixConfig::from_toml_str("[sessions]\nidle_timeout_secs = 60").unwrap();
        assert_eq!(config.sessions.idle_timeout(), Duration::from_secs(60));
        assert!(HealixConfig::from_toml_str("[sessions]\nidle_timeout_secs = 0").is_err());
    }

    #[test]
    fn token_ttl_is_bounded() {
        let err = HealixConfig::from_toml_str("[auth]\ntoken_ttl_minutes = 1000000000000").unwrap_err();
        assert!(matches!(err, HealixError::ConfigError { .. }));
        assert!(err.to_string().contains("token_ttl_minutes"));

        assert!(HealixConfig::from_toml_str("[auth]\ntoken_ttl_minutes = 0").is_err());
        let max = format!("[auth]\ntoken_ttl_minutes = {}", AuthSettings::MAX_TOKEN_TTL_MINUTES);
        assert!(HealixConfig::from_toml_str(&max).is_ok());
    }

    #[test]
    fn weak_password_iterations_are_rejected() {
        let err = HealixConfig::from_toml_str("[auth]\npassword_iterations = 1").unwrap_err();
        assert!(err.to_string().contains("password_iterations"));
        assert_eq!(HealixConfig::default().auth.password_iterations, 600_000);
    }
}

//! Error types shared by every Healix crate.
//!
//! All fallible operations return `HealixResult<T>`. Predictor failures are
//! deliberately absent here: they are folded into `Unavailable` by the
//! adapters and never reach the caller as errors.

use thiserror::Error;

/// The unified error type for the Healix workspace.
#[derive(Debug, Error)]
pub enum HealixError {
    /// A configuration value or file is missing, malformed, or inconsistent.
    ///
    /// Raised at startup; the process must not serve requests afterwards.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// The symptom vocabulary contains a duplicate or empty label.
    #[error("invalid symptom vocabulary: {reason}")]
    VocabularyInvalid { reason: String },

    /// A model artifact could not be read, parsed, or validated.
    #[error("model artifact '{path}' could not be loaded: {reason}")]
    ArtifactLoad { path: String, reason: String },

    /// A loaded model rejected its input or failed during inference.
    #[error("model inference failed: {reason}")]
    ModelFailure { reason: String },

    /// The report store or a patient document could not be written.
    #[error("storage write failed: {reason}")]
    StorageWrite { reason: String },

    /// The report store or a patient document could not be read.
    #[error("storage read failed: {reason}")]
    StorageRead { reason: String },

    /// The session registry could not be accessed.
    #[error("session error: {reason}")]
    SessionError { reason: String },

    /// Signup or login was attempted without an email or password.
    #[error("email and password are required")]
    MissingCredentials,

    /// Signup was attempted with an email that is already registered.
    #[error("user '{email}' already exists")]
    UserExists { email: String },

    /// The email/password pair did not match a stored account.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The account exists but does not hold the requested role.
    #[error("role '{requested}' does not match this account")]
    RoleMismatch { requested: String },

    /// A bearer token failed signature, format, or expiry checks.
    #[error("invalid token: {reason}")]
    TokenInvalid { reason: String },

    /// Reading from or writing to the console failed.
    #[error("console I/O failed: {reason}")]
    ConsoleError { reason: String },
}

/// Convenience alias used throughout the Healix crates.
pub type HealixResult<T> = Result<T, HealixError>;

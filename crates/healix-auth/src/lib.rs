//! # healix-auth
//!
//! Patient and doctor accounts for the Healix intake assistant.
//!
//! - [`users`]: the `User` record and its JSON-file / in-memory stores
//! - [`password`]: PBKDF2-SHA256 password hashes
//! - [`token`]: HS256 bearer tokens (`hmac` + `sha2`, base64url)
//! - [`AuthService`]: signup, login, token verification, doctor directory
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use healix_auth::{AuthService, JsonFileUserStore, SignupRequest};
//!
//! let users = Arc::new(JsonFileUserStore::new(config.storage.users_file()));
//! let auth = AuthService::from_settings(users, &config.auth);
//! let session = auth.signup(SignupRequest { email, password, ..Default::default() })?;
//! let claims = auth.verify(&session.token)?;
//! ```

pub mod password;
pub mod service;
pub mod token;
pub mod users;

pub use service::{AuthService, AuthSession, DoctorListing, SignupRequest};
pub use token::{Claims, TokenSigner};
pub use users::{InMemoryUserStore, JsonFileUserStore, PublicUser, User, UserStore};

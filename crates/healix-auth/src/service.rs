//! Signup, login, token verification, and the doctor directory.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use healix_contracts::error::{HealixError, HealixResult};
use healix_core::config::AuthSettings;

use crate::{
    password::{hash_password, verify_password, DEFAULT_ITERATIONS},
    token::{Claims, TokenSigner},
    users::{normalize_email, PublicUser, User, UserStore, DOCTOR_ROLE, PATIENT_ROLE},
};

/// Everything a new account may carry. Only `email` and `password` are required.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub role: Option<String>,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub specialty: String,
    #[serde(default)]
    pub mobile: String,
    #[serde(default)]
    pub hospital_code: String,
}

/// Returned by signup and login.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub user: PublicUser,
    pub token: String,
}

/// A doctor account as listed to patients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DoctorListing {
    pub id: String,
    pub name: String,
    pub specialty: String,
    pub experience: String,
    pub email: String,
    pub mobile: String,
}

pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: TokenSigner,
    password_iterations: u32,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, tokens: TokenSigner) -> Self {
        Self { users, tokens, password_iterations: DEFAULT_ITERATIONS }
    }

    /// PBKDF2 rounds for newly hashed passwords.
    pub fn with_password_iterations(mut self, iterations: u32) -> Self {
        self.password_iterations = iterations;
        self
    }

    pub fn from_settings(users: Arc<dyn UserStore>, settings: &AuthSettings) -> Self {
        if settings.secret == AuthSettings::DEFAULT_SECRET {
            warn!("auth.secret is the built-in default; set a real secret before deployment");
        }
        Self::new(users, TokenSigner::new(&settings.secret, settings.token_ttl_minutes))
            .with_password_iterations(settings.password_iterations)
    }

    /// Create an account and sign it in.
    ///
    /// # Errors
    ///
    /// `MissingCredentials` for a blank email or empty password,
    /// `UserExists` if the email is already registered.
    pub fn signup(&self, request: SignupRequest) -> HealixResult<AuthSession> {
        let email = normalize_email(&request.email);
        if email.is_empty() || request.password.is_empty() {
            return Err(HealixError::MissingCredentials);
        }

        let role = request
            .role
            .map(|r| r.trim().to_lowercase())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| PATIENT_ROLE.to_string());

        let user = User {
            id: User::generate_id(),
            full_name: request.full_name,
            age: request.age,
            gender: request.gender,
            email,
            role,
            specialty: request.specialty,
            mobile: request.mobile,
            hospital_code: request.hospital_code,
            password_hash: hash_password(&request.password, self.password_iterations),
            created_at: Utc::now(),
        };
        let session = self.session_for(&user)?;
        self.users.insert(user)?;
        info!(user_id = %session.user.id, role = %session.user.role, "account created");
        Ok(session)
    }

    /// Sign in. When `role` is given, the account must hold it.
    pub fn login(&self, email: &str, password: &str, role: Option<&str>) -> HealixResult<AuthSession> {
        let user = self
            .users
            .find_by_email(email)?
            .filter(|u| verify_password(password, &u.password_hash))
            .ok_or(HealixError::InvalidCredentials)?;

        if let Some(requested) = role.map(str::trim).filter(|r| !r.is_empty()) {
            if !requested.eq_ignore_ascii_case(&user.role) {
                return Err(HealixError::RoleMismatch { requested: requested.to_string() });
            }
        }

        info!(user_id = %user.id, "login succeeded");
        self.session_for(&user)
    }

    /// Claims of a valid, unexpired token. Accepts a `Bearer ` prefix.
    pub fn verify(&self, token: &str) -> HealixResult<Claims> {
        let token = token.trim();
        let token = token.strip_prefix("Bearer ").unwrap_or(token);
        self.tokens.verify(token)
    }

    /// Every account with the doctor role.
    pub fn doctors(&self) -> HealixResult<Vec<DoctorListing>> {
        Ok(self
            .users
            .all()?
            .into_iter()
            .filter(|u| u.role == DOCTOR_ROLE)
            .map(|u| DoctorListing {
                name: non_empty_or(u.full_name, "Doctor"),
                specialty: non_empty_or(u.specialty, "General Practice"),
                experience: "N/A".to_string(),
                id: u.id,
                email: u.email,
                mobile: u.mobile,
            })
            .collect())
    }

    fn session_for(&self, user: &User) -> HealixResult<AuthSession> {
        let claims = self.tokens.claims_for(&user.id, &user.email, &user.role)?;
        Ok(AuthSession { user: user.public(), token: self.tokens.sign(&claims)? })
    }
}

fn non_empty_or(value: String, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value
    }
}

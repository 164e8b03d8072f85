//! User accounts and their storage.
//!
//! Accounts are keyed by email, normalized to trimmed lowercase before any
//! lookup or insert.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use healix_contracts::error::{HealixError, HealixResult};
use healix_store::JsonArrayFile;

pub const PATIENT_ROLE: &str = "patient";
pub const DOCTOR_ROLE: &str = "doctor";

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// A stored account, including its password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub gender: String,
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub specialty: String,
    #[serde(default)]
    pub mobile: String,
    #[serde(default)]
    pub hospital_code: String,
    #[serde(rename = "password_hash")]
    pub password_hash: String,
    #[serde(rename = "created_at", deserialize_with = "healix_contracts::timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

/// A `User` without its password hash; safe to hand to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub full_name: String,
    pub age: String,
    pub gender: String,
    pub email: String,
    pub role: String,
    pub specialty: String,
    pub mobile: String,
    pub hospital_code: String,
    #[serde(rename = "created_at")]
    pub created_at: DateTime<Utc>,
}

impl User {
    /// New id: `user_` followed by eight hex characters.
    pub fn generate_id() -> String {
        let hex = uuid::Uuid::new_v4().simple().to_string();
        format!("user_{}", &hex[..8])
    }

    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id.clone(),
            full_name: self.full_name.clone(),
            age: self.age.clone(),
            gender: self.gender.clone(),
            email: self.email.clone(),
            role: self.role.clone(),
            specialty: self.specialty.clone(),
            mobile: self.mobile.clone(),
            hospital_code: self.hospital_code.clone(),
            created_at: self.created_at,
        }
    }
}

/// Account storage.
pub trait UserStore: Send + Sync {
    /// All accounts, in creation order.
    fn all(&self) -> HealixResult<Vec<User>>;

    /// Insert `user`; fails with `UserExists` if the email is taken.
    fn insert(&self, user: User) -> HealixResult<()>;

    fn find_by_email(&self, email: &str) -> HealixResult<Option<User>> {
        let email = normalize_email(email);
        Ok(self.all()?.into_iter().find(|u| u.email == email))
    }
}

fn ensure_unique(users: &[User], user: &User) -> HealixResult<()> {
    if users.iter().any(|u| u.email == user.email) {
        return Err(HealixError::UserExists { email: user.email.clone() });
    }
    Ok(())
}

// ── In-memory ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct InMemoryUserStore {
    users: Arc<Mutex<Vec<User>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserStore for InMemoryUserStore {
    fn all(&self) -> HealixResult<Vec<User>> {
        let users = self.users.lock().map_err(|e| HealixError::StorageRead {
            reason: format!("user store lock poisoned: {e}"),
        })?;
        Ok(users.clone())
    }

    fn insert(&self, user: User) -> HealixResult<()> {
        let mut users = self.users.lock().map_err(|e| HealixError::StorageWrite {
            reason: format!("user store lock poisoned: {e}"),
        })?;
        ensure_unique(&users, &user)?;
        users.push(user);
        Ok(())
    }
}

// ── JSON file ─────────────────────────────────────────────────────────────────

/// Accounts in one JSON array (`users.json`). A damaged file lists as no
/// accounts, but is never overwritten by a signup (see [`JsonArrayFile`]).
#[derive(Debug)]
pub struct JsonFileUserStore {
    file: JsonArrayFile,
    lock: Mutex<()>,
}

impl JsonFileUserStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { file: JsonArrayFile::new(path), lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

impl UserStore for JsonFileUserStore {
    fn all(&self) -> HealixResult<Vec<User>> {
        let _guard = self.lock.lock().map_err(|e| HealixError::StorageRead {
            reason: format!("user file lock poisoned: {e}"),
        })?;
        Ok(self.file.read_lenient())
    }

    fn insert(&self, user: User) -> HealixResult<()> {
        let _guard = self.lock.lock().map_err(|e| HealixError::StorageWrite {
            reason: format!("user file lock poisoned: {e}"),
        })?;

        let mut users: Vec<User> = self.file.read_for_update()?;
        ensure_unique(&users, &user)?;
        debug!(user_id = %user.id, role = %user.role, "storing new account");
        users.push(user);
        self.file.write(&users)
    }
}

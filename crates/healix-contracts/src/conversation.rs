//! Session identity and demographic slot types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies one conversation. Each session owns its own demographic slots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// The session used by callers that do not supply an identifier.
    pub const DEFAULT: &'static str = "default";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh random session identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a conversation currently stands. Derived from which slots are set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConversationPhase {
    AwaitingName,
    AwaitingAge,
    AwaitingGender,
    AwaitingSymptoms,
}

/// The three demographic slots, each unset or a trimmed non-empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Demographics {
    pub name: Option<String>,
    pub age: Option<String>,
    pub gender: Option<String>,
}

impl Demographics {
    pub fn phase(&self) -> ConversationPhase {
        if self.name.is_none() {
            ConversationPhase::AwaitingName
        } else if self.age.is_none() {
            ConversationPhase::AwaitingAge
        } else if self.gender.is_none() {
            ConversationPhase::AwaitingGender
        } else {
            ConversationPhase::AwaitingSymptoms
        }
    }

    pub fn is_complete(&self) -> bool {
        self.phase() == ConversationPhase::AwaitingSymptoms
    }
}

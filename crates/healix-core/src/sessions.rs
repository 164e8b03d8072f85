//! Per-session conversation state.
//!
//! Each session id owns an independent `Conversation`, so concurrent users
//! no longer overwrite each other's demographics. Callers that do not track
//! sessions all share `SessionId::default()`.
//!
//! Conversations have no terminal state. A session is dropped when its
//! caller ends it, or once it has been idle longer than the registry's idle
//! timeout; the next message for that id starts over at the name prompt.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::debug;

use healix_contracts::{
    conversation::SessionId,
    error::{HealixError, HealixResult},
};

use crate::conversation::Conversation;

/// Idle sessions older than this are evicted unless configured otherwise.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

struct Entry {
    conversation: Conversation,
    last_seen: Instant,
}

/// Thread-safe map from session id to conversation.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<SessionId, Entry>>,
    idle_timeout: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_idle_timeout(DEFAULT_IDLE_TIMEOUT)
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self { sessions: Mutex::new(HashMap::new()), idle_timeout }
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Run `f` against the conversation for `id`, creating it on first use.
    ///
    /// Idle sessions are swept first. The registry lock is held only for the
    /// duration of `f`; keep it short.
    pub fn with_session<R>(
        &self,
        id: &SessionId,
        f: impl FnOnce(&mut Conversation) -> R,
    ) -> HealixResult<R> {
        let mut sessions = self.lock()?;
        let now = Instant::now();
        Self::sweep(&mut sessions, now, self.idle_timeout);

        let entry = sessions.entry(id.clone()).or_insert_with(|| {
            debug!(session = %id, "starting new conversation");
            Entry { conversation: Conversation::new(), last_seen: now }
        });
        entry.last_seen = now;
        Ok(f(&mut entry.conversation))
    }

    /// Forget a session. Returns true if it existed.
    pub fn end(&self, id: &SessionId) -> HealixResult<bool> {
        let ended = self.lock()?.remove(id).is_some();
        if ended {
            debug!(session = %id, "conversation ended");
        }
        Ok(ended)
    }

    /// Drop every session idle longer than the timeout. Returns how many.
    pub fn evict_idle(&self) -> HealixResult<usize> {
        let mut sessions = self.lock()?;
        Ok(Self::sweep(&mut sessions, Instant::now(), self.idle_timeout))
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> HealixResult<std::sync::MutexGuard<'_, HashMap<SessionId, Entry>>> {
        self.sessions.lock().map_err(|e| HealixError::SessionError {
            reason: format!("session registry lock poisoned: {e}"),
        })
    }

    fn sweep(sessions: &mut HashMap<SessionId, Entry>, now: Instant, idle_timeout: Duration) -> usize {
        let before = sessions.len();
        sessions.retain(|_, e| now.saturating_duration_since(e.last_seen) <= idle_timeout);
        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!(evicted, remaining = sessions.len(), "idle sessions evicted");
        }
        evicted
    }
}

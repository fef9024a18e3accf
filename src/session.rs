//! Per-session chat history.
//!
//! Histories live only in memory. Ending a session, leaving it idle past
//! the timeout, or stopping the process discards them.
//!
//! Key properties:
//! - Readers get a snapshot; writers append, so concurrent requests on one
//!   session never drop each other's turns
//! - Idle sessions are evicted lazily whenever a session is opened
//! - The number of open sessions is capped; the least recently active one
//!   goes first

use std::collections::HashMap;
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::config;
use crate::models::ConversationTurn;

#[derive(Debug)]
struct Session {
    history: Vec<ConversationTurn>,
    last_activity: Instant,
}

impl Session {
    fn new() -> Self {
        Self {
            history: Vec::new(),
            last_activity: Instant::now(),
        }
    }

    fn touch(&mut self) {
        self.last_activity = Instant::now();
    }
}

/// All open chat sessions, keyed by session id.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: HashMap<Uuid, Session>,
    idle_timeout: Duration,
    max_sessions: usize,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_limits(
            Duration::from_secs(config::SESSION_IDLE_TIMEOUT_SECS),
            config::MAX_SESSIONS,
        )
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry evicting sessions idle for `idle_timeout` and holding at
    /// most `max_sessions` (at least one).
    pub fn with_limits(idle_timeout: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: HashMap::new(),
            idle_timeout,
            max_sessions: max_sessions.max(1),
        }
    }

    /// Reuse a known session, or start a fresh one.
    ///
    /// An unknown id (e.g. from before a restart) gets a new session rather
    /// than an error, so a client can always keep chatting.
    pub fn open(&mut self, requested: Option<Uuid>) -> Uuid {
        self.evict_idle();

        if let Some(id) = requested {
            if let Some(session) = self.sessions.get_mut(&id) {
                session.touch();
                return id;
            }
            tracing::debug!(session = %id, "Unknown session id, starting a new session");
        }

        while self.sessions.len() >= self.max_sessions {
            if !self.evict_least_recent() {
                break;
            }
        }

        let id = Uuid::new_v4();
        self.sessions.insert(id, Session::new());
        tracing::info!(session = %id, "Chat session started");
        id
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn history(&self, id: &Uuid) -> Option<&[ConversationTurn]> {
        self.sessions.get(id).map(|s| s.history.as_slice())
    }

    /// Copy of the history for a pipeline pass. The stored history is left
    /// in place for concurrent readers.
    pub fn snapshot(&self, id: &Uuid) -> Option<Vec<ConversationTurn>> {
        self.history(id).map(<[ConversationTurn]>::to_vec)
    }

    /// Append turns produced by a pipeline pass and return the full stored
    /// history. `None` if the session ended or expired in the meantime.
    pub fn append(&mut self, id: &Uuid, turns: &[ConversationTurn]) -> Option<&[ConversationTurn]> {
        let session = self.sessions.get_mut(id)?;
        session.history.extend_from_slice(turns);
        session.touch();
        Some(session.history.as_slice())
    }

    /// Drop a session and its history. Returns false if it did not exist.
    pub fn end(&mut self, id: &Uuid) -> bool {
        let removed = self.sessions.remove(id).is_some();
        if removed {
            tracing::info!(session = %id, "Chat session ended");
        }
        removed
    }

    /// Drop every session idle for at least the timeout. Returns how many.
    pub fn evict_idle(&mut self) -> usize {
        let now = Instant::now();
        let timeout = self.idle_timeout;
        let before = self.sessions.len();
        self.sessions
            .retain(|_, s| now.saturating_duration_since(s.last_activity) < timeout);
        let evicted = before - self.sessions.len();
        if evicted > 0 {
            tracing::info!(evicted, "Idle chat sessions evicted");
        }
        evicted
    }

    fn evict_least_recent(&mut self) -> bool {
        let oldest = self
            .sessions
            .iter()
            .min_by_key(|(_, s)| s.last_activity)
            .map(|(id, _)| *id);
        match oldest {
            Some(id) => {
                self.sessions.remove(&id);
                tracing::info!(session = %id, "Session limit reached, oldest session evicted");
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

//! Session store - per-visitor history lives here
//!
//! Sessions are created by the first check a visitor submits and dropped on
//! explicit end or after sitting idle. Expiry is checked lazily on every lookup; there is
//! no background sweeper.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use newscheck_core::HistoryBuffer;
use parking_lot::{Mutex, RwLock};
use uuid::Uuid;

/// One visitor's session
#[derive(Debug)]
pub struct Session {
    pub id: Uuid,
    last_seen: Mutex<DateTime<Utc>>,
    /// Held for the whole check so one session never runs two inferences at once
    pub history: Mutex<HistoryBuffer>,
}

impl Session {
    fn new(history_capacity: usize) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            last_seen: Mutex::new(now),
            history: Mutex::new(HistoryBuffer::new(history_capacity)),
        }
    }

    pub fn last_seen(&self) -> DateTime<Utc> {
        *self.last_seen.lock()
    }

    fn touch(&self, now: DateTime<Utc>) {
        *self.last_seen.lock() = now;
    }
}

#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Arc<Session>>>,
    idle_timeout: Duration,
    history_capacity: usize,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration, history_capacity: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
            history_capacity,
        }
    }

    /// Look up a live session or start a new one. Returns `true` when created.
    pub fn resolve(&self, id: Option<Uuid>) -> (Arc<Session>, bool) {
        self.resolve_at(id, Utc::now())
    }

    /// Look up a live session without starting one
    pub fn find(&self, id: Uuid) -> Option<Arc<Session>> {
        self.find_at(id, Utc::now())
    }

    fn resolve_at(&self, id: Option<Uuid>, now: DateTime<Utc>) -> (Arc<Session>, bool) {
        let mut sessions = self.sessions.write();
        self.expire(&mut sessions, now);

        if let Some(session) = id.and_then(|id| sessions.get(&id)) {
            session.touch(now);
            return (Arc::clone(session), false);
        }

        let session = Arc::new(Session::new(self.history_capacity));
        session.touch(now);
        sessions.insert(session.id, Arc::clone(&session));
        tracing::debug!("Session started: {}", session.id);

        (session, true)
    }

    fn find_at(&self, id: Uuid, now: DateTime<Utc>) -> Option<Arc<Session>> {
        let mut sessions = self.sessions.write();
        self.expire(&mut sessions, now);

        let session = sessions.get(&id)?;
        session.touch(now);
        Some(Arc::clone(session))
    }

    fn expire(&self, sessions: &mut HashMap<Uuid, Arc<Session>>, now: DateTime<Utc>) {
        let before = sessions.len();
        sessions.retain(|_, s| now - s.last_seen() <= self.idle_timeout);
        let expired = before - sessions.len();
        if expired > 0 {
            tracing::debug!("Expired {} idle session(s)", expired);
        }
    }

    /// End a session, dropping its history
    pub fn end(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().remove(&id).is_some();
        if removed {
            tracing::debug!("Session ended: {}", id);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }
}

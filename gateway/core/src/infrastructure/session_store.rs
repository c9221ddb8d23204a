// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::clock::{Clock, SystemClock};
use crate::domain::session::{ContainerId, Session, SessionError, SessionId, SessionMode};
use crate::domain::session_repository::SessionRepository;

/// Process-local session registry.
///
/// One mutex guards the whole map. Every critical section is a single map
/// operation and the lock is never held across an `.await`.
pub struct InMemorySessionRepository {
    // Maps SessionId -> Session
    sessions: Mutex<HashMap<SessionId, Session>>,
    clock: Arc<dyn Clock>,
    ttl: chrono::Duration,
}

impl InMemorySessionRepository {
    pub fn new(ttl: chrono::Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: chrono::Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            clock,
            ttl,
        }
    }

    pub fn ttl(&self) -> chrono::Duration {
        self.ttl
    }
}

impl SessionRepository for InMemorySessionRepository {
    fn register(
        &self,
        session_id: SessionId,
        container_id: ContainerId,
        mode: SessionMode,
    ) -> Result<Session, SessionError> {
        let now = self.clock.now();
        let mut guard = self.sessions.lock();

        if let Some(existing) = guard.get(&session_id) {
            if existing.is_active_at(now) {
                return Err(SessionError::DuplicateSession(session_id));
            }
            // An expired record is already absent; let the new one take its place.
        }

        let session = Session::new(session_id.clone(), container_id, mode, now, self.ttl);
        guard.insert(session_id, session.clone());
        Ok(session)
    }

    fn lookup(&self, session_id: &SessionId) -> Option<Session> {
        let now = self.clock.now();
        let mut guard = self.sessions.lock();

        match guard.get(session_id) {
            Some(session) if session.is_active_at(now) => Some(session.clone()),
            Some(_) => {
                guard.remove(session_id);
                None
            }
            None => None,
        }
    }

    fn unregister(&self, session_id: &SessionId) -> bool {
        let now = self.clock.now();
        let mut guard = self.sessions.lock();
        guard
            .remove(session_id)
            .is_some_and(|session| session.is_active_at(now))
    }

    fn sweep(&self, now: DateTime<Utc>) -> usize {
        let mut guard = self.sessions.lock();
        let before = guard.len();
        guard.retain(|_, session| session.expires_at > now);
        before - guard.len()
    }

    fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    fn active_count(&self) -> usize {
        let now = self.clock.now();
        self.sessions
            .lock()
            .values()
            .filter(|session| session.is_active_at(now))
            .count()
    }
}

// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Session Application Service
//!
//! Register and unregister container sessions. Accepts the raw strings a
//! request carries, validates them into domain types, and delegates storage to
//! the [`SessionRepository`]. Registration never touches the policy engine.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::session::{ContainerId, Session, SessionError, SessionId, SessionMode};
use crate::domain::session_repository::SessionRepository;

pub struct SessionService {
    repository: Arc<dyn SessionRepository>,
}

impl SessionService {
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    /// Register a new session.
    ///
    /// # Errors
    ///
    /// - [`SessionError::InvalidMode`] if `mode` is not `private` or `public`
    /// - [`SessionError::InvalidSessionId`] / [`SessionError::InvalidContainerId`]
    ///   for malformed identifiers
    /// - [`SessionError::DuplicateSession`] if the id is held by a live session
    pub fn register(
        &self,
        session_id: &str,
        container_id: &str,
        mode: &str,
    ) -> Result<Session, SessionError> {
        let mode: SessionMode = mode.parse()?;
        let session_id = SessionId::parse(session_id)?;
        let container_id = ContainerId::parse(container_id)?;

        match self.repository.register(session_id, container_id, mode) {
            Ok(session) => {
                info!(
                    session_id = %session.session_id,
                    container_id = %session.container_id,
                    mode = %session.mode(),
                    expires_at = %session.expires_at,
                    "Session registered"
                );
                Ok(session)
            }
            Err(e) => {
                warn!("Session registration rejected: {}", e);
                Err(e)
            }
        }
    }

    /// Unregister a session. Unknown, expired, or malformed ids are not errors.
    pub fn unregister(&self, session_id: &str) {
        let Ok(session_id) = SessionId::parse(session_id) else {
            debug!("Ignoring unregister for malformed session id");
            return;
        };

        if self.repository.unregister(&session_id) {
            info!(session_id = %session_id, "Session unregistered");
        } else {
            debug!(session_id = %session_id, "Unregister for absent session");
        }
    }

    pub fn lookup(&self, session_id: &SessionId) -> Option<Session> {
        self.repository.lookup(session_id)
    }

    /// Records currently held by the store.
    pub fn stored_sessions(&self) -> usize {
        self.repository.len()
    }

    pub fn active_sessions(&self) -> usize {
        self.repository.active_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::session_store::InMemorySessionRepository;

    fn service() -> SessionService {
        SessionService::new(Arc::new(InMemorySessionRepository::new(chrono::Duration::hours(24))))
    }

    #[test]
    fn test_register_and_unregister() {
        let service = service();
        let session = service.register("abc123", "jib-A", "private").unwrap();
        assert_eq!(session.mode(), SessionMode::Private);
        assert!(service.lookup(&session.session_id).is_some());

        service.unregister("abc123");
        assert!(service.lookup(&session.session_id).is_none());
        service.unregister("abc123");
        service.unregister("not a valid id");
    }

    #[test]
    fn test_invalid_mode() {
        let err = service().register("abc123", "jib-A", "internal").unwrap_err();
        assert_eq!(err, SessionError::InvalidMode("internal".to_string()));
    }

    #[test]
    fn test_invalid_mode_reported_before_duplicate() {
        let service = service();
        service.register("abc123", "jib-A", "private").unwrap();
        assert!(matches!(
            service.register("abc123", "jib-A", "bogus"),
            Err(SessionError::InvalidMode(_))
        ));
    }

    #[test]
    fn test_duplicate() {
        let service = service();
        service.register("abc123", "jib-A", "private").unwrap();
        assert!(matches!(
            service.register("abc123", "jib-B", "public"),
            Err(SessionError::DuplicateSession(_))
        ));
        assert_eq!(service.stored_sessions(), 1);
    }
}

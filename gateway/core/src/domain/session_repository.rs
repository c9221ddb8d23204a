// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};

use crate::domain::session::{ContainerId, Session, SessionError, SessionId, SessionMode};

/// Registry of live gateway sessions.
///
/// Implementations must serialise mutations so that two concurrent
/// `register` calls for the same id cannot both succeed, and must never hand
/// out a partially written record.
pub trait SessionRepository: Send + Sync {
    /// Store a new session expiring one TTL from now.
    ///
    /// Fails with [`SessionError::DuplicateSession`] if a non-expired record
    /// already holds `session_id`; that record is left untouched.
    fn register(
        &self,
        session_id: SessionId,
        container_id: ContainerId,
        mode: SessionMode,
    ) -> Result<Session, SessionError>;

    /// Return the live session for `session_id`. Expired records are purged
    /// and reported as absent.
    fn lookup(&self, session_id: &SessionId) -> Option<Session>;

    /// Remove a session. Idempotent; returns whether a live record was removed.
    fn unregister(&self, session_id: &SessionId) -> bool;

    /// Remove every record with `expires_at <= now`, returning how many went.
    fn sweep(&self, now: DateTime<Utc>) -> usize;

    /// Records physically held, expired-but-unswept ones included.
    fn len(&self) -> usize;

    /// Records that have not yet expired.
    fn active_count(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

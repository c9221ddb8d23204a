// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Gateway Session Aggregate
//!
//! Domain model for a container's declared repository-access mode. Each
//! sandboxed container registers exactly one [`Session`] at startup; every
//! git/gh operation it performs afterwards is checked against that session's
//! [`SessionMode`].
//!
//! ## Session Lifecycle
//!
//! ```text
//! Register(session_id, container_id, mode)
//!   └─ Active   ← until expires_at, or until Unregister
//!        └─ Expired  ← detected lazily against the clock
//!             └─ Removed  ← lazy purge on lookup, Sweep, or Unregister
//! ```
//!
//! ## Invariants
//!
//! - `mode` is fixed at construction. There is no setter.
//! - `expires_at = created_at + ttl`, saturating at the latest representable
//!   instant; the session is present only while `now < expires_at`.
//! - Uniqueness of `session_id` is enforced by the
//!   [`crate::domain::session_repository::SessionRepository`], not here.
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default time-to-live for a registered session.
pub const DEFAULT_SESSION_TTL: std::time::Duration = std::time::Duration::from_secs(24 * 60 * 60);

const MAX_SESSION_ID_LEN: usize = 256;

/// Errors raised when registering a session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// A live session already holds this id. The existing record is untouched.
    #[error("session '{0}' is already registered")]
    DuplicateSession(SessionId),

    /// The requested mode is not `private` or `public`.
    #[error("invalid session mode '{0}': expected 'private' or 'public'")]
    InvalidMode(String),

    /// The session id is empty, too long, or contains whitespace/control characters.
    #[error("invalid session id: {0}")]
    InvalidSessionId(String),

    /// The container id is empty.
    #[error("container id cannot be empty")]
    InvalidContainerId,
}

/// Opaque, caller-minted session token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    pub fn parse(raw: impl Into<String>) -> Result<Self, SessionError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(SessionError::InvalidSessionId("empty".to_string()));
        }
        if raw.len() > MAX_SESSION_ID_LEN {
            return Err(SessionError::InvalidSessionId(format!(
                "longer than {} bytes",
                MAX_SESSION_ID_LEN
            )));
        }
        if raw.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(SessionError::InvalidSessionId(
                "contains whitespace or control characters".to_string(),
            ));
        }
        Ok(Self(raw))
    }

    /// Mint a fresh random token.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SessionId {
    type Error = SessionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of the container that owns a session. Audit correlation only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerId(String);

impl ContainerId {
    pub fn parse(raw: impl Into<String>) -> Result<Self, SessionError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(SessionError::InvalidContainerId);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Repository-access mode a container declares at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    /// May reach private and internal repositories; remote operations on
    /// public repositories are blocked.
    Private,
    /// May reach public repositories only.
    Public,
}

impl SessionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Public => "public",
        }
    }
}

impl FromStr for SessionMode {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "private" => Ok(Self::Private),
            "public" => Ok(Self::Public),
            _ => Err(SessionError::InvalidMode(s.to_string())),
        }
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a stored [`Session`], derived from the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Active,
    Expired,
}

/// A registered binding between a running container and its access mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: SessionId,
    pub container_id: ContainerId,
    mode: SessionMode,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(
        session_id: SessionId,
        container_id: ContainerId,
        mode: SessionMode,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            session_id,
            container_id,
            mode,
            created_at: now,
            expires_at: now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn status_at(&self, now: DateTime<Utc>) -> SessionStatus {
        if now < self.expires_at {
            SessionStatus::Active
        } else {
            SessionStatus::Expired
        }
    }

    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.status_at(now) == SessionStatus::Active
    }
}

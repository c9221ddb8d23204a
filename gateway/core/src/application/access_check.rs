// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Access Check Application Service
//!
//! Answers "may this container perform this git/gh operation on this
//! repository?" for every intercepted command.
//!
//! ## Processing Pipeline
//!
//! ```text
//! AccessCheckRequest { session_id?, operation_class, repo }
//!   └─ OperationClass::classify            ← unknown labels become Remote
//!   └─ SessionRepository::lookup           ← absent/expired → no session
//!   └─ VisibilityResolver::resolve         ← bounded by timeout; failure → None
//!   └─ PolicyEngine::decide_with           ← session present
//!      LegacyPolicy::decide                ← no session
//! ```
//!
//! All I/O happens before the decision. The decision itself is pure.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::domain::legacy::LegacyPolicy;
use crate::domain::policy::{OperationClass, PolicyDecision, PolicyEngine};
use crate::domain::session::{Session, SessionId};
use crate::domain::session_repository::SessionRepository;
use crate::domain::visibility::{RepositoryRef, RepositoryVisibility};
use crate::infrastructure::visibility::VisibilityResolver;

/// One intercepted operation, as the wrapper reports it.
#[derive(Debug, Clone)]
pub struct AccessCheckRequest {
    pub session_id: Option<String>,
    pub operation_class: String,
    pub repo: String,
}

pub struct AccessCheckService {
    sessions: Arc<dyn SessionRepository>,
    resolver: Arc<dyn VisibilityResolver>,
    legacy: Arc<dyn LegacyPolicy>,
    engine: PolicyEngine,
    resolve_timeout: Duration,
}

impl AccessCheckService {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        resolver: Arc<dyn VisibilityResolver>,
        legacy: Arc<dyn LegacyPolicy>,
        resolve_timeout: Duration,
    ) -> Self {
        Self {
            sessions,
            resolver,
            legacy,
            engine: PolicyEngine::new(),
            resolve_timeout,
        }
    }

    pub async fn check(&self, request: &AccessCheckRequest) -> PolicyDecision {
        let operation = OperationClass::classify(&request.operation_class);
        let session = self.find_session(request.session_id.as_deref());
        let visibility = self.resolve_visibility(&request.repo).await;

        let decision = match &session {
            Some(session) => self.engine.decide_with(operation, visibility, session.mode()),
            None => self.legacy.decide(operation, visibility),
        };

        let session_id = session.as_ref().map(|s| s.session_id.as_str()).unwrap_or("-");
        let mode = session.as_ref().map(|s| s.mode().as_str()).unwrap_or("legacy");
        let visibility = visibility.map(|v| v.as_str()).unwrap_or("unresolved");

        if decision.allow {
            debug!(
                session_id,
                mode,
                operation = %operation,
                repo = %request.repo,
                visibility,
                "Operation allowed"
            );
        } else {
            warn!(
                session_id,
                mode,
                operation = %operation,
                repo = %request.repo,
                visibility,
                reason = decision.reason.as_deref().unwrap_or_default(),
                "Operation denied"
            );
        }

        decision
    }

    fn find_session(&self, raw: Option<&str>) -> Option<Session> {
        let raw = raw.filter(|s| !s.is_empty())?;
        let session_id = match SessionId::parse(raw) {
            Ok(id) => id,
            Err(e) => {
                warn!("Ignoring malformed session id on check: {}", e);
                return None;
            }
        };

        let session = self.sessions.lookup(&session_id);
        if session.is_none() {
            debug!(session_id = %session_id, "No live session, falling back to legacy mode");
        }
        session
    }

    async fn resolve_visibility(&self, raw_repo: &str) -> Option<RepositoryVisibility> {
        let repo = match RepositoryRef::parse(raw_repo) {
            Ok(repo) => repo,
            Err(e) => {
                warn!("Visibility unresolved: {}", e);
                return None;
            }
        };

        match tokio::time::timeout(self.resolve_timeout, self.resolver.resolve(&repo)).await {
            Ok(Ok(visibility)) => Some(visibility),
            Ok(Err(e)) => {
                warn!(repo = %repo, "Visibility unresolved: {}", e);
                None
            }
            Err(_) => {
                warn!(
                    repo = %repo,
                    timeout_ms = self.resolve_timeout.as_millis() as u64,
                    "Visibility unresolved: resolver timed out"
                );
                None
            }
        }
    }
}

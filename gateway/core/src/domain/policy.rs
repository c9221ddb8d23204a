// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Repository Access Policy
//!
//! Pure decision function mapping `(operation class, repository visibility,
//! session mode)` to allow/deny.
//!
//! | mode    | visibility         | local | remote |
//! |---------|--------------------|-------|--------|
//! | private | private / internal | allow | allow  |
//! | private | public             | allow | deny   |
//! | public  | private / internal | deny  | deny   |
//! | public  | public             | allow | allow  |
//!
//! Callers that could not classify the operation pass
//! [`OperationClass::Remote`]. Callers that could not resolve visibility use
//! [`PolicyEngine::decide_unresolved`], which denies in every mode.
//! The "no session" row lives in [`crate::domain::legacy`], not here.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::session::SessionMode;
use crate::domain::visibility::RepositoryVisibility;

pub const REMOTE_BLOCKED_FOR_PUBLIC_REPO: &str =
    "remote operation blocked for public repo in private mode";
pub const PRIVATE_REPO_IN_PUBLIC_MODE: &str = "private repository not accessible in public mode";
pub const UNRESOLVED_VISIBILITY: &str = "repository visibility could not be resolved";

/// Whether an operation stays on the local clone or talks to a remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationClass {
    /// No network egress (status, log, diff, commit, ...).
    Local,
    /// Contacts a remote repository or the hosting API (fetch, push, gh pr, ...).
    Remote,
}

impl OperationClass {
    /// Total parse: anything other than a recognised `local` label is `Remote`.
    pub fn classify(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "local" => Self::Local,
            "remote" => Self::Remote,
            other => {
                tracing::debug!(operation_class = other, "Unrecognised operation class, treating as remote");
                Self::Remote
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
        }
    }
}

impl fmt::Display for OperationClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single access decision. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDecision {
    pub allow: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl PolicyDecision {
    pub fn allow() -> Self {
        Self {
            allow: true,
            reason: None,
        }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allow: false,
            reason: Some(reason.into()),
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.allow
    }
}

/// Stateless repository access policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyEngine;

impl PolicyEngine {
    pub fn new() -> Self {
        Self
    }

    /// Decide whether `operation` on a repository of `visibility` is permitted
    /// for a container running in `mode`.
    pub fn decide(
        &self,
        operation: OperationClass,
        visibility: RepositoryVisibility,
        mode: SessionMode,
    ) -> PolicyDecision {
        match (mode, visibility.is_restricted(), operation) {
            (SessionMode::Private, true, _) => PolicyDecision::allow(),
            (SessionMode::Private, false, OperationClass::Local) => PolicyDecision::allow(),
            (SessionMode::Private, false, OperationClass::Remote) => {
                PolicyDecision::deny(REMOTE_BLOCKED_FOR_PUBLIC_REPO)
            }
            (SessionMode::Public, true, _) => PolicyDecision::deny(PRIVATE_REPO_IN_PUBLIC_MODE),
            (SessionMode::Public, false, _) => PolicyDecision::allow(),
        }
    }

    /// Decide when the repository's visibility is unknown: always a denial,
    /// whatever the operation class or mode.
    pub fn decide_unresolved(&self) -> PolicyDecision {
        PolicyDecision::deny(UNRESOLVED_VISIBILITY)
    }

    /// [`decide`](Self::decide) or [`decide_unresolved`](Self::decide_unresolved)
    /// depending on whether visibility was resolved.
    pub fn decide_with(
        &self,
        operation: OperationClass,
        visibility: Option<RepositoryVisibility>,
        mode: SessionMode,
    ) -> PolicyDecision {
        match visibility {
            Some(visibility) => self.decide(operation, visibility, mode),
            None => self.decide_unresolved(),
        }
    }
}

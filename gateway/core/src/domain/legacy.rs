// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Legacy Global-Mode Policy
//!
//! Before per-session modes existed, a gateway process ran with one global
//! switch: "private repositories only" or "public repositories only". Checks
//! that arrive without a session id still get that behaviour, so containers
//! launched by older tooling keep working during rollout.
//!
//! The switches are read once at startup and passed in explicitly; the policy
//! engine never consults process-wide state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::policy::{OperationClass, PolicyDecision, PolicyEngine};
use crate::domain::session::SessionMode;
use crate::domain::visibility::RepositoryVisibility;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("legacy switches private_only and public_only are mutually exclusive")]
pub struct ConflictingLegacyFlags;

/// The two legacy startup switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyModeConfig {
    #[serde(default)]
    pub private_only: bool,
    #[serde(default)]
    pub public_only: bool,
}

impl LegacyModeConfig {
    /// The session mode these switches are equivalent to, if any.
    pub fn equivalent_mode(&self) -> Result<Option<SessionMode>, ConflictingLegacyFlags> {
        match (self.private_only, self.public_only) {
            (true, true) => Err(ConflictingLegacyFlags),
            (true, false) => Ok(Some(SessionMode::Private)),
            (false, true) => Ok(Some(SessionMode::Public)),
            (false, false) => Ok(None),
        }
    }
}

/// Decision source for checks that carry no (live) session.
///
/// `visibility` is `None` when the resolver failed or timed out.
pub trait LegacyPolicy: Send + Sync {
    fn decide(
        &self,
        operation: OperationClass,
        visibility: Option<RepositoryVisibility>,
    ) -> PolicyDecision;
}

/// Global-mode fallback.
///
/// With a switch set it behaves exactly like a session in the equivalent
/// mode. With neither switch set every repository whose visibility resolved
/// is allowed; unresolved visibility is denied either way.
#[derive(Debug, Clone, Copy)]
pub struct GlobalModePolicy {
    mode: Option<SessionMode>,
    engine: PolicyEngine,
}

impl GlobalModePolicy {
    pub fn from_config(config: LegacyModeConfig) -> Result<Self, ConflictingLegacyFlags> {
        Ok(Self {
            mode: config.equivalent_mode()?,
            engine: PolicyEngine::new(),
        })
    }

    pub fn unrestricted() -> Self {
        Self {
            mode: None,
            engine: PolicyEngine::new(),
        }
    }

    pub fn mode(&self) -> Option<SessionMode> {
        self.mode
    }
}

impl LegacyPolicy for GlobalModePolicy {
    fn decide(
        &self,
        operation: OperationClass,
        visibility: Option<RepositoryVisibility>,
    ) -> PolicyDecision {
        match (self.mode, visibility) {
            (Some(mode), _) => self.engine.decide_with(operation, visibility, mode),
            (None, Some(_)) => PolicyDecision::allow(),
            (None, None) => self.engine.decide_unresolved(),
        }
    }
}

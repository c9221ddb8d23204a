// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod auth;
pub mod session_store;
pub mod visibility;

pub use auth::{AuthError, SharedSecretGuard};
pub use session_store::InMemorySessionRepository;
pub use visibility::{build_resolver, VisibilityError, VisibilityResolver};

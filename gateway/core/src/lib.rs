// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Repogate core
//!
//! Session registry, repository access policy and the HTTP API that a
//! container's git/gh wrapper calls before running a command.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Per-session private/public repository access control

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;

// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain layer: sessions, repository visibility, access policy, and the
//! gateway configuration manifest.
//!
//! Nothing in here performs I/O except [`config`] loading its YAML file.

pub mod clock;
pub mod config;
pub mod legacy;
pub mod policy;
pub mod session;
pub mod session_repository;
pub mod visibility;

// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Presentation Layer (`repogate-core`)
//!
//! HTTP surface that translates wrapper and launcher requests into
//! application service calls. Policy lives in `crate::domain`; handlers only
//! parse, authenticate and serialize.
//!
//! | Module | Transport | Description |
//! |--------|-----------|-------------|
//! | [`api`] | HTTP (Axum) | Session registration, access checks, health |
//! | [`error`] | HTTP (Axum) | `ApiError` → `{error, message}` JSON responses |

pub mod api;
pub mod error;

pub use api::{app, GatewayState};
pub use error::ApiError;

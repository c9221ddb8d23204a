// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod access_check;
pub mod session_service;
pub mod session_sweeper;

// Re-export use cases for convenience
pub use access_check::{AccessCheckRequest, AccessCheckService};
pub use session_service::SessionService;
pub use session_sweeper::SessionSweeper;

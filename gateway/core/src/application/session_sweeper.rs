// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Session Sweeper - Background task that physically removes expired sessions
//!
//! Lookups already purge the records they touch; the sweeper bounds memory for
//! containers that crashed without unregistering and are never looked up again.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Periodic `SessionRepository::sweep`, independent of request traffic

use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::domain::clock::Clock;
use crate::domain::session_repository::SessionRepository;

/// Session sweeper - background task
pub struct SessionSweeper {
    repository: Arc<dyn SessionRepository>,
    clock: Arc<dyn Clock>,
    interval: Duration,
    shutdown_token: CancellationToken,
}

impl SessionSweeper {
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        clock: Arc<dyn Clock>,
        interval: Duration,
    ) -> Self {
        Self {
            repository,
            clock,
            interval,
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Get a handle to trigger shutdown
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown_token.clone()
    }

    /// Start the sweeper background task
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    /// Run the sweep loop until the shutdown token is cancelled
    async fn run(&self) {
        info!(
            interval_seconds = self.interval.as_secs(),
            "Starting session sweeper background task"
        );

        let mut tick = interval(self.interval);
        // The first tick completes immediately; nothing can have expired yet.
        tick.tick().await;

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    self.sweep_once();
                }
                _ = self.shutdown_token.cancelled() => {
                    info!("Shutdown signal received, stopping session sweeper");
                    break;
                }
            }
        }

        info!("Session sweeper background task stopped");
    }

    /// Execute a single sweep cycle
    pub fn sweep_once(&self) -> usize {
        let removed = self.repository.sweep(self.clock.now());
        if removed > 0 {
            info!(removed, remaining = self.repository.len(), "Expired sessions swept");
        } else {
            debug!("Session sweep found nothing to remove");
        }
        removed
    }
}

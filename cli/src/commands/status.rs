// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use anyhow::Result;
use colored::Colorize;

use super::GatewayTarget;
use crate::daemon::{check_gateway_running, GatewayStatus};

/// Returns whether the gateway answered healthy.
pub async fn execute(target: GatewayTarget) -> Result<bool> {
    let healthy = match check_gateway_running(&target.host, target.port).await? {
        GatewayStatus::Running {
            version,
            uptime,
            active_sessions,
        } => {
            println!(
                "{}",
                format!("✓ Gateway is running on {}:{}", target.host, target.port).green()
            );
            println!("  Version: {}", version);
            println!("  Uptime: {}s", uptime);
            println!("  Active sessions: {}", active_sessions);
            true
        }
        GatewayStatus::Stopped => {
            println!("{}", "Gateway is not running".yellow());
            false
        }
        GatewayStatus::Unhealthy { error } => {
            println!("{}", format!("⚠ Gateway is unhealthy: {}", error).red());
            false
        }
    };

    Ok(healthy)
}

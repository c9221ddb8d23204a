// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `repogate check`: ask the gateway whether one git/gh operation may run.
//!
//! Exit status is 0 when allowed and 1 when denied, so wrapper scripts can
//! gate the real command on it.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::GatewayTarget;

#[derive(Args)]
pub struct CheckCommand {
    /// Operation class: local or remote (anything else counts as remote)
    #[arg(long = "op", value_name = "CLASS")]
    pub operation_class: String,

    /// Repository as owner/name, host/owner/name, or a clone URL
    #[arg(long)]
    pub repo: String,

    /// Session id (absent: the gateway's legacy global mode applies)
    #[arg(long, env = "REPOGATE_SESSION_ID")]
    pub session_id: Option<String>,
}

/// Returns whether the operation was allowed.
pub async fn execute(command: CheckCommand, target: GatewayTarget) -> Result<bool> {
    let decision = target
        .client()?
        .check(
            command.session_id.as_deref(),
            &command.operation_class,
            &command.repo,
        )
        .await?;

    if decision.allow {
        println!("{} {} {}", "ALLOW".green().bold(), command.operation_class, command.repo);
    } else {
        eprintln!(
            "{} {} {}: {}",
            "DENY".red().bold(),
            command.operation_class,
            command.repo,
            decision.reason.as_deref().unwrap_or("denied by policy")
        );
    }

    Ok(decision.allow)
}

// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Session commands used by container launchers
//!
//! Commands: register, unregister

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use super::GatewayTarget;
use repogate_core::domain::session::SessionId;

#[derive(Subcommand)]
pub enum SessionCommand {
    /// Register a container session and print its id
    Register {
        /// Container the session belongs to
        #[arg(long)]
        container_id: String,

        /// Access mode: private or public
        #[arg(long)]
        mode: String,

        /// Session id to use (default: generate one)
        #[arg(long)]
        session_id: Option<String>,

        /// Print only the session id
        #[arg(short, long)]
        quiet: bool,
    },

    /// Unregister a session (succeeds if already gone)
    Unregister {
        /// Session id returned by `register`
        #[arg(value_name = "SESSION_ID")]
        session_id: String,
    },
}

pub async fn handle_command(command: SessionCommand, target: GatewayTarget) -> Result<()> {
    match command {
        SessionCommand::Register {
            container_id,
            mode,
            session_id,
            quiet,
        } => register(&target, &container_id, &mode, session_id, quiet).await,
        SessionCommand::Unregister { session_id } => unregister(&target, &session_id).await,
    }
}

async fn register(
    target: &GatewayTarget,
    container_id: &str,
    mode: &str,
    session_id: Option<String>,
    quiet: bool,
) -> Result<()> {
    let session_id = session_id.unwrap_or_else(|| SessionId::generate().to_string());
    let session = target
        .client()?
        .register_session(&session_id, container_id, mode)
        .await?;

    if quiet {
        println!("{}", session.session_id);
        return Ok(());
    }

    println!("{}", "✓ Session registered".green());
    println!("  Session ID:   {}", session.session_id.to_string().bold());
    println!("  Container ID: {}", session.container_id);
    println!("  Mode:         {}", session.mode());
    println!("  Expires at:   {}", session.expires_at.to_rfc3339());

    Ok(())
}

async fn unregister(target: &GatewayTarget, session_id: &str) -> Result<()> {
    target.client()?.unregister_session(session_id).await?;
    println!("{}", format!("✓ Session unregistered: {}", session_id).green());
    Ok(())
}

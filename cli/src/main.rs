// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # repogate
//!
//! The `repogate` binary runs the repository access gateway and talks to a
//! running one.
//!
//! ## Commands
//!
//! - `repogate serve` - Run the gateway in the foreground
//! - `repogate status` - Health-check a running gateway
//! - `repogate session register|unregister` - Manage container sessions
//! - `repogate check` - Ask whether a git/gh operation may run (exit 0/1)
//! - `repogate config show|validate|generate` - Configuration management

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing::info;

use repogate::commands::{self, check::CheckCommand, ConfigCommand, GatewayTarget, SessionCommand};
use repogate::daemon::{self, ServeOptions};
use repogate_core::domain::config::{GatewayConfigManifest, LoggingConfig};

/// repogate - per-session private/public repository access gateway
#[derive(Parser)]
#[command(name = "repogate")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "REPOGATE_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Gateway port (default: from config, else 9443)
    #[arg(long, global = true, env = "REPOGATE_PORT")]
    port: Option<u16>,

    /// Gateway host (default: from config, else 127.0.0.1)
    #[arg(long, global = true, env = "REPOGATE_HOST")]
    host: Option<String>,

    /// Shared secret for the gateway API
    #[arg(long, global = true, env = "REPOGATE_SHARED_SECRET", hide_env_values = true)]
    secret: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "REPOGATE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format (text, json)
    #[arg(long, global = true, env = "REPOGATE_LOG_FORMAT")]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the gateway server
    #[command(name = "serve")]
    Serve,

    /// Check whether a gateway is running
    #[command(name = "status")]
    Status,

    /// Container session management
    #[command(name = "session")]
    Session {
        #[command(subcommand)]
        command: SessionCommand,
    },

    /// Check one operation against the gateway policy
    #[command(name = "check")]
    Check(CheckCommand),

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize logging
    let logging = configured_logging(cli.config.clone());
    init_logging(
        cli.log_level.as_deref().unwrap_or(&logging.level),
        cli.log_format.as_deref().unwrap_or(&logging.format),
    )?;

    match cli.command {
        Some(Commands::Serve) => {
            info!("Starting repogate gateway");
            daemon::start_gateway(ServeOptions {
                config_path: cli.config,
                host: cli.host,
                port: cli.port,
                secret: cli.secret,
            })
            .await
        }
        Some(Commands::Status) => {
            let target = GatewayTarget::resolve(cli.host, cli.port, cli.secret, cli.config)?;
            if !commands::status::execute(target).await? {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Commands::Session { command }) => {
            let target = GatewayTarget::resolve(cli.host, cli.port, cli.secret, cli.config)?;
            commands::session::handle_command(command, target).await
        }
        Some(Commands::Check(command)) => {
            let target = GatewayTarget::resolve(cli.host, cli.port, cli.secret, cli.config)?;
            if !commands::check::execute(command, target).await? {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Commands::Config { command }) => {
            commands::config::handle_command(command, cli.config).await
        }
        None => {
            // No command provided - show help
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    }
}

/// Logging settings from the configuration file, if one loads; defaults otherwise.
fn configured_logging(config_path: Option<PathBuf>) -> LoggingConfig {
    GatewayConfigManifest::load_or_default(config_path)
        .ok()
        .and_then(|config| config.spec.observability)
        .and_then(|observability| observability.logging)
        .unwrap_or_default()
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str, format: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    match format {
        "json" => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init(),
        _ => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .compact()
            .init(),
    }

    Ok(())
}

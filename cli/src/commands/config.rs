// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use repogate_core::domain::config::{GatewayConfigManifest, VisibilityProvider};

const MINIMAL_TEMPLATE: &str = include_str!("../../templates/config-minimal.yaml");
const EXAMPLES_TEMPLATE: &str = include_str!("../../templates/config-with-examples.yaml");

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample configuration
    Generate {
        /// Output path (default: ./repogate-config.yaml)
        #[arg(short, long, default_value = "./repogate-config.yaml")]
        output: PathBuf,

        /// Include examples and comments
        #[arg(long)]
        examples: bool,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => show(config_override, paths).await,
        ConfigCommand::Validate { file } => validate(file.or(config_override)).await,
        ConfigCommand::Generate { output, examples } => generate(output, examples).await,
    }
}

async fn show(config_override: Option<PathBuf>, show_paths: bool) -> Result<()> {
    let config = GatewayConfigManifest::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. REPOGATE_CONFIG_PATH: {}",
            std::env::var("REPOGATE_CONFIG_PATH")
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./repogate-config.yaml");
        println!("  4. ~/.repogate/config.yaml");
        println!("  5. /etc/repogate/config.yaml");
        println!();
    }

    println!("{}", "Current configuration:".bold());
    println!();

    println!("{}", "Gateway:".bold());
    println!("  Name: {}", config.metadata.name);
    println!(
        "  Listen: {}:{}",
        config.spec.server.bind_address, config.spec.server.port
    );
    println!("  Shared secret: {}", secret_state(config.spec.auth.shared_secret.as_deref()));
    println!();

    println!("{}", "Sessions:".bold());
    println!("  TTL: {}", humanize(config.spec.sessions.ttl));
    println!("  Sweep interval: {}", humanize(config.spec.sessions.sweep_interval));
    println!();

    let visibility = &config.spec.visibility;
    println!("{}", "Visibility:".bold());
    match visibility.provider {
        VisibilityProvider::Github => {
            println!("  Provider: github ({})", visibility.api_base);
            println!("  Token: {}", secret_state(visibility.token.as_deref()));
        }
        VisibilityProvider::Static => {
            println!("  Provider: static ({} entries)", visibility.repositories.len());
            for (repo, vis) in &visibility.repositories {
                println!("    - {} → {}", repo, vis);
            }
            if let Some(default) = visibility.default {
                println!("  Default: {}", default);
            }
        }
    }
    println!("  Timeout: {}", humanize(visibility.timeout));
    if visibility.cache_capacity == 0 || visibility.cache_ttl.is_zero() {
        println!("  Cache: {}", "disabled".dimmed());
    } else {
        println!(
            "  Cache: {} entries, {}",
            visibility.cache_capacity,
            humanize(visibility.cache_ttl)
        );
    }
    println!();

    println!("{}", "Legacy mode (session-less checks):".bold());
    let legacy = match config.spec.legacy.equivalent_mode() {
        Ok(Some(mode)) => format!("{}-only", mode),
        Ok(None) => "unrestricted".to_string(),
        Err(e) => format!("{}", e).red().to_string(),
    };
    println!("  {}", legacy);
    println!();

    Ok(())
}

async fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = GatewayConfigManifest::load_or_default(config_path)
        .context("Failed to load configuration")?;

    config
        .validate()
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

async fn generate(output: PathBuf, with_examples: bool) -> Result<()> {
    let sample = if with_examples {
        EXAMPLES_TEMPLATE
    } else {
        MINIMAL_TEMPLATE
    };

    std::fs::write(&output, sample)
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );

    Ok(())
}

fn secret_state(value: Option<&str>) -> String {
    match value {
        Some(v) if v.starts_with("env:") => format!("from {}", &v["env:".len()..]),
        Some(_) => "(set)".to_string(),
        None => "(not set)".dimmed().to_string(),
    }
}

fn humanize(duration: std::time::Duration) -> String {
    format!("{}s", duration.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use repogate_core::domain::legacy::LegacyModeConfig;

    #[test]
    fn test_templates_parse() {
        for template in [MINIMAL_TEMPLATE, EXAMPLES_TEMPLATE] {
            let mut config = GatewayConfigManifest::from_yaml_str(template).unwrap();
            assert_eq!(config.api_version, "repogate/v1");
            assert_eq!(config.spec.legacy, LegacyModeConfig::default());

            // Secret and token are env references; give them literal values.
            config.spec.auth.shared_secret = Some("s3cret".to_string());
            config.spec.visibility.token = None;
            config.validate().unwrap();
        }
    }

    #[test]
    fn test_examples_template_durations() {
        let config = GatewayConfigManifest::from_yaml_str(EXAMPLES_TEMPLATE).unwrap();
        assert_eq!(config.spec.sessions.ttl.as_secs(), 24 * 60 * 60);
        assert_eq!(config.spec.sessions.sweep_interval.as_secs(), 300);
        assert_eq!(config.spec.visibility.repositories.len(), 2);
    }

    #[test]
    fn test_secret_state_never_prints_value() {
        assert_eq!(secret_state(Some("hunter2")), "(set)");
        assert_eq!(secret_state(Some("env:MY_SECRET")), "from MY_SECRET");
    }

    #[tokio::test]
    async fn test_generate_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("repogate-config.yaml");
        generate(path.clone(), false).await.unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, MINIMAL_TEMPLATE);
    }
}

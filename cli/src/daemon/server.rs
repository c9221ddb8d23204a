// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Gateway HTTP server

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use repogate_core::{
    application::{AccessCheckService, SessionService, SessionSweeper},
    domain::{
        clock::{Clock, SystemClock},
        config::GatewayConfigManifest,
        legacy::GlobalModePolicy,
    },
    infrastructure::{build_resolver, InMemorySessionRepository, SharedSecretGuard},
    presentation::{app, GatewayState},
};

/// Command-line overrides applied on top of the loaded configuration.
#[derive(Debug, Default, Clone)]
pub struct ServeOptions {
    pub config_path: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub secret: Option<String>,
}

/// Load configuration, apply overrides, and validate.
pub fn load_gateway_config(options: &ServeOptions) -> Result<GatewayConfigManifest> {
    let mut config = GatewayConfigManifest::load_or_default(options.config_path.clone())
        .context("Failed to load configuration")?;

    if let Some(host) = &options.host {
        config.spec.server.bind_address = host.clone();
    }
    if let Some(port) = options.port {
        config.spec.server.port = port;
    }
    if let Some(secret) = &options.secret {
        config.spec.auth.shared_secret = Some(secret.clone());
    }

    config
        .validate()
        .context("Configuration validation failed")?;

    Ok(config)
}

pub async fn start_gateway(options: ServeOptions) -> Result<()> {
    let config = load_gateway_config(&options)?;

    info!(
        name = %config.metadata.name,
        provider = ?config.spec.visibility.provider,
        "Configuration loaded"
    );

    // Initialize services
    let guard = SharedSecretGuard::new(&config.shared_secret()?)
        .context("Failed to initialize shared-secret guard")?;

    let ttl = chrono::Duration::from_std(config.spec.sessions.ttl)
        .context("Session TTL is out of range")?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let sessions = Arc::new(InMemorySessionRepository::with_clock(ttl, clock.clone()));

    let resolver = build_resolver(&config).context("Failed to initialize visibility resolver")?;

    let legacy = GlobalModePolicy::from_config(config.spec.legacy)
        .context("Invalid legacy mode configuration")?;
    match legacy.mode() {
        Some(mode) => warn!(mode = %mode, "Legacy global mode active for session-less checks"),
        None => info!("No legacy global mode set; session-less checks are unrestricted"),
    }

    let sweeper = Arc::new(SessionSweeper::new(
        sessions.clone(),
        clock,
        config.spec.sessions.sweep_interval,
    ));
    let sweeper_token = sweeper.shutdown_token();
    let sweeper_handle = sweeper.start();

    let state = GatewayState::new(
        guard,
        SessionService::new(sessions.clone()),
        AccessCheckService::new(
            sessions,
            resolver,
            Arc::new(legacy),
            config.spec.visibility.timeout,
        ),
    );

    // Start HTTP server
    let addr = format!(
        "{}:{}",
        config.spec.server.bind_address, config.spec.server.port
    );
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Gateway listening on {}", addr);

    axum::serve(listener, app(Arc::new(state)))
        .with_graceful_shutdown(shutdown_signal(sweeper_token.clone()))
        .await
        .context("HTTP server failed")?;

    sweeper_token.cancel();
    if let Err(e) = sweeper_handle.await {
        warn!("Session sweeper task ended abnormally: {}", e);
    }

    info!("Gateway shut down");

    Ok(())
}

async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }

    token.cancel();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CONFIG: &str = r#"
apiVersion: repogate/v1
kind: GatewayConfig
metadata:
  name: test-gateway
spec:
  auth:
    shared_secret: from-file
  visibility:
    provider: static
    repositories:
      octo/site: public
"#;

    #[test]
    fn test_cli_overrides_win_over_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CONFIG.as_bytes()).unwrap();

        let options = ServeOptions {
            config_path: Some(file.path().to_path_buf()),
            host: Some("0.0.0.0".to_string()),
            port: Some(18443),
            secret: Some("from-flag".to_string()),
        };
        let config = load_gateway_config(&options).unwrap();

        assert_eq!(config.spec.server.bind_address, "0.0.0.0");
        assert_eq!(config.spec.server.port, 18443);
        assert_eq!(config.shared_secret().unwrap(), "from-flag");
    }

    #[test]
    fn test_missing_explicit_config_fails() {
        let options = ServeOptions {
            config_path: Some(PathBuf::from("/nonexistent/repogate.yaml")),
            ..Default::default()
        };
        assert!(load_gateway_config(&options).is_err());
    }
}

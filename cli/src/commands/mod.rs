// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the repogate CLI

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::daemon::{GatewayClient, DEFAULT_HOST};
use repogate_core::domain::config::GatewayConfigManifest;

pub mod check;
pub mod config;
pub mod session;
pub mod status;

pub use self::config::ConfigCommand;
pub use self::session::SessionCommand;

/// Address and credential for talking to a running gateway.
#[derive(Debug, Clone)]
pub struct GatewayTarget {
    pub host: String,
    pub port: u16,
    secret: Option<String>,
}

impl GatewayTarget {
    /// Command-line values win; anything unset is taken from the configuration
    /// file the server itself would load.
    pub fn resolve(
        host: Option<String>,
        port: Option<u16>,
        secret: Option<String>,
        config_path: Option<PathBuf>,
    ) -> Result<Self> {
        let config = GatewayConfigManifest::load_or_default(config_path)
            .context("Failed to load configuration")?;

        let host = host.unwrap_or_else(|| client_host(&config.spec.server.bind_address));
        let port = port.unwrap_or(config.spec.server.port);
        let secret = match secret {
            Some(secret) => Some(secret),
            None => config.shared_secret().ok(),
        };

        Ok(Self { host, port, secret })
    }

    pub fn new(host: impl Into<String>, port: u16, secret: Option<String>) -> Self {
        Self {
            host: host.into(),
            port,
            secret,
        }
    }

    pub fn client(&self) -> Result<GatewayClient> {
        let secret = self.secret.clone().context(
            "No shared secret: pass --secret, set REPOGATE_SHARED_SECRET, or configure spec.auth.shared_secret",
        )?;
        GatewayClient::new(crate::daemon::base_url(&self.host, self.port), secret)
    }
}

/// A wildcard bind address is not a destination; use loopback instead.
fn client_host(bind_address: &str) -> String {
    match bind_address {
        "0.0.0.0" | "::" | "[::]" | "" => DEFAULT_HOST.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcard_bind_maps_to_loopback() {
        assert_eq!(client_host("0.0.0.0"), "127.0.0.1");
        assert_eq!(client_host("10.0.0.5"), "10.0.0.5");
    }

    #[test]
    fn test_client_requires_secret() {
        let target = GatewayTarget::new("127.0.0.1", 9443, None);
        assert!(target.client().is_err());

        let target = GatewayTarget::new("127.0.0.1", 9443, Some("s".to_string()));
        assert!(target.client().is_ok());
    }
}

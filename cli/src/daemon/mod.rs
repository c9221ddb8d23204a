// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Gateway process support
//!
//! Handles:
//! - Running the gateway server in the foreground
//! - HTTP health checks against a running gateway
//! - The authenticated API client used by the CLI subcommands

use anyhow::Result;
use std::time::Duration;

pub mod client;
pub mod server;

pub use client::GatewayClient;
pub use server::{start_gateway, ServeOptions};

pub const DEFAULT_HOST: &str = "127.0.0.1";

#[derive(Debug, Clone, PartialEq)]
pub enum GatewayStatus {
    Running {
        version: String,
        uptime: u64,
        active_sessions: usize,
    },
    Stopped,
    Unhealthy {
        error: String,
    },
}

/// Build the base URL for a gateway address. A host that already carries a
/// scheme is used as given.
pub fn base_url(host: &str, port: u16) -> String {
    if host.starts_with("http://") || host.starts_with("https://") {
        format!("{}:{}", host.trim_end_matches('/'), port)
    } else {
        format!("http://{}:{}", host, port)
    }
}

/// Check whether a gateway is answering on `host:port` via `GET /health`.
pub async fn check_gateway_running(host: &str, port: u16) -> Result<GatewayStatus> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(500)) // Fast timeout for local checks
        .build()?;

    let health_url = format!("{}/health", base_url(host, port));

    match client.get(&health_url).send().await {
        Ok(resp) if resp.status().is_success() => {
            let health = resp.json::<serde_json::Value>().await.ok();
            let field = |name: &str| health.as_ref().and_then(|v| v[name].as_u64());

            Ok(GatewayStatus::Running {
                version: health
                    .as_ref()
                    .and_then(|v| v["version"].as_str())
                    .unwrap_or("unknown")
                    .to_string(),
                uptime: field("uptime_seconds").unwrap_or(0),
                active_sessions: field("active_sessions").unwrap_or(0) as usize,
            })
        }
        Ok(resp) => Ok(GatewayStatus::Unhealthy {
            error: format!("HTTP {}", resp.status()),
        }),
        Err(e) if e.is_connect() => Ok(GatewayStatus::Stopped),
        Err(e) => Ok(GatewayStatus::Unhealthy {
            error: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(url: &str) -> (String, u16) {
        let (host, port) = url.rsplit_once(':').unwrap();
        (host.to_string(), port.parse().unwrap())
    }

    #[test]
    fn test_base_url() {
        assert_eq!(base_url("127.0.0.1", 9443), "http://127.0.0.1:9443");
        assert_eq!(base_url("https://gate.internal", 443), "https://gate.internal:443");
    }

    #[tokio::test]
    async fn test_running_gateway_reports_health() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/health")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"ok","version":"0.3.0","active_sessions":2,"uptime_seconds":42}"#)
            .create_async()
            .await;

        let (host, port) = split(&server.url());
        let status = check_gateway_running(&host, port).await.unwrap();
        assert_eq!(
            status,
            GatewayStatus::Running {
                version: "0.3.0".to_string(),
                uptime: 42,
                active_sessions: 2,
            }
        );
    }

    #[tokio::test]
    async fn test_error_status_is_unhealthy() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/health")
            .with_status(503)
            .create_async()
            .await;

        let (host, port) = split(&server.url());
        let status = check_gateway_running(&host, port).await.unwrap();
        assert!(matches!(status, GatewayStatus::Unhealthy { .. }));
    }
}

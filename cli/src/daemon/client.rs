// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! HTTP client for communicating with the gateway API

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::Deserialize;
use std::time::Duration;

use repogate_core::domain::policy::PolicyDecision;
use repogate_core::domain::session::Session;
use repogate_core::presentation::api::{CheckRequest, HealthResponse, RegisterSessionRequest};

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: Client,
    base_url: String,
    secret: String,
}

impl GatewayClient {
    pub fn new(base_url: impl Into<String>, secret: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            secret: secret.into(),
        })
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request.header("Authorization", format!("Bearer {}", self.secret))
    }

    pub async fn register_session(
        &self,
        session_id: &str,
        container_id: &str,
        mode: &str,
    ) -> Result<Session> {
        let body = RegisterSessionRequest {
            session_id: session_id.to_string(),
            container_id: container_id.to_string(),
            mode: mode.to_string(),
        };

        let response = self
            .authed(self.client.post(format!("{}/api/v1/sessions", self.base_url)))
            .json(&body)
            .send()
            .await
            .context("Failed to register session")?;

        let response = error_for_status(response, "Failed to register session").await?;
        response
            .json()
            .await
            .context("Failed to parse register response")
    }

    pub async fn unregister_session(&self, session_id: &str) -> Result<()> {
        let mut url = Url::parse(&format!("{}/api/v1/sessions", self.base_url))
            .context("Invalid gateway URL")?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Gateway URL cannot carry a path"))?
            .push(session_id);

        let response = self
            .authed(self.client.delete(url))
            .send()
            .await
            .context("Failed to unregister session")?;

        error_for_status(response, "Failed to unregister session").await?;
        Ok(())
    }

    pub async fn check(
        &self,
        session_id: Option<&str>,
        operation_class: &str,
        repo: &str,
    ) -> Result<PolicyDecision> {
        let body = CheckRequest {
            session_id: session_id.map(str::to_string),
            operation_class: operation_class.to_string(),
            repo: repo.to_string(),
        };

        let response = self
            .authed(self.client.post(format!("{}/api/v1/check", self.base_url)))
            .json(&body)
            .send()
            .await
            .context("Failed to check operation")?;

        let response = error_for_status(response, "Failed to check operation").await?;
        response
            .json()
            .await
            .context("Failed to parse check response")
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .context("Failed to reach gateway")?;

        let response = error_for_status(response, "Health check failed").await?;
        response
            .json()
            .await
            .context("Failed to parse health response")
    }
}

async fn error_for_status(response: Response, what: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorResponse>(&text) {
        Ok(err) => anyhow::bail!("{}: {} ({}, HTTP {})", what, err.message, err.error, status.as_u16()),
        Err(_) => anyhow::bail!("{}: HTTP {} {}", what, status.as_u16(), text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_register_sends_bearer_secret() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/sessions")
            .match_header("authorization", "Bearer s3cret")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "session_id": "abc123",
                "container_id": "jib-A",
                "mode": "private"
            })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"session_id":"abc123","container_id":"jib-A","mode":"private",
                    "created_at":"2026-01-01T00:00:00Z","expires_at":"2026-01-02T00:00:00Z"}"#,
            )
            .create_async()
            .await;

        let client = GatewayClient::new(server.url(), "s3cret").unwrap();
        let session = client.register_session("abc123", "jib-A", "private").await.unwrap();
        assert_eq!(session.session_id.as_str(), "abc123");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_body_is_surfaced() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/v1/sessions")
            .with_status(409)
            .with_body(r#"{"error":"duplicate_session","message":"session 'abc123' is already registered"}"#)
            .create_async()
            .await;

        let client = GatewayClient::new(server.url(), "s3cret").unwrap();
        let err = client
            .register_session("abc123", "jib-A", "private")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("duplicate_session"));
    }

    #[tokio::test]
    async fn test_check_parses_decision() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/v1/check")
            .with_status(200)
            .with_body(r#"{"allow":false,"reason":"remote operation blocked for public repo in private mode"}"#)
            .create_async()
            .await;

        let client = GatewayClient::new(server.url(), "s3cret").unwrap();
        let decision = client.check(Some("abc123"), "remote", "octo/site").await.unwrap();
        assert!(!decision.allow);
        assert!(decision.reason.is_some());
    }

    #[tokio::test]
    async fn test_unregister_hits_session_path() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", "/api/v1/sessions/abc123")
            .with_status(204)
            .create_async()
            .await;

        let client = GatewayClient::new(server.url(), "s3cret").unwrap();
        client.unregister_session("abc123").await.unwrap();
        mock.assert_async().await;
    }
}

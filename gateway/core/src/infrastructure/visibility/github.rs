// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! GitHub Visibility Adapter
//!
//! Resolves repository visibility through the GitHub REST API.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** `GET {api_base}/repos/{owner}/{repo}` → `visibility`
//! - **Integration:** GitHub / GitHub Enterprise API → access-check service

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use super::{VisibilityError, VisibilityResolver};
use crate::domain::visibility::{RepositoryRef, RepositoryVisibility};

const USER_AGENT: &str = concat!("repogate/", env!("CARGO_PKG_VERSION"));

/// Subset of the `GET /repos/{owner}/{repo}` response we read.
#[derive(Debug, Deserialize)]
struct RepositoryResponse {
    /// `public`, `private` or `internal`. Absent on some older GHES versions.
    visibility: Option<String>,
    private: Option<bool>,
}

pub struct GitHubVisibilityResolver {
    /// HTTP client
    client: Client,

    /// API base URL (e.g., "https://api.github.com")
    api_base: String,

    token: Option<String>,
}

impl GitHubVisibilityResolver {
    /// Create a resolver whose HTTP requests are bounded by `timeout`.
    pub fn new(
        api_base: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    fn repo_url(&self, repo: &RepositoryRef) -> String {
        format!("{}/repos/{}/{}", self.api_base, repo.owner, repo.name)
    }
}

#[async_trait]
impl VisibilityResolver for GitHubVisibilityResolver {
    async fn resolve(&self, repo: &RepositoryRef) -> Result<RepositoryVisibility, VisibilityError> {
        let mut req = self
            .client
            .get(self.repo_url(repo))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");

        if let Some(token) = &self.token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        let response = req
            .send()
            .await
            .map_err(|e| VisibilityError::Transport(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {}
            // GitHub answers 404 for private repositories the token cannot see.
            StatusCode::NOT_FOUND => return Err(VisibilityError::NotFound(repo.to_string())),
            status => return Err(VisibilityError::UnexpectedStatus(status.as_u16())),
        }

        let body: RepositoryResponse = response
            .json()
            .await
            .map_err(|e| VisibilityError::MalformedResponse(e.to_string()))?;

        match (body.visibility, body.private) {
            (Some(visibility), _) => visibility
                .parse::<RepositoryVisibility>()
                .map_err(|e| VisibilityError::MalformedResponse(e.to_string())),
            (None, Some(true)) => Ok(RepositoryVisibility::Private),
            (None, Some(false)) => Ok(RepositoryVisibility::Public),
            (None, None) => Err(VisibilityError::MalformedResponse(
                "neither 'visibility' nor 'private' present".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(server: &mockito::ServerGuard, token: Option<&str>) -> GitHubVisibilityResolver {
        GitHubVisibilityResolver::new(server.url(), token.map(str::to_string), Duration::from_secs(2))
            .unwrap()
    }

    #[tokio::test]
    async fn test_reads_visibility_field() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/repos/octo/inner")
            .match_header("authorization", "Bearer t0ken")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"full_name":"octo/inner","private":true,"visibility":"internal"}"#)
            .create_async()
            .await;

        let vis = resolver(&server, Some("t0ken"))
            .resolve(&RepositoryRef::new("octo", "inner"))
            .await;
        assert_eq!(vis, Ok(RepositoryVisibility::Internal));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_falls_back_to_private_flag() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/repos/octo/site")
            .with_status(200)
            .with_body(r#"{"private":false}"#)
            .create_async()
            .await;

        let vis = resolver(&server, None)
            .resolve(&RepositoryRef::new("octo", "site"))
            .await;
        assert_eq!(vis, Ok(RepositoryVisibility::Public));
    }

    #[tokio::test]
    async fn test_not_found_and_server_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/repos/octo/hidden")
            .with_status(404)
            .create_async()
            .await;
        server
            .mock("GET", "/repos/octo/flaky")
            .with_status(502)
            .create_async()
            .await;

        let r = resolver(&server, None);
        assert_eq!(
            r.resolve(&RepositoryRef::new("octo", "hidden")).await,
            Err(VisibilityError::NotFound("octo/hidden".to_string()))
        );
        assert_eq!(
            r.resolve(&RepositoryRef::new("octo", "flaky")).await,
            Err(VisibilityError::UnexpectedStatus(502))
        );
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/repos/octo/odd")
            .with_status(200)
            .with_body(r#"{"visibility":"secret"}"#)
            .create_async()
            .await;

        assert!(matches!(
            resolver(&server, None)
                .resolve(&RepositoryRef::new("octo", "odd"))
                .await,
            Err(VisibilityError::MalformedResponse(_))
        ));
    }
}

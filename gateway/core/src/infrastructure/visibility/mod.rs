// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Repository Visibility Resolution
//!
//! Adapters behind the [`VisibilityResolver`] seam. The access-check service
//! treats any error from a resolver, and any resolver that outlives its
//! timeout, as "unresolved".
//!
//! | Module | Adapter |
//! |--------|---------|
//! | [`github`] | GitHub REST API (`GET /repos/{owner}/{repo}`) |
//! | [`static_table`] | Fixed table from configuration |
//! | [`cache`] | LRU + TTL decorator over another resolver |

pub mod cache;
pub mod github;
pub mod static_table;

pub use cache::CachingVisibilityResolver;
pub use github::GitHubVisibilityResolver;
pub use static_table::StaticVisibilityResolver;

use async_trait::async_trait;
use std::num::NonZeroUsize;
use std::sync::Arc;
use thiserror::Error;

use crate::domain::config::{GatewayConfigManifest, VisibilityProvider};
use crate::domain::visibility::{RepositoryRef, RepositoryVisibility};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VisibilityError {
    #[error("repository {0} not found")]
    NotFound(String),

    #[error("repository {0} is not in the visibility table")]
    Unlisted(String),

    #[error("visibility lookup returned HTTP {0}")]
    UnexpectedStatus(u16),

    #[error("visibility lookup failed: {0}")]
    Transport(String),

    #[error("malformed visibility response: {0}")]
    MalformedResponse(String),
}

/// Resolves a repository to its hosting-platform visibility.
#[async_trait]
pub trait VisibilityResolver: Send + Sync {
    async fn resolve(&self, repo: &RepositoryRef) -> Result<RepositoryVisibility, VisibilityError>;
}

/// Build the resolver stack described by `spec.visibility`.
pub fn build_resolver(config: &GatewayConfigManifest) -> anyhow::Result<Arc<dyn VisibilityResolver>> {
    let visibility = &config.spec.visibility;

    let base: Arc<dyn VisibilityResolver> = match visibility.provider {
        VisibilityProvider::Github => Arc::new(GitHubVisibilityResolver::new(
            visibility.api_base.clone(),
            config.visibility_token()?,
            visibility.timeout,
        )?),
        VisibilityProvider::Static => Arc::new(StaticVisibilityResolver::from_table(
            &visibility.repositories,
            visibility.default,
        )?),
    };

    let capacity = NonZeroUsize::new(visibility.cache_capacity);
    match capacity {
        Some(capacity) if !visibility.cache_ttl.is_zero() => {
            tracing::info!(
                capacity = capacity.get(),
                ttl_seconds = visibility.cache_ttl.as_secs(),
                "Visibility cache enabled"
            );
            Ok(Arc::new(CachingVisibilityResolver::new(base, capacity, visibility.cache_ttl)))
        }
        _ => Ok(base),
    }
}

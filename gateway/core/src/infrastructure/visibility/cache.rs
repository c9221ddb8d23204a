// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use super::{VisibilityError, VisibilityResolver};
use crate::domain::visibility::{RepositoryRef, RepositoryVisibility};

/// LRU cache in front of another resolver.
///
/// Only successful resolutions are cached; a failure is retried on the next
/// check. Entries older than `ttl` are treated as misses.
pub struct CachingVisibilityResolver {
    inner: Arc<dyn VisibilityResolver>,
    cache: Mutex<LruCache<String, (RepositoryVisibility, Instant)>>,
    ttl: Duration,
}

impl CachingVisibilityResolver {
    pub fn new(inner: Arc<dyn VisibilityResolver>, capacity: NonZeroUsize, ttl: Duration) -> Self {
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    fn cached(&self, key: &str) -> Option<RepositoryVisibility> {
        let mut cache = self.cache.lock();
        match cache.get(key) {
            Some((vis, stored_at)) if stored_at.elapsed() < self.ttl => Some(*vis),
            Some(_) => {
                cache.pop(key);
                None
            }
            None => None,
        }
    }
}

#[async_trait]
impl VisibilityResolver for CachingVisibilityResolver {
    async fn resolve(&self, repo: &RepositoryRef) -> Result<RepositoryVisibility, VisibilityError> {
        let key = repo.key();
        if let Some(vis) = self.cached(&key) {
            tracing::trace!(repo = %repo, visibility = %vis, "Visibility cache hit");
            return Ok(vis);
        }

        let vis = self.inner.resolve(repo).await?;
        self.cache.lock().put(key, (vis, Instant::now()));
        Ok(vis)
    }
}

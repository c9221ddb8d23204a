// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};

use super::{VisibilityError, VisibilityResolver};
use crate::domain::visibility::{RepositoryRef, RepositoryVisibility};

/// Resolves from a fixed `owner/name -> visibility` table.
///
/// Repositories missing from the table get `default`, or an
/// [`VisibilityError::Unlisted`] error when no default is configured.
pub struct StaticVisibilityResolver {
    table: HashMap<String, RepositoryVisibility>,
    default: Option<RepositoryVisibility>,
}

impl StaticVisibilityResolver {
    pub fn new(
        entries: impl IntoIterator<Item = (RepositoryRef, RepositoryVisibility)>,
        default: Option<RepositoryVisibility>,
    ) -> Self {
        Self {
            table: entries.into_iter().map(|(repo, vis)| (repo.key(), vis)).collect(),
            default,
        }
    }

    /// Build from the raw configuration table, validating every key.
    pub fn from_table(
        table: &BTreeMap<String, RepositoryVisibility>,
        default: Option<RepositoryVisibility>,
    ) -> anyhow::Result<Self> {
        let entries = table
            .iter()
            .map(|(key, vis)| {
                RepositoryRef::parse(key)
                    .map(|repo| (repo, *vis))
                    .map_err(|e| anyhow::anyhow!("Invalid visibility table entry: {}", e))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Self::new(entries, default))
    }
}

#[async_trait]
impl VisibilityResolver for StaticVisibilityResolver {
    async fn resolve(&self, repo: &RepositoryRef) -> Result<RepositoryVisibility, VisibilityError> {
        self.table
            .get(&repo.key())
            .copied()
            .or(self.default)
            .ok_or_else(|| VisibilityError::Unlisted(repo.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookup_is_case_insensitive() {
        let resolver = StaticVisibilityResolver::new(
            [(RepositoryRef::new("Octo", "Site"), RepositoryVisibility::Public)],
            None,
        );
        assert_eq!(
            resolver.resolve(&RepositoryRef::new("octo", "site")).await,
            Ok(RepositoryVisibility::Public)
        );
    }

    #[tokio::test]
    async fn test_unlisted_without_default_is_error() {
        let resolver = StaticVisibilityResolver::new([], None);
        assert!(matches!(
            resolver.resolve(&RepositoryRef::new("octo", "x")).await,
            Err(VisibilityError::Unlisted(_))
        ));
    }

    #[tokio::test]
    async fn test_unlisted_uses_default() {
        let resolver = StaticVisibilityResolver::new([], Some(RepositoryVisibility::Internal));
        assert_eq!(
            resolver.resolve(&RepositoryRef::new("octo", "x")).await,
            Ok(RepositoryVisibility::Internal)
        );
    }

    #[test]
    fn test_from_table_rejects_bad_keys() {
        let table = BTreeMap::from([("nope".to_string(), RepositoryVisibility::Public)]);
        assert!(StaticVisibilityResolver::from_table(&table, None).is_err());
    }
}

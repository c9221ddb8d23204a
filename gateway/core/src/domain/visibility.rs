// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Repository Visibility
//!
//! Value objects describing the target of a source-control operation and the
//! hosting platform's classification of it. Resolution itself happens behind
//! [`crate::infrastructure::visibility::VisibilityResolver`]; the domain only
//! names the result.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Hosting-platform visibility of a single repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryVisibility {
    Public,
    Private,
    /// Organisation-internal. Treated like `Private` by policy.
    Internal,
}

impl RepositoryVisibility {
    /// `true` for anything that is not world-readable.
    pub fn is_restricted(&self) -> bool {
        !matches!(self, Self::Public)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Internal => "internal",
        }
    }
}

impl FromStr for RepositoryVisibility {
    type Err = RepositoryRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            "internal" => Ok(Self::Internal),
            other => Err(RepositoryRefError::UnknownVisibility(other.to_string())),
        }
    }
}

impl fmt::Display for RepositoryVisibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryRefError {
    #[error("repository identifier '{0}' is not of the form owner/name")]
    Malformed(String),

    #[error("unknown visibility '{0}'")]
    UnknownVisibility(String),
}

/// `owner/name` pair identifying a hosted repository.
///
/// Accepts the spellings git and gh hand to the wrappers:
///
/// - `owner/name`
/// - `github.com/owner/name`
/// - `https://github.com/owner/name.git`
/// - `git@github.com:owner/name.git`
/// - `ssh://git@github.com/owner/name`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
}

impl RepositoryRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    pub fn parse(raw: &str) -> Result<Self, RepositoryRefError> {
        let malformed = || RepositoryRefError::Malformed(raw.to_string());
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(malformed());
        }

        let path = if trimmed.contains("://") {
            let parsed = url::Url::parse(trimmed).map_err(|_| malformed())?;
            parsed.path().to_string()
        } else if let Some((prefix, rest)) = trimmed.split_once(':') {
            // scp-like syntax: user@host:owner/name
            if !prefix.contains('@') && !prefix.contains('.') {
                return Err(malformed());
            }
            rest.to_string()
        } else {
            trimmed.to_string()
        };

        let segments: Vec<&str> = path
            .trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        // Keep the last two segments so that `host/owner/name` also parses.
        let (owner, name) = match segments.as_slice() {
            [owner, name] => (*owner, *name),
            [host, owner, name] if host.contains('.') => (*owner, *name),
            _ => return Err(malformed()),
        };

        let name = name.strip_suffix(".git").unwrap_or(name);
        if owner.is_empty() || name.is_empty() || !is_valid_segment(owner) || !is_valid_segment(name) {
            return Err(malformed());
        }

        Ok(Self::new(owner, name))
    }

    /// Lower-cased `owner/name`, suitable as a cache or table key.
    pub fn key(&self) -> String {
        format!("{}/{}", self.owner, self.name).to_ascii_lowercase()
    }
}

fn is_valid_segment(segment: &str) -> bool {
    segment
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

impl FromStr for RepositoryRef {
    type Err = RepositoryRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

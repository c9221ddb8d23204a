// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Shared-Secret Guard
//!
//! Gates the whole gateway API behind one pre-shared secret. The guard knows
//! nothing about sessions or repositories; a request that fails here never
//! reaches the session store.
//!
//! ## Security
//!
//! Both the configured and the presented secret are reduced to SHA-256
//! digests and compared with [`subtle::ConstantTimeEq`]. Comparing fixed-size
//! digests keeps the comparison time independent of both the length and the
//! matching prefix of the presented value.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("missing credentials")]
    MissingCredentials,

    #[error("invalid credentials")]
    InvalidCredentials,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("shared secret cannot be empty")]
pub struct EmptySecret;

/// Validates the shared secret presented with every API request.
#[derive(Clone)]
pub struct SharedSecretGuard {
    expected_digest: [u8; 32],
}

impl SharedSecretGuard {
    pub fn new(secret: &str) -> Result<Self, EmptySecret> {
        if secret.is_empty() {
            return Err(EmptySecret);
        }
        Ok(Self {
            expected_digest: digest(secret),
        })
    }

    /// Check a presented credential. `None` means the request carried none.
    pub fn verify(&self, presented: Option<&str>) -> Result<(), AuthError> {
        let presented = match presented {
            Some(value) if !value.is_empty() => value,
            _ => return Err(AuthError::MissingCredentials),
        };

        if bool::from(digest(presented)[..].ct_eq(&self.expected_digest[..])) {
            Ok(())
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }
}

impl std::fmt::Debug for SharedSecretGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedSecretGuard").finish_non_exhaustive()
    }
}

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}

// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Argon2 password hashing.
//!
//! Hashes are stored as PHC strings, so verification reads its parameters
//! from the stored hash and keeps working after the cost is changed.

use argon2::{Algorithm, Argon2, Params, PasswordHasher, PasswordVerifier, Version};
use password_hash::{PasswordHash, SaltString};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Argon2 cost profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashCost {
    /// Argon2id with the crate's recommended parameters.
    #[default]
    Standard,
    /// Minimal parameters. Only for tests.
    Low,
}

/// Hashes and verifies passwords.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordHashing {
    cost: HashCost,
}

impl PasswordHashing {
    /// Creates a hasher with the given cost.
    pub fn new(cost: HashCost) -> Self {
        Self { cost }
    }

    fn argon2(&self) -> Argon2<'static> {
        match self.cost {
            HashCost::Standard => Argon2::default(),
            HashCost::Low => {
                let params = Params::new(Params::MIN_M_COST.max(1024), 1, 1, None)
                    .unwrap_or_default();
                Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
            }
        }
    }

    /// Hashes a password into a PHC string.
    pub fn hash(&self, password: &str) -> Result<String, StoreError> {
        let mut salt_bytes = [0u8; 16];
        getrandom::getrandom(&mut salt_bytes)
            .map_err(|e| StoreError::PasswordHash(e.to_string()))?;
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| StoreError::PasswordHash(e.to_string()))?;

        let phc = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| StoreError::PasswordHash(e.to_string()))?
            .to_string();
        Ok(phc)
    }

    /// Returns `true` if the password matches the PHC string.
    ///
    /// A malformed hash never matches.
    pub fn verify(&self, phc: &str, password: &str) -> bool {
        match PasswordHash::new(phc) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Store contracts.
//!
//! # Role-permission store
//!
//! The durable mapping of role name to permission identifiers. It is the
//! single source of truth the credential issuer reads at login.
//!
//! Every grant or revoke also writes the role's `permission` role claim in
//! the identity store. Implementations perform both writes as one unit; a
//! failure of either leaves neither applied.
//!
//! # Identity store
//!
//! Principals, password verification, role memberships and role claims.
//!
//! # Example
//!
//! ```rust,ignore
//! use hrms_store::{open_store, StoreConfig};
//!
//! let store = open_store(&StoreConfig::memory())?;
//! store.roles.create_role("Admin").await?;
//! store.roles.grant("Admin", &"View".into()).await?;
//! ```

use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use hrms_core::{
    AccessResult, NewPrincipal, PermissionId, PermissionSet, Principal, PrincipalUpdate,
};

use crate::memory::MemoryStore;
use crate::password::{HashCost, PasswordHashing};
use crate::sqlite::SqliteStore;

// =============================================================================
// Store Configuration
// =============================================================================

/// Which backend to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local, lost on exit.
    #[default]
    Memory,
    /// SQLite database file.
    Sqlite,
}

/// Store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend.
    #[serde(default)]
    pub backend: StoreBackend,

    /// Database path for the SQLite backend.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Password hashing cost.
    #[serde(default)]
    pub hash_cost: HashCost,
}

impl StoreConfig {
    /// Configuration for the in-memory backend.
    pub fn memory() -> Self {
        Self::default()
    }

    /// Configuration for a SQLite file.
    pub fn sqlite(path: impl Into<PathBuf>) -> Self {
        Self {
            backend: StoreBackend::Sqlite,
            path: Some(path.into()),
            hash_cost: HashCost::default(),
        }
    }

    /// Sets the password hashing cost.
    pub fn with_hash_cost(mut self, cost: HashCost) -> Self {
        self.hash_cost = cost;
        self
    }
}

// =============================================================================
// Role Claim
// =============================================================================

/// A claim attached to a role in the identity store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoleClaim {
    /// Claim type, e.g. `permission`.
    pub claim_type: String,
    /// Claim value, e.g. `View`.
    pub value: String,
}

impl RoleClaim {
    /// Creates a `permission` role claim.
    pub fn permission(value: impl Into<String>) -> Self {
        Self {
            claim_type: hrms_core::PERMISSION_CLAIM.to_string(),
            value: value.into(),
        }
    }
}

// =============================================================================
// Role-Permission Store
// =============================================================================

/// Durable role to permission mapping.
#[async_trait]
pub trait RolePermissionStore: Send + Sync + Debug {
    /// Creates a role. Fails with `Conflict` if it exists.
    async fn create_role(&self, role: &str) -> AccessResult<()>;

    /// Deletes a role with its grants, role claims and memberships.
    ///
    /// Fails with `NotFound` if the role does not exist.
    async fn delete_role(&self, role: &str) -> AccessResult<()>;

    /// Returns `true` if the role exists.
    async fn role_exists(&self, role: &str) -> AccessResult<bool>;

    /// Returns all role names, sorted.
    async fn list_roles(&self) -> AccessResult<Vec<String>>;

    /// Grants a permission to a role and adds the matching role claim.
    ///
    /// - `NotFound` if the role does not exist
    /// - `Conflict` if the grant exists
    async fn grant(&self, role: &str, permission: &PermissionId) -> AccessResult<()>;

    /// Revokes a permission from a role and removes the matching role claim.
    ///
    /// `NotFound` if the role or the grant does not exist.
    async fn revoke(&self, role: &str, permission: &str) -> AccessResult<()>;

    /// Returns the permissions granted to a role.
    ///
    /// `NotFound` if the role does not exist; an existing role without
    /// grants yields an empty set.
    async fn list_for_role(&self, role: &str) -> AccessResult<PermissionSet>;

    /// Returns the distinct permissions granted to any role.
    async fn list_all(&self) -> AccessResult<PermissionSet>;

    /// Returns the union of the grants of the given roles.
    ///
    /// Unknown roles contribute nothing.
    async fn permissions_for_roles(&self, roles: &[String]) -> AccessResult<PermissionSet>;

    /// Returns the total number of stored grants.
    async fn grant_count(&self) -> AccessResult<usize>;
}

// =============================================================================
// Identity Store
// =============================================================================

/// Principals, memberships and role claims.
#[async_trait]
pub trait IdentityStore: Send + Sync + Debug {
    /// Creates a principal. `Conflict` on a duplicate username or email.
    async fn create_principal(&self, new: NewPrincipal) -> AccessResult<Principal>;

    /// Finds a principal by id.
    async fn find_by_id(&self, id: &str) -> AccessResult<Option<Principal>>;

    /// Finds a principal by email or username, ignoring case.
    async fn find_by_login(&self, login: &str) -> AccessResult<Option<Principal>>;

    /// Returns all principals ordered by username.
    async fn list_principals(&self) -> AccessResult<Vec<Principal>>;

    /// Applies a partial update.
    ///
    /// A password change is applied only if `current_password` verifies.
    async fn update_principal(&self, id: &str, update: PrincipalUpdate)
        -> AccessResult<Principal>;

    /// Deletes a principal and its memberships.
    async fn delete_principal(&self, id: &str) -> AccessResult<()>;

    /// Verifies a password for the principal named by email or username.
    ///
    /// Unknown principal and wrong password both fail with
    /// `AuthenticationFailed`.
    async fn verify_password(&self, login: &str, password: &str) -> AccessResult<Principal>;

    /// Returns the roles of a principal, sorted.
    async fn roles_of(&self, id: &str) -> AccessResult<Vec<String>>;

    /// Adds a principal to a role. `Conflict` if already a member.
    async fn add_to_role(&self, id: &str, role: &str) -> AccessResult<()>;

    /// Removes a principal from a role. `NotFound` if not a member.
    async fn remove_from_role(&self, id: &str, role: &str) -> AccessResult<()>;

    /// Returns the members of a role. `NotFound` if the role does not exist.
    async fn users_in_role(&self, role: &str) -> AccessResult<Vec<Principal>>;

    /// Returns the claims attached to a role. `NotFound` if the role does
    /// not exist.
    async fn role_claims(&self, role: &str) -> AccessResult<Vec<RoleClaim>>;
}

// =============================================================================
// Store Handle
// =============================================================================

/// Both store views over one backend.
#[derive(Debug, Clone)]
pub struct StoreHandle {
    /// Role-permission view.
    pub roles: Arc<dyn RolePermissionStore>,
    /// Identity view.
    pub identities: Arc<dyn IdentityStore>,
}

impl StoreHandle {
    /// Creates a handle over a backend implementing both traits.
    pub fn new<S>(backend: Arc<S>) -> Self
    where
        S: RolePermissionStore + IdentityStore + 'static,
    {
        Self {
            roles: backend.clone(),
            identities: backend,
        }
    }
}

/// Opens the configured backend.
pub fn open_store(config: &StoreConfig) -> AccessResult<StoreHandle> {
    let hashing = PasswordHashing::new(config.hash_cost);
    match config.backend {
        StoreBackend::Memory => {
            info!("Opening in-memory store");
            Ok(StoreHandle::new(Arc::new(MemoryStore::with_hashing(hashing))))
        }
        StoreBackend::Sqlite => {
            let store = match &config.path {
                Some(path) => {
                    info!(path = %path.display(), "Opening SQLite store");
                    SqliteStore::open(path, hashing)?
                }
                None => {
                    info!("Opening in-memory SQLite store");
                    SqliteStore::in_memory(hashing)?
                }
            };
            Ok(StoreHandle::new(Arc::new(store)))
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_config_deserialize() {
        let config: StoreConfig =
            serde_json::from_str(r#"{"backend":"sqlite","path":"/tmp/hrms.db"}"#).unwrap();
        assert_eq!(config.backend, StoreBackend::Sqlite);
        assert_eq!(config.path, Some(PathBuf::from("/tmp/hrms.db")));
        assert_eq!(config.hash_cost, HashCost::Standard);
    }

    #[tokio::test]
    async fn test_open_memory_store_shares_state() {
        let store = open_store(&StoreConfig::memory().with_hash_cost(HashCost::Low)).unwrap();
        store.roles.create_role("Admin").await.unwrap();
        store.roles.grant("Admin", &"View".into()).await.unwrap();

        let claims = store.identities.role_claims("Admin").await.unwrap();
        assert_eq!(claims, vec![RoleClaim::permission("View")]);
    }
}

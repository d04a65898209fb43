// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Catalog-checked grant administration.

use std::sync::Arc;

use tracing::info;

use hrms_core::{
    AccessError, AccessResult, PermissionCatalog, PermissionId, PermissionSet, ResourceKind,
};

use crate::traits::RolePermissionStore;

/// Grant administration over a [`RolePermissionStore`].
///
/// Grants are limited to identifiers present in the catalog. Revoke is not,
/// so a grant whose identifier left the catalog can still be removed.
#[derive(Debug, Clone)]
pub struct RoleGrants {
    store: Arc<dyn RolePermissionStore>,
    catalog: Arc<PermissionCatalog>,
}

impl RoleGrants {
    /// Creates the service.
    pub fn new(store: Arc<dyn RolePermissionStore>, catalog: Arc<PermissionCatalog>) -> Self {
        Self { store, catalog }
    }

    /// Returns the catalog.
    pub fn catalog(&self) -> &PermissionCatalog {
        &self.catalog
    }

    /// Grants a catalog permission to an existing role.
    pub async fn grant(&self, role: &str, permission: &str) -> AccessResult<()> {
        if !self.catalog.contains(permission) {
            return Err(AccessError::not_found(ResourceKind::Permission, permission));
        }
        self.store.grant(role, &PermissionId::new(permission)).await?;
        info!(role, permission, "Permission granted");
        Ok(())
    }

    /// Revokes a permission from a role.
    pub async fn revoke(&self, role: &str, permission: &str) -> AccessResult<()> {
        self.store.revoke(role, permission).await?;
        info!(role, permission, "Permission revoked");
        Ok(())
    }

    /// Lists the permissions of a role.
    pub async fn list_for_role(&self, role: &str) -> AccessResult<PermissionSet> {
        self.store.list_for_role(role).await
    }

    /// Lists the distinct permissions granted to any role.
    pub async fn list_all(&self) -> AccessResult<PermissionSet> {
        self.store.list_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use hrms_core::{CatalogBuilder, OperationSpec};

    fn grants() -> RoleGrants {
        let catalog = CatalogBuilder::new()
            .operation(OperationSpec::read("users.list", "/api/users"))
            .operation(OperationSpec::create("users.create", "/api/users"))
            .build()
            .unwrap();
        RoleGrants::new(Arc::new(MemoryStore::new()), Arc::new(catalog))
    }

    #[tokio::test]
    async fn test_grant_rejects_identifier_outside_catalog() {
        let grants = grants();
        grants.store.create_role("User").await.unwrap();

        let err = grants.grant("User", "Delete").await.unwrap_err();
        assert!(matches!(
            err,
            AccessError::NotFound { kind: ResourceKind::Permission, .. }
        ));

        grants.grant("User", "Create").await.unwrap();
        assert_eq!(grants.list_all().await.unwrap().to_strings(), vec!["Create"]);
    }

    #[tokio::test]
    async fn test_grant_unknown_role() {
        let grants = grants();
        let err = grants.grant("Ghost", "View").await.unwrap_err();
        assert!(matches!(err, AccessError::NotFound { kind: ResourceKind::Role, .. }));
    }

    #[tokio::test]
    async fn test_revoke_identifier_outside_catalog() {
        let grants = grants();
        grants.store.create_role("User").await.unwrap();
        grants.store.grant("User", &"Approve".into()).await.unwrap();

        grants.revoke("User", "Approve").await.unwrap();
        assert!(grants.list_for_role("User").await.unwrap().is_empty());
    }
}

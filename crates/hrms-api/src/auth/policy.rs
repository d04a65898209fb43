// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authorization policies derived from the permission catalog.

use std::collections::BTreeMap;
use std::sync::Arc;

use hrms_core::{AccessError, AccessResult, PermissionCatalog, PermissionId, PERMISSION_CLAIM};
use serde::Serialize;
use tracing::info;

use super::AuthContext;

// =============================================================================
// Policy
// =============================================================================

/// A named authorization predicate.
///
/// Satisfied when the credential carries a `permission` claim equal to the
/// policy's identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Policy {
    name: String,
    claim_type: &'static str,
    permission: PermissionId,
}

impl Policy {
    /// Creates the policy for one permission. The policy is named after it.
    pub fn for_permission(permission: PermissionId) -> Self {
        Self {
            name: permission.as_str().to_string(),
            claim_type: PERMISSION_CLAIM,
            permission,
        }
    }

    /// Returns the policy name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the claim type the predicate inspects.
    pub fn claim_type(&self) -> &'static str {
        self.claim_type
    }

    /// Returns the required permission.
    pub fn permission(&self) -> &PermissionId {
        &self.permission
    }

    /// Evaluates the predicate against a context.
    pub fn is_satisfied_by(&self, ctx: &AuthContext) -> bool {
        ctx.has_permission(self.permission.as_str())
    }
}

// =============================================================================
// PolicyRegistry
// =============================================================================

/// One policy per catalog identifier, registered once at startup.
#[derive(Debug, Clone, Default)]
pub struct PolicyRegistry {
    policies: BTreeMap<PermissionId, Arc<Policy>>,
}

impl PolicyRegistry {
    /// Registers a policy for every identifier in the catalog.
    ///
    /// An empty catalog leaves every protected route without a policy and is
    /// rejected.
    pub fn from_catalog(catalog: &PermissionCatalog) -> AccessResult<Self> {
        if catalog.is_empty() {
            return Err(AccessError::configuration(
                "permission catalog is empty; no policies can be registered",
            ));
        }

        let policies: BTreeMap<_, _> = catalog
            .permissions()
            .iter()
            .map(|p| (p.clone(), Arc::new(Policy::for_permission(p.clone()))))
            .collect();

        info!(
            count = policies.len(),
            policies = ?policies.keys().map(PermissionId::as_str).collect::<Vec<_>>(),
            "Registered authorization policies"
        );

        Ok(Self { policies })
    }

    /// Returns the policy for a permission, if registered.
    pub fn get(&self, permission: &str) -> Option<&Arc<Policy>> {
        self.policies.get(permission)
    }

    /// Returns the policy for a permission or a configuration error.
    pub fn require(&self, permission: &str) -> AccessResult<Arc<Policy>> {
        self.get(permission).cloned().ok_or_else(|| {
            AccessError::configuration(format!(
                "no policy registered for permission '{}'",
                permission
            ))
        })
    }

    /// Returns the registered policy names in order.
    pub fn names(&self) -> Vec<&str> {
        self.policies.keys().map(PermissionId::as_str).collect()
    }

    /// Returns the number of registered policies.
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Claims;
    use hrms_core::{CatalogBuilder, OperationSpec};

    fn catalog() -> PermissionCatalog {
        CatalogBuilder::new()
            .operation(OperationSpec::read("things.list", "/things"))
            .operation(OperationSpec::create("things.create", "/things"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_one_policy_per_identifier() {
        let registry = PolicyRegistry::from_catalog(&catalog()).unwrap();

        assert_eq!(registry.names(), vec!["Create", "View"]);
        let policy = registry.require("View").unwrap();
        assert_eq!(policy.name(), "View");
        assert_eq!(policy.claim_type(), "permission");
    }

    #[test]
    fn test_empty_catalog_is_fatal() {
        let empty = CatalogBuilder::new().build().unwrap();
        let err = PolicyRegistry::from_catalog(&empty).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_missing_policy_is_configuration_error() {
        let registry = PolicyRegistry::from_catalog(&catalog()).unwrap();
        let err = registry.require("Delete").unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_policy_predicate() {
        let policy = Policy::for_permission("Create".into());

        let with = AuthContext::from_claims(&Claims::builder("a").add_permission("Create").build());
        let without = AuthContext::from_claims(&Claims::builder("b").add_permission("View").build());

        assert!(policy.is_satisfied_by(&with));
        assert!(!policy.is_satisfied_by(&without));
    }
}

// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Bootstrap seeder.
//!
//! Converges the store towards the [`SeedConfig`] on every start:
//!
//! 1. every baseline role exists
//! 2. every baseline role holds the grants its rule selects from the catalog
//! 3. the administrative principal exists and holds the admin role
//!
//! Only gaps are filled. Existing grants are never revoked. An existing
//! admin principal keeps its password and only regains a missing admin role. A `Conflict` from
//! the store means another seeder got there first and counts as done.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use hrms_core::{
    AccessError, AccessResult, NewPrincipal, PermissionCatalog, Principal, SeedConfig,
};

use crate::traits::StoreHandle;

/// What a seeding run changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    /// Roles created by this run.
    pub roles_created: Vec<String>,
    /// Grants added by this run.
    pub grants_added: usize,
    /// Whether this run created the admin principal.
    pub admin_created: bool,
    /// Whether this run put an existing admin principal back in its role.
    pub admin_role_restored: bool,
}

impl SeedReport {
    /// Returns `true` if the run changed nothing.
    pub fn is_noop(&self) -> bool {
        self.roles_created.is_empty()
            && self.grants_added == 0
            && !self.admin_created
            && !self.admin_role_restored
    }
}

/// Idempotent seeder for baseline roles, grants and the admin principal.
#[derive(Debug, Clone)]
pub struct BootstrapSeeder {
    store: StoreHandle,
    catalog: Arc<PermissionCatalog>,
}

impl BootstrapSeeder {
    /// Creates a seeder.
    pub fn new(store: StoreHandle, catalog: Arc<PermissionCatalog>) -> Self {
        Self { store, catalog }
    }

    /// Runs the seeder.
    pub async fn run(&self, config: &SeedConfig) -> AccessResult<SeedReport> {
        config.validate()?;
        let mut report = SeedReport::default();

        self.ensure_roles(config, &mut report).await?;
        self.ensure_grants(config, &mut report).await?;
        self.ensure_admin(config, &mut report).await?;

        info!(
            roles_created = report.roles_created.len(),
            grants_added = report.grants_added,
            admin_created = report.admin_created,
            admin_role_restored = report.admin_role_restored,
            "Bootstrap seeding complete"
        );
        Ok(report)
    }

    async fn ensure_roles(&self, config: &SeedConfig, report: &mut SeedReport) -> AccessResult<()> {
        for role in &config.roles {
            if self.store.roles.role_exists(&role.name).await? {
                continue;
            }
            match self.store.roles.create_role(&role.name).await {
                Ok(()) => {
                    info!(role = %role.name, "Baseline role created");
                    report.roles_created.push(role.name.clone());
                }
                Err(e) if e.is_conflict() => debug!(role = %role.name, "Role created concurrently"),
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    async fn ensure_grants(&self, config: &SeedConfig, report: &mut SeedReport) -> AccessResult<()> {
        for role in &config.roles {
            let wanted = role.rule.select(&self.catalog);
            let existing = self.store.roles.list_for_role(&role.name).await?;

            for permission in wanted.iter().filter(|p| !existing.contains(p.as_str())) {
                match self.store.roles.grant(&role.name, permission).await {
                    Ok(()) => {
                        debug!(role = %role.name, %permission, "Baseline grant added");
                        report.grants_added += 1;
                    }
                    Err(e) if e.is_conflict() => {}
                    Err(e) => return Err(e),
                }
            }
        }
        Ok(())
    }

    async fn ensure_admin(&self, config: &SeedConfig, report: &mut SeedReport) -> AccessResult<()> {
        let admin = &config.admin;

        if let Some(existing) = self.find_admin(config).await? {
            debug!(username = %existing.username, "Admin principal present");
            report.admin_role_restored = self.ensure_admin_role(&existing, &admin.role).await?;
            return Ok(());
        }

        let created = self
            .store
            .identities
            .create_principal(NewPrincipal {
                username: admin.username.clone(),
                email: admin.email.clone(),
                full_name: admin.full_name.clone(),
                password: admin.password.clone(),
            })
            .await;

        let principal = match created {
            Ok(principal) => principal,
            Err(e) if e.is_conflict() => {
                debug!(username = %admin.username, "Admin principal created concurrently");
                return match self.find_admin(config).await? {
                    Some(existing) => {
                        report.admin_role_restored =
                            self.ensure_admin_role(&existing, &admin.role).await?;
                        Ok(())
                    }
                    None => Err(e),
                };
            }
            Err(AccessError::Invalid { field, message }) => {
                return Err(AccessError::configuration(format!(
                    "seed admin {}: {}",
                    field, message
                )));
            }
            Err(e) => return Err(e),
        };

        self.ensure_admin_role(&principal, &admin.role).await?;

        info!(username = %principal.username, role = %admin.role, "Admin principal created");
        report.admin_created = true;
        Ok(())
    }

    async fn find_admin(&self, config: &SeedConfig) -> AccessResult<Option<Principal>> {
        let identities = &self.store.identities;
        match identities.find_by_login(&config.admin.email).await? {
            Some(principal) => Ok(Some(principal)),
            None => identities.find_by_login(&config.admin.username).await,
        }
    }

    /// Adds the admin role when missing. Never touches the password.
    /// Returns `true` if a membership was added.
    async fn ensure_admin_role(&self, principal: &Principal, role: &str) -> AccessResult<bool> {
        let identities = &self.store.identities;
        if identities.roles_of(&principal.id).await?.iter().any(|r| r == role) {
            return Ok(false);
        }

        match identities.add_to_role(&principal.id, role).await {
            Ok(()) => {
                warn!(username = %principal.username, role, "Admin principal lacked its role, restored");
                Ok(true)
            }
            Err(e) if e.is_conflict() => Ok(false),
            Err(e) => Err(e),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::password::{HashCost, PasswordHashing};
    use hrms_core::{CatalogBuilder, OperationSpec, PrincipalUpdate};

    fn catalog() -> Arc<PermissionCatalog> {
        Arc::new(
            CatalogBuilder::new()
                .operation(OperationSpec::read("a", "/a"))
                .operation(OperationSpec::create("b", "/b"))
                .operation(OperationSpec::update("c", "/c"))
                .operation(OperationSpec::delete("d", "/d"))
                .build()
                .unwrap(),
        )
    }

    fn seeder() -> BootstrapSeeder {
        let store = StoreHandle::new(Arc::new(MemoryStore::with_hashing(PasswordHashing::new(
            HashCost::Low,
        ))));
        BootstrapSeeder::new(store, catalog())
    }

    #[tokio::test]
    async fn test_seed_default_roles() {
        let seeder = seeder();
        let report = seeder.run(&SeedConfig::default()).await.unwrap();

        assert_eq!(report.roles_created, vec!["Admin", "User"]);
        assert_eq!(report.grants_added, 5);
        assert!(report.admin_created);

        let roles = &seeder.store.roles;
        assert_eq!(
            roles.list_for_role("Admin").await.unwrap().to_strings(),
            vec!["Create", "Delete", "Update", "View"]
        );
        assert_eq!(roles.list_for_role("User").await.unwrap().to_strings(), vec!["View"]);

        let admin = seeder
            .store
            .identities
            .verify_password("admin@example.com", "Admin@123")
            .await
            .unwrap();
        assert_eq!(
            seeder.store.identities.roles_of(&admin.id).await.unwrap(),
            vec!["Admin"]
        );
    }

    #[tokio::test]
    async fn test_reseed_is_idempotent() {
        let seeder = seeder();
        let config = SeedConfig::default();
        seeder.run(&config).await.unwrap();
        let count = seeder.store.roles.grant_count().await.unwrap();

        let second = seeder.run(&config).await.unwrap();
        assert!(second.is_noop());
        assert_eq!(seeder.store.roles.grant_count().await.unwrap(), count);
    }

    #[tokio::test]
    async fn test_reseed_keeps_changed_admin_password() {
        let seeder = seeder();
        let config = SeedConfig::default();
        seeder.run(&config).await.unwrap();

        let identities = &seeder.store.identities;
        let admin = identities.find_by_login("admin").await.unwrap().unwrap();
        identities
            .update_principal(
                &admin.id,
                PrincipalUpdate {
                    current_password: Some("Admin@123".to_string()),
                    new_password: Some("Changed@456".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        seeder.run(&config).await.unwrap();
        assert!(identities.verify_password("admin", "Changed@456").await.is_ok());
        assert!(identities.verify_password("admin", "Admin@123").await.is_err());
    }

    #[tokio::test]
    async fn test_reseed_restores_missing_admin_role() {
        let seeder = seeder();
        let config = SeedConfig::default();
        seeder.run(&config).await.unwrap();

        let identities = &seeder.store.identities;
        let admin = identities.find_by_login("admin").await.unwrap().unwrap();
        identities.remove_from_role(&admin.id, "Admin").await.unwrap();

        let report = seeder.run(&config).await.unwrap();
        assert!(report.admin_role_restored);
        assert!(!report.admin_created);
        assert!(!report.is_noop());
        assert_eq!(identities.roles_of(&admin.id).await.unwrap(), vec!["Admin"]);

        assert!(seeder.run(&config).await.unwrap().is_noop());
    }

    #[tokio::test]
    async fn test_reseed_never_revokes() {
        let seeder = seeder();
        let config = SeedConfig::default();
        seeder.run(&config).await.unwrap();
        seeder.store.roles.grant("User", &"Create".into()).await.unwrap();

        seeder.run(&config).await.unwrap();
        assert_eq!(
            seeder.store.roles.list_for_role("User").await.unwrap().to_strings(),
            vec!["Create", "View"]
        );
    }

    #[tokio::test]
    async fn test_concurrent_seeds_converge() {
        let seeder = seeder();
        let config = SeedConfig::default();
        let (a, b) = tokio::join!(seeder.run(&config), seeder.run(&config));
        a.unwrap();
        b.unwrap();

        assert_eq!(seeder.store.roles.grant_count().await.unwrap(), 5);
        assert_eq!(seeder.store.identities.list_principals().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_seed_is_configuration_error() {
        let seeder = seeder();
        let mut config = SeedConfig::default();
        config.admin.role = "Nobody".to_string();
        assert!(seeder.run(&config).await.unwrap_err().is_fatal());
    }
}

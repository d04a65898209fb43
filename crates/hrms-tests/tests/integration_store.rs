// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Store Integration Tests
//!
//! Grant administration and bootstrap seeding against both backends.
//!
//! - `test_grants_*`: grant and revoke semantics
//! - `test_seed_*`: bootstrap seeding
//! - `test_identity_*`: principals and memberships

use hrms_core::{
    AccessError, BaselineRole, GrantRule, NewPrincipal, PermissionId, PrincipalUpdate, ResourceKind,
    SeedConfig,
};
use hrms_store::{BootstrapSeeder, RoleClaim, RoleGrants, StoreHandle};
use hrms_tests::prelude::*;

/// Runs `check` against a fresh in-memory store and a fresh SQLite file.
macro_rules! on_both_backends {
    ($check:ident) => {{
        $check(StoreFixtures::memory()).await;
        let dir = hrms_tests::common::temp_test_dir("hrms-store-");
        $check(StoreFixtures::sqlite(&dir.path().join("hrms.db"))).await;
    }};
}

async fn user_role(store: &StoreHandle) -> RoleGrants {
    store.roles.create_role("User").await.unwrap();
    RoleGrants::new(store.roles.clone(), CatalogFixtures::verbs())
}

// =============================================================================
// Grants
// =============================================================================

async fn double_grant_is_conflict(store: StoreHandle) {
    let grants = user_role(&store).await;

    grants.grant("User", "View").await.unwrap();
    let err = grants.grant("User", "View").await.unwrap_err();

    assert!(matches!(err, AccessError::Conflict { kind: ResourceKind::Grant, .. }));
    assert!(err.to_string().contains("User/View"));
    assert_eq!(store.roles.grant_count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_grants_double_grant_is_conflict() {
    on_both_backends!(double_grant_is_conflict);
}

async fn revoke_absent_is_not_found(store: StoreHandle) {
    let grants = user_role(&store).await;
    grants.grant("User", "View").await.unwrap();

    let err = grants.revoke("User", "Delete").await.unwrap_err();

    assert!(matches!(err, AccessError::NotFound { kind: ResourceKind::Grant, .. }));
    assert_eq!(store.roles.grant_count().await.unwrap(), 1);
    assert_eq!(
        grants.list_for_role("User").await.unwrap().to_strings(),
        vec!["View"]
    );
}

#[tokio::test]
async fn test_grants_revoke_absent_leaves_store_unchanged() {
    on_both_backends!(revoke_absent_is_not_found);
}

async fn grant_outside_catalog_is_rejected(store: StoreHandle) {
    let grants = user_role(&store).await;

    let err = grants.grant("User", "Approve").await.unwrap_err();

    assert!(matches!(err, AccessError::NotFound { kind: ResourceKind::Permission, .. }));
    assert_eq!(store.roles.grant_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_grants_identifier_outside_catalog_is_rejected() {
    on_both_backends!(grant_outside_catalog_is_rejected);
}

async fn grant_to_missing_role_is_not_found(store: StoreHandle) {
    let grants = RoleGrants::new(store.roles.clone(), CatalogFixtures::verbs());

    let err = grants.grant("Ghost", "View").await.unwrap_err();

    assert!(matches!(err, AccessError::NotFound { kind: ResourceKind::Role, .. }));
}

#[tokio::test]
async fn test_grants_missing_role_is_not_found() {
    on_both_backends!(grant_to_missing_role_is_not_found);
}

async fn grant_syncs_role_claims(store: StoreHandle) {
    let grants = user_role(&store).await;

    grants.grant("User", "View").await.unwrap();
    grants.grant("User", "Update").await.unwrap();
    assert_eq!(
        store.identities.role_claims("User").await.unwrap(),
        vec![RoleClaim::permission("Update"), RoleClaim::permission("View")]
    );

    grants.revoke("User", "Update").await.unwrap();
    assert_eq!(
        store.identities.role_claims("User").await.unwrap(),
        vec![RoleClaim::permission("View")]
    );
}

#[tokio::test]
async fn test_grants_keep_role_claims_in_sync() {
    on_both_backends!(grant_syncs_role_claims);
}

async fn permissions_union_ignores_role_order(store: StoreHandle) {
    for role in ["Clerk", "Auditor"] {
        store.roles.create_role(role).await.unwrap();
    }
    store.roles.grant("Clerk", &PermissionId::new("Create")).await.unwrap();
    store.roles.grant("Clerk", &PermissionId::new("View")).await.unwrap();
    store.roles.grant("Auditor", &PermissionId::new("View")).await.unwrap();

    let forward = store
        .roles
        .permissions_for_roles(&["Clerk".to_string(), "Auditor".to_string()])
        .await
        .unwrap();
    let reverse = store
        .roles
        .permissions_for_roles(&["Auditor".to_string(), "Clerk".to_string()])
        .await
        .unwrap();

    assert_eq!(forward, reverse);
    assert_eq!(forward.to_strings(), vec!["Create", "View"]);
}

#[tokio::test]
async fn test_grants_union_is_independent_of_role_order() {
    on_both_backends!(permissions_union_ignores_role_order);
}

// =============================================================================
// Seeding
// =============================================================================

async fn seed_admin_and_user(store: StoreHandle) {
    let seeder = BootstrapSeeder::new(store.clone(), CatalogFixtures::verbs());
    let report = seeder.run(&SeedConfig::default()).await.unwrap();

    assert!(report.admin_created);
    assert_eq!(
        store.roles.list_for_role("Admin").await.unwrap().to_strings(),
        vec!["Create", "Delete", "Update", "View"]
    );
    assert_eq!(
        store.roles.list_for_role("User").await.unwrap().to_strings(),
        vec!["View"]
    );

    let admin = store
        .identities
        .find_by_login(ADMIN_LOGIN)
        .await
        .unwrap()
        .expect("admin exists");
    assert_eq!(store.identities.roles_of(&admin.id).await.unwrap(), vec!["Admin"]);
}

#[tokio::test]
async fn test_seed_admin_all_user_view() {
    on_both_backends!(seed_admin_and_user);
}

async fn reseed_is_idempotent(store: StoreHandle) {
    let seeder = BootstrapSeeder::new(store.clone(), CatalogFixtures::verbs());

    seeder.run(&SeedConfig::default()).await.unwrap();
    let first = store.roles.grant_count().await.unwrap();

    let report = seeder.run(&SeedConfig::default()).await.unwrap();
    let second = store.roles.grant_count().await.unwrap();

    assert_eq!(first, 5);
    assert_eq!(first, second);
    assert!(report.is_noop());
    assert_eq!(store.identities.list_principals().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_seed_twice_yields_identical_grants() {
    on_both_backends!(reseed_is_idempotent);
}

async fn reseed_never_revokes(store: StoreHandle) {
    let seeder = BootstrapSeeder::new(store.clone(), CatalogFixtures::verbs());
    seeder.run(&SeedConfig::default()).await.unwrap();

    store.roles.grant("User", &PermissionId::new("Update")).await.unwrap();
    store.roles.revoke("Admin", "Delete").await.unwrap();

    let report = seeder.run(&SeedConfig::default()).await.unwrap();

    assert_eq!(report.grants_added, 1);
    assert_eq!(
        store.roles.list_for_role("User").await.unwrap().to_strings(),
        vec!["Update", "View"]
    );
    assert!(store.roles.list_for_role("Admin").await.unwrap().contains("Delete"));
}

#[tokio::test]
async fn test_seed_fills_gaps_without_revoking() {
    on_both_backends!(reseed_never_revokes);
}

async fn seed_except_rule(store: StoreHandle) {
    let config = SeedConfig {
        roles: vec![
            BaselineRole::new("Admin", GrantRule::All),
            BaselineRole::new("User", GrantRule::Only(vec![PermissionId::new("View")])),
            BaselineRole::new("Manager", GrantRule::Except(vec![PermissionId::new("Delete")])),
        ],
        ..SeedConfig::default()
    };

    let seeder = BootstrapSeeder::new(store.clone(), CatalogFixtures::verbs());
    let report = seeder.run(&config).await.unwrap();

    assert_eq!(report.roles_created, vec!["Admin", "User", "Manager"]);
    assert_eq!(
        store.roles.list_for_role("Manager").await.unwrap().to_strings(),
        vec!["Create", "Update", "View"]
    );
}

#[tokio::test]
async fn test_seed_except_rule() {
    on_both_backends!(seed_except_rule);
}

async fn existing_admin_untouched(store: StoreHandle) {
    let seeder = BootstrapSeeder::new(store.clone(), CatalogFixtures::verbs());
    seeder.run(&SeedConfig::default()).await.unwrap();

    let admin = store.identities.find_by_login(ADMIN_LOGIN).await.unwrap().unwrap();
    let update = PrincipalUpdate {
        current_password: Some(ADMIN_PASSWORD.to_string()),
        new_password: Some("Rotated#789".to_string()),
        ..Default::default()
    };
    store.identities.update_principal(&admin.id, update).await.unwrap();

    let report = seeder.run(&SeedConfig::default()).await.unwrap();

    assert!(!report.admin_created);
    assert!(store.identities.verify_password(ADMIN_LOGIN, "Rotated#789").await.is_ok());
    assert!(matches!(
        store.identities.verify_password(ADMIN_LOGIN, ADMIN_PASSWORD).await,
        Err(AccessError::AuthenticationFailed)
    ));
}

#[tokio::test]
async fn test_seed_leaves_existing_admin_untouched() {
    on_both_backends!(existing_admin_untouched);
}

async fn admin_without_role_is_repaired(store: StoreHandle) {
    let seeder = BootstrapSeeder::new(store.clone(), CatalogFixtures::verbs());
    let config = SeedConfig::default();
    let admin = store
        .identities
        .create_principal(NewPrincipal {
            username: config.admin.username.clone(),
            email: config.admin.email.clone(),
            full_name: config.admin.full_name.clone(),
            password: "Interrupted#1".to_string(),
        })
        .await
        .unwrap();

    let report = seeder.run(&config).await.unwrap();

    assert!(!report.admin_created);
    assert!(report.admin_role_restored);
    assert_eq!(store.identities.roles_of(&admin.id).await.unwrap(), vec!["Admin"]);
    assert!(store.identities.verify_password(ADMIN_LOGIN, "Interrupted#1").await.is_ok());
    assert!(seeder.run(&config).await.unwrap().is_noop());
}

#[tokio::test]
async fn test_seed_repairs_admin_missing_its_role() {
    on_both_backends!(admin_without_role_is_repaired);
}

// =============================================================================
// Identities
// =============================================================================

async fn delete_role_cascades(store: StoreHandle) {
    let grants = user_role(&store).await;
    grants.grant("User", "View").await.unwrap();

    let alice = store
        .identities
        .create_principal(PrincipalFixtures::named("alice"))
        .await
        .unwrap();
    store.identities.add_to_role(&alice.id, "User").await.unwrap();

    store.roles.delete_role("User").await.unwrap();

    assert!(!store.roles.role_exists("User").await.unwrap());
    assert_eq!(store.roles.grant_count().await.unwrap(), 0);
    assert!(store.identities.roles_of(&alice.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_identity_role_deletion_cascades() {
    on_both_backends!(delete_role_cascades);
}

async fn duplicate_membership_is_conflict(store: StoreHandle) {
    store.roles.create_role("User").await.unwrap();
    let bob = store
        .identities
        .create_principal(PrincipalFixtures::named("bob"))
        .await
        .unwrap();

    store.identities.add_to_role(&bob.id, "User").await.unwrap();
    let err = store.identities.add_to_role(&bob.id, "User").await.unwrap_err();

    assert!(err.is_conflict());
    let members: Vec<String> = store
        .identities
        .users_in_role("User")
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(members, vec![bob.id]);
}

#[tokio::test]
async fn test_identity_duplicate_membership_is_conflict() {
    on_both_backends!(duplicate_membership_is_conflict);
}

async fn login_is_case_insensitive(store: StoreHandle) {
    store
        .identities
        .create_principal(PrincipalFixtures::named("carol"))
        .await
        .unwrap();

    let principal = store
        .identities
        .verify_password("CAROL@Example.com", USER_PASSWORD)
        .await
        .unwrap();
    assert_eq!(principal.username, "carol");

    let err = store
        .identities
        .create_principal(PrincipalFixtures::named("Carol"))
        .await
        .unwrap_err();
    assert!(err.is_conflict());
}

#[tokio::test]
async fn test_identity_logins_are_case_insensitive() {
    on_both_backends!(login_is_case_insensitive);
}

fn principal(username: &str, email: &str) -> NewPrincipal {
    NewPrincipal {
        username: username.to_string(),
        email: email.to_string(),
        full_name: format!("{} Tester", username),
        password: USER_PASSWORD.to_string(),
    }
}

async fn username_and_email_share_login_namespace(store: StoreHandle) {
    let identities = &store.identities;
    let squatter = identities
        .create_principal(principal("carol@corp.com", "mallory@evil.com"))
        .await
        .unwrap();

    let err = identities
        .create_principal(principal("carol", "CAROL@corp.com"))
        .await
        .unwrap_err();
    assert!(err.is_conflict());

    let err = identities
        .create_principal(principal("mallory@evil.com", "other@example.com"))
        .await
        .unwrap_err();
    assert!(err.is_conflict());

    identities
        .create_principal(principal("dave", "dave@corp.com"))
        .await
        .unwrap();
    let rename = PrincipalUpdate {
        username: Some("Dave@corp.com".to_string()),
        ..Default::default()
    };
    assert!(identities
        .update_principal(&squatter.id, rename)
        .await
        .unwrap_err()
        .is_conflict());

    let owner = identities.verify_password("dave@corp.com", USER_PASSWORD).await.unwrap();
    assert_eq!(owner.username, "dave");
    assert_eq!(identities.list_principals().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_identity_username_cannot_shadow_email() {
    on_both_backends!(username_and_email_share_login_namespace);
}

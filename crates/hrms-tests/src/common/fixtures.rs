// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Fixtures
//!
//! Pre-built test data for consistent and reproducible testing.

use std::path::Path;
use std::sync::Arc;

use hrms_api::{ApiConfig, JwtConfig, JwtManager};
use hrms_core::{CatalogBuilder, NewPrincipal, OperationSpec, PermissionCatalog, SeedConfig};
use hrms_store::{HashCost, MemoryStore, PasswordHashing, SqliteStore, StoreHandle};

/// Signing secret shared by every fixture.
pub const TEST_SECRET: &str = "test-secret-key-for-jwt-signing-must-be-at-least-32-chars";

/// Login of the seeded admin principal.
pub const ADMIN_LOGIN: &str = "admin@example.com";

/// Password of the seeded admin principal.
pub const ADMIN_PASSWORD: &str = "Admin@123";

/// Password used for fixture principals.
pub const USER_PASSWORD: &str = "Secret#456";

// =============================================================================
// Config Fixtures
// =============================================================================

/// Fixture providing API and signing configurations.
pub struct ConfigFixtures;

impl ConfigFixtures {
    /// Signing configuration with [`TEST_SECRET`].
    pub fn jwt() -> JwtConfig {
        JwtConfig::new(TEST_SECRET)
    }

    /// A signer over [`ConfigFixtures::jwt`].
    pub fn jwt_manager() -> Arc<JwtManager> {
        Arc::new(JwtManager::new(Self::jwt()).expect("valid JWT config"))
    }

    /// API configuration with the test signer.
    pub fn api() -> ApiConfig {
        ApiConfig::default().with_jwt(Self::jwt())
    }

    /// The default baseline: `Admin` holds everything, `User` holds `View`.
    pub fn seed() -> SeedConfig {
        SeedConfig::default()
    }
}

// =============================================================================
// Store Fixtures
// =============================================================================

/// Fixture providing store backends with cheap password hashing.
pub struct StoreFixtures;

impl StoreFixtures {
    /// An in-memory store.
    pub fn memory() -> StoreHandle {
        StoreHandle::new(Arc::new(MemoryStore::with_hashing(PasswordHashing::new(
            HashCost::Low,
        ))))
    }

    /// A SQLite store in the given file.
    pub fn sqlite(path: &Path) -> StoreHandle {
        let store = SqliteStore::open(path, PasswordHashing::new(HashCost::Low))
            .expect("Failed to open SQLite store");
        StoreHandle::new(Arc::new(store))
    }
}

// =============================================================================
// Catalog Fixtures
// =============================================================================

/// Fixture providing permission catalogs.
pub struct CatalogFixtures;

impl CatalogFixtures {
    /// Operations covering the four invocation kinds.
    pub fn verb_operations() -> Vec<OperationSpec> {
        vec![
            OperationSpec::read("employees.list", "/api/employees"),
            OperationSpec::create("employees.create", "/api/employees"),
            OperationSpec::update("employees.update", "/api/employees/{id}"),
            OperationSpec::delete("employees.delete", "/api/employees/{id}"),
        ]
    }

    /// Catalog over [`CatalogFixtures::verb_operations`]:
    /// `{View, Create, Update, Delete}`.
    pub fn verbs() -> Arc<PermissionCatalog> {
        Arc::new(
            CatalogBuilder::new()
                .operations(Self::verb_operations())
                .build()
                .expect("valid catalog"),
        )
    }

    /// The catalog derived from the API route table.
    pub fn routes() -> Arc<PermissionCatalog> {
        Arc::new(hrms_api::build_catalog().expect("valid route catalog"))
    }
}

// =============================================================================
// Principal Fixtures
// =============================================================================

/// Fixture providing principal inputs.
pub struct PrincipalFixtures;

impl PrincipalFixtures {
    /// A principal named after `username`, with [`USER_PASSWORD`].
    pub fn named(username: &str) -> NewPrincipal {
        NewPrincipal {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            full_name: format!("{} Tester", username),
            password: USER_PASSWORD.to_string(),
        }
    }

    /// Registration body for `username`.
    pub fn registration(username: &str) -> serde_json::Value {
        serde_json::json!({
            "full_name": format!("{} Tester", username),
            "username": username,
            "email": format!("{}@example.com", username),
            "password": USER_PASSWORD,
        })
    }
}

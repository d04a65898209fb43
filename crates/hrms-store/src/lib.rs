// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # hrms-store
//!
//! Persistence for the HRMS access-control engine.
//!
//! - [`traits`]: the [`RolePermissionStore`] and [`IdentityStore`] contracts
//! - [`memory`]: in-memory backend for tests and development
//! - [`sqlite`]: durable SQLite backend
//! - [`grants`]: catalog-checked grant administration
//! - [`seed`]: the idempotent bootstrap seeder
//!
//! Both backends implement both traits on one object so that a grant or
//! revoke updates the grant row and the matching role claim atomically.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod grants;
pub mod memory;
pub mod password;
pub mod seed;
pub mod sqlite;
pub mod traits;

pub use error::StoreError;
pub use grants::RoleGrants;
pub use memory::MemoryStore;
pub use password::{HashCost, PasswordHashing};
pub use seed::{BootstrapSeeder, SeedReport};
pub use sqlite::SqliteStore;
pub use traits::{
    open_store, IdentityStore, RoleClaim, RolePermissionStore, StoreBackend, StoreConfig,
    StoreHandle,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

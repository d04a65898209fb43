// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # hrms-core
//!
//! Core types of the HRMS access-control engine.
//!
//! This crate owns everything that does not depend on a transport or a
//! storage backend:
//!
//! - [`catalog`]: protected operation declarations and the catalog builder
//!   that derives permission identifiers from them
//! - [`permission`]: permission identifiers and permission sets
//! - [`rules`]: baseline roles, their grant rules and the admin seed
//! - [`principal`]: principal (user) records and their input shapes
//! - [`error`]: the access-control error taxonomy
//!
//! ## Data Flow
//!
//! ```text
//! OperationSpec[] ──► CatalogBuilder ──► PermissionCatalog
//!                                            │
//!                     ┌──────────────────────┼────────────────────┐
//!                     ▼                      ▼                    ▼
//!              PolicyRegistry         BootstrapSeeder        RoleGrants
//!               (hrms-api)             (hrms-store)         (hrms-store)
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod permission;
pub mod principal;
pub mod rules;

pub use catalog::{CatalogBuilder, InvocationKind, KindMapping, OperationSpec, PermissionCatalog};
pub use error::{AccessError, AccessResult, ResourceKind};
pub use permission::{PermissionId, PermissionSet};
pub use principal::{NewPrincipal, Principal, PrincipalUpdate};
pub use rules::{AdminSeed, BaselineRole, GrantRule, SeedConfig, ADMIN_ROLE, USER_ROLE};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Claim type under which permissions are stored on roles and credentials.
pub const PERMISSION_CLAIM: &str = "permission";

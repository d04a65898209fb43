// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # HRMS Integration Tests
//!
//! Integration tests for the HRMS access-control engine, with the fixtures
//! and harness they share.
//!
//! ## Module Structure
//!
//! - [`common`]: Shared test utilities
//!   - `fixtures`: Pre-built configurations, principals and catalogs
//!   - `assertions`: Assertions on HTTP responses
//!   - `harness`: A seeded application served through `oneshot`
//!
//! ## Running Tests
//!
//! ```bash
//! # Run all integration tests
//! cargo test -p hrms-tests
//!
//! # Run a specific suite
//! cargo test -p hrms-tests --test integration_catalog
//! cargo test -p hrms-tests --test integration_store
//! cargo test -p hrms-tests --test integration_auth
//! cargo test -p hrms-tests --test integration_api
//! cargo test -p hrms-tests --test integration_config
//! ```
//!
//! ## Test Categories
//!
//! ### Catalog Tests (`integration_catalog.rs`)
//! - Determinism across builds and declaration order
//! - Unclassified operations
//!
//! ### Store Tests (`integration_store.rs`)
//! - Grant and revoke semantics on both backends
//! - Bootstrap seeding and reseeding
//!
//! ### Auth Tests (`integration_auth.rs`)
//! - Credential issuance from role grants
//! - Policy evaluation and snapshot trust
//!
//! ### API Tests (`integration_api.rs`)
//! - Registration, login and the current principal
//! - Permission enforcement on administrative routes
//!
//! ### Config Tests (`integration_config.rs`)
//! - Loading, env overrides and validation
//!
//! ## Using the Harness
//!
//! ```rust,ignore
//! use hrms_tests::prelude::*;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let app = TestApp::new().await;
//!     let token = app.admin_token().await;
//!     let response = app.get("/api/roles", Some(&token)).await;
//!     response.assert_status(StatusCode::OK);
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod common;

/// Re-export commonly used items for convenience.
pub mod prelude {
    pub use crate::common::assertions::*;
    pub use crate::common::fixtures::*;
    pub use crate::common::harness::*;
    pub use axum::http::StatusCode;
}

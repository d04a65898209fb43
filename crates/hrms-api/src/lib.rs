// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # hrms-api
//!
//! HTTP surface of the HRMS backend.
//!
//! This crate provides credential issuance, the policy registry built from the
//! permission catalog, request authorization middleware and the administrative
//! handlers. Every route is declared once in [`routes::ROUTES`]; the catalog
//! and the router are both derived from that table.
//!
//! ```text
//! Authorization: Bearer <jwt>
//!        │
//!        ▼
//! ┌────────────┐  401   ┌──────────────────┐  403   ┌─────────┐
//! │ AuthLayer  │──────▶ │ PermissionLayer  │──────▶ │ handler │
//! └────────────┘        └──────────────────┘        └─────────┘
//!   signature/expiry      claim ∈ credential
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use auth::{
    AuthContext, AuthorizationDecision, Claims, CredentialIssuer, IssuedCredential, JwtConfig,
    JwtManager, Policy, PolicyRegistry, RequestAuthorizer,
};
pub use config::{ApiConfig, CorsConfig};
pub use error::{ApiError, ApiResult};
pub use routes::{build_catalog, Access, Route, ROUTES};
pub use server::ApiServer;
pub use state::AppState;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication and authorization module.
//!
//! This module provides:
//! - JWT credential signing and validation
//! - Credential issuance from stored grants
//! - The policy registry built from the permission catalog
//! - Per-request authorization decisions

mod authorizer;
mod claims;
mod context;
mod issuer;
mod jwt;
mod policy;

pub use authorizer::{AuthorizationDecision, RequestAuthorizer};
pub use claims::{Claims, ClaimsBuilder};
pub use context::AuthContext;
pub use issuer::{CredentialIssuer, IssuedCredential};
pub use jwt::{JwtConfig, JwtManager};
pub use policy::{Policy, PolicyRegistry};

// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Middleware implementations for the API server.
//!
//! - [`AuthLayer`]: credential validation, applied to the whole router
//! - [`PermissionLayer`]: per-route policy enforcement

mod auth;
mod permission;

pub use auth::{AuthLayer, AuthMiddleware};
pub use permission::{PermissionLayer, PermissionMiddleware};

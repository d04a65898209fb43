// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The route table.
//!
//! Every operation the service exposes is declared once in [`ROUTES`]. The
//! permission catalog is derived from the protected entries and the router
//! is assembled from all of them, so a route cannot exist without its
//! declaration.

use axum::routing::{on, MethodFilter, MethodRouter};
use axum::Router;
use hrms_core::{AccessResult, CatalogBuilder, OperationSpec, PermissionCatalog};
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::handlers;
use crate::middleware::PermissionLayer;
use crate::state::AppState;

// =============================================================================
// Route Table
// =============================================================================

/// How a route is guarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// No credential needed.
    Public,
    /// Any valid credential.
    Authenticated,
    /// A valid credential carrying the permission mapped from the
    /// operation's invocation kind.
    Protected,
}

/// One entry of the route table.
#[derive(Debug, Clone, Copy)]
pub struct Route {
    /// Guard.
    pub access: Access,
    /// Operation declaration.
    pub spec: OperationSpec,
}

impl Route {
    const fn public(spec: OperationSpec) -> Self {
        Self {
            access: Access::Public,
            spec,
        }
    }

    const fn authenticated(spec: OperationSpec) -> Self {
        Self {
            access: Access::Authenticated,
            spec,
        }
    }

    const fn protected(spec: OperationSpec) -> Self {
        Self {
            access: Access::Protected,
            spec,
        }
    }
}

/// Every route served by the API.
pub const ROUTES: &[Route] = &[
    // Health
    Route::public(OperationSpec::unclassified("health", "GET", "/health")),
    // Authentication
    Route::public(OperationSpec::unclassified("auth.login", "POST", "/api/auth/login")),
    Route::public(OperationSpec::unclassified("auth.register", "POST", "/api/auth/register")),
    Route::authenticated(OperationSpec::unclassified("auth.me", "GET", "/api/auth/me")),
    // Permissions
    Route::protected(OperationSpec::read("permissions.list", "/api/permissions")),
    Route::protected(OperationSpec::read("permissions.catalog", "/api/permissions/catalog")),
    Route::protected(OperationSpec::read("permissions.for_role", "/api/permissions/roles/{role}")),
    Route::protected(OperationSpec::create("permissions.grant", "/api/permissions/grants")),
    Route::protected(OperationSpec::delete("permissions.revoke", "/api/permissions/grants")),
    // Roles
    Route::protected(OperationSpec::read("roles.list", "/api/roles")),
    Route::protected(OperationSpec::create("roles.create", "/api/roles")),
    Route::protected(OperationSpec::delete("roles.delete", "/api/roles/{role}")),
    Route::protected(OperationSpec::read("roles.users", "/api/roles/{role}/users")),
    Route::protected(OperationSpec::create("roles.assign", "/api/roles/assignments")),
    Route::protected(OperationSpec::delete("roles.unassign", "/api/roles/assignments")),
    // Users
    Route::protected(OperationSpec::read("users.list", "/api/users")),
    Route::protected(OperationSpec::read("users.get", "/api/users/{id}")),
    Route::protected(OperationSpec::create("users.create", "/api/users")),
    Route::protected(OperationSpec::update("users.update", "/api/users/{id}")),
    Route::protected(OperationSpec::delete("users.delete", "/api/users/{id}")),
];

/// Returns the operations that require a permission.
pub fn protected_operations() -> impl Iterator<Item = OperationSpec> {
    ROUTES
        .iter()
        .filter(|r| r.access == Access::Protected)
        .map(|r| r.spec)
}

/// Returns the paths served without a credential.
pub fn public_paths() -> Vec<&'static str> {
    ROUTES
        .iter()
        .filter(|r| r.access == Access::Public)
        .map(|r| r.spec.path)
        .collect()
}

/// Builds the permission catalog from the protected routes.
pub fn build_catalog() -> AccessResult<PermissionCatalog> {
    CatalogBuilder::new()
        .operations(protected_operations())
        .build()
}

// =============================================================================
// Router Assembly
// =============================================================================

/// Assembles the router from [`ROUTES`].
///
/// Each protected route gets a [`PermissionLayer`] for the policy of its
/// required permission. A protected operation without an invocation kind,
/// one missing from the catalog, or a requirement without a registered
/// policy fails with a configuration error.
pub fn router(state: &AppState) -> ApiResult<Router<AppState>> {
    router_from(ROUTES, state)
}

fn router_from(routes: &[Route], state: &AppState) -> ApiResult<Router<AppState>> {
    let mut router = Router::new();

    for route in routes {
        let spec = &route.spec;
        let mut method_router = method_router(spec)?;

        if route.access == Access::Protected {
            if !spec.is_classified() {
                return Err(ApiError::configuration(format!(
                    "protected operation '{}' declares no invocation kind",
                    spec.name
                )));
            }
            let permission = state.catalog.requirement(spec.name).ok_or_else(|| {
                ApiError::configuration(format!(
                    "operation '{}' is missing from the permission catalog",
                    spec.name
                ))
            })?;
            let policy = state.policies.require(permission.as_str())?;
            debug!(operation = spec.name, policy = policy.name(), "Route protected");
            method_router =
                method_router.route_layer(PermissionLayer::new(state.authorizer.clone(), policy));
        }

        router = router.route(spec.path, method_router);
    }

    Ok(router)
}

fn method_filter(spec: &OperationSpec) -> ApiResult<MethodFilter> {
    match spec.method {
        "GET" => Ok(MethodFilter::GET),
        "POST" => Ok(MethodFilter::POST),
        "PUT" => Ok(MethodFilter::PUT),
        "PATCH" => Ok(MethodFilter::PATCH),
        "DELETE" => Ok(MethodFilter::DELETE),
        other => Err(ApiError::configuration(format!(
            "operation '{}' uses unsupported method '{}'",
            spec.name, other
        ))),
    }
}

fn method_router(spec: &OperationSpec) -> ApiResult<MethodRouter<AppState>> {
    let filter = method_filter(spec)?;

    let router = match spec.name {
        "health" => on(filter, handlers::health::health),
        "auth.login" => on(filter, handlers::auth::login),
        "auth.register" => on(filter, handlers::auth::register),
        "auth.me" => on(filter, handlers::auth::me),
        "permissions.list" => on(filter, handlers::permissions::list_all),
        "permissions.catalog" => on(filter, handlers::permissions::catalog),
        "permissions.for_role" => on(filter, handlers::permissions::list_for_role),
        "permissions.grant" => on(filter, handlers::permissions::grant),
        "permissions.revoke" => on(filter, handlers::permissions::revoke),
        "roles.list" => on(filter, handlers::roles::list_roles),
        "roles.create" => on(filter, handlers::roles::create_role),
        "roles.delete" => on(filter, handlers::roles::delete_role),
        "roles.users" => on(filter, handlers::roles::users_in_role),
        "roles.assign" => on(filter, handlers::roles::assign),
        "roles.unassign" => on(filter, handlers::roles::unassign),
        "users.list" => on(filter, handlers::users::list_users),
        "users.get" => on(filter, handlers::users::get_user),
        "users.create" => on(filter, handlers::users::create_user),
        "users.update" => on(filter, handlers::users::update_user),
        "users.delete" => on(filter, handlers::users::delete_user),
        other => {
            return Err(ApiError::configuration(format!(
                "no handler for operation '{}'",
                other
            )))
        }
    };

    Ok(router)
}

// =============================================================================
// Tests
// =============================================================================

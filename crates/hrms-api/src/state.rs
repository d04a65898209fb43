// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Application state shared across handlers.

use std::sync::Arc;

use hrms_core::{PermissionCatalog, USER_ROLE};
use hrms_store::{RoleGrants, StoreHandle};

use crate::auth::{CredentialIssuer, JwtManager, PolicyRegistry, RequestAuthorizer};
use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};

// =============================================================================
// AppState
// =============================================================================

/// Application state shared across all handlers.
///
/// The catalog and policy registry are built once and only read afterwards.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: Arc<ApiConfig>,
    /// JWT manager for token operations.
    pub jwt_manager: Arc<JwtManager>,
    /// Derived permission catalog.
    pub catalog: Arc<PermissionCatalog>,
    /// One policy per catalog identifier.
    pub policies: Arc<PolicyRegistry>,
    /// Request authorizer shared by the middleware.
    pub authorizer: Arc<RequestAuthorizer>,
    /// Store views.
    pub store: StoreHandle,
    /// Catalog-checked grant administration.
    pub grants: RoleGrants,
    /// Credential issuer.
    pub issuer: CredentialIssuer,
    /// Role assigned to self-registered principals.
    pub default_role: Arc<str>,
}

impl AppState {
    /// Creates a new app state builder.
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::new()
    }

    /// Returns the JWT manager.
    pub fn jwt(&self) -> &JwtManager {
        &self.jwt_manager
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("jwt", &self.jwt_manager)
            .field("permissions", &self.catalog.len())
            .field("policies", &self.policies.len())
            .field("default_role", &self.default_role)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// AppStateBuilder
// =============================================================================

/// Builder for constructing AppState.
#[derive(Default)]
pub struct AppStateBuilder {
    config: Option<ApiConfig>,
    catalog: Option<Arc<PermissionCatalog>>,
    store: Option<StoreHandle>,
    default_role: Option<String>,
}

impl AppStateBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the catalog. Defaults to the one derived from the route table.
    pub fn catalog(mut self, catalog: Arc<PermissionCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Sets the store.
    pub fn store(mut self, store: StoreHandle) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the role assigned on registration.
    pub fn default_role(mut self, role: impl Into<String>) -> Self {
        self.default_role = Some(role.into());
        self
    }

    /// Builds the AppState.
    ///
    /// Fails with a configuration error when the signing key is missing, the
    /// catalog is empty or no store was supplied.
    pub fn build(self) -> ApiResult<AppState> {
        let config = self.config.unwrap_or_default();
        let store = self
            .store
            .ok_or_else(|| ApiError::configuration("no store configured"))?;

        let catalog = match self.catalog {
            Some(catalog) => catalog,
            None => Arc::new(crate::routes::build_catalog()?),
        };

        let jwt_manager = Arc::new(JwtManager::new(config.jwt.clone())?);
        let policies = Arc::new(PolicyRegistry::from_catalog(&catalog)?);
        let authorizer = Arc::new(RequestAuthorizer::new(jwt_manager.clone()));
        let grants = RoleGrants::new(store.roles.clone(), catalog.clone());
        let issuer = CredentialIssuer::new(store.clone(), jwt_manager.clone());
        let default_role: Arc<str> = self
            .default_role
            .unwrap_or_else(|| USER_ROLE.to_string())
            .into();

        Ok(AppState {
            config: Arc::new(config),
            jwt_manager,
            catalog,
            policies,
            authorizer,
            store,
            grants,
            issuer,
            default_role,
        })
    }
}

// =============================================================================
// FromRef implementations for extracting parts of state
// =============================================================================

impl axum::extract::FromRef<AppState> for Arc<JwtManager> {
    fn from_ref(state: &AppState) -> Self {
        state.jwt_manager.clone()
    }
}

impl axum::extract::FromRef<AppState> for Arc<PermissionCatalog> {
    fn from_ref(state: &AppState) -> Self {
        state.catalog.clone()
    }
}

// =============================================================================
// Tests
// =============================================================================

// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Permission administration handlers.

use axum::{extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::extractors::{NamePath, ValidatedJson};
use crate::response::ApiResponse;
use crate::state::AppState;

/// Grant or revoke request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrantRequest {
    /// Role name.
    pub role: String,
    /// Permission identifier.
    pub permission: String,
}

impl GrantRequest {
    /// Strips surrounding whitespace from both names.
    pub fn trimmed(self) -> Self {
        Self {
            role: self.role.trim().to_string(),
            permission: self.permission.trim().to_string(),
        }
    }
}

/// Catalog listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct CatalogView {
    /// Every identifier the service can require.
    pub permissions: Vec<String>,
    /// Operations without an invocation kind.
    pub unclassified: Vec<String>,
}

/// GET /api/permissions
///
/// Lists every permission granted to at least one role.
pub async fn list_all(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let permissions = state.grants.list_all().await?;
    Ok(ApiResponse::success(permissions.to_strings()))
}

/// GET /api/permissions/catalog
pub async fn catalog(State(state): State<AppState>) -> impl IntoResponse {
    ApiResponse::success(CatalogView {
        permissions: state.catalog.permissions().to_strings(),
        unclassified: state.catalog.unclassified().to_vec(),
    })
}

/// GET /api/permissions/roles/{role}
pub async fn list_for_role(
    State(state): State<AppState>,
    NamePath(role): NamePath,
) -> ApiResult<impl IntoResponse> {
    let permissions = state.grants.list_for_role(&role).await?;
    Ok(ApiResponse::success(permissions.to_strings()))
}

/// POST /api/permissions/grants
pub async fn grant(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<GrantRequest>,
) -> ApiResult<impl IntoResponse> {
    let request = request.trimmed();
    state
        .grants
        .grant(&request.role, &request.permission)
        .await?;
    Ok(ApiResponse::created(request))
}

/// DELETE /api/permissions/grants
pub async fn revoke(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<GrantRequest>,
) -> ApiResult<impl IntoResponse> {
    let request = request.trimmed();
    state
        .grants
        .revoke(&request.role, &request.permission)
        .await?;
    Ok(ApiResponse::ok())
}

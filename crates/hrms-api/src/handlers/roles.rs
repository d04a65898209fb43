// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Role administration handlers.

use axum::{extract::State, response::IntoResponse};
use hrms_core::{AccessError, Principal};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::extractors::{NamePath, ValidatedJson};
use crate::response::ApiResponse;
use crate::state::AppState;

/// Role creation request body.
#[derive(Debug, Deserialize)]
pub struct CreateRoleRequest {
    /// Role name. Case-sensitive.
    pub name: String,
}

/// Membership change request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentRequest {
    /// Principal id.
    pub user_id: String,
    /// Role name.
    pub role: String,
}

/// GET /api/roles
pub async fn list_roles(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let roles = state.store.roles.list_roles().await?;
    Ok(ApiResponse::success(roles))
}

/// POST /api/roles
pub async fn create_role(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateRoleRequest>,
) -> ApiResult<impl IntoResponse> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(AccessError::invalid("name", "must not be empty").into());
    }

    state.store.roles.create_role(name).await?;
    tracing::info!(role = name, "Role created");
    Ok(ApiResponse::created(name.to_string()))
}

/// DELETE /api/roles/{role}
///
/// Removes the role with its grants, role claims and memberships.
pub async fn delete_role(
    State(state): State<AppState>,
    NamePath(role): NamePath,
) -> ApiResult<impl IntoResponse> {
    state.store.roles.delete_role(&role).await?;
    tracing::info!(role = %role, "Role deleted");
    Ok(ApiResponse::ok())
}

/// GET /api/roles/{role}/users
pub async fn users_in_role(
    State(state): State<AppState>,
    NamePath(role): NamePath,
) -> ApiResult<impl IntoResponse> {
    let users: Vec<Principal> = state.store.identities.users_in_role(&role).await?;
    Ok(ApiResponse::success(users))
}

/// POST /api/roles/assignments
pub async fn assign(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<AssignmentRequest>,
) -> ApiResult<impl IntoResponse> {
    state
        .store
        .identities
        .add_to_role(&request.user_id, &request.role)
        .await?;
    tracing::info!(user_id = %request.user_id, role = %request.role, "Role assigned");
    Ok(ApiResponse::created(request))
}

/// DELETE /api/roles/assignments
pub async fn unassign(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<AssignmentRequest>,
) -> ApiResult<impl IntoResponse> {
    state
        .store
        .identities
        .remove_from_role(&request.user_id, &request.role)
        .await?;
    tracing::info!(user_id = %request.user_id, role = %request.role, "Role unassigned");
    Ok(ApiResponse::ok())
}

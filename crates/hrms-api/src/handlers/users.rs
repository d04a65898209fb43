// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! User administration handlers.

use axum::{extract::State, response::IntoResponse};
use hrms_core::{AccessError, NewPrincipal, Principal, PrincipalUpdate, ResourceKind};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::extractors::{NamePath, ValidatedJson};
use crate::response::ApiResponse;
use crate::state::AppState;

/// A principal with its role names.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserView {
    /// The principal.
    #[serde(flatten)]
    pub principal: Principal,
    /// Role names.
    pub roles: Vec<String>,
}

async fn view(state: &AppState, principal: Principal) -> ApiResult<UserView> {
    let roles = state.store.identities.roles_of(&principal.id).await?;
    Ok(UserView { principal, roles })
}

/// GET /api/users
pub async fn list_users(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let principals = state.store.identities.list_principals().await?;
    Ok(ApiResponse::success(principals))
}

/// GET /api/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    NamePath(id): NamePath,
) -> ApiResult<impl IntoResponse> {
    let principal = state
        .store
        .identities
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AccessError::not_found(ResourceKind::Principal, &id))?;
    Ok(ApiResponse::success(view(&state, principal).await?))
}

/// POST /api/users
///
/// Creates a principal without roles.
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(new): ValidatedJson<NewPrincipal>,
) -> ApiResult<impl IntoResponse> {
    new.validate()?;
    let principal = state.store.identities.create_principal(new).await?;
    tracing::info!(user_id = %principal.id, username = %principal.username, "User created");
    Ok(ApiResponse::created(principal))
}

/// PUT /api/users/{id}
///
/// Updates the profile. A password change needs the current password.
pub async fn update_user(
    State(state): State<AppState>,
    NamePath(id): NamePath,
    ValidatedJson(update): ValidatedJson<PrincipalUpdate>,
) -> ApiResult<impl IntoResponse> {
    update.validate()?;
    let changes_password = update.changes_password();
    let principal = state.store.identities.update_principal(&id, update).await?;
    tracing::info!(user_id = %principal.id, changes_password, "User updated");
    Ok(ApiResponse::success(view(&state, principal).await?))
}

/// DELETE /api/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    NamePath(id): NamePath,
) -> ApiResult<impl IntoResponse> {
    state.store.identities.delete_principal(&id).await?;
    tracing::info!(user_id = %id, "User deleted");
    Ok(ApiResponse::ok())
}

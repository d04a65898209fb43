// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use hrms_core::NewPrincipal;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::extractors::{Auth, ValidatedJson};
use crate::response::{ApiResponse, AuthResponse};
use crate::state::AppState;

// =============================================================================
// Login
// =============================================================================

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email or username.
    #[serde(alias = "email", alias = "username")]
    pub login: String,
    /// Password.
    pub password: String,
}

/// POST /api/auth/login
///
/// Verifies the password and returns a signed credential.
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    if request.login.trim().is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let credential = state
        .issuer
        .login(request.login.trim(), &request.password)
        .await?;

    Ok(Json(AuthResponse::from(credential)))
}

// =============================================================================
// Register
// =============================================================================

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Display name.
    pub full_name: String,
    /// Username.
    pub username: String,
    /// Email.
    pub email: String,
    /// Password.
    pub password: String,
}

/// POST /api/auth/register
///
/// Creates a principal in the default role and returns a credential for it.
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let new = NewPrincipal {
        username: request.username.trim().to_string(),
        email: request.email.trim().to_string(),
        full_name: request.full_name.trim().to_string(),
        password: request.password,
    };
    new.validate()?;

    let identities = &state.store.identities;
    let principal = identities.create_principal(new).await?;

    if let Err(e) = identities.add_to_role(&principal.id, &state.default_role).await {
        tracing::error!(
            error = %e,
            role = %state.default_role,
            "Default role assignment failed, removing registered principal"
        );
        if let Err(cleanup) = identities.delete_principal(&principal.id).await {
            tracing::warn!(error = %cleanup, user_id = %principal.id, "Cleanup failed");
        }
        return Err(e.into());
    }

    tracing::info!(
        user_id = %principal.id,
        username = %principal.username,
        role = %state.default_role,
        "Principal registered"
    );

    let credential = state.issuer.issue_for(&principal).await?;
    Ok((StatusCode::CREATED, Json(AuthResponse::from(credential))))
}

// =============================================================================
// Current Principal
// =============================================================================

/// Current principal response.
#[derive(Debug, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Principal id.
    pub user_id: String,
    /// Username.
    pub username: String,
    /// Email.
    pub email: String,
    /// Roles carried by the credential.
    pub roles: Vec<String>,
    /// Permissions carried by the credential.
    pub permissions: Vec<String>,
}

/// GET /api/auth/me
///
/// Echoes the claims of the presented credential.
pub async fn me(Auth(ctx): Auth) -> impl IntoResponse {
    ApiResponse::success(CurrentUser {
        user_id: ctx.user_id,
        username: ctx.username,
        email: ctx.email,
        roles: ctx.roles,
        permissions: ctx.permissions.to_strings(),
    })
}

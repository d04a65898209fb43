// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API error types and handling.
//!
//! Every failure leaves the service as a JSON `{ "error": { code, message } }`
//! body. Authentication and authorization failures never carry internal
//! detail; not-found and conflict failures name the role or permission.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hrms_core::AccessError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// ApiError
// =============================================================================

/// API error type with HTTP status code mapping.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad request (400).
    #[error("Bad request: {message}")]
    BadRequest {
        /// Error message.
        message: String,
    },

    /// Unauthorized (401).
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Error message (logged, not returned).
        message: String,
    },

    /// Internal server error (500).
    #[error("Internal error: {message}")]
    Internal {
        /// Error message (for logging, not user-facing).
        message: String,
    },

    /// Access-control engine error.
    #[error(transparent)]
    Access(#[from] AccessError),
}

impl ApiError {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Creates a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Creates an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Access(AccessError::configuration(message))
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Access(e) => match e {
                AccessError::AuthenticationFailed => StatusCode::UNAUTHORIZED,
                AccessError::AuthorizationDenied { .. } => StatusCode::FORBIDDEN,
                AccessError::NotFound { .. } => StatusCode::NOT_FOUND,
                AccessError::Conflict { .. } => StatusCode::CONFLICT,
                AccessError::Invalid { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                AccessError::Configuration { .. } | AccessError::Storage { .. } => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    /// Returns the error code for categorization.
    pub fn error_code(&self) -> &'static str {
        match self.status_code() {
            StatusCode::BAD_REQUEST => "BAD_REQUEST",
            StatusCode::UNAUTHORIZED => "UNAUTHORIZED",
            StatusCode::FORBIDDEN => "FORBIDDEN",
            StatusCode::NOT_FOUND => "NOT_FOUND",
            StatusCode::CONFLICT => "CONFLICT",
            StatusCode::UNPROCESSABLE_ENTITY => "VALIDATION_ERROR",
            _ => "INTERNAL_ERROR",
        }
    }

    /// Returns the message safe to show to callers.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::BadRequest { message } => message.clone(),
            ApiError::Unauthorized { .. } => "Authentication required".to_string(),
            ApiError::Internal { .. } => "Internal server error".to_string(),
            ApiError::Access(e) => match e {
                AccessError::AuthenticationFailed => "Invalid credentials".to_string(),
                AccessError::AuthorizationDenied { .. } => "Access denied".to_string(),
                AccessError::NotFound { .. }
                | AccessError::Conflict { .. }
                | AccessError::Invalid { .. } => e.to_string(),
                AccessError::Configuration { .. } | AccessError::Storage { .. } => {
                    "Internal server error".to_string()
                }
            },
        }
    }

    /// Returns `true` if this error should be logged at error level.
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Returns `true` if the error must abort startup.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ApiError::Access(e) if e.is_fatal())
    }
}

// =============================================================================
// IntoResponse Implementation
// =============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        if self.is_server_error() {
            tracing::error!(
                error = %self,
                error_code = error_code,
                status = %status,
                "Server error occurred"
            );
        } else {
            tracing::debug!(
                error = %self,
                error_code = error_code,
                status = %status,
                "Client error occurred"
            );
        }

        let body = ErrorResponseBody {
            error: ErrorDetails {
                code: error_code.to_string(),
                message: self.user_message(),
            },
        };

        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Error Response Body
// =============================================================================

/// Error response body structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponseBody {
    /// Error details.
    pub error: ErrorDetails,
}

/// Error details within the response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use hrms_core::ResourceKind;

    #[test]
    fn test_access_error_status_mapping() {
        let cases = [
            (AccessError::AuthenticationFailed, StatusCode::UNAUTHORIZED),
            (AccessError::denied("Create"), StatusCode::FORBIDDEN),
            (
                AccessError::not_found(ResourceKind::Role, "Auditor"),
                StatusCode::NOT_FOUND,
            ),
            (AccessError::grant_conflict("User", "View"), StatusCode::CONFLICT),
            (
                AccessError::invalid("email", "bad"),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AccessError::storage("disk full"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(ApiError::from(error).status_code(), status);
        }
    }

    #[test]
    fn test_auth_failures_hide_detail() {
        let denied = ApiError::from(AccessError::denied("Delete"));
        assert_eq!(denied.user_message(), "Access denied");

        let unauthorized = ApiError::unauthorized("Token has expired");
        assert_eq!(unauthorized.user_message(), "Authentication required");

        let storage = ApiError::from(AccessError::storage("database is locked"));
        assert_eq!(storage.user_message(), "Internal server error");
    }

    #[test]
    fn test_not_found_names_resource() {
        let error = ApiError::from(AccessError::not_found(ResourceKind::Role, "Auditor"));
        assert_eq!(error.error_code(), "NOT_FOUND");
        assert!(error.user_message().contains("Auditor"));
    }

    #[test]
    fn test_configuration_is_fatal() {
        assert!(ApiError::configuration("empty catalog").is_fatal());
        assert!(!ApiError::unauthorized("x").is_fatal());
    }

    #[tokio::test]
    async fn test_error_response_body() {
        let response = ApiError::from(AccessError::grant_conflict("User", "View")).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: ErrorResponseBody = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.error.code, "CONFLICT");
        assert!(body.error.message.contains("User/View"));
    }
}

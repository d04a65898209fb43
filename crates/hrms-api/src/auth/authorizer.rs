// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Per-request authorization decisions.
//!
//! ```text
//! UNAUTHENTICATED ── valid signature, unexpired ──▶ AUTHENTICATED
//! AUTHENTICATED   ── permission claim present  ──▶ AUTHORIZED
//! AUTHENTICATED   ── permission claim missing  ──▶ DENIED
//! ```
//!
//! Decisions depend only on the presented credential. Grants revoked after
//! issuance stay effective until the credential expires.

use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use hrms_core::AccessError;

use super::{AuthContext, JwtManager, Policy};
use crate::error::{ApiError, ApiResult};

/// Outcome of authorizing one request against one policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationDecision {
    /// The credential carries the required permission.
    Authorized,
    /// Authenticated, but the permission is missing.
    Denied {
        /// The missing permission.
        permission: String,
    },
    /// No credential, or one that failed validation.
    Unauthenticated {
        /// Reason, for logs only.
        reason: String,
    },
}

impl AuthorizationDecision {
    /// Returns `true` if the request may proceed.
    pub fn is_authorized(&self) -> bool {
        matches!(self, AuthorizationDecision::Authorized)
    }

    /// Converts the decision into a result.
    pub fn into_result(self) -> ApiResult<()> {
        match self {
            AuthorizationDecision::Authorized => Ok(()),
            AuthorizationDecision::Denied { permission } => {
                Err(AccessError::denied(permission).into())
            }
            AuthorizationDecision::Unauthenticated { reason } => Err(ApiError::unauthorized(reason)),
        }
    }
}

impl IntoResponse for AuthorizationDecision {
    fn into_response(self) -> Response {
        match self.into_result() {
            Ok(()) => axum::http::StatusCode::NO_CONTENT.into_response(),
            Err(e) => e.into_response(),
        }
    }
}

/// Authenticates credentials and evaluates policies.
#[derive(Debug, Clone)]
pub struct RequestAuthorizer {
    jwt: Arc<JwtManager>,
}

impl RequestAuthorizer {
    /// Creates an authorizer over the given signing configuration.
    pub fn new(jwt: Arc<JwtManager>) -> Self {
        Self { jwt }
    }

    /// Validates a bearer token and builds the request context.
    pub fn authenticate(&self, token: Option<&str>) -> ApiResult<AuthContext> {
        let token = token.ok_or_else(|| ApiError::unauthorized("No authorization token provided"))?;
        let data = self.jwt.validate_token(token)?;
        Ok(AuthContext::from_claims(&data.claims))
    }

    /// Evaluates a policy for an already-authenticated context.
    pub fn authorize(&self, ctx: Option<&AuthContext>, policy: &Policy) -> AuthorizationDecision {
        match ctx {
            Some(ctx) if !ctx.is_anonymous() => {
                if policy.is_satisfied_by(ctx) {
                    AuthorizationDecision::Authorized
                } else {
                    AuthorizationDecision::Denied {
                        permission: policy.permission().to_string(),
                    }
                }
            }
            _ => AuthorizationDecision::Unauthenticated {
                reason: "Authentication required".to_string(),
            },
        }
    }

    /// Runs both steps for a raw token.
    pub fn decide(&self, token: Option<&str>, policy: &Policy) -> AuthorizationDecision {
        match self.authenticate(token) {
            Ok(ctx) => self.authorize(Some(&ctx), policy),
            Err(e) => AuthorizationDecision::Unauthenticated {
                reason: e.to_string(),
            },
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Claims, JwtConfig};

    fn authorizer() -> (RequestAuthorizer, Arc<JwtManager>) {
        let jwt = Arc::new(
            JwtManager::new(JwtConfig::new("test-secret-key-that-is-long-enough-for-testing"))
                .unwrap(),
        );
        (RequestAuthorizer::new(jwt.clone()), jwt)
    }

    fn token(jwt: &JwtManager, permissions: &[&str], expires_in: i64) -> String {
        let mut builder = Claims::builder("alice")
            .user_id("u-1")
            .issuer(jwt.issuer())
            .audience(jwt.audience())
            .expires_in(expires_in);
        for p in permissions {
            builder = builder.add_permission(*p);
        }
        jwt.create_token(&builder.build()).unwrap()
    }

    #[test]
    fn test_authorized_with_claim() {
        let (authorizer, jwt) = authorizer();
        let policy = Policy::for_permission("View".into());

        let decision = authorizer.decide(Some(&token(&jwt, &["View"], 3600)), &policy);
        assert_eq!(decision, AuthorizationDecision::Authorized);
    }

    #[test]
    fn test_denied_without_claim() {
        let (authorizer, jwt) = authorizer();
        let policy = Policy::for_permission("Create".into());

        let decision = authorizer.decide(Some(&token(&jwt, &["View"], 3600)), &policy);
        assert_eq!(
            decision,
            AuthorizationDecision::Denied {
                permission: "Create".to_string()
            }
        );
    }

    #[test]
    fn test_missing_token_is_unauthenticated() {
        let (authorizer, _) = authorizer();
        let policy = Policy::for_permission("View".into());

        let decision = authorizer.decide(None, &policy);
        assert!(matches!(decision, AuthorizationDecision::Unauthenticated { .. }));
    }

    #[test]
    fn test_expired_token_is_unauthenticated_despite_claims() {
        let (authorizer, jwt) = authorizer();
        let policy = Policy::for_permission("View".into());

        let decision = authorizer.decide(Some(&token(&jwt, &["View"], -3600)), &policy);
        assert!(matches!(decision, AuthorizationDecision::Unauthenticated { .. }));
    }

    #[test]
    fn test_anonymous_context_is_unauthenticated() {
        let (authorizer, _) = authorizer();
        let policy = Policy::for_permission("View".into());

        let decision = authorizer.authorize(Some(&AuthContext::anonymous()), &policy);
        assert!(matches!(decision, AuthorizationDecision::Unauthenticated { .. }));
    }

    #[test]
    fn test_decision_status_codes() {
        let denied = AuthorizationDecision::Denied {
            permission: "Delete".to_string(),
        };
        assert_eq!(
            denied.into_result().unwrap_err().status_code(),
            axum::http::StatusCode::FORBIDDEN
        );

        let unauthenticated = AuthorizationDecision::Unauthenticated {
            reason: "expired".to_string(),
        };
        assert_eq!(
            unauthenticated.into_result().unwrap_err().status_code(),
            axum::http::StatusCode::UNAUTHORIZED
        );
    }
}

// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Permission enforcement middleware.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};

use crate::auth::{AuthContext, AuthorizationDecision, Policy, RequestAuthorizer};

// =============================================================================
// PermissionLayer
// =============================================================================

/// Layer enforcing one registered policy on a route.
///
/// Runs after [`AuthLayer`](super::AuthLayer). Answers 401 when no
/// authenticated context is present and 403 when the credential lacks the
/// policy's permission.
#[derive(Clone)]
pub struct PermissionLayer {
    authorizer: Arc<RequestAuthorizer>,
    policy: Arc<Policy>,
}

impl PermissionLayer {
    /// Creates a layer for the given policy.
    pub fn new(authorizer: Arc<RequestAuthorizer>, policy: Arc<Policy>) -> Self {
        Self { authorizer, policy }
    }

    /// Returns the enforced policy.
    pub fn policy(&self) -> &Policy {
        &self.policy
    }
}

impl<S> Layer<S> for PermissionLayer {
    type Service = PermissionMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        PermissionMiddleware {
            inner,
            authorizer: self.authorizer.clone(),
            policy: self.policy.clone(),
        }
    }
}

// =============================================================================
// PermissionMiddleware
// =============================================================================

/// Middleware for permission enforcement.
#[derive(Clone)]
pub struct PermissionMiddleware<S> {
    inner: S,
    authorizer: Arc<RequestAuthorizer>,
    policy: Arc<Policy>,
}

impl<S> Service<Request<Body>> for PermissionMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let authorizer = self.authorizer.clone();
        let policy = self.policy.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let ctx = req.extensions().get::<AuthContext>();
            let decision = authorizer.authorize(ctx, &policy);

            match decision {
                AuthorizationDecision::Authorized => inner.call(req).await,
                AuthorizationDecision::Denied { ref permission } => {
                    tracing::warn!(
                        user_id = ctx.map(|c| c.user_id.as_str()).unwrap_or_default(),
                        roles = ?ctx.map(|c| c.roles.as_slice()).unwrap_or_default(),
                        required_permission = %permission,
                        path = %req.uri().path(),
                        "Permission denied"
                    );
                    Ok(decision.into_response())
                }
                AuthorizationDecision::Unauthenticated { .. } => {
                    tracing::warn!(path = %req.uri().path(), "No auth context found, denying access");
                    Ok(decision.into_response())
                }
            }
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Claims, JwtConfig, JwtManager};
    use axum::http::StatusCode;
    use tower::ServiceExt;

    async fn ok(_req: Request<Body>) -> Result<Response, std::convert::Infallible> {
        Ok(StatusCode::OK.into_response())
    }

    fn layer(permission: &str) -> PermissionLayer {
        let jwt = Arc::new(
            JwtManager::new(JwtConfig::new("test-secret-key-that-is-long-enough-for-testing"))
                .unwrap(),
        );
        PermissionLayer::new(
            Arc::new(RequestAuthorizer::new(jwt)),
            Arc::new(Policy::for_permission(permission.into())),
        )
    }

    fn request_with(ctx: Option<AuthContext>) -> Request<Body> {
        let mut req = Request::builder().uri("/things").body(Body::empty()).unwrap();
        if let Some(ctx) = ctx {
            req.extensions_mut().insert(ctx);
        }
        req
    }

    fn context(permissions: &[&str]) -> AuthContext {
        let mut builder = Claims::builder("alice");
        for p in permissions {
            builder = builder.add_permission(*p);
        }
        AuthContext::from_claims(&builder.build())
    }

    #[tokio::test]
    async fn test_permission_granted() {
        let service = layer("View").layer(tower::service_fn(ok));
        let response = service
            .oneshot(request_with(Some(context(&["View"]))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_permission_missing_is_forbidden() {
        let service = layer("Create").layer(tower::service_fn(ok));
        let response = service
            .oneshot(request_with(Some(context(&["View"]))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_no_context_is_unauthorized() {
        let service = layer("View").layer(tower::service_fn(ok));
        let response = service.oneshot(request_with(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_anonymous_context_is_unauthorized() {
        let service = layer("View").layer(tower::service_fn(ok));
        let response = service
            .oneshot(request_with(Some(AuthContext::anonymous())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

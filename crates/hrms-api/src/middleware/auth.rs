// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! JWT authentication middleware.

use std::collections::HashSet;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, Request},
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};
use uuid::Uuid;

use crate::auth::{AuthContext, RequestAuthorizer};

// =============================================================================
// AuthLayer
// =============================================================================

/// Layer for JWT authentication.
///
/// Extracts the bearer token, validates it and stores an [`AuthContext`] in
/// the request extensions. Requests to non-public paths without a valid
/// token are answered with 401.
#[derive(Clone)]
pub struct AuthLayer {
    authorizer: Arc<RequestAuthorizer>,
    public_paths: Arc<HashSet<String>>,
}

impl AuthLayer {
    /// Creates a new auth layer.
    pub fn new(authorizer: Arc<RequestAuthorizer>) -> Self {
        Self {
            authorizer,
            public_paths: Arc::new(HashSet::new()),
        }
    }

    /// Adds public paths that don't require authentication.
    ///
    /// A trailing `*` matches any path with that prefix.
    pub fn with_public_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.public_paths = Arc::new(paths.into_iter().map(Into::into).collect());
        self
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            authorizer: self.authorizer.clone(),
            public_paths: self.public_paths.clone(),
        }
    }
}

// =============================================================================
// AuthMiddleware
// =============================================================================

/// Middleware for JWT authentication.
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    authorizer: Arc<RequestAuthorizer>,
    public_paths: Arc<HashSet<String>>,
}

impl<S> AuthMiddleware<S> {
    /// Checks if a path is public.
    fn is_public_path(&self, path: &str) -> bool {
        if self.public_paths.contains(path) {
            return true;
        }

        self.public_paths.iter().any(|public| {
            public
                .strip_suffix('*')
                .is_some_and(|prefix| path.starts_with(prefix))
        })
    }
}

impl<S> Service<Request<Body>> for AuthMiddleware<S>
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

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let authorizer = self.authorizer.clone();
        let is_public = self.is_public_path(req.uri().path());
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let request_id = Uuid::now_v7();
            let client_ip = req
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ci| ci.0.ip());

            let auth_ctx = if is_public {
                AuthContext::anonymous()
            } else {
                let token = extract_bearer_token(&req);
                match authorizer.authenticate(token.as_deref()) {
                    Ok(ctx) => ctx,
                    Err(e) => {
                        tracing::debug!(
                            error = %e,
                            path = %req.uri().path(),
                            "Authentication failed"
                        );
                        return Ok(e.into_response());
                    }
                }
            };

            let mut auth_ctx = auth_ctx.with_request_id(request_id);
            if let Some(ip) = client_ip {
                auth_ctx = auth_ctx.with_client_ip(ip);
            }
            req.extensions_mut().insert(auth_ctx);

            inner.call(req).await
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token<B>(req: &Request<B>) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{JwtConfig, JwtManager};
    use axum::http::{HeaderValue, StatusCode};
    use tower::ServiceExt;

    fn layer() -> AuthLayer {
        let jwt = Arc::new(
            JwtManager::new(JwtConfig::new("test-secret-key-that-is-long-enough-for-testing"))
                .unwrap(),
        );
        AuthLayer::new(Arc::new(RequestAuthorizer::new(jwt)))
            .with_public_paths(["/health", "/public/*"])
    }

    async fn echo(req: Request<Body>) -> Result<Response, std::convert::Infallible> {
        let anonymous = req
            .extensions()
            .get::<AuthContext>()
            .map(AuthContext::is_anonymous)
            .unwrap_or(false);
        Ok(if anonymous { "anonymous" } else { "user" }.into_response())
    }

    #[test]
    fn test_extract_bearer_token() {
        let mut req = Request::builder().uri("/test").body(Body::empty()).unwrap();

        assert!(extract_bearer_token(&req).is_none());

        req.headers_mut()
            .insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(extract_bearer_token(&req).is_none());

        req.headers_mut().insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer mytoken123"),
        );
        assert_eq!(extract_bearer_token(&req), Some("mytoken123".to_string()));
    }

    #[test]
    fn test_public_paths() {
        let middleware = layer().layer(tower::service_fn(echo));

        assert!(middleware.is_public_path("/health"));
        assert!(middleware.is_public_path("/public/anything"));
        assert!(!middleware.is_public_path("/private"));
    }

    #[tokio::test]
    async fn test_public_path_passes_anonymously() {
        let service = layer().layer(tower::service_fn(echo));
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let response = service.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_token_is_rejected() {
        let service = layer().layer(tower::service_fn(echo));
        let req = Request::builder().uri("/private").body(Body::empty()).unwrap();

        let response = service.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_garbage_token_is_rejected() {
        let service = layer().layer(tower::service_fn(echo));
        let req = Request::builder()
            .uri("/private")
            .header(header::AUTHORIZATION, "Bearer not-a-jwt")
            .body(Body::empty())
            .unwrap();

        let response = service.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API server implementation.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthLayer;
use crate::routes;
use crate::state::AppState;

// =============================================================================
// ApiServer
// =============================================================================

/// The API server.
///
/// The router is assembled when the server is created, so a route without a
/// registered policy fails before any listener is bound.
pub struct ApiServer {
    router: Router,
    addr: SocketAddr,
}

impl ApiServer {
    /// Creates the server and assembles its router.
    pub fn new(state: AppState) -> ApiResult<Self> {
        let addr = state.config.socket_addr();
        let router = build_router(state)?;
        Ok(Self { router, addr })
    }

    /// Returns a clone of the assembled router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Returns the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Runs the server until the shutdown signal resolves.
    pub async fn run_with_shutdown(
        self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> ApiResult<()> {
        info!("Starting API server on {}", self.addr);

        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .map_err(|e| ApiError::internal(format!("Failed to bind {}: {}", self.addr, e)))?;

        axum::serve(
            listener,
            self.router
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| ApiError::internal(format!("Server error: {}", e)))?;

        info!("API server shutdown complete");

        Ok(())
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Builds the full router with the middleware stack.
pub fn build_router(state: AppState) -> ApiResult<Router> {
    let config = state.config.clone();
    let auth = AuthLayer::new(state.authorizer.clone()).with_public_paths(routes::public_paths());

    let mut router = routes::router(&state)?.layer(auth);

    if let Some(cors) = create_cors_layer(&config)? {
        router = router.layer(cors);
    }

    let router = router
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout(),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(router)
}

/// Creates the CORS layer from configuration. `None` when no origin is set.
fn create_cors_layer(config: &ApiConfig) -> ApiResult<Option<CorsLayer>> {
    let cors = &config.cors;
    if !cors.is_enabled() {
        return Ok(None);
    }

    let mut layer = CorsLayer::new()
        .max_age(Duration::from_secs(cors.max_age))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT]);

    if cors.allows_any_origin() {
        layer = layer.allow_origin(Any);
        if cors.allow_credentials {
            warn!("CORS credentials cannot be combined with a wildcard origin; ignoring");
        }
    } else {
        let origins = cors
            .allowed_origins
            .iter()
            .map(|o| {
                HeaderValue::from_str(o)
                    .map_err(|_| ApiError::configuration(format!("Invalid CORS origin: {}", o)))
            })
            .collect::<ApiResult<Vec<_>>>()?;
        layer = layer
            .allow_origin(AllowOrigin::list(origins))
            .allow_credentials(cors.allow_credentials);
    }

    Ok(Some(layer))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::JwtConfig;
    use crate::config::CorsConfig;
    use hrms_store::{HashCost, MemoryStore, PasswordHashing, StoreHandle};
    use std::sync::Arc;

    fn test_state(config: ApiConfig) -> AppState {
        let store = StoreHandle::new(Arc::new(MemoryStore::with_hashing(PasswordHashing::new(
            HashCost::Low,
        ))));
        AppState::builder()
            .config(config)
            .store(store)
            .build()
            .unwrap()
    }

    fn test_config() -> ApiConfig {
        ApiConfig::default().with_jwt(JwtConfig::new("test-secret-key-that-is-long-enough"))
    }

    #[test]
    fn test_server_creation() {
        let server = ApiServer::new(test_state(test_config())).unwrap();
        assert_eq!(server.addr().port(), 8080);
    }

    #[test]
    fn test_cors_disabled_by_default() {
        assert!(create_cors_layer(&test_config()).unwrap().is_none());
    }

    #[test]
    fn test_cors_origin_list() {
        let config = test_config().with_cors(CorsConfig {
            allowed_origins: vec!["https://hr.example.com".to_string()],
            allow_credentials: true,
            ..Default::default()
        });
        assert!(create_cors_layer(&config).unwrap().is_some());
    }

    #[test]
    fn test_invalid_cors_origin() {
        let config = test_config().with_cors(CorsConfig {
            allowed_origins: vec!["bad\norigin".to_string()],
            ..Default::default()
        });
        assert!(create_cors_layer(&config).is_err());
    }

    #[test]
    fn test_catalog_mismatch_is_configuration_error() {
        let catalog = hrms_core::CatalogBuilder::new()
            .operation(hrms_core::OperationSpec::read("other", "/other"))
            .build()
            .unwrap();
        let store = StoreHandle::new(Arc::new(MemoryStore::new()));
        let state = AppState::builder()
            .config(test_config())
            .store(store)
            .catalog(Arc::new(catalog))
            .build()
            .unwrap();

        let err = ApiServer::new(state).err().unwrap();
        assert!(err.is_fatal());
    }
}

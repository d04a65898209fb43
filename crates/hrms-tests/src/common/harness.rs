// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Harness
//!
//! A seeded application driven in-process through `tower::ServiceExt::oneshot`.
//! No listener is bound.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use hrms_api::{server::build_router, AppState};
use hrms_store::{BootstrapSeeder, SeedReport, StoreHandle};

use crate::common::fixtures::{
    CatalogFixtures, ConfigFixtures, PrincipalFixtures, StoreFixtures, ADMIN_LOGIN,
    ADMIN_PASSWORD, USER_PASSWORD,
};
use crate::common::init_test_logging;

/// Largest response body the harness reads.
const MAX_BODY_BYTES: usize = 1024 * 1024;

// =============================================================================
// TestResponse
// =============================================================================

/// Status and JSON body of one response.
#[derive(Debug)]
pub struct TestResponse {
    /// Status code.
    pub status: StatusCode,
    /// Parsed body, `Value::Null` when empty.
    pub body: Value,
}

// =============================================================================
// TestApp
// =============================================================================

/// The full router over a seeded store.
pub struct TestApp {
    /// Application state shared with the router.
    pub state: AppState,
    /// What the initial seeding created.
    pub seed_report: SeedReport,
    router: Router,
    _dir: Option<TempDir>,
}

impl TestApp {
    /// An application over the in-memory store.
    pub async fn new() -> Self {
        Self::with_store(StoreFixtures::memory(), None).await
    }

    /// An application over a SQLite file in a fresh temp directory.
    pub async fn with_sqlite() -> Self {
        let dir = crate::common::temp_test_dir("hrms-api-");
        let store = StoreFixtures::sqlite(&dir.path().join("hrms.db"));
        Self::with_store(store, Some(dir)).await
    }

    async fn with_store(store: StoreHandle, dir: Option<TempDir>) -> Self {
        init_test_logging();

        let catalog = CatalogFixtures::routes();
        let seed_report = BootstrapSeeder::new(store.clone(), catalog.clone())
            .run(&ConfigFixtures::seed())
            .await
            .expect("seeding succeeds");

        let state = AppState::builder()
            .config(ConfigFixtures::api())
            .catalog(catalog)
            .store(store)
            .build()
            .expect("valid state");
        let router = build_router(state.clone()).expect("valid router");

        Self {
            state,
            seed_report,
            router,
            _dir: dir,
        }
    }

    /// Sends a request through the full middleware stack.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), MAX_BODY_BYTES)
            .await
            .expect("readable body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("JSON body")
        };

        TestResponse { status, body }
    }

    /// Sends a request with an optional bearer token and JSON body.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("valid request");

        self.send(request).await
    }

    /// `GET` request.
    pub async fn get(&self, path: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, path, token, None).await
    }

    /// `POST` request with a JSON body.
    pub async fn post(&self, path: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, path, token, Some(body)).await
    }

    /// `PUT` request with a JSON body.
    pub async fn put(&self, path: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::PUT, path, token, Some(body)).await
    }

    /// `DELETE` request, with a JSON body when given.
    pub async fn delete(&self, path: &str, token: Option<&str>, body: Option<Value>) -> TestResponse {
        self.request(Method::DELETE, path, token, body).await
    }

    /// Logs in and returns the token.
    pub async fn login(&self, login: &str, password: &str) -> String {
        let response = self
            .post(
                "/api/auth/login",
                None,
                serde_json::json!({ "email": login, "password": password }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {}", response.body);
        token_of(&response)
    }

    /// Token of the seeded admin principal.
    pub async fn admin_token(&self) -> String {
        self.login(ADMIN_LOGIN, ADMIN_PASSWORD).await
    }

    /// Registers `username` in the default role and returns its token.
    pub async fn register(&self, username: &str) -> String {
        let response = self
            .post(
                "/api/auth/register",
                None,
                PrincipalFixtures::registration(username),
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "registration failed: {}",
            response.body
        );
        token_of(&response)
    }

    /// Logs in a principal created from [`PrincipalFixtures::named`].
    pub async fn login_user(&self, username: &str) -> String {
        self.login(&format!("{}@example.com", username), USER_PASSWORD).await
    }
}

fn token_of(response: &TestResponse) -> String {
    response.body["token"]
        .as_str()
        .unwrap_or_else(|| panic!("no token in {}", response.body))
        .to_string()
}

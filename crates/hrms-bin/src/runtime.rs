// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Server runtime orchestration.
//!
//! Startup order:
//!
//! 1. derive the permission catalog from the route table
//! 2. open the configured store
//! 3. seed baseline roles, their grants and the admin principal
//! 4. build the application state and its policies
//! 5. serve the API until shutdown is signaled
//!
//! Any configuration failure in steps 1 to 4 aborts before a listener is
//! bound.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use jsonwebtoken::Algorithm;
use tracing::{info, warn};

use hrms_api::{ApiConfig, ApiServer, AppState, JwtConfig};
use hrms_config::{load_config, HrmsConfig, JwtAlgorithm, JwtSettings, StorageBackend, StorageConfig};
use hrms_store::{open_store, BootstrapSeeder, HashCost, StoreConfig};

use crate::error::{BinError, BinResult};
use crate::shutdown::ShutdownCoordinator;

// =============================================================================
// ServerRuntime
// =============================================================================

/// Orchestrates catalog, store, seeding and the API server.
pub struct ServerRuntime {
    config: Arc<HrmsConfig>,
    shutdown: ShutdownCoordinator,
    seed: bool,
    hash_cost: HashCost,
}

impl ServerRuntime {
    /// Creates a runtime for a validated configuration.
    pub fn new(config: HrmsConfig) -> Self {
        Self {
            config: Arc::new(config),
            shutdown: ShutdownCoordinator::new(),
            seed: true,
            hash_cost: HashCost::default(),
        }
    }

    /// Enables or disables bootstrap seeding.
    pub fn with_seeding(mut self, enabled: bool) -> Self {
        self.seed = enabled;
        self
    }

    /// Sets the password hashing cost of the store.
    pub fn with_hash_cost(mut self, cost: HashCost) -> Self {
        self.hash_cost = cost;
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &HrmsConfig {
        &self.config
    }

    /// Runs the server until shutdown is signaled.
    pub async fn run(self) -> BinResult<()> {
        info!("Starting HRMS v{}", hrms_core::VERSION);

        let state = self.initialize().await?;
        let server = ApiServer::new(state)?;
        let addr = server.addr();

        let signal = self.shutdown.shutdown_signal();
        let coordinator = self.shutdown.clone();
        let watcher = tokio::spawn(async move { coordinator.wait_for_shutdown().await });

        info!(%addr, "HRMS is ready");
        let result = server.run_with_shutdown(signal.wait()).await;
        watcher.abort();
        result?;

        info!("HRMS shutdown complete");
        Ok(())
    }

    /// Performs every startup step short of binding the listener.
    pub async fn initialize(&self) -> BinResult<AppState> {
        info!("Initializing components...");

        let catalog = Arc::new(hrms_api::build_catalog()?);
        info!(
            permissions = catalog.permissions().len(),
            operations = catalog.operations().len(),
            "Permission catalog built"
        );
        for operation in catalog.unclassified() {
            warn!(operation = %operation, "Operation declares no invocation kind");
        }

        let store_config = store_config(&self.config.storage)?.with_hash_cost(self.hash_cost);
        let store = open_store(&store_config)?;

        if self.seed {
            let report = BootstrapSeeder::new(store.clone(), catalog.clone())
                .run(&self.config.seed)
                .await?;
            if report.is_noop() {
                info!("Baseline roles already in place");
            }
        } else {
            warn!("Bootstrap seeding skipped");
        }

        let state = AppState::builder()
            .config(api_config(&self.config)?)
            .catalog(catalog)
            .store(store)
            .default_role(self.config.seed.default_role.clone())
            .build()?;

        Ok(state)
    }
}

// =============================================================================
// Configuration Mapping
// =============================================================================

/// Maps the `server` and `security` sections onto the API configuration.
pub fn api_config(config: &HrmsConfig) -> BinResult<ApiConfig> {
    let server = &config.server;
    let cors = hrms_api::CorsConfig {
        allowed_origins: server.cors.allowed_origins.clone(),
        allow_credentials: server.cors.allow_credentials,
        ..Default::default()
    };

    Ok(ApiConfig {
        host: server.host,
        port: server.port,
        cors,
        jwt: jwt_config(&config.security.jwt)?,
        request_timeout_secs: server.request_timeout_secs,
    })
}

/// Maps the JWT settings onto the signer configuration.
pub fn jwt_config(settings: &JwtSettings) -> BinResult<JwtConfig> {
    let expiration_secs = i64::try_from(settings.expiration_secs).map_err(|_| {
        BinError::config(format!(
            "security.jwt.expiration_secs out of range: {}",
            settings.expiration_secs
        ))
    })?;

    let algorithm = match settings.algorithm {
        JwtAlgorithm::HS256 => Algorithm::HS256,
        JwtAlgorithm::HS384 => Algorithm::HS384,
        JwtAlgorithm::HS512 => Algorithm::HS512,
    };

    Ok(JwtConfig {
        secret: settings.secret.expose().to_string(),
        issuer: settings.issuer.clone(),
        audience: settings.audience.clone(),
        expiration_secs,
        algorithm,
        leeway_secs: settings.leeway_secs,
    })
}

/// Maps the `storage` section onto the store configuration, creating the
/// database directory for the SQLite backend.
pub fn store_config(storage: &StorageConfig) -> BinResult<StoreConfig> {
    match storage.backend {
        StorageBackend::Memory => {
            warn!("Using the in-memory store; state is lost on exit");
            Ok(StoreConfig::memory())
        }
        StorageBackend::Sqlite => {
            ensure_parent_dir(&storage.path)?;
            Ok(StoreConfig::sqlite(&storage.path))
        }
    }
}

fn ensure_parent_dir(path: &Path) -> BinResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data directory {}", parent.display()))?;
        }
    }
    Ok(())
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for constructing the server runtime.
pub struct RuntimeBuilder {
    config_path: Option<PathBuf>,
    config: Option<HrmsConfig>,
    seed: bool,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder. Seeding is enabled.
    pub fn new() -> Self {
        Self {
            config_path: None,
            config: None,
            seed: true,
        }
    }

    /// Sets the configuration file path.
    pub fn config_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the configuration directly. It is validated by [`build`](Self::build).
    pub fn config(mut self, config: HrmsConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Enables or disables bootstrap seeding.
    pub fn seed(mut self, enabled: bool) -> Self {
        self.seed = enabled;
        self
    }

    /// Builds the runtime.
    pub fn build(self) -> BinResult<ServerRuntime> {
        let config = match self.config {
            Some(config) => {
                config.validate()?;
                config
            }
            None => {
                let path = self
                    .config_path
                    .ok_or_else(|| BinError::config("No configuration provided"))?;

                load_config(&path).map_err(|e| {
                    BinError::from(e).with_context(format!("Failed to load {}", path.display()))
                })?
            }
        };

        Ok(ServerRuntime::new(config).with_seeding(self.seed))
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

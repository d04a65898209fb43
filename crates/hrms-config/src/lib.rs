// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # hrms-config
//!
//! Configuration for the HRMS backend.
//!
//! ## Features
//!
//! - **Schema**: typed sections with defaults and validation
//! - **Multi-Format**: YAML, TOML and JSON files
//! - **Placeholders**: `${VAR}` and `${VAR:default}` in file content
//! - **Environment Overrides**: `HRMS_*` variables applied after parsing
//!
//! ## Quick Start
//!
//! ```no_run
//! use hrms_config::load_config;
//!
//! let config = load_config("hrms.yaml").unwrap();
//! println!("Listening on {}", config.server.socket_addr());
//! ```
//!
//! ## Configuration Schema
//!
//! - `server` - bind address, port, request timeout, CORS
//! - `security.jwt` - signing secret, algorithm, issuer, audience, lifetime
//! - `storage` - `memory` or `sqlite` backend
//! - `seed` - baseline roles, their grant rules and the admin principal
//! - `logging` - level and format

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod loader;
pub mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_config, ConfigFormat, ConfigLoader};
pub use schema::{
    CorsConfig, HrmsConfig, JwtAlgorithm, JwtSettings, LogFormat, LogLevel, LoggingConfig,
    SecretString, SecurityConfig, ServerConfig, StorageBackend, StorageConfig,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

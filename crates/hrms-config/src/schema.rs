// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration schema.
//!
//! # Schema Structure
//!
//! ```text
//! HrmsConfig
//! ├── server: ServerConfig
//! │   └── cors: CorsConfig
//! ├── security: SecurityConfig
//! │   └── jwt: JwtSettings
//! ├── storage: StorageConfig
//! ├── seed: SeedConfig            (hrms-core)
//! └── logging: LoggingConfig
//! ```

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use hrms_core::SeedConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

// =============================================================================
// Constants
// =============================================================================

/// Default API port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default credential lifetime in seconds (1 hour).
pub const DEFAULT_JWT_EXPIRATION_SECS: u64 = 3600;

/// Longest accepted credential lifetime in seconds (1 day).
pub const MAX_JWT_EXPIRATION_SECS: u64 = 86_400;

/// Default request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Top-Level Configuration
// =============================================================================

/// The root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HrmsConfig {
    /// HTTP server.
    #[serde(default)]
    pub server: ServerConfig,

    /// Credential signing.
    #[serde(default)]
    pub security: SecurityConfig,

    /// Persistence backend.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Baseline roles and admin principal.
    #[serde(default)]
    pub seed: SeedConfig,

    /// Logging.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl HrmsConfig {
    /// Validates the entire configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.server.validate()?;
        self.security.validate()?;
        self.storage.validate()?;
        self.seed
            .validate()
            .map_err(|e| ConfigError::validation("seed", e.to_string()))?;
        Ok(())
    }
}

// =============================================================================
// Server Configuration
// =============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Listen port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// CORS configuration.
    #[serde(default)]
    pub cors: CorsConfig,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0))
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl ServerConfig {
    /// Validates the server configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::validation(
                "server.request_timeout_secs",
                "cannot be zero",
            ));
        }
        Ok(())
    }

    /// Returns the request timeout as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Returns the socket address.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: DEFAULT_PORT,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            cors: CorsConfig::default(),
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins. Empty disables CORS; `*` allows any origin.
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    /// Allow credentials.
    #[serde(default)]
    pub allow_credentials: bool,
}

// =============================================================================
// Security Configuration
// =============================================================================

/// Security configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecurityConfig {
    /// Credential signing.
    #[serde(default)]
    pub jwt: JwtSettings,
}

impl SecurityConfig {
    /// Validates the security configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.jwt.validate()
    }
}

/// A string that never shows up in logs or serialized output.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct SecretString(String);

impl SecretString {
    /// Wraps a secret.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the secret.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the secret is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// JWT credential settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JwtSettings {
    /// Symmetric signing key. Required.
    #[serde(default, skip_serializing)]
    pub secret: SecretString,

    /// Signing algorithm.
    #[serde(default)]
    pub algorithm: JwtAlgorithm,

    /// Token issuer (`iss`).
    #[serde(default = "default_issuer")]
    pub issuer: String,

    /// Token audience (`aud`).
    #[serde(default = "default_audience")]
    pub audience: String,

    /// Credential lifetime in seconds.
    #[serde(default = "default_jwt_expiration")]
    pub expiration_secs: u64,

    /// Clock skew tolerance in seconds.
    #[serde(default)]
    pub leeway_secs: u64,
}

fn default_issuer() -> String {
    "hrms".to_string()
}

fn default_audience() -> String {
    "hrms-api".to_string()
}

fn default_jwt_expiration() -> u64 {
    DEFAULT_JWT_EXPIRATION_SECS
}

impl JwtSettings {
    /// Validates the JWT settings.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.secret.is_empty() {
            return Err(ConfigError::validation(
                "security.jwt.secret",
                "a signing secret is required",
            ));
        }
        if self.expiration_secs == 0 || self.expiration_secs > MAX_JWT_EXPIRATION_SECS {
            return Err(ConfigError::validation(
                "security.jwt.expiration_secs",
                format!("must be between 1 and {}", MAX_JWT_EXPIRATION_SECS),
            ));
        }
        if self.issuer.is_empty() {
            return Err(ConfigError::validation("security.jwt.issuer", "cannot be empty"));
        }
        if self.audience.is_empty() {
            return Err(ConfigError::validation("security.jwt.audience", "cannot be empty"));
        }
        Ok(())
    }

    /// Returns the credential lifetime as a Duration.
    pub fn expiration(&self) -> Duration {
        Duration::from_secs(self.expiration_secs)
    }
}

impl Default for JwtSettings {
    fn default() -> Self {
        Self {
            secret: SecretString::default(),
            algorithm: JwtAlgorithm::default(),
            issuer: default_issuer(),
            audience: default_audience(),
            expiration_secs: DEFAULT_JWT_EXPIRATION_SECS,
            leeway_secs: 0,
        }
    }
}

/// JWT signing algorithm. Symmetric only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JwtAlgorithm {
    /// HMAC using SHA-256.
    #[default]
    HS256,
    /// HMAC using SHA-384.
    HS384,
    /// HMAC using SHA-512.
    HS512,
}

// =============================================================================
// Storage Configuration
// =============================================================================

/// Storage backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// In-memory store; state is lost on exit.
    Memory,
    /// SQLite database file.
    #[default]
    Sqlite,
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Backend.
    #[serde(default)]
    pub backend: StorageBackend,

    /// Database path for the SQLite backend.
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

/// Returns the default database path.
pub fn default_storage_path() -> PathBuf {
    PathBuf::from("./data/hrms.db")
}

impl StorageConfig {
    /// Validates the storage configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.backend == StorageBackend::Sqlite && self.path.as_os_str().is_empty() {
            return Err(ConfigError::validation(
                "storage.path",
                "required for the sqlite backend",
            ));
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: default_storage_path(),
        }
    }
}

// =============================================================================
// Logging Configuration
// =============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Log format.
    #[serde(default)]
    pub format: LogFormat,
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warn level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Parses a log level string.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }

    /// Returns the level as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// JSON lines.
    Json,
    /// Compact single-line text.
    Compact,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> HrmsConfig {
        let mut config = HrmsConfig::default();
        config.security.jwt.secret = SecretString::new("0123456789abcdef0123456789abcdef");
        config
    }

    #[test]
    fn test_defaults() {
        let config = HrmsConfig::default();
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.security.jwt.expiration_secs, 3600);
        assert_eq!(config.security.jwt.algorithm, JwtAlgorithm::HS256);
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert_eq!(config.seed.roles.len(), 2);
    }

    #[test]
    fn test_missing_secret_is_rejected() {
        let err = HrmsConfig::default().validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Validation { ref field, .. } if field == "security.jwt.secret"
        ));
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_lifetime_bounds() {
        let mut config = valid();
        config.security.jwt.expiration_secs = 0;
        assert!(config.validate().is_err());

        config.security.jwt.expiration_secs = MAX_JWT_EXPIRATION_SECS + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_seed_is_rejected() {
        let mut config = valid();
        config.seed.default_role = "Nobody".to_string();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "seed"));
    }

    #[test]
    fn test_secret_is_redacted() {
        let config = valid();
        assert!(!format!("{:?}", config).contains("0123456789abcdef"));
        assert!(!serde_json::to_string(&config).unwrap().contains("0123456789abcdef"));
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!(LogLevel::parse("WARNING"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("verbose"), None);
    }
}

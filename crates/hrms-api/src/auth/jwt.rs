// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! JWT token management.

use std::sync::Arc;

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, TokenData,
    Validation,
};
use serde::{Deserialize, Serialize};

use super::Claims;
use crate::error::{ApiError, ApiResult};

// =============================================================================
// JwtConfig
// =============================================================================

/// JWT configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    /// Secret key for signing tokens.
    #[serde(skip_serializing)]
    pub secret: String,
    /// Token issuer.
    pub issuer: String,
    /// Token audience.
    pub audience: String,
    /// Credential lifetime in seconds.
    pub expiration_secs: i64,
    /// Algorithm to use for signing.
    #[serde(with = "algorithm_serde")]
    pub algorithm: Algorithm,
    /// Clock skew tolerance in seconds.
    pub leeway_secs: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(), // Must be set by user
            issuer: "hrms".to_string(),
            audience: "hrms-api".to_string(),
            expiration_secs: 3600, // 1 hour
            algorithm: Algorithm::HS256,
            leeway_secs: 30,
        }
    }
}

impl JwtConfig {
    /// Creates a new configuration with the given secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Sets the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Sets the audience.
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = audience.into();
        self
    }

    /// Sets the credential lifetime in seconds.
    pub fn with_expiration_secs(mut self, secs: i64) -> Self {
        self.expiration_secs = secs;
        self
    }

    /// Sets the signing algorithm.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ApiResult<()> {
        if self.secret.is_empty() {
            return Err(ApiError::configuration("JWT secret is not configured"));
        }
        if !matches!(
            self.algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(ApiError::configuration(format!(
                "Unsupported JWT algorithm: {:?}",
                self.algorithm
            )));
        }
        if self.expiration_secs <= 0 {
            return Err(ApiError::configuration("JWT lifetime must be positive"));
        }
        if self.secret.len() < 32 {
            tracing::warn!("JWT secret is shorter than recommended (32 bytes)");
        }
        Ok(())
    }
}

// =============================================================================
// JwtManager
// =============================================================================

/// Signs and validates credentials.
///
/// Validation checks signature, expiry, issuer and audience. A credential
/// that fails any check is rejected regardless of what it claims.
#[derive(Clone)]
pub struct JwtManager {
    config: Arc<JwtConfig>,
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
    validation: Arc<Validation>,
}

impl JwtManager {
    /// Creates a new JWT manager with the given configuration.
    pub fn new(config: JwtConfig) -> ApiResult<Self> {
        config.validate()?;

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(config.algorithm);
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);
        validation.leeway = config.leeway_secs;

        Ok(Self {
            config: Arc::new(config),
            encoding_key: Arc::new(encoding_key),
            decoding_key: Arc::new(decoding_key),
            validation: Arc::new(validation),
        })
    }

    /// Signs the given claims.
    pub fn create_token(&self, claims: &Claims) -> ApiResult<String> {
        let header = Header::new(self.config.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| ApiError::internal(format!("Failed to create token: {}", e)))
    }

    /// Validates and decodes a token.
    pub fn validate_token(&self, token: &str) -> ApiResult<TokenData<Claims>> {
        decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => ApiError::unauthorized("Token has expired"),
                ErrorKind::InvalidToken => ApiError::unauthorized("Invalid token format"),
                ErrorKind::InvalidSignature => ApiError::unauthorized("Invalid token signature"),
                ErrorKind::InvalidIssuer => ApiError::unauthorized("Invalid token issuer"),
                ErrorKind::InvalidAudience => ApiError::unauthorized("Invalid token audience"),
                _ => ApiError::unauthorized(format!("Token validation failed: {}", e)),
            }
        })
    }

    /// Returns the configured issuer.
    pub fn issuer(&self) -> &str {
        &self.config.issuer
    }

    /// Returns the configured audience.
    pub fn audience(&self) -> &str {
        &self.config.audience
    }

    /// Returns the credential lifetime in seconds.
    pub fn expiration_secs(&self) -> i64 {
        self.config.expiration_secs
    }
}

impl std::fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtManager")
            .field("issuer", &self.config.issuer)
            .field("audience", &self.config.audience)
            .field("algorithm", &self.config.algorithm)
            .field("expiration_secs", &self.config.expiration_secs)
            .finish()
    }
}

// =============================================================================
// Algorithm Serialization
// =============================================================================

mod algorithm_serde {
    use jsonwebtoken::Algorithm;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(algorithm: &Algorithm, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = match algorithm {
            Algorithm::HS384 => "HS384",
            Algorithm::HS512 => "HS512",
            _ => "HS256",
        };
        s.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Algorithm, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "HS256" => Ok(Algorithm::HS256),
            "HS384" => Ok(Algorithm::HS384),
            "HS512" => Ok(Algorithm::HS512),
            _ => Err(serde::de::Error::custom(format!(
                "Unsupported algorithm: {}",
                s
            ))),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig::new("test-secret-key-that-is-long-enough-for-testing")
    }

    fn claims_for(manager: &JwtManager, expires_in: i64) -> Claims {
        Claims::builder("alice")
            .user_id("u-1")
            .email("alice@example.com")
            .add_permission("View")
            .issuer(manager.issuer())
            .audience(manager.audience())
            .expires_in(expires_in)
            .build()
    }

    #[test]
    fn test_create_and_validate_token() {
        let manager = JwtManager::new(test_config()).unwrap();

        let claims = claims_for(&manager, 3600);
        let token = manager.create_token(&claims).unwrap();
        let token_data = manager.validate_token(&token).unwrap();

        assert_eq!(token_data.claims, claims);
    }

    #[test]
    fn test_missing_secret_is_configuration_error() {
        let err = JwtManager::new(JwtConfig::default()).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_expired_token() {
        let manager = JwtManager::new(test_config()).unwrap();

        let token = manager.create_token(&claims_for(&manager, -3600)).unwrap();

        let err = manager.validate_token(&token).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized { ref message } if message == "Token has expired"));
    }

    #[test]
    fn test_invalid_token() {
        let manager = JwtManager::new(test_config()).unwrap();
        assert!(manager.validate_token("invalid.token.here").is_err());
    }

    #[test]
    fn test_wrong_secret() {
        let manager1 = JwtManager::new(JwtConfig::new("secret-one-for-testing-purposes")).unwrap();
        let manager2 = JwtManager::new(JwtConfig::new("secret-two-for-testing-purposes")).unwrap();

        let token = manager1.create_token(&claims_for(&manager1, 3600)).unwrap();

        assert!(manager2.validate_token(&token).is_err());
    }

    #[test]
    fn test_wrong_audience() {
        let manager = JwtManager::new(test_config()).unwrap();
        let other = JwtManager::new(test_config().with_audience("payroll")).unwrap();

        let token = other.create_token(&claims_for(&other, 3600)).unwrap();

        assert!(manager.validate_token(&token).is_err());
    }

    #[test]
    fn test_algorithm_from_config() {
        let manager =
            JwtManager::new(test_config().with_algorithm(Algorithm::HS512)).unwrap();
        let token = manager.create_token(&claims_for(&manager, 3600)).unwrap();

        let header = jsonwebtoken::decode_header(&token).unwrap();
        assert_eq!(header.alg, Algorithm::HS512);
    }

    #[test]
    fn test_algorithm_serde() {
        let config: JwtConfig =
            serde_json::from_str(r#"{"secret":"s","algorithm":"HS384"}"#).unwrap();
        assert_eq!(config.algorithm, Algorithm::HS384);

        let result: Result<JwtConfig, _> = serde_json::from_str(r#"{"algorithm":"RS256"}"#);
        assert!(result.is_err());
    }
}

// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! JWT claims structure.

use chrono::{DateTime, Utc};
use hrms_core::PermissionSet;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried by an issued credential.
///
/// `roles` holds one entry per role and `permission` one entry per granted
/// identifier. Both are a snapshot taken at issuance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    // =========================================================================
    // Standard JWT Claims (RFC 7519)
    // =========================================================================
    /// Subject: the principal's username.
    pub sub: String,

    /// JWT ID, fresh per credential.
    pub jti: String,

    /// Issued at time (Unix timestamp).
    pub iat: i64,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Issuer.
    pub iss: String,

    /// Audience.
    pub aud: String,

    // =========================================================================
    // Custom Claims
    // =========================================================================
    /// Principal id.
    pub uid: String,

    /// Principal email.
    pub email: String,

    /// Role names.
    #[serde(default)]
    pub roles: Vec<String>,

    /// Granted permission identifiers.
    #[serde(default)]
    pub permission: Vec<String>,
}

impl Claims {
    /// Creates a builder for constructing claims.
    pub fn builder(subject: impl Into<String>) -> ClaimsBuilder {
        ClaimsBuilder::new(subject)
    }

    /// Returns the principal id.
    pub fn user_id(&self) -> &str {
        &self.uid
    }

    /// Returns `true` if the claims name the given role.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Returns `true` if the claims carry the given permission.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permission.iter().any(|p| p == permission)
    }

    /// Collects the permission claims into a set.
    pub fn permissions(&self) -> PermissionSet {
        self.permission.iter().map(String::as_str).collect()
    }

    /// Returns the expiration time as a DateTime.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

// =============================================================================
// Claims Builder
// =============================================================================

/// Builder for constructing credential claims.
#[derive(Debug)]
pub struct ClaimsBuilder {
    subject: String,
    user_id: String,
    email: String,
    roles: Vec<String>,
    permissions: Vec<String>,
    expires_in_secs: i64,
    issuer: String,
    audience: String,
}

impl ClaimsBuilder {
    /// Creates a new builder.
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            user_id: String::new(),
            email: String::new(),
            roles: Vec::new(),
            permissions: Vec::new(),
            expires_in_secs: 3600,
            issuer: String::new(),
            audience: String::new(),
        }
    }

    /// Sets the principal id.
    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    /// Sets the email.
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    /// Sets the roles.
    pub fn roles(mut self, roles: Vec<String>) -> Self {
        self.roles = roles;
        self
    }

    /// Sets the permission claims.
    pub fn permissions(mut self, permissions: &PermissionSet) -> Self {
        self.permissions = permissions.to_strings();
        self
    }

    /// Adds one permission claim.
    pub fn add_permission(mut self, permission: impl Into<String>) -> Self {
        self.permissions.push(permission.into());
        self
    }

    /// Sets the lifetime in seconds. Negative values produce expired claims.
    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.expires_in_secs = seconds;
        self
    }

    /// Sets the issuer.
    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Sets the audience.
    pub fn audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = audience.into();
        self
    }

    /// Builds the claims with a fresh `jti` and `iat = now`.
    pub fn build(self) -> Claims {
        let now = Utc::now().timestamp();

        Claims {
            sub: self.subject,
            jti: Uuid::now_v7().to_string(),
            iat: now,
            exp: now + self.expires_in_secs,
            iss: self.issuer,
            aud: self.audience,
            uid: self.user_id,
            email: self.email,
            roles: self.roles,
            permission: self.permissions,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_builder() {
        let permissions: PermissionSet = ["View", "Create"].into_iter().collect();
        let claims = Claims::builder("alice")
            .user_id("u-1")
            .email("alice@example.com")
            .roles(vec!["User".to_string()])
            .permissions(&permissions)
            .issuer("hrms")
            .audience("hrms-api")
            .build();

        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.user_id(), "u-1");
        assert!(claims.has_role("User"));
        assert!(claims.has_permission("View"));
        assert!(!claims.has_permission("Delete"));
        assert_eq!(claims.permission, vec!["Create", "View"]);
        assert!(claims.expires_at() > Some(Utc::now()));
    }

    #[test]
    fn test_fresh_jti_per_build() {
        let a = Claims::builder("alice").build();
        let b = Claims::builder("alice").build();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_repeated_permission_claim_serialization() {
        let claims = Claims::builder("alice")
            .add_permission("View")
            .add_permission("Update")
            .build();

        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["permission"], serde_json::json!(["View", "Update"]));
    }

    #[test]
    fn test_claims_expiration() {
        let expired = Claims::builder("alice").expires_in(-100).build();
        assert!(expired.expires_at() < Some(Utc::now()));
    }
}

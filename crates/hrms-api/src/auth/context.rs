// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication context.

use std::net::IpAddr;
use std::sync::Arc;

use hrms_core::PermissionSet;
use uuid::Uuid;

use super::Claims;

/// Authentication context for a request.
///
/// Built from a validated credential. Permissions come from the credential's
/// `permission` claims only; the store is never consulted.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Principal id (`uid`).
    pub user_id: String,
    /// Username (`sub`).
    pub username: String,
    /// Email.
    pub email: String,
    /// Roles.
    pub roles: Vec<String>,
    /// Permissions carried by the credential.
    pub permissions: Arc<PermissionSet>,
    /// Credential id (`jti`).
    pub token_id: Option<String>,
    /// Client IP address.
    pub client_ip: Option<IpAddr>,
    /// Request ID for tracing.
    pub request_id: Uuid,
}

impl AuthContext {
    /// Creates a context from validated claims.
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            user_id: claims.uid.clone(),
            username: claims.sub.clone(),
            email: claims.email.clone(),
            roles: claims.roles.clone(),
            permissions: Arc::new(claims.permissions()),
            token_id: Some(claims.jti.clone()),
            client_ip: None,
            request_id: Uuid::now_v7(),
        }
    }

    /// Creates an anonymous context (for public routes).
    pub fn anonymous() -> Self {
        Self {
            user_id: String::new(),
            username: "anonymous".to_string(),
            email: String::new(),
            roles: Vec::new(),
            permissions: Arc::new(PermissionSet::new()),
            token_id: None,
            client_ip: None,
            request_id: Uuid::now_v7(),
        }
    }

    /// Sets the client IP address.
    pub fn with_client_ip(mut self, ip: IpAddr) -> Self {
        self.client_ip = Some(ip);
        self
    }

    /// Sets the request ID.
    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = request_id;
        self
    }

    /// Returns `true` if the context has the given role.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Returns `true` if the credential carries the given permission.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    /// Returns `true` if this is an anonymous context.
    pub fn is_anonymous(&self) -> bool {
        self.token_id.is_none()
    }
}

impl Default for AuthContext {
    fn default() -> Self {
        Self::anonymous()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_context_from_claims() {
        let claims = Claims::builder("alice")
            .user_id("u-1")
            .roles(vec!["User".to_string()])
            .add_permission("View")
            .build();

        let ctx = AuthContext::from_claims(&claims);

        assert_eq!(ctx.user_id, "u-1");
        assert_eq!(ctx.username, "alice");
        assert!(ctx.has_role("User"));
        assert!(ctx.has_permission("View"));
        assert!(!ctx.has_permission("Create"));
        assert!(!ctx.is_anonymous());
    }

    #[test]
    fn test_anonymous_context() {
        let ctx = AuthContext::anonymous();

        assert!(ctx.is_anonymous());
        assert!(ctx.roles.is_empty());
        assert!(ctx.permissions.is_empty());
    }
}

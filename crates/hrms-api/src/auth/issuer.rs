// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Credential issuance.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use hrms_core::Principal;
use hrms_store::StoreHandle;
use serde::Serialize;
use tracing::{debug, info};

use super::{Claims, JwtManager};
use crate::error::ApiResult;

/// A signed credential and the claims it carries.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedCredential {
    /// Encoded JWT.
    pub token: String,
    /// Lifetime in seconds.
    pub expires_in: i64,
    /// Absolute expiry.
    pub expires_at: Option<DateTime<Utc>>,
    /// Claims embedded in the token.
    pub claims: Claims,
}

/// Resolves a principal's grants and signs a credential for them.
///
/// Only reads the store. Dropping the future before it resolves leaves
/// nothing behind.
#[derive(Debug, Clone)]
pub struct CredentialIssuer {
    store: StoreHandle,
    jwt: Arc<JwtManager>,
}

impl CredentialIssuer {
    /// Creates an issuer.
    pub fn new(store: StoreHandle, jwt: Arc<JwtManager>) -> Self {
        Self { store, jwt }
    }

    /// Verifies the password for an email or username and issues a credential.
    ///
    /// Unknown login and wrong password fail identically.
    pub async fn login(&self, login: &str, password: &str) -> ApiResult<IssuedCredential> {
        let principal = self
            .store
            .identities
            .verify_password(login, password)
            .await
            .inspect_err(|e| debug!(error = %e, "Login rejected"))?;

        let credential = self.issue_for(&principal).await?;
        info!(
            user_id = %principal.id,
            username = %principal.username,
            roles = ?credential.claims.roles,
            "Issued credential"
        );
        Ok(credential)
    }

    /// Issues a credential for an already-verified principal.
    pub async fn issue_for(&self, principal: &Principal) -> ApiResult<IssuedCredential> {
        let roles = self.store.identities.roles_of(&principal.id).await?;
        let permissions = self.store.roles.permissions_for_roles(&roles).await?;

        let claims = Claims::builder(&principal.username)
            .user_id(&principal.id)
            .email(&principal.email)
            .roles(roles)
            .permissions(&permissions)
            .expires_in(self.jwt.expiration_secs())
            .issuer(self.jwt.issuer())
            .audience(self.jwt.audience())
            .build();

        let token = self.jwt.create_token(&claims)?;

        Ok(IssuedCredential {
            token,
            expires_in: self.jwt.expiration_secs(),
            expires_at: claims.expires_at(),
            claims,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::JwtConfig;
    use crate::error::ApiError;
    use hrms_core::{AccessError, NewPrincipal};
    use hrms_store::{HashCost, MemoryStore, PasswordHashing};

    async fn setup() -> (CredentialIssuer, StoreHandle, Arc<JwtManager>) {
        let store = StoreHandle::new(Arc::new(MemoryStore::with_hashing(PasswordHashing::new(
            HashCost::Low,
        ))));
        let jwt = Arc::new(
            JwtManager::new(JwtConfig::new("test-secret-key-that-is-long-enough-for-testing"))
                .unwrap(),
        );

        for role in ["Admin", "User"] {
            store.roles.create_role(role).await.unwrap();
        }
        store.roles.grant("User", &"View".into()).await.unwrap();
        store.roles.grant("Admin", &"View".into()).await.unwrap();
        store.roles.grant("Admin", &"Delete".into()).await.unwrap();

        let principal = store
            .identities
            .create_principal(NewPrincipal {
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                full_name: "Alice".to_string(),
                password: "secret1".to_string(),
            })
            .await
            .unwrap();
        store.identities.add_to_role(&principal.id, "User").await.unwrap();
        store.identities.add_to_role(&principal.id, "Admin").await.unwrap();

        (CredentialIssuer::new(store.clone(), jwt.clone()), store, jwt)
    }

    #[tokio::test]
    async fn test_login_issues_union_of_grants() {
        let (issuer, _, jwt) = setup().await;

        let credential = issuer.login("alice@example.com", "secret1").await.unwrap();

        assert_eq!(credential.claims.sub, "alice");
        assert_eq!(credential.claims.email, "alice@example.com");
        assert_eq!(credential.claims.permission, vec!["Delete", "View"]);
        assert!(credential.claims.has_role("Admin"));
        assert!(credential.claims.has_role("User"));
        assert_eq!(credential.claims.iss, "hrms");
        assert_eq!(credential.claims.aud, "hrms-api");

        let decoded = jwt.validate_token(&credential.token).unwrap();
        assert_eq!(decoded.claims, credential.claims);
    }

    #[tokio::test]
    async fn test_login_by_username() {
        let (issuer, _, _) = setup().await;
        assert!(issuer.login("alice", "secret1").await.is_ok());
    }

    #[tokio::test]
    async fn test_failures_are_indistinguishable() {
        let (issuer, _, _) = setup().await;

        let wrong_password = issuer.login("alice", "nope").await.unwrap_err();
        let unknown_user = issuer.login("mallory", "secret1").await.unwrap_err();

        for err in [wrong_password, unknown_user] {
            assert!(matches!(err, ApiError::Access(AccessError::AuthenticationFailed)));
            assert_eq!(err.user_message(), "Invalid credentials");
        }
    }

    #[tokio::test]
    async fn test_fresh_jti_per_login() {
        let (issuer, _, _) = setup().await;

        let a = issuer.login("alice", "secret1").await.unwrap();
        let b = issuer.login("alice", "secret1").await.unwrap();
        assert_ne!(a.claims.jti, b.claims.jti);
    }
}

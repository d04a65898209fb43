// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-memory store for tests and development.
//!
//! All state sits behind a single `parking_lot::RwLock`, so a grant and its
//! role claim are written under the same guard and every check happens
//! before the first mutation. Data is lost when the store is dropped.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use tracing::debug;

use hrms_core::{
    AccessError, AccessResult, NewPrincipal, PermissionId, PermissionSet, Principal,
    PrincipalUpdate, ResourceKind,
};

use crate::error::StoreResultExt;
use crate::password::PasswordHashing;
use crate::traits::{IdentityStore, RoleClaim, RolePermissionStore};

#[derive(Clone)]
struct PrincipalRecord {
    principal: Principal,
    password_hash: String,
}

#[derive(Default)]
struct State {
    /// Role name to grants. Key presence means the role exists.
    grants: BTreeMap<String, BTreeSet<PermissionId>>,
    role_claims: BTreeMap<String, BTreeSet<RoleClaim>>,
    principals: BTreeMap<String, PrincipalRecord>,
    /// Principal id to role names.
    memberships: BTreeMap<String, BTreeSet<String>>,
}

impl State {
    fn require_role(&self, role: &str) -> AccessResult<()> {
        if self.grants.contains_key(role) {
            Ok(())
        } else {
            Err(AccessError::not_found(ResourceKind::Role, role))
        }
    }

    fn find_login(&self, login: &str) -> Option<&PrincipalRecord> {
        self.principals.values().find(|r| {
            r.principal.email.eq_ignore_ascii_case(login)
                || r.principal.username.eq_ignore_ascii_case(login)
        })
    }

    fn check_unique(&self, username: &str, email: &str, except_id: Option<&str>) -> AccessResult<()> {
        for record in self.principals.values() {
            if Some(record.principal.id.as_str()) == except_id {
                continue;
            }
            // Both columns share one login namespace.
            let taken = |login: &str| {
                record.principal.username.eq_ignore_ascii_case(login)
                    || record.principal.email.eq_ignore_ascii_case(login)
            };
            if taken(username) {
                return Err(AccessError::conflict(ResourceKind::Principal, username));
            }
            if taken(email) {
                return Err(AccessError::conflict(ResourceKind::Principal, email));
            }
        }
        Ok(())
    }
}

/// An in-memory implementation of both store traits.
pub struct MemoryStore {
    state: RwLock<State>,
    hashing: PasswordHashing,
}

impl MemoryStore {
    /// Creates an empty store with standard password hashing.
    pub fn new() -> Self {
        Self::with_hashing(PasswordHashing::default())
    }

    /// Creates an empty store with the given password hashing.
    pub fn with_hashing(hashing: PasswordHashing) -> Self {
        Self {
            state: RwLock::new(State::default()),
            hashing,
        }
    }

    async fn hash(&self, password: String) -> AccessResult<String> {
        let hashing = self.hashing;
        tokio::task::spawn_blocking(move || hashing.hash(&password))
            .await
            .store_err()?
            .store_err()
    }

    async fn verify(&self, phc: String, password: String) -> AccessResult<bool> {
        let hashing = self.hashing;
        tokio::task::spawn_blocking(move || hashing.verify(&phc, &password))
            .await
            .store_err()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("MemoryStore")
            .field("roles", &state.grants.len())
            .field("principals", &state.principals.len())
            .finish()
    }
}

// =============================================================================
// Role-Permission Store
// =============================================================================

#[async_trait]
impl RolePermissionStore for MemoryStore {
    async fn create_role(&self, role: &str) -> AccessResult<()> {
        let mut state = self.state.write();
        if state.grants.contains_key(role) {
            return Err(AccessError::conflict(ResourceKind::Role, role));
        }
        state.grants.insert(role.to_string(), BTreeSet::new());
        state.role_claims.insert(role.to_string(), BTreeSet::new());
        debug!(role, "Role created");
        Ok(())
    }

    async fn delete_role(&self, role: &str) -> AccessResult<()> {
        let mut state = self.state.write();
        state.require_role(role)?;
        state.grants.remove(role);
        state.role_claims.remove(role);
        for roles in state.memberships.values_mut() {
            roles.remove(role);
        }
        debug!(role, "Role deleted");
        Ok(())
    }

    async fn role_exists(&self, role: &str) -> AccessResult<bool> {
        Ok(self.state.read().grants.contains_key(role))
    }

    async fn list_roles(&self) -> AccessResult<Vec<String>> {
        Ok(self.state.read().grants.keys().cloned().collect())
    }

    async fn grant(&self, role: &str, permission: &PermissionId) -> AccessResult<()> {
        let mut state = self.state.write();
        state.require_role(role)?;

        let claim = RoleClaim::permission(permission.as_str());
        let has_grant = state
            .grants
            .get(role)
            .is_some_and(|g| g.contains(permission));
        if has_grant {
            return Err(AccessError::grant_conflict(role, permission.as_str()));
        }

        if let Some(grants) = state.grants.get_mut(role) {
            grants.insert(permission.clone());
        }
        state
            .role_claims
            .entry(role.to_string())
            .or_default()
            .insert(claim);
        Ok(())
    }

    async fn revoke(&self, role: &str, permission: &str) -> AccessResult<()> {
        let mut state = self.state.write();
        state.require_role(role)?;

        let removed = state
            .grants
            .get_mut(role)
            .is_some_and(|g| g.remove(permission));
        if !removed {
            return Err(AccessError::grant_not_found(role, permission));
        }

        if let Some(claims) = state.role_claims.get_mut(role) {
            claims.remove(&RoleClaim::permission(permission));
        }
        Ok(())
    }

    async fn list_for_role(&self, role: &str) -> AccessResult<PermissionSet> {
        let state = self.state.read();
        state
            .grants
            .get(role)
            .map(|g| g.iter().cloned().collect())
            .ok_or_else(|| AccessError::not_found(ResourceKind::Role, role))
    }

    async fn list_all(&self) -> AccessResult<PermissionSet> {
        let state = self.state.read();
        Ok(state.grants.values().flatten().cloned().collect())
    }

    async fn permissions_for_roles(&self, roles: &[String]) -> AccessResult<PermissionSet> {
        let state = self.state.read();
        Ok(roles
            .iter()
            .filter_map(|r| state.grants.get(r))
            .flatten()
            .cloned()
            .collect())
    }

    async fn grant_count(&self) -> AccessResult<usize> {
        Ok(self.state.read().grants.values().map(BTreeSet::len).sum())
    }
}

// =============================================================================
// Identity Store
// =============================================================================

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn create_principal(&self, new: NewPrincipal) -> AccessResult<Principal> {
        new.validate()?;
        self.state.read().check_unique(&new.username, &new.email, None)?;

        let password_hash = self.hash(new.password).await?;
        let principal = Principal {
            id: uuid::Uuid::now_v7().to_string(),
            username: new.username,
            email: new.email,
            full_name: new.full_name,
            created_at: Utc::now(),
        };

        let mut state = self.state.write();
        // Re-checked under the write guard; the hash was computed unlocked.
        state.check_unique(&principal.username, &principal.email, None)?;
        state.principals.insert(
            principal.id.clone(),
            PrincipalRecord {
                principal: principal.clone(),
                password_hash,
            },
        );
        state.memberships.insert(principal.id.clone(), BTreeSet::new());
        Ok(principal)
    }

    async fn find_by_id(&self, id: &str) -> AccessResult<Option<Principal>> {
        Ok(self
            .state
            .read()
            .principals
            .get(id)
            .map(|r| r.principal.clone()))
    }

    async fn find_by_login(&self, login: &str) -> AccessResult<Option<Principal>> {
        Ok(self.state.read().find_login(login).map(|r| r.principal.clone()))
    }

    async fn list_principals(&self) -> AccessResult<Vec<Principal>> {
        let state = self.state.read();
        let mut principals: Vec<Principal> =
            state.principals.values().map(|r| r.principal.clone()).collect();
        principals.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(principals)
    }

    async fn update_principal(
        &self,
        id: &str,
        update: PrincipalUpdate,
    ) -> AccessResult<Principal> {
        update.validate()?;

        let current_hash = self
            .state
            .read()
            .principals
            .get(id)
            .map(|r| r.password_hash.clone())
            .ok_or_else(|| AccessError::not_found(ResourceKind::Principal, id))?;

        let new_hash = match (update.current_password, update.new_password) {
            (Some(current), Some(new)) => {
                if !self.verify(current_hash, current).await? {
                    return Err(AccessError::invalid(
                        "current_password",
                        "does not match",
                    ));
                }
                Some(self.hash(new).await?)
            }
            _ => None,
        };

        let mut state = self.state.write();
        let existing = state
            .principals
            .get(id)
            .cloned()
            .ok_or_else(|| AccessError::not_found(ResourceKind::Principal, id))?;

        let mut principal = existing.principal;
        if let Some(username) = update.username {
            principal.username = username;
        }
        if let Some(email) = update.email {
            principal.email = email;
        }
        if let Some(full_name) = update.full_name {
            principal.full_name = full_name;
        }
        state.check_unique(&principal.username, &principal.email, Some(id))?;

        state.principals.insert(
            id.to_string(),
            PrincipalRecord {
                principal: principal.clone(),
                password_hash: new_hash.unwrap_or(existing.password_hash),
            },
        );
        Ok(principal)
    }

    async fn delete_principal(&self, id: &str) -> AccessResult<()> {
        let mut state = self.state.write();
        if state.principals.remove(id).is_none() {
            return Err(AccessError::not_found(ResourceKind::Principal, id));
        }
        state.memberships.remove(id);
        Ok(())
    }

    async fn verify_password(&self, login: &str, password: &str) -> AccessResult<Principal> {
        let record = self.state.read().find_login(login).cloned();
        let Some(record) = record else {
            return Err(AccessError::AuthenticationFailed);
        };

        if self
            .verify(record.password_hash, password.to_string())
            .await?
        {
            Ok(record.principal)
        } else {
            Err(AccessError::AuthenticationFailed)
        }
    }

    async fn roles_of(&self, id: &str) -> AccessResult<Vec<String>> {
        self.state
            .read()
            .memberships
            .get(id)
            .map(|roles| roles.iter().cloned().collect())
            .ok_or_else(|| AccessError::not_found(ResourceKind::Principal, id))
    }

    async fn add_to_role(&self, id: &str, role: &str) -> AccessResult<()> {
        let mut state = self.state.write();
        state.require_role(role)?;
        let roles = state
            .memberships
            .get_mut(id)
            .ok_or_else(|| AccessError::not_found(ResourceKind::Principal, id))?;
        if !roles.insert(role.to_string()) {
            return Err(AccessError::conflict(
                ResourceKind::Membership,
                format!("{}/{}", id, role),
            ));
        }
        Ok(())
    }

    async fn remove_from_role(&self, id: &str, role: &str) -> AccessResult<()> {
        let mut state = self.state.write();
        state.require_role(role)?;
        let roles = state
            .memberships
            .get_mut(id)
            .ok_or_else(|| AccessError::not_found(ResourceKind::Principal, id))?;
        if !roles.remove(role) {
            return Err(AccessError::not_found(
                ResourceKind::Membership,
                format!("{}/{}", id, role),
            ));
        }
        Ok(())
    }

    async fn users_in_role(&self, role: &str) -> AccessResult<Vec<Principal>> {
        let state = self.state.read();
        state.require_role(role)?;
        let mut members: Vec<Principal> = state
            .memberships
            .iter()
            .filter(|(_, roles)| roles.contains(role))
            .filter_map(|(id, _)| state.principals.get(id))
            .map(|r| r.principal.clone())
            .collect();
        members.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(members)
    }

    async fn role_claims(&self, role: &str) -> AccessResult<Vec<RoleClaim>> {
        let state = self.state.read();
        state.require_role(role)?;
        Ok(state
            .role_claims
            .get(role)
            .map(|c| c.iter().cloned().collect())
            .unwrap_or_default())
    }
}

// =============================================================================
// Tests
// =============================================================================

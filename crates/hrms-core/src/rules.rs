// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Baseline roles and seed configuration.
//!
//! A [`SeedConfig`] is loaded once at startup and handed to the bootstrap
//! seeder. Each [`BaselineRole`] carries a [`GrantRule`], a predicate over
//! permission identifiers that is evaluated against the current catalog.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::PermissionCatalog;
use crate::error::{AccessError, AccessResult};
use crate::permission::{PermissionId, PermissionSet};

/// Name of the administrative role.
pub const ADMIN_ROLE: &str = "Admin";

/// Name of the default role given to self-registered principals.
pub const USER_ROLE: &str = "User";

// =============================================================================
// Grant Rule
// =============================================================================

/// Which catalog identifiers a baseline role receives.
///
/// In YAML: `all`, `{ only: [View] }` or `{ except: [Delete] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantRule {
    /// Every identifier in the catalog.
    All,
    /// Only the listed identifiers.
    Only(Vec<PermissionId>),
    /// Every identifier except the listed ones.
    Except(Vec<PermissionId>),
}

impl GrantRule {
    /// Returns `true` if the rule grants the identifier.
    pub fn allows(&self, permission: &PermissionId) -> bool {
        match self {
            GrantRule::All => true,
            GrantRule::Only(list) => list.contains(permission),
            GrantRule::Except(list) => !list.contains(permission),
        }
    }

    /// Evaluates the rule against a catalog.
    pub fn select(&self, catalog: &PermissionCatalog) -> PermissionSet {
        catalog
            .permissions()
            .iter()
            .filter(|p| self.allows(p))
            .cloned()
            .collect()
    }
}

impl Default for GrantRule {
    fn default() -> Self {
        GrantRule::Only(Vec::new())
    }
}

/// A role ensured at every start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineRole {
    /// Role name.
    pub name: String,
    /// Grant rule.
    #[serde(default)]
    pub rule: GrantRule,
}

impl BaselineRole {
    /// Creates a baseline role.
    pub fn new(name: impl Into<String>, rule: GrantRule) -> Self {
        Self {
            name: name.into(),
            rule,
        }
    }
}

// =============================================================================
// Admin Seed
// =============================================================================

/// The initial administrative principal.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminSeed {
    /// Username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// Initial password. Used only when the principal is created.
    #[serde(skip_serializing)]
    pub password: String,
    /// Role assigned on creation.
    pub role: String,
}

impl Default for AdminSeed {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            email: "admin@example.com".to_string(),
            full_name: "Admin User".to_string(),
            password: "Admin@123".to_string(),
            role: ADMIN_ROLE.to_string(),
        }
    }
}

impl fmt::Debug for AdminSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminSeed")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("full_name", &self.full_name)
            .field("password", &"[REDACTED]")
            .field("role", &self.role)
            .finish()
    }
}

// =============================================================================
// Seed Config
// =============================================================================

/// Baseline roles, their rules and the admin principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Roles ensured at start, in order.
    pub roles: Vec<BaselineRole>,
    /// Administrative principal.
    pub admin: AdminSeed,
    /// Role given to self-registered principals.
    pub default_role: String,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            roles: vec![
                BaselineRole::new(ADMIN_ROLE, GrantRule::All),
                BaselineRole::new(USER_ROLE, GrantRule::Only(vec![PermissionId::new("View")])),
            ],
            admin: AdminSeed::default(),
            default_role: USER_ROLE.to_string(),
        }
    }
}

impl SeedConfig {
    /// Returns the baseline role with the given name.
    pub fn role(&self, name: &str) -> Option<&BaselineRole> {
        self.roles.iter().find(|r| r.name == name)
    }

    /// Validates the seed configuration.
    pub fn validate(&self) -> AccessResult<()> {
        let mut names = HashSet::new();
        for role in &self.roles {
            if role.name.trim().is_empty() {
                return Err(AccessError::configuration("baseline role name is empty"));
            }
            if !names.insert(role.name.as_str()) {
                return Err(AccessError::configuration(format!(
                    "baseline role '{}' declared more than once",
                    role.name
                )));
            }
        }

        if self.admin.username.trim().is_empty() || self.admin.email.trim().is_empty() {
            return Err(AccessError::configuration(
                "admin principal needs a username and an email",
            ));
        }
        if self.admin.password.is_empty() {
            return Err(AccessError::configuration("admin principal password is empty"));
        }
        if !names.contains(self.admin.role.as_str()) {
            return Err(AccessError::configuration(format!(
                "admin role '{}' is not a baseline role",
                self.admin.role
            )));
        }
        if !names.contains(self.default_role.as_str()) {
            return Err(AccessError::configuration(format!(
                "default role '{}' is not a baseline role",
                self.default_role
            )));
        }

        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogBuilder, OperationSpec};

    fn catalog() -> PermissionCatalog {
        CatalogBuilder::new()
            .operation(OperationSpec::read("a", "/a"))
            .operation(OperationSpec::create("b", "/b"))
            .operation(OperationSpec::update("c", "/c"))
            .operation(OperationSpec::delete("d", "/d"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_default_rules_select_expected_grants() {
        let seed = SeedConfig::default();
        let catalog = catalog();

        let admin = seed.role(ADMIN_ROLE).unwrap().rule.select(&catalog);
        assert_eq!(admin.to_strings(), vec!["Create", "Delete", "Update", "View"]);

        let user = seed.role(USER_ROLE).unwrap().rule.select(&catalog);
        assert_eq!(user.to_strings(), vec!["View"]);
    }

    #[test]
    fn test_only_rule_ignores_identifiers_outside_catalog() {
        let rule = GrantRule::Only(vec!["View".into(), "Approve".into()]);
        assert_eq!(rule.select(&catalog()).to_strings(), vec!["View"]);
    }

    #[test]
    fn test_except_rule() {
        let rule = GrantRule::Except(vec!["Delete".into()]);
        assert_eq!(
            rule.select(&catalog()).to_strings(),
            vec!["Create", "Update", "View"]
        );
    }

    #[test]
    fn test_grant_rule_serde_forms() {
        let all: GrantRule = serde_json::from_str("\"all\"").unwrap();
        assert_eq!(all, GrantRule::All);

        let only: GrantRule = serde_json::from_str(r#"{"only":["View"]}"#).unwrap();
        assert_eq!(only, GrantRule::Only(vec!["View".into()]));
    }

    #[test]
    fn test_default_seed_is_valid() {
        assert!(SeedConfig::default().validate().is_ok());
    }

    #[test]
    fn test_seed_rejects_unknown_admin_role() {
        let mut seed = SeedConfig::default();
        seed.admin.role = "Root".to_string();
        assert!(seed.validate().unwrap_err().is_fatal());
    }

    #[test]
    fn test_seed_rejects_duplicate_role() {
        let mut seed = SeedConfig::default();
        seed.roles.push(BaselineRole::new(USER_ROLE, GrantRule::All));
        assert!(seed.validate().is_err());
    }

    #[test]
    fn test_admin_password_is_redacted() {
        let debug = format!("{:?}", AdminSeed::default());
        assert!(!debug.contains("Admin@123"));

        let json = serde_json::to_string(&AdminSeed::default()).unwrap();
        assert!(!json.contains("Admin@123"));
    }
}

// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Principal (user account) records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AccessError, AccessResult};

/// Minimum password length accepted for new principals.
pub const MIN_PASSWORD_LEN: usize = 6;

/// A stored principal. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Stable identifier.
    pub id: String,
    /// Unique username.
    pub username: String,
    /// Unique email address.
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Input for creating a principal.
#[derive(Clone, Deserialize)]
pub struct NewPrincipal {
    /// Unique username.
    pub username: String,
    /// Unique email address.
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// Plaintext password; hashed by the store.
    pub password: String,
}

impl std::fmt::Debug for NewPrincipal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewPrincipal")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("full_name", &self.full_name)
            .finish_non_exhaustive()
    }
}

impl NewPrincipal {
    /// Validates field shapes.
    pub fn validate(&self) -> AccessResult<()> {
        require_non_empty("username", &self.username)?;
        require_non_empty("full_name", &self.full_name)?;
        validate_email(&self.email)?;
        validate_password(&self.password)
    }
}

/// Partial update of a principal.
///
/// Changing the password requires `current_password` and a `new_password`
/// different from it.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct PrincipalUpdate {
    /// New username.
    pub username: Option<String>,
    /// New email address.
    pub email: Option<String>,
    /// New display name.
    pub full_name: Option<String>,
    /// Current password, required with `new_password`.
    pub current_password: Option<String>,
    /// New password.
    pub new_password: Option<String>,
}

impl std::fmt::Debug for PrincipalUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrincipalUpdate")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("full_name", &self.full_name)
            .field("changes_password", &self.new_password.is_some())
            .finish()
    }
}

impl PrincipalUpdate {
    /// Validates field shapes and the password-change pairing.
    pub fn validate(&self) -> AccessResult<()> {
        if let Some(username) = &self.username {
            require_non_empty("username", username)?;
        }
        if let Some(full_name) = &self.full_name {
            require_non_empty("full_name", full_name)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }

        match (&self.current_password, &self.new_password) {
            (_, None) => Ok(()),
            (None, Some(_)) => Err(AccessError::invalid(
                "current_password",
                "required to change the password",
            )),
            (Some(current), Some(new)) if current == new => Err(AccessError::invalid(
                "new_password",
                "must differ from the current password",
            )),
            (Some(_), Some(new)) => validate_password(new),
        }
    }

    /// Returns `true` if the update changes the password.
    pub fn changes_password(&self) -> bool {
        self.new_password.is_some()
    }
}

fn require_non_empty(field: &str, value: &str) -> AccessResult<()> {
    if value.trim().is_empty() {
        return Err(AccessError::invalid(field, "must not be empty"));
    }
    Ok(())
}

fn validate_email(email: &str) -> AccessResult<()> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(AccessError::invalid("email", "not a valid email address")),
    }
}

fn validate_password(password: &str) -> AccessResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AccessError::invalid(
            "password",
            format!("must be at least {} characters", MIN_PASSWORD_LEN),
        ));
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

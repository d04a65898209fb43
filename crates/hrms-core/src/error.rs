// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Access-control error taxonomy.
//!
//! Every component of the engine reports failures through [`AccessError`].
//! The HTTP layer maps each variant onto a status code; the binary maps
//! [`AccessError::Configuration`] onto a startup abort.

use std::fmt;

use thiserror::Error;

/// Result type alias for access-control operations.
pub type AccessResult<T> = Result<T, AccessError>;

/// The kind of resource named in a not-found or conflict failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// A role.
    Role,
    /// A permission identifier.
    Permission,
    /// A (role, permission) grant.
    Grant,
    /// A principal (user account).
    Principal,
    /// A role membership of a principal.
    Membership,
}

impl ResourceKind {
    /// Returns the resource kind as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Role => "role",
            ResourceKind::Permission => "permission",
            ResourceKind::Grant => "grant",
            ResourceKind::Principal => "principal",
            ResourceKind::Membership => "membership",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by the access-control engine.
#[derive(Debug, Error)]
pub enum AccessError {
    /// Bad credentials. Never says which factor failed.
    #[error("Invalid credentials")]
    AuthenticationFailed,

    /// Valid principal without the required permission.
    #[error("Permission '{permission}' required")]
    AuthorizationDenied {
        /// The permission that was missing.
        permission: String,
    },

    /// Unknown role, permission, grant or principal.
    #[error("{kind} not found: {name}")]
    NotFound {
        /// What was looked up.
        kind: ResourceKind,
        /// The offending name.
        name: String,
    },

    /// Duplicate grant, role or principal.
    #[error("{kind} already exists: {name}")]
    Conflict {
        /// What collided.
        kind: ResourceKind,
        /// The offending name.
        name: String,
    },

    /// Input rejected before reaching a store.
    #[error("Invalid {field}: {message}")]
    Invalid {
        /// The offending field.
        field: String,
        /// Why it was rejected.
        message: String,
    },

    /// Startup-fatal misconfiguration.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message.
        message: String,
    },

    /// Backend I/O failure.
    #[error("Storage error: {message}")]
    Storage {
        /// Error message.
        message: String,
    },
}

impl AccessError {
    /// Creates a not found error.
    pub fn not_found(kind: ResourceKind, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Creates a conflict error.
    pub fn conflict(kind: ResourceKind, name: impl Into<String>) -> Self {
        Self::Conflict {
            kind,
            name: name.into(),
        }
    }

    /// Creates a not found error for a (role, permission) grant.
    pub fn grant_not_found(role: &str, permission: &str) -> Self {
        Self::not_found(ResourceKind::Grant, grant_name(role, permission))
    }

    /// Creates a conflict error for a (role, permission) grant.
    pub fn grant_conflict(role: &str, permission: &str) -> Self {
        Self::conflict(ResourceKind::Grant, grant_name(role, permission))
    }

    /// Creates an authorization error.
    pub fn denied(permission: impl Into<String>) -> Self {
        Self::AuthorizationDenied {
            permission: permission.into(),
        }
    }

    /// Creates a validation error.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Returns `true` for not found errors.
    pub fn is_not_found(&self) -> bool {
        matches!(self, AccessError::NotFound { .. })
    }

    /// Returns `true` for conflict errors.
    pub fn is_conflict(&self) -> bool {
        matches!(self, AccessError::Conflict { .. })
    }

    /// Returns `true` if this error must abort startup.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AccessError::Configuration { .. })
    }
}

fn grant_name(role: &str, permission: &str) -> String {
    format!("{}/{}", role, permission)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_errors_name_role_and_permission() {
        let err = AccessError::grant_conflict("User", "View");
        assert_eq!(err.to_string(), "grant already exists: User/View");
        assert!(err.is_conflict());

        let err = AccessError::grant_not_found("User", "Delete");
        assert_eq!(err.to_string(), "grant not found: User/Delete");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_authentication_message_is_generic() {
        assert_eq!(
            AccessError::AuthenticationFailed.to_string(),
            "Invalid credentials"
        );
    }

    #[test]
    fn test_only_configuration_is_fatal() {
        assert!(AccessError::configuration("empty catalog").is_fatal());
        assert!(!AccessError::storage("disk").is_fatal());
        assert!(!AccessError::not_found(ResourceKind::Role, "x").is_fatal());
    }
}

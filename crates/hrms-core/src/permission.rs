// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Permission identifiers.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque permission identifier such as `View` or `Create`.
///
/// Identifiers are derived from the invocation kind of protected
/// operations; see [`crate::catalog::KindMapping`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionId(String);

impl PermissionId {
    /// Creates a permission identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PermissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PermissionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PermissionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for PermissionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for PermissionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// Permission Set
// =============================================================================

/// An ordered set of permission identifiers.
///
/// Ordering is lexical so that two sets built from the same identifiers in
/// different orders compare and serialize identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet {
    permissions: BTreeSet<PermissionId>,
}

impl PermissionSet {
    /// Creates an empty permission set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a permission. Returns `false` if it was already present.
    pub fn add(&mut self, permission: impl Into<PermissionId>) -> bool {
        self.permissions.insert(permission.into())
    }

    /// Removes a permission. Returns `false` if it was absent.
    pub fn remove(&mut self, permission: &str) -> bool {
        self.permissions.remove(permission)
    }

    /// Returns `true` if the set contains the permission.
    pub fn contains(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    /// Returns `true` if the set contains all the permissions.
    pub fn contains_all<'a>(&self, permissions: impl IntoIterator<Item = &'a str>) -> bool {
        permissions.into_iter().all(|p| self.contains(p))
    }

    /// Returns the number of permissions.
    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    /// Returns `true` if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }

    /// Returns an iterator over the permissions in lexical order.
    pub fn iter(&self) -> impl Iterator<Item = &PermissionId> {
        self.permissions.iter()
    }

    /// Merges another permission set into this one.
    pub fn merge(&mut self, other: &PermissionSet) {
        self.permissions.extend(other.permissions.iter().cloned());
    }

    /// Returns the permissions as plain strings in lexical order.
    pub fn to_strings(&self) -> Vec<String> {
        self.permissions.iter().map(|p| p.to_string()).collect()
    }
}

impl<P: Into<PermissionId>> FromIterator<P> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self {
            permissions: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<P: Into<PermissionId>> Extend<P> for PermissionSet {
    fn extend<I: IntoIterator<Item = P>>(&mut self, iter: I) {
        self.permissions.extend(iter.into_iter().map(Into::into));
    }
}

impl IntoIterator for PermissionSet {
    type Item = PermissionId;
    type IntoIter = std::collections::btree_set::IntoIter<PermissionId>;

    fn into_iter(self) -> Self::IntoIter {
        self.permissions.into_iter()
    }
}

impl<'a> IntoIterator for &'a PermissionSet {
    type Item = &'a PermissionId;
    type IntoIter = std::collections::btree_set::Iter<'a, PermissionId>;

    fn into_iter(self) -> Self::IntoIter {
        self.permissions.iter()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_set_operations() {
        let mut set = PermissionSet::new();
        assert!(set.is_empty());

        assert!(set.add("View"));
        assert!(!set.add("View"));
        set.add("Create");

        assert_eq!(set.len(), 2);
        assert!(set.contains("View"));
        assert!(!set.contains("Delete"));
        assert!(set.contains_all(["View", "Create"]));
        assert!(!set.contains_all(["View", "Delete"]));

        assert!(set.remove("View"));
        assert!(!set.remove("View"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_permission_set_is_order_independent() {
        let a: PermissionSet = ["Delete", "View", "Create"].into_iter().collect();
        let b: PermissionSet = ["Create", "Delete", "View"].into_iter().collect();
        assert_eq!(a, b);
        assert_eq!(a.to_strings(), vec!["Create", "Delete", "View"]);
    }

    #[test]
    fn test_permission_set_merge() {
        let mut a: PermissionSet = ["View"].into_iter().collect();
        let b: PermissionSet = ["View", "Update"].into_iter().collect();
        a.merge(&b);
        assert_eq!(a.to_strings(), vec!["Update", "View"]);
    }

    #[test]
    fn test_permission_id_serializes_as_string() {
        let id = PermissionId::new("View");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"View\"");

        let set: PermissionSet = ["View", "Create"].into_iter().collect();
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["Create","View"]"#);
    }
}

// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Operation catalog.
//!
//! Every protected operation is declared once as an [`OperationSpec`]
//! carrying its invocation kind. The [`CatalogBuilder`] folds those
//! declarations through a [`KindMapping`] into a [`PermissionCatalog`]:
//! the distinct permission identifiers, the requirement of each operation,
//! and the operations that declared no kind.
//!
//! # Examples
//!
//! ```
//! use hrms_core::catalog::{CatalogBuilder, OperationSpec};
//!
//! let catalog = CatalogBuilder::new()
//!     .operation(OperationSpec::read("users.list", "/api/users"))
//!     .operation(OperationSpec::create("users.create", "/api/users"))
//!     .operation(OperationSpec::read("roles.list", "/api/roles"))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(catalog.len(), 2);
//! assert_eq!(catalog.requirement("roles.list").unwrap().as_str(), "View");
//! ```

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{AccessError, AccessResult};
use crate::permission::{PermissionId, PermissionSet};

// =============================================================================
// Invocation Kind
// =============================================================================

/// The verb category of a protected operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvocationKind {
    /// Reads state.
    Read,
    /// Creates state.
    Create,
    /// Modifies existing state.
    Update,
    /// Removes state.
    Delete,
}

impl InvocationKind {
    /// Returns all invocation kinds.
    pub fn all() -> &'static [InvocationKind] {
        &[
            InvocationKind::Read,
            InvocationKind::Create,
            InvocationKind::Update,
            InvocationKind::Delete,
        ]
    }

    /// Returns the kind name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            InvocationKind::Read => "read",
            InvocationKind::Create => "create",
            InvocationKind::Update => "update",
            InvocationKind::Delete => "delete",
        }
    }

    /// Parses a kind from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "read" | "view" => Some(InvocationKind::Read),
            "create" => Some(InvocationKind::Create),
            "update" => Some(InvocationKind::Update),
            "delete" => Some(InvocationKind::Delete),
            _ => None,
        }
    }

    /// Returns the HTTP method conventionally bound to this kind.
    pub fn http_method(&self) -> &'static str {
        match self {
            InvocationKind::Read => "GET",
            InvocationKind::Create => "POST",
            InvocationKind::Update => "PUT",
            InvocationKind::Delete => "DELETE",
        }
    }

    /// Returns the kind conventionally bound to an HTTP method.
    pub fn from_http_method(method: &str) -> Option<Self> {
        match method.to_ascii_uppercase().as_str() {
            "GET" => Some(InvocationKind::Read),
            "POST" => Some(InvocationKind::Create),
            "PUT" | "PATCH" => Some(InvocationKind::Update),
            "DELETE" => Some(InvocationKind::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for InvocationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Kind Mapping
// =============================================================================

/// Declarative mapping from invocation kind to permission identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KindMapping {
    entries: BTreeMap<InvocationKind, PermissionId>,
}

impl KindMapping {
    /// Creates an empty mapping.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Adds or replaces the identifier for a kind.
    pub fn with(mut self, kind: InvocationKind, permission: impl Into<PermissionId>) -> Self {
        self.entries.insert(kind, permission.into());
        self
    }

    /// Returns the identifier a kind maps to.
    pub fn permission_for(&self, kind: InvocationKind) -> Option<&PermissionId> {
        self.entries.get(&kind)
    }

    /// Returns the number of mapped kinds.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no kind is mapped.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for KindMapping {
    fn default() -> Self {
        Self::empty()
            .with(InvocationKind::Read, "View")
            .with(InvocationKind::Create, "Create")
            .with(InvocationKind::Update, "Update")
            .with(InvocationKind::Delete, "Delete")
    }
}

// =============================================================================
// Operation Spec
// =============================================================================

/// Static declaration of one operation exposed by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OperationSpec {
    /// Unique operation name, e.g. `roles.create`.
    pub name: &'static str,
    /// HTTP method.
    pub method: &'static str,
    /// Route path in axum syntax.
    pub path: &'static str,
    /// Invocation kind; `None` leaves the operation unprotected.
    pub kind: Option<InvocationKind>,
}

impl OperationSpec {
    /// Creates an operation declaration.
    pub const fn new(
        name: &'static str,
        method: &'static str,
        path: &'static str,
        kind: Option<InvocationKind>,
    ) -> Self {
        Self {
            name,
            method,
            path,
            kind,
        }
    }

    /// Declares a `GET` read operation.
    pub const fn read(name: &'static str, path: &'static str) -> Self {
        Self::new(name, "GET", path, Some(InvocationKind::Read))
    }

    /// Declares a `POST` create operation.
    pub const fn create(name: &'static str, path: &'static str) -> Self {
        Self::new(name, "POST", path, Some(InvocationKind::Create))
    }

    /// Declares a `PUT` update operation.
    pub const fn update(name: &'static str, path: &'static str) -> Self {
        Self::new(name, "PUT", path, Some(InvocationKind::Update))
    }

    /// Declares a `DELETE` delete operation.
    pub const fn delete(name: &'static str, path: &'static str) -> Self {
        Self::new(name, "DELETE", path, Some(InvocationKind::Delete))
    }

    /// Declares an operation without invocation kind.
    pub const fn unclassified(name: &'static str, method: &'static str, path: &'static str) -> Self {
        Self::new(name, method, path, None)
    }

    /// Returns `true` if the operation declared an invocation kind.
    pub fn is_classified(&self) -> bool {
        self.kind.is_some()
    }
}

impl fmt::Display for OperationSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.method, self.path, self.name)
    }
}

// =============================================================================
// Catalog Builder
// =============================================================================

/// Builds a [`PermissionCatalog`] from operation declarations.
#[derive(Debug, Clone, Default)]
pub struct CatalogBuilder {
    mapping: KindMapping,
    operations: Vec<OperationSpec>,
}

impl CatalogBuilder {
    /// Creates a builder using the default kind mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the kind mapping.
    pub fn mapping(mut self, mapping: KindMapping) -> Self {
        self.mapping = mapping;
        self
    }

    /// Adds an operation.
    pub fn operation(mut self, spec: OperationSpec) -> Self {
        self.operations.push(spec);
        self
    }

    /// Adds several operations.
    pub fn operations(mut self, specs: impl IntoIterator<Item = OperationSpec>) -> Self {
        self.operations.extend(specs);
        self
    }

    /// Builds the catalog.
    ///
    /// Fails with a configuration error if two operations share a name.
    pub fn build(self) -> AccessResult<PermissionCatalog> {
        let mut seen = HashSet::new();
        for op in &self.operations {
            if !seen.insert(op.name) {
                return Err(AccessError::configuration(format!(
                    "operation '{}' declared more than once",
                    op.name
                )));
            }
        }

        let mut permissions = PermissionSet::new();
        let mut requirements = BTreeMap::new();
        let mut unclassified = BTreeSet::new();

        for op in &self.operations {
            let permission = op.kind.and_then(|k| self.mapping.permission_for(k));
            match permission {
                Some(permission) => {
                    permissions.add(permission.clone());
                    requirements.insert(op.name.to_string(), permission.clone());
                }
                None => {
                    warn!(
                        operation = op.name,
                        method = op.method,
                        path = op.path,
                        kind = ?op.kind,
                        "Operation has no mapped invocation kind and is unprotected"
                    );
                    unclassified.insert(op.name.to_string());
                }
            }
        }

        let mut operations = self.operations;
        operations.sort_by(|a, b| a.name.cmp(b.name));

        Ok(PermissionCatalog {
            permissions,
            requirements,
            unclassified: unclassified.into_iter().collect(),
            operations,
        })
    }
}

// =============================================================================
// Permission Catalog
// =============================================================================

/// The derived set of permission identifiers and per-operation requirements.
///
/// Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionCatalog {
    permissions: PermissionSet,
    requirements: BTreeMap<String, PermissionId>,
    unclassified: Vec<String>,
    operations: Vec<OperationSpec>,
}

impl PermissionCatalog {
    /// Returns the distinct permission identifiers.
    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    /// Returns `true` if the catalog contains the identifier.
    pub fn contains(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    /// Returns the permission an operation requires.
    pub fn requirement(&self, operation: &str) -> Option<&PermissionId> {
        self.requirements.get(operation)
    }

    /// Returns every operation name with its required permission.
    pub fn requirements(&self) -> impl Iterator<Item = (&str, &PermissionId)> {
        self.requirements.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the operations that contribute no permission, sorted by name.
    pub fn unclassified(&self) -> &[String] {
        &self.unclassified
    }

    /// Returns all declared operations, sorted by name.
    pub fn operations(&self) -> &[OperationSpec] {
        &self.operations
    }

    /// Returns the number of distinct permission identifiers.
    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    /// Returns `true` if no permission was derived.
    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn operations() -> Vec<OperationSpec> {
        vec![
            OperationSpec::read("roles.list", "/api/roles"),
            OperationSpec::create("roles.create", "/api/roles"),
            OperationSpec::delete("roles.delete", "/api/roles/{role}"),
            OperationSpec::read("users.list", "/api/users"),
            OperationSpec::update("users.update", "/api/users/{id}"),
            OperationSpec::unclassified("health", "GET", "/health"),
        ]
    }

    #[test]
    fn test_catalog_derives_distinct_identifiers() {
        let catalog = CatalogBuilder::new().operations(operations()).build().unwrap();

        assert_eq!(
            catalog.permissions().to_strings(),
            vec!["Create", "Delete", "Update", "View"]
        );
        assert_eq!(catalog.requirement("users.list").unwrap().as_str(), "View");
        assert_eq!(catalog.requirement("roles.delete").unwrap().as_str(), "Delete");
        assert!(catalog.requirement("health").is_none());
    }

    #[test]
    fn test_catalog_is_deterministic() {
        let first = CatalogBuilder::new().operations(operations()).build().unwrap();
        let second = CatalogBuilder::new().operations(operations()).build().unwrap();
        assert_eq!(first, second);

        let mut reversed = operations();
        reversed.reverse();
        let third = CatalogBuilder::new().operations(reversed).build().unwrap();
        assert_eq!(first, third);
    }

    #[test]
    fn test_unclassified_operations_are_reported() {
        let catalog = CatalogBuilder::new().operations(operations()).build().unwrap();
        assert_eq!(catalog.unclassified(), &["health".to_string()]);
        assert_eq!(catalog.operations().len(), 6);
    }

    #[test]
    fn test_kind_missing_from_mapping_is_unclassified() {
        let mapping = KindMapping::empty().with(InvocationKind::Read, "View");
        let catalog = CatalogBuilder::new()
            .mapping(mapping)
            .operations(operations())
            .build()
            .unwrap();

        assert_eq!(catalog.permissions().to_strings(), vec!["View"]);
        assert!(catalog.unclassified().contains(&"roles.create".to_string()));
        assert!(catalog.unclassified().contains(&"users.update".to_string()));
    }

    #[test]
    fn test_custom_mapping_renames_identifiers() {
        let mapping = KindMapping::default().with(InvocationKind::Read, "Read");
        let catalog = CatalogBuilder::new()
            .mapping(mapping)
            .operation(OperationSpec::read("users.list", "/api/users"))
            .build()
            .unwrap();
        assert!(catalog.contains("Read"));
        assert!(!catalog.contains("View"));
    }

    #[test]
    fn test_duplicate_operation_name_is_rejected() {
        let err = CatalogBuilder::new()
            .operation(OperationSpec::read("users.list", "/api/users"))
            .operation(OperationSpec::read("users.list", "/api/v2/users"))
            .build()
            .unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_empty_declarations_build_empty_catalog() {
        let catalog = CatalogBuilder::new().build().unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_invocation_kind_conversions() {
        assert_eq!(InvocationKind::from_http_method("get"), Some(InvocationKind::Read));
        assert_eq!(InvocationKind::from_http_method("OPTIONS"), None);
        assert_eq!(InvocationKind::parse("View"), Some(InvocationKind::Read));
        for kind in InvocationKind::all() {
            assert_eq!(InvocationKind::from_http_method(kind.http_method()), Some(*kind));
        }
    }
}

// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `catalog` command.

use hrms_core::PermissionCatalog;

use crate::cli::{CatalogArgs, Cli, OutputFormat};
use crate::error::{BinError, BinResult};

/// Prints the permission catalog derived from the route table.
pub fn catalog(_cli: &Cli, args: CatalogArgs) -> BinResult<()> {
    let catalog = hrms_api::build_catalog()?;

    match args.format {
        OutputFormat::Text => print!("{}", render_text(&catalog)),
        OutputFormat::Json => {
            let output = serde_json::json!({
                "permissions": catalog.permissions().to_strings(),
                "operations": catalog.operations(),
                "requirements": catalog
                    .requirements()
                    .map(|(operation, permission)| (operation.to_string(), permission.as_str().to_string()))
                    .collect::<std::collections::BTreeMap<_, _>>(),
                "unclassified": catalog.unclassified(),
            });
            let rendered = serde_json::to_string_pretty(&output)
                .map_err(|e| BinError::runtime(format!("Failed to render catalog: {}", e)))?;
            println!("{}", rendered);
        }
    }

    Ok(())
}

/// Renders the catalog as a table grouped by permission.
pub fn render_text(catalog: &PermissionCatalog) -> String {
    let mut out = String::new();

    out.push_str(&format!("Permissions ({}):\n", catalog.permissions().len()));
    for permission in catalog.permissions().iter() {
        out.push_str(&format!("  {}\n", permission));
        for spec in catalog.operations() {
            if catalog.requirement(spec.name) == Some(permission) {
                out.push_str(&format!("    {:<22} {:<6} {}\n", spec.name, spec.method, spec.path));
            }
        }
    }

    if !catalog.unclassified().is_empty() {
        out.push_str(&format!("\nUnclassified operations ({}):\n", catalog.unclassified().len()));
        for name in catalog.unclassified() {
            out.push_str(&format!("  {}\n", name));
        }
    }

    out
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use hrms_core::{CatalogBuilder, OperationSpec};

    #[test]
    fn test_render_groups_operations_by_permission() {
        let catalog = CatalogBuilder::new()
            .operation(OperationSpec::read("roles.list", "/api/roles"))
            .operation(OperationSpec::create("roles.create", "/api/roles"))
            .operation(OperationSpec::unclassified("roles.export", "GET", "/api/roles/export"))
            .build()
            .unwrap();

        let text = render_text(&catalog);
        assert!(text.starts_with("Permissions (2):\n  Create\n    roles.create"));
        assert!(text.contains("  View\n    roles.list"));
        assert!(text.contains("Unclassified operations (1):\n  roles.export"));
    }

    #[test]
    fn test_render_route_catalog() {
        let text = render_text(&hrms_api::build_catalog().unwrap());
        assert!(text.contains("permissions.grant"));
        assert!(!text.contains("Unclassified"));
    }
}

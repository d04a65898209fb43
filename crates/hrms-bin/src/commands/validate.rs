// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use hrms_config::{HrmsConfig, StorageBackend};
use hrms_core::AdminSeed;

use crate::cli::{Cli, OutputFormat, ValidateArgs};
use crate::error::{BinError, BinResult};

/// Shortest signing secret that does not produce a warning.
const RECOMMENDED_SECRET_LEN: usize = 32;

/// Executes the `validate` command.
///
/// Loads and validates the configuration, derives the permission catalog and
/// reports anything that is legal but probably unintended.
pub fn validate(cli: &Cli, args: ValidateArgs) -> BinResult<()> {
    let config_path = &cli.config;

    if !config_path.exists() {
        return Err(BinError::config(format!(
            "Configuration file not found: {}",
            config_path.display()
        )));
    }

    let config = hrms_config::load_config(config_path)
        .map_err(|e| BinError::from(e).with_context("Configuration validation failed"))?;
    let catalog = hrms_api::build_catalog()?;
    let warnings = collect_warnings(&config);

    match args.format {
        OutputFormat::Text => {
            println!("✓ Configuration is valid: {}", config_path.display());
            println!();
            println!("Summary:");
            println!("  API: {}", config.server.socket_addr());
            println!("  Storage: {}", storage_summary(&config));
            println!("  JWT: {} / {}s", config.security.jwt.issuer, config.security.jwt.expiration_secs);
            println!(
                "  Baseline roles: {}",
                config
                    .seed
                    .roles
                    .iter()
                    .map(|r| r.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            println!("  Default role: {}", config.seed.default_role);
            println!("  Permissions: {}", catalog.permissions().to_strings().join(", "));

            if !warnings.is_empty() {
                println!();
                println!("Warnings:");
                for warning in &warnings {
                    println!("  ⚠ {}", warning);
                }
            }

            if args.show_config {
                println!();
                println!("Parsed configuration:");
                println!("{}", to_json(&config)?);
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "valid": true,
                "config_path": config_path.display().to_string(),
                "summary": {
                    "api": config.server.socket_addr().to_string(),
                    "storage": storage_summary(&config),
                    "jwt_issuer": config.security.jwt.issuer,
                    "jwt_expiration_secs": config.security.jwt.expiration_secs,
                    "baseline_roles": config.seed.roles.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
                    "default_role": config.seed.default_role,
                    "permissions": catalog.permissions().to_strings(),
                },
                "warnings": warnings,
                "config": if args.show_config { Some(&config) } else { None },
            });
            println!("{}", to_json(&output)?);
        }
    }

    if args.strict && !warnings.is_empty() {
        return Err(BinError::config(format!(
            "Strict mode: {} warning(s) found",
            warnings.len()
        )));
    }

    Ok(())
}

/// Returns warnings for settings that pass validation but look unintended.
pub fn collect_warnings(config: &HrmsConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.security.jwt.secret.expose().len() < RECOMMENDED_SECRET_LEN {
        warnings.push(format!(
            "JWT secret is shorter than {} bytes",
            RECOMMENDED_SECRET_LEN
        ));
    }

    if config.seed.admin.password == AdminSeed::default().password {
        warnings.push("Admin principal uses the built-in default password".to_string());
    }

    if config.storage.backend == StorageBackend::Memory {
        warnings.push("In-memory storage loses principals and grants on exit".to_string());
    }

    let cors = &config.server.cors;
    if cors.allow_credentials && cors.allowed_origins.iter().any(|o| o == "*") {
        warnings.push("CORS credentials are ignored with a wildcard origin".to_string());
    }

    warnings
}

fn storage_summary(config: &HrmsConfig) -> String {
    match config.storage.backend {
        StorageBackend::Memory => "memory".to_string(),
        StorageBackend::Sqlite => format!("sqlite ({})", config.storage.path.display()),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> BinResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| BinError::runtime(format!("Failed to render output: {}", e)))
}

// =============================================================================
// Tests
// =============================================================================

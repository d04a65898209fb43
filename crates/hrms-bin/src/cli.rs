// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI argument parsing and command definitions.
//!
//! - `run`: Start the server (default)
//! - `validate`: Validate the configuration file
//! - `catalog`: Print the permission catalog
//! - `version`: Show version information

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// =============================================================================
// Main CLI Structure
// =============================================================================

/// HRMS - human resources backend with capability-based access control.
#[derive(Parser, Debug)]
#[command(
    name = "hrms",
    author = "Sylvex <contact@sylvex.io>",
    version = hrms_core::VERSION,
    about = "HRMS backend server",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Configuration file path
    #[arg(
        short,
        long,
        default_value = "hrms.yaml",
        env = "HRMS_CONFIG",
        global = true
    )]
    pub config: PathBuf,

    /// Log level (trace, debug, info, warn, error). Overrides the config file.
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Log format (text, json, compact). Overrides the config file.
    #[arg(long, global = true)]
    pub log_format: Option<LogFormat>,

    /// Enable quiet mode (warnings and errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

// =============================================================================
// Subcommands
// =============================================================================

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the API server
    ///
    /// This is the default command when no subcommand is specified.
    /// It opens the store, seeds the baseline roles and serves the API.
    Run(RunArgs),

    /// Validate the configuration file
    ///
    /// Parses and validates the configuration file without starting the server.
    Validate(ValidateArgs),

    /// Print the permission catalog
    ///
    /// Lists every permission the service can require, the operation that
    /// requires it, and the operations that declare no invocation kind.
    Catalog(CatalogArgs),

    /// Show detailed version information
    Version,
}

// =============================================================================
// Command Arguments
// =============================================================================

/// Arguments for the `run` command.
#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Skip bootstrap seeding of baseline roles and the admin principal
    #[arg(long)]
    pub skip_seed: bool,
}

/// Arguments for the `validate` command.
#[derive(Args, Debug, Default, Clone)]
pub struct ValidateArgs {
    /// Show parsed configuration after validation
    #[arg(short, long)]
    pub show_config: bool,

    /// Output format for validation results
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Strict mode: treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the `catalog` command.
#[derive(Args, Debug, Default, Clone)]
pub struct CatalogArgs {
    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

// =============================================================================
// Enums
// =============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for structured logging
    Json,
    /// Compact format for minimal output
    Compact,
}

impl From<hrms_config::LogFormat> for LogFormat {
    fn from(format: hrms_config::LogFormat) -> Self {
        match format {
            hrms_config::LogFormat::Text => LogFormat::Text,
            hrms_config::LogFormat::Json => LogFormat::Json,
            hrms_config::LogFormat::Compact => LogFormat::Compact,
        }
    }
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for programmatic parsing
    Json,
}

// =============================================================================
// Helper Methods
// =============================================================================

impl Cli {
    /// Parse CLI arguments from the command line.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective command, defaulting to `Run` if none specified.
    pub fn effective_command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or_else(|| Commands::Run(RunArgs::default()))
    }

    /// Resolves the log level: flags first, then `--log-level`, then the
    /// configured level.
    pub fn effective_log_level<'a>(&'a self, configured: &'a str) -> &'a str {
        if self.quiet {
            "warn"
        } else if self.verbose {
            "debug"
        } else {
            self.log_level.as_deref().unwrap_or(configured)
        }
    }

    /// Resolves the log format: `--log-format`, then the configured format.
    pub fn effective_log_format(&self, configured: hrms_config::LogFormat) -> LogFormat {
        self.log_format.unwrap_or_else(|| configured.into())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_run() {
        let cli = Cli::parse_from(["hrms"]);
        assert!(matches!(cli.effective_command(), Commands::Run(_)));
        assert_eq!(cli.config, PathBuf::from("hrms.yaml"));
    }

    #[test]
    fn test_run_skip_seed() {
        let cli = Cli::parse_from(["hrms", "run", "--skip-seed"]);
        match cli.effective_command() {
            Commands::Run(args) => assert!(args.skip_seed),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_catalog_json() {
        let cli = Cli::parse_from(["hrms", "catalog", "--format", "json"]);
        match cli.effective_command() {
            Commands::Catalog(args) => assert_eq!(args.format, OutputFormat::Json),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli = Cli::parse_from(["hrms", "validate", "-c", "/etc/hrms/hrms.toml"]);
        assert_eq!(cli.config, PathBuf::from("/etc/hrms/hrms.toml"));
    }

    #[test]
    fn test_log_level_precedence() {
        let cli = Cli::parse_from(["hrms"]);
        assert_eq!(cli.effective_log_level("info"), "info");

        let cli = Cli::parse_from(["hrms", "--log-level", "trace"]);
        assert_eq!(cli.effective_log_level("info"), "trace");

        let cli = Cli::parse_from(["hrms", "--log-level", "trace", "--quiet"]);
        assert_eq!(cli.effective_log_level("info"), "warn");

        let cli = Cli::parse_from(["hrms", "-v"]);
        assert_eq!(cli.effective_log_level("info"), "debug");
    }

    #[test]
    fn test_log_format_falls_back_to_config() {
        let cli = Cli::parse_from(["hrms"]);
        assert_eq!(
            cli.effective_log_format(hrms_config::LogFormat::Json),
            LogFormat::Json
        );

        let cli = Cli::parse_from(["hrms", "--log-format", "compact"]);
        assert_eq!(
            cli.effective_log_format(hrms_config::LogFormat::Json),
            LogFormat::Compact
        );
    }
}

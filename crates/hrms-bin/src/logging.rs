// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Logging and tracing initialization.

use tracing_subscriber::{
    filter::Directive, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use crate::cli::LogFormat;
use crate::error::{BinError, BinResult};

/// Noisy dependency targets capped below the application level.
const DEPENDENCY_DIRECTIVES: &[&str] = &["hyper=warn", "tower=warn", "axum=info", "tokio=info"];

// =============================================================================
// Logging Initialization
// =============================================================================

/// Initializes the logging subsystem.
///
/// `RUST_LOG` takes precedence over `level` when set. Fails when `level` is
/// not a valid filter or a global subscriber is already installed.
///
/// # Example
///
/// ```ignore
/// use hrms_bin::logging::init_logging;
/// use hrms_bin::cli::LogFormat;
///
/// init_logging("info", LogFormat::Text)?;
/// ```
pub fn init_logging(level: &str, format: LogFormat) -> BinResult<()> {
    let filter = build_filter(level)?;

    let result = match format {
        LogFormat::Text => init_text_logging(filter),
        LogFormat::Json => init_json_logging(filter),
        LogFormat::Compact => init_compact_logging(filter),
    };

    result.map_err(|e| BinError::init(format!("Failed to install log subscriber: {}", e)))
}

/// Builds the filter from `RUST_LOG` or `level`, plus the dependency caps.
pub fn build_filter(level: &str) -> BinResult<EnvFilter> {
    let mut filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| BinError::config(format!("Invalid log level '{}': {}", level, e)))?,
    };

    for directive in DEPENDENCY_DIRECTIVES {
        let directive: Directive = directive
            .parse()
            .map_err(|e| BinError::init(format!("Invalid log directive '{}': {}", directive, e)))?;
        filter = filter.add_directive(directive);
    }

    Ok(filter)
}

type InitResult = Result<(), tracing_subscriber::util::TryInitError>;

fn init_text_logging(filter: EnvFilter) -> InitResult {
    let is_terminal = std::io::IsTerminal::is_terminal(&std::io::stdout());

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_ansi(is_terminal),
        )
        .try_init()
}

/// JSON lines for log aggregation.
fn init_json_logging(filter: EnvFilter) -> InitResult {
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .json()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_current_span(true)
                .with_span_list(true),
        )
        .try_init()
}

fn init_compact_logging(filter: EnvFilter) -> InitResult {
    let is_terminal = std::io::IsTerminal::is_terminal(&std::io::stdout());

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_ansi(is_terminal),
        )
        .try_init()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_accepts_levels() {
        for level in ["trace", "debug", "info", "warn", "error", "hrms_api=debug,info"] {
            assert!(build_filter(level).is_ok(), "{}", level);
        }
    }

    #[test]
    fn test_dependency_directives_parse() {
        for directive in DEPENDENCY_DIRECTIVES {
            assert!(directive.parse::<Directive>().is_ok(), "{}", directive);
        }
    }
}

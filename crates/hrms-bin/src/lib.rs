// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # hrms-bin
//!
//! CLI binary for the HRMS backend.
//!
//! This crate provides the `hrms` binary, including:
//!
//! - CLI argument parsing with clap
//! - Server runtime orchestration (catalog, store, seeding, API server)
//! - Graceful shutdown handling
//! - Logging initialization
//! - Command implementations (run, validate, catalog, version)
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         main.rs                              │
//! │                    (Entry Point)                             │
//! └─────────────────────────┬───────────────────────────────────┘
//!                           │
//!                    ┌──────▼──────┐
//!                    │    cli.rs   │
//!                    └──────┬──────┘
//!                           │
//!               ┌───────────┼───────────┐
//!               ▼           ▼           ▼
//!        ┌──────────┐ ┌──────────┐ ┌──────────┐
//!        │ commands │ │ runtime  │ │ logging  │
//!        └──────────┘ └────┬─────┘ └──────────┘
//!                          │
//!          ┌───────────────┼───────────────┐
//!          ▼               ▼               ▼
//!   ┌────────────┐  ┌────────────┐  ┌────────────┐
//!   │  catalog   │  │ store+seed │  │ ApiServer  │
//!   │ (hrms-api) │  │(hrms-store)│  │ + shutdown │
//!   └────────────┘  └────────────┘  └────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the server (default command)
//! hrms
//!
//! # Start with a custom config
//! hrms -c /etc/hrms/hrms.yaml
//!
//! # Validate configuration
//! hrms validate
//!
//! # Print the permission catalog
//! hrms catalog
//!
//! # Show version
//! hrms version
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod shutdown;

// =============================================================================
// Re-exports
// =============================================================================

pub use cli::{Cli, Commands};
pub use error::{BinError, BinResult};
pub use logging::init_logging;
pub use runtime::{RuntimeBuilder, ServerRuntime};
pub use shutdown::{ShutdownCoordinator, ShutdownSignal};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

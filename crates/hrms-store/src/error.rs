// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Backend errors.
//!
//! Backend failures are collected in [`StoreError`] and surface to callers
//! as [`AccessError::Storage`].

use hrms_core::AccessError;
use thiserror::Error;

/// Low-level storage failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite error.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// I/O error while preparing the database file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Password hashing failure.
    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    /// The blocking worker panicked or was cancelled.
    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl From<StoreError> for AccessError {
    fn from(err: StoreError) -> Self {
        AccessError::storage(err.to_string())
    }
}

/// Converts backend results into [`hrms_core::AccessResult`].
pub(crate) trait StoreResultExt<T> {
    /// Maps the error into [`AccessError::Storage`].
    fn store_err(self) -> Result<T, AccessError>;
}

impl<T, E: Into<StoreError>> StoreResultExt<T> for Result<T, E> {
    fn store_err(self) -> Result<T, AccessError> {
        self.map_err(|e| AccessError::from(e.into()))
    }
}

// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Custom Test Assertions
//!
//! Assertion helpers for HTTP responses produced by the harness.

use axum::http::StatusCode;
use serde_json::Value;

use crate::common::harness::TestResponse;

impl TestResponse {
    /// Asserts the status code, printing the body on mismatch.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status, expected,
            "Expected {}, got {} with body {}",
            expected, self.status, self.body
        );
        self
    }

    /// Asserts an error response with the given status and error code.
    pub fn assert_error(&self, expected: StatusCode, code: &str) -> &Self {
        self.assert_status(expected);
        assert_eq!(
            self.body["error"]["code"], code,
            "Unexpected error body {}",
            self.body
        );
        self
    }

    /// Returns the `data` member of a success envelope.
    pub fn data(&self) -> &Value {
        assert_eq!(self.body["success"], true, "Not a success envelope: {}", self.body);
        &self.body["data"]
    }
}

/// Collects a JSON array of strings.
pub fn string_array(value: &Value) -> Vec<String> {
    value
        .as_array()
        .unwrap_or_else(|| panic!("Expected an array, got {}", value))
        .iter()
        .map(|v| {
            v.as_str()
                .unwrap_or_else(|| panic!("Expected a string, got {}", v))
                .to_string()
        })
        .collect()
}

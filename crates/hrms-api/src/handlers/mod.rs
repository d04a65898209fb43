// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! HTTP handlers.
//!
//! Handlers assume authorization already happened in the middleware stack;
//! none of them checks permissions itself.

pub mod auth;
pub mod health;
pub mod permissions;
pub mod roles;
pub mod users;

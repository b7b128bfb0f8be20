// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger Auth Server - password login, signed credentials and a
//! concurrent-safe balance ledger behind an HTTP API.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Password verification, HS256 credentials and access control
//! - `ledger` - In-memory account balances with atomic transfers
//! - `store` - Credential store and startup provisioning

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod models;
pub mod state;
pub mod store;
pub mod tls;

#[cfg(test)]
mod test_support;

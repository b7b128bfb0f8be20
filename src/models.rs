// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies for the HTTP API. All types derive
//! `ToSchema` for the OpenAPI document.
//!
//! ## Model Categories
//!
//! - **Session**: login request and the signed credential returned
//! - **Users**: public view of an identity (never the password verifier)
//! - **Payments**: transfer request and resulting balances

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{Role, UserId};
use crate::ledger::Balances;
use crate::store::Identity;

// =============================================================================
// Session Models
// =============================================================================

/// Login request body.
///
/// Missing fields deserialize as empty strings and simply fail to match.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Successful login.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Bearer credential for the `Authorization` header.
    pub token: String,
    /// Seconds until the credential expires.
    pub expires_in: i64,
    pub user: UserView,
}

// =============================================================================
// User Models
// =============================================================================

/// Public fields of an identity.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UserView {
    #[schema(value_type = i64)]
    pub id: UserId,
    pub username: String,
    pub role: Role,
}

impl From<&Identity> for UserView {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id,
            username: identity.username.clone(),
            role: identity.role,
        }
    }
}

// =============================================================================
// Payment Models
// =============================================================================

/// Transfer request body.
///
/// `amount` is validated by the ledger: a JSON integer, an integral float
/// or a numeric string, in minor units.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TransferRequest {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    #[schema(value_type = u64, example = 30)]
    pub amount: serde_json::Value,
}

/// Committed transfer.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransferResponse {
    /// Always `true`.
    pub ok: bool,
    /// All balances right after the transfer committed.
    #[schema(value_type = Object)]
    pub balances: Balances,
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::auth::AuthError;
use crate::ledger::{Balances, LedgerError};

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    /// Stable machine-readable kind.
    pub code: &'static str,
    pub message: String,
    /// Unchanged balances, attached to insufficient-funds failures.
    pub balances: Option<Balances>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    error_code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    balances: Option<Balances>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            balances: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    /// Body that is not JSON or does not match the expected shape.
    pub fn invalid_request() -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_request", "bad request body")
    }

    pub fn invalid_amount() -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_amount", "bad amount")
    }

    pub fn invalid_account() -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_account", "bad account")
    }

    pub fn insufficient_funds(balances: Balances) -> Self {
        Self {
            balances: Some(balances),
            ..Self::new(StatusCode::BAD_REQUEST, "insufficient_funds", "insufficient funds")
        }
    }

    /// Log `detail` server-side and return a generic failure.
    pub fn internal(detail: &str) -> Self {
        tracing::error!(error = %detail, "internal failure");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "internal error",
        )
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Internal(detail) => Self::internal(&detail),
            other => Self::new(other.status_code(), other.error_code(), other.public_message()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(reason = %rejection.body_text(), "request body rejected");
        Self::invalid_request()
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InvalidAmount | LedgerError::CreditOverflow => Self::invalid_amount(),
            LedgerError::InvalidAccount => Self::invalid_account(),
            LedgerError::InsufficientFunds { balances } => Self::insufficient_funds(balances),
            LedgerError::Unavailable => Self::internal("ledger lock poisoned"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
            error_code: self.code,
            balances: self.balances,
        });
        (self.status, body).into_response()
    }
}

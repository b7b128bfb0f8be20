// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication and authorization errors.
//!
//! Every token failure (malformed, bad signature, wrong algorithm, expired)
//! collapses into [`AuthError::Unauthenticated`] so callers cannot learn
//! which check rejected their credential.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Authentication error type.
#[derive(Debug)]
pub enum AuthError {
    /// Username/password pair rejected at login
    InvalidCredentials,
    /// Missing, malformed, forged or expired bearer credential
    Unauthenticated,
    /// Authenticated (or anonymous) caller denied by the access policy
    Forbidden,
    /// Signing key or credential store unavailable; detail is logged, not returned
    Internal(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::Unauthenticated => "unauthenticated",
            AuthError::Forbidden => "forbidden",
            AuthError::Internal(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials | AuthError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show the caller.
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid credentials",
            AuthError::Unauthenticated => "unauthenticated",
            AuthError::Forbidden => "forbidden",
            AuthError::Internal(_) => "internal error",
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::Internal(msg) => write!(f, "Internal authentication error: {msg}"),
            other => f.write_str(other.public_message()),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::Internal(detail) = &self {
            tracing::error!(error = %detail, "authentication subsystem failure");
        }
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.public_message().to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}

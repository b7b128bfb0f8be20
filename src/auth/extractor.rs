// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for bearer credentials.
//!
//! Use `Auth` to require a valid credential, or `OptionalAuth` for
//! endpoints where an absent credential is an anonymous context:
//!
//! ```rust,ignore
//! async fn my_handler(OptionalAuth(claims): OptionalAuth) -> impl IntoResponse {
//!     // claims is Option<Claims>
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::{AuthError, Claims};
use crate::state::AppState;

/// Extract the bearer token, if any.
///
/// `Ok(None)` means no `Authorization` header. A header that is present but
/// not a well-formed `Bearer` credential is an error.
fn bearer_token(parts: &Parts) -> Result<Option<&str>, AuthError> {
    let Some(value) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value.to_str().map_err(|_| AuthError::Unauthenticated)?;
    let token = value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::Unauthenticated)?;
    Ok(Some(token))
}

fn verify(token: &str, state: &AppState) -> Result<Claims, AuthError> {
    state.tokens.verify(token).map_err(|e| {
        tracing::debug!(reason = %e, "bearer credential rejected");
        AuthError::Unauthenticated
    })
}

/// Extractor for authenticated callers.
///
/// Rejects with `401 unauthenticated` when the credential is missing or
/// fails any verification check.
pub struct Auth(pub Claims);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(claims) = parts.extensions.get::<Claims>().cloned() {
            return Ok(Auth(claims));
        }

        let token = bearer_token(parts)?.ok_or(AuthError::Unauthenticated)?;
        let claims = verify(token, state)?;
        parts.extensions.insert(claims.clone());
        Ok(Auth(claims))
    }
}

/// Optional authentication extractor.
///
/// Yields `None` when no `Authorization` header is present. A credential
/// that is present but invalid is still rejected with `401`, so a forged
/// token never silently degrades into an anonymous request.
pub struct OptionalAuth(pub Option<Claims>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if parts.headers.get(AUTHORIZATION).is_none() {
            return Ok(OptionalAuth(None));
        }
        let Auth(claims) = Auth::from_request_parts(parts, state).await?;
        Ok(OptionalAuth(Some(claims)))
    }
}

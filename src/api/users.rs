// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    auth::{authorize, Claims, OptionalAuth, Role, UserId},
    error::ApiError,
    models::UserView,
    state::AppState,
};

/// Fetch an identity by id.
///
/// The caller must own the identity or be an admin. Authorization is decided
/// before the lookup, so an unauthorized caller gets `403` whether or not the
/// id exists.
#[utoipa::path(
    get,
    path = "/user/{id}",
    params(
        ("id" = i64, Path, description = "Identity id")
    ),
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "User information", body = UserView),
        (status = 401, description = "Credential present but invalid or expired"),
        (status = 403, description = "Not the owner and not an admin, or no credential"),
        (status = 404, description = "No such user"),
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    OptionalAuth(claims): OptionalAuth,
    Path(raw_id): Path<String>,
) -> Result<Json<UserView>, ApiError> {
    let claims = claims.as_ref();

    // A non-numeric id has no owner: only an admin learns it does not exist.
    let Ok(id) = raw_id.parse::<UserId>() else {
        authorize(claims, None, Some(Role::Admin))
            .ensure()
            .inspect_err(|_| log_denied(claims, &raw_id))?;
        return Err(ApiError::not_found("user not found"));
    };

    authorize(claims, Some(id), None)
        .ensure()
        .inspect_err(|_| log_denied(claims, &raw_id))?;

    let identity = state
        .credentials
        .find_by_id(id)
        .ok_or_else(|| ApiError::not_found("user not found"))?;

    Ok(Json(UserView::from(&identity)))
}

fn log_denied(claims: Option<&Claims>, requested: &str) {
    tracing::info!(
        caller = claims.map(|c| c.subject_id),
        requested_id = requested,
        "user lookup forbidden"
    );
}

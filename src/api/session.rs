// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login endpoint.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use zeroize::Zeroizing;

use crate::{
    auth::{AuthError, PasswordError},
    error::ApiError,
    models::{LoginRequest, LoginResponse, UserView},
    state::AppState,
};

/// Exchange a username and password for a signed bearer credential.
///
/// Unknown usernames, wrong passwords and unreadable bodies all produce the
/// same `401 invalid_credentials` response.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    tag = "Session",
    responses(
        (status = 200, description = "Credential issued", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(reason = %rejection.body_text(), "login body rejected");
        AuthError::InvalidCredentials
    })?;

    let identity = state.credentials.find_by_username(&request.username);

    let passwords = state.passwords.clone();
    let stored = identity.as_ref().map(|i| i.password_verifier.clone());
    let password = Zeroizing::new(request.password);

    let permit = state
        .login_permits
        .clone()
        .acquire_owned()
        .await
        .map_err(|e| ApiError::internal(&format!("login permits closed: {e}")))?;

    // Argon2 is CPU-bound; keep it off the reactor threads.
    let verified = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        match stored {
            Some(stored) => passwords.verify(&password, &stored),
            None => {
                passwords.verify_dummy(&password);
                Ok(false)
            }
        }
    })
    .await
    .map_err(|e| ApiError::internal(&format!("password verification task failed: {e}")))?;

    let identity = match (verified, identity) {
        (Ok(true), Some(identity)) => identity,
        (Err(PasswordError::CorruptVerifier), _) => {
            tracing::error!(username = %request.username, "stored password verifier is corrupt");
            return Err(AuthError::InvalidCredentials.into());
        }
        (Err(e), _) => {
            tracing::error!(username = %request.username, error = %e, "password verification failed");
            return Err(AuthError::InvalidCredentials.into());
        }
        _ => {
            tracing::info!(username = %request.username, "login rejected");
            return Err(AuthError::InvalidCredentials.into());
        }
    };

    let issued = state
        .tokens
        .issue(&identity)
        .map_err(|e| ApiError::internal(&format!("credential signing failed: {e}")))?;

    tracing::info!(user_id = identity.id, username = %identity.username, "login succeeded");

    Ok(Json(LoginResponse {
        token: issued.token,
        expires_in: state.tokens.ttl_secs(),
        user: UserView::from(&identity),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::auth::{Argon2Verifier, Role, TokenService};
    use crate::ledger::Ledger;
    use crate::store::{Identity, InMemoryCredentialStore};
    use crate::test_support::{fast_password_config, test_config, test_state, BOB_PASSWORD};

    fn request(username: &str, password: &str) -> Result<Json<LoginRequest>, JsonRejection> {
        Ok(Json(LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        }))
    }

    #[tokio::test]
    async fn login_issues_verifiable_credential() {
        let state = test_state();
        let Json(response) = login(State(state.clone()), request("bob", BOB_PASSWORD))
            .await
            .expect("login succeeds");

        assert_eq!(response.user.username, "bob");
        assert_eq!(response.user.role, Role::User);
        assert_eq!(response.expires_in, state.tokens.ttl_secs());

        let claims = state.tokens.verify(&response.token).unwrap();
        assert_eq!(claims.subject_id, response.user.id);
        assert_eq!(claims.username, "bob");
        assert_eq!(claims.role, Role::User);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_look_the_same() {
        let state = test_state();

        let wrong = login(State(state.clone()), request("bob", "not-the-password"))
            .await
            .unwrap_err();
        let unknown = login(State(state), request("mallory", "whatever"))
            .await
            .unwrap_err();

        assert_eq!(wrong.status, unknown.status);
        assert_eq!(wrong.code, "invalid_credentials");
        assert_eq!(unknown.code, "invalid_credentials");
        assert_eq!(wrong.message, unknown.message);
    }

    #[tokio::test]
    async fn empty_fields_are_rejected() {
        let state = test_state();
        let err = login(State(state), request("", "")).await.unwrap_err();
        assert_eq!(err.code, "invalid_credentials");
    }

    #[tokio::test]
    async fn corrupt_stored_verifier_is_invalid_credentials() {
        let passwords = Argon2Verifier::new(fast_password_config()).unwrap();
        let mut store = InMemoryCredentialStore::new();
        store
            .insert(Identity {
                id: 1,
                username: "dave".to_string(),
                password_verifier: "not-a-phc-string".to_string(),
                role: Role::User,
            })
            .unwrap();
        let state = AppState::new(
            TokenService::new(&test_config().token),
            Arc::new(passwords),
            Arc::new(store),
            Ledger::default(),
            1,
        );

        let err = login(State(state), request("dave", "anything"))
            .await
            .unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::UNAUTHORIZED);
        assert_eq!(err.code, "invalid_credentials");
    }

    #[tokio::test]
    async fn login_waits_for_a_free_permit() {
        let mut config = test_config();
        config.login_concurrency = 1;
        let state = AppState::from_config(&config).unwrap();

        let held = state.login_permits.clone().acquire_owned().await.unwrap();
        let pending = tokio::time::timeout(
            Duration::from_millis(50),
            login(State(state.clone()), request("bob", BOB_PASSWORD)),
        )
        .await;
        assert!(pending.is_err(), "login must not start while the permit is held");

        drop(held);
        let Json(response) = login(State(state.clone()), request("bob", BOB_PASSWORD))
            .await
            .expect("login succeeds once a permit frees up");
        assert_eq!(response.user.username, "bob");
        assert_eq!(state.login_permits.available_permits(), 1);
    }
}

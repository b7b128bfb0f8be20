// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared fixtures for unit tests.

use crate::config::{AppConfig, PasswordConfig};
use crate::state::AppState;
use crate::store::CredentialStore;

pub const TEST_SECRET: &str = "0123456789abcdef0123456789abcdef";
pub const ADMIN_PASSWORD: &str = "admin-pass";
pub const BOB_PASSWORD: &str = "password1";
pub const CAROL_PASSWORD: &str = "carol-pass";

/// Low-cost Argon2 parameters keep the suite fast.
pub fn fast_password_config() -> PasswordConfig {
    PasswordConfig {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    }
}

/// Configuration with `root` (id 1, admin), `bob` (id 2) and `carol` (id 3),
/// and the demo ledger `{alice: 100, bob: 50}`.
pub fn test_config() -> AppConfig {
    let seed_users = format!("bob:user:{BOB_PASSWORD},carol:user:{CAROL_PASSWORD}");
    let vars = [
        ("TOKEN_SECRET", TEST_SECRET.to_string()),
        ("ADMIN_USER", "root".to_string()),
        ("ADMIN_PASS", ADMIN_PASSWORD.to_string()),
        ("SEED_USERS", seed_users),
        ("PASSWORD_MEMORY_KIB", "1024".to_string()),
        ("PASSWORD_ITERATIONS", "1".to_string()),
    ];
    AppConfig::from_lookup(|name| {
        vars.iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.clone())
    })
    .expect("test config is valid")
}

pub fn test_state() -> AppState {
    AppState::from_config(&test_config()).expect("test state builds")
}

/// Sign a credential for a provisioned username.
pub fn issue_for(state: &AppState, username: &str) -> String {
    let identity = state
        .credentials
        .find_by_username(username)
        .expect("user is provisioned");
    state.tokens.issue(&identity).expect("token issues").token
}

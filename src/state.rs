// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Semaphore;

use crate::auth::{Argon2Verifier, PasswordError, PasswordVerifier, TokenService};
use crate::config::AppConfig;
use crate::ledger::Ledger;
use crate::store::{CredentialStore, InMemoryCredentialStore, StoreError};

/// Errors building [`AppState`] at startup.
#[derive(Debug, Error)]
pub enum StateError {
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Handles shared by every request.
///
/// Everything except the ledger is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenService>,
    pub passwords: Arc<dyn PasswordVerifier>,
    pub credentials: Arc<dyn CredentialStore>,
    pub ledger: Arc<Ledger>,
    /// Caps how many Argon2 verifications run on the blocking pool at once.
    pub login_permits: Arc<Semaphore>,
}

impl AppState {
    pub fn new(
        tokens: TokenService,
        passwords: Arc<dyn PasswordVerifier>,
        credentials: Arc<dyn CredentialStore>,
        ledger: Ledger,
        login_concurrency: usize,
    ) -> Self {
        Self {
            tokens: Arc::new(tokens),
            passwords,
            credentials,
            ledger: Arc::new(ledger),
            login_permits: Arc::new(Semaphore::new(login_concurrency)),
        }
    }

    /// Build the full state from configuration: hash seed passwords,
    /// provision identities and seed the ledger.
    pub fn from_config(config: &AppConfig) -> Result<Self, StateError> {
        let passwords = Argon2Verifier::new(config.password)?;
        let credentials =
            InMemoryCredentialStore::from_seed(&config.admin, &config.seed_users, &passwords)?;
        tracing::info!(identities = credentials.len(), "credential store provisioned");

        let ledger = Ledger::with_balances(config.ledger_seed.iter().cloned());
        let total = ledger.total().unwrap_or_default();
        tracing::info!(accounts = config.ledger_seed.len(), %total, "ledger seeded");

        Ok(Self::new(
            TokenService::new(&config.token),
            Arc::new(passwords),
            Arc::new(credentials),
            ledger,
            config.login_concurrency,
        ))
    }
}

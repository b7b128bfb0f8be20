// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Password verification.
//!
//! Stored verifiers are Argon2id PHC strings with a per-identity random
//! salt. Call sites depend only on the [`PasswordVerifier`] trait, so the
//! algorithm can be replaced without touching handlers.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, SaltString},
    Algorithm, Argon2, Params, Version,
};
use thiserror::Error;
use zeroize::Zeroizing;

use crate::config::PasswordConfig;

/// Longest password accepted for hashing or verification, in bytes.
///
/// Longer input is rejected up front so a single request cannot buy an
/// arbitrarily expensive hash.
pub const MAX_PASSWORD_LEN: usize = 1024;

/// Password hashing and verification failures.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// The stored verifier could not be parsed.
    #[error("stored password verifier is corrupt")]
    CorruptVerifier,
    /// Hashing failed (invalid parameters or RNG failure).
    #[error("password hashing failed: {0}")]
    Hashing(String),
    /// Password longer than [`MAX_PASSWORD_LEN`].
    #[error("password exceeds {} bytes", MAX_PASSWORD_LEN)]
    TooLong,
}

/// A one-way password transform.
pub trait PasswordVerifier: Send + Sync {
    /// Derive a stored verifier from a plaintext password.
    fn hash(&self, password: &str) -> Result<String, PasswordError>;

    /// Check a presented password against a stored verifier.
    ///
    /// Returns `Ok(false)` on any mismatch, including over-long or empty
    /// input. Only a corrupt verifier is an error.
    fn verify(&self, password: &str, verifier: &str) -> Result<bool, PasswordError>;

    /// Burn the same work as a real verification.
    ///
    /// Called when the username does not exist so response timing does not
    /// reveal account existence.
    fn verify_dummy(&self, password: &str);
}

/// Argon2id implementation of [`PasswordVerifier`].
pub struct Argon2Verifier {
    params: Params,
    dummy_verifier: String,
}

impl Argon2Verifier {
    pub fn new(config: PasswordConfig) -> Result<Self, PasswordError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| PasswordError::Hashing(format!("invalid Argon2 params: {e}")))?;

        let mut verifier = Self {
            params,
            dummy_verifier: String::new(),
        };
        verifier.dummy_verifier = verifier.hash("dummy-password-for-timing")?;
        Ok(verifier)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl PasswordVerifier for Argon2Verifier {
    fn hash(&self, password: &str) -> Result<String, PasswordError> {
        if password.len() > MAX_PASSWORD_LEN {
            return Err(PasswordError::TooLong);
        }
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PasswordError::Hashing(e.to_string()))?;
        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, verifier: &str) -> Result<bool, PasswordError> {
        let parsed = PasswordHash::new(verifier).map_err(|_| PasswordError::CorruptVerifier)?;
        if password.len() > MAX_PASSWORD_LEN {
            return Ok(false);
        }

        let password = Zeroizing::new(password.as_bytes().to_vec());
        // Parameters come from the PHC string; the digest comparison is constant-time.
        match argon2::PasswordVerifier::verify_password(&Argon2::default(), &password, &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(_) => Err(PasswordError::CorruptVerifier),
        }
    }

    fn verify_dummy(&self, password: &str) {
        let _ = self.verify(password, &self.dummy_verifier);
    }
}

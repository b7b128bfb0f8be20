// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signed credential issuance and verification.
//!
//! Credentials are HS256 JWTs. The algorithm is fixed by the service, not
//! read from the credential: a header naming any other algorithm (including
//! `none`) is rejected before the payload is trusted. Verification is a
//! single call that either returns fully checked [`Claims`] or an error.

use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::{Claims, Role};
use crate::config::TokenConfig;
use crate::store::Identity;

/// The only algorithm this service signs with or accepts.
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// Issuer and verifier share a clock, so no skew allowance.
const CLOCK_SKEW_LEEWAY: u64 = 0;

/// Credential verification and signing failures.
///
/// Callers outside this module map every verification variant to the same
/// opaque unauthenticated outcome.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("credential is malformed")]
    Malformed,
    #[error("credential signature is invalid")]
    SignatureInvalid,
    #[error("credential has expired")]
    Expired,
    #[error("failed to sign credential: {0}")]
    Signing(String),
}

/// Wire format of the JWT payload. Private: never handed out unverified.
#[derive(Debug, Serialize, Deserialize)]
struct JwtClaims {
    sub: String,
    username: String,
    role: Role,
    iat: i64,
    exp: i64,
    iss: String,
    jti: String,
}

/// A freshly signed credential and the claims it encodes.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

/// Issues and verifies bearer credentials with a process-wide key.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    ttl_secs: i64,
}

impl TokenService {
    pub fn new(config: &TokenConfig) -> Self {
        let secret = config.secret.expose().as_bytes();

        let mut validation = Validation::new(TOKEN_ALGORITHM);
        validation.leeway = CLOCK_SKEW_LEEWAY;
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.set_issuer(&[&config.issuer]);
        validation.set_required_spec_claims(&["exp", "iat", "sub", "iss"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            issuer: config.issuer.clone(),
            ttl_secs: config.ttl_secs,
        }
    }

    /// Credential lifetime in seconds.
    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Sign a credential for `identity`, valid from now for the configured TTL.
    pub fn issue(&self, identity: &Identity) -> Result<IssuedToken, TokenError> {
        self.issue_at(identity, Utc::now().timestamp())
    }

    pub(crate) fn issue_at(&self, identity: &Identity, issued_at: i64) -> Result<IssuedToken, TokenError> {
        let expires_at = issued_at
            .checked_add(self.ttl_secs)
            .ok_or_else(|| TokenError::Signing("expiry overflows the timestamp range".to_string()))?;

        let claims = Claims {
            subject_id: identity.id,
            username: identity.username.clone(),
            role: identity.role,
            issued_at,
            expires_at,
        };

        let payload = JwtClaims {
            sub: claims.subject_id.to_string(),
            username: claims.username.clone(),
            role: claims.role,
            iat: claims.issued_at,
            exp: claims.expires_at,
            iss: self.issuer.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(TOKEN_ALGORITHM), &payload, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        Ok(IssuedToken { token, claims })
    }

    /// Check signature, algorithm, issuer and expiry, then return the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<JwtClaims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature
                | ErrorKind::InvalidAlgorithm
                | ErrorKind::InvalidIssuer => TokenError::SignatureInvalid,
                _ => TokenError::Malformed,
            }
        })?;

        let claims = data.claims;
        let subject_id = claims.sub.parse().map_err(|_| TokenError::Malformed)?;

        Ok(Claims {
            subject_id,
            username: claims.username,
            role: claims.role,
            issued_at: claims.iat,
            expires_at: claims.exp,
        })
    }
}

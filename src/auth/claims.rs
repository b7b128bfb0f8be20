// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Verified credential claims.

use serde::Serialize;

use super::roles::Role;

/// Integer identifier of an identity in the credential store.
pub type UserId = i64;

/// Identity facts carried by a signed credential.
///
/// A `Claims` value is only ever produced by [`TokenService::verify`] after
/// the signature, algorithm, issuer and expiry checks have all passed, or by
/// [`TokenService::issue`] for a freshly signed credential. It has no
/// `Deserialize` impl: untrusted bytes cannot become claims without passing
/// through verification.
///
/// [`TokenService::verify`]: super::TokenService::verify
/// [`TokenService::issue`]: super::TokenService::issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Claims {
    /// Identity the credential was issued to
    pub subject_id: UserId,
    /// Username at issuance time
    pub username: String,
    /// Role at issuance time
    pub role: Role,
    /// Unix timestamp of issuance
    pub issued_at: i64,
    /// Unix timestamp after which the credential is rejected
    pub expires_at: i64,
}

impl Claims {
    /// Check if the holder has the required role.
    pub fn has_role(&self, required: Role) -> bool {
        self.role.has_privilege(required)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Credential verification, signed-token issuance and access control.
//!
//! ## Auth Flow
//!
//! 1. `POST /login` checks the password against the stored Argon2id verifier
//! 2. On success the server signs an HS256 credential carrying
//!    `sub`, `username`, `role`, `iat`, `exp`
//! 3. Later requests send `Authorization: Bearer <credential>`
//! 4. The extractor verifies signature, algorithm, issuer and expiry in one
//!    step and only then yields [`Claims`]
//! 5. Handlers ask [`policy::authorize`] for an allow/deny decision
//!
//! ## Security
//!
//! - The signing algorithm is fixed; `none` and header-chosen algorithms
//!   are rejected
//! - All token failures surface as a single `unauthenticated` code
//! - The signing key is loaded once at startup and never mutated

pub mod claims;
pub mod error;
pub mod extractor;
pub mod password;
pub mod policy;
pub mod roles;
pub mod token;

pub use claims::{Claims, UserId};
pub use error::AuthError;
pub use extractor::{Auth, OptionalAuth};
pub use password::{Argon2Verifier, PasswordError, PasswordVerifier};
pub use policy::{authorize, Decision};
pub use roles::Role;
pub use token::{IssuedToken, TokenError, TokenService};

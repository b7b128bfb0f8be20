// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access control decisions.
//!
//! [`authorize`] is pure: every input is supplied by the caller and it never
//! consults the credential store. Rules, in order:
//!
//! 1. No claims → deny.
//! 2. A required role the claims do not satisfy → deny.
//! 3. For an object-scoped resource, allow only an admin or the owner.

use super::{AuthError, Claims, Role, UserId};

/// Outcome of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    /// Convert to a result; a denial is always `Forbidden`, never `NotFound`.
    pub fn ensure(self) -> Result<(), AuthError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny => Err(AuthError::Forbidden),
        }
    }
}

/// Decide whether `claims` may act on a resource.
///
/// `resource_owner` is `Some` for object-scoped resources and `None` for
/// resources guarded by role alone.
pub fn authorize(
    claims: Option<&Claims>,
    resource_owner: Option<UserId>,
    required_role: Option<Role>,
) -> Decision {
    let Some(claims) = claims else {
        return Decision::Deny;
    };

    if let Some(required) = required_role {
        if !claims.has_role(required) {
            return Decision::Deny;
        }
    }

    match resource_owner {
        Some(owner) if claims.is_admin() || claims.subject_id == owner => Decision::Allow,
        Some(_) => Decision::Deny,
        None => Decision::Allow,
    }
}

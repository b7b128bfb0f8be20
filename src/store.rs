// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential store.
//!
//! Identity records are provisioned once at startup and read-only
//! afterwards, so lookups take no lock. Handlers depend on the
//! [`CredentialStore`] trait; [`InMemoryCredentialStore`] is the bundled
//! implementation.

use std::collections::HashMap;

use thiserror::Error;

use crate::auth::{PasswordError, PasswordVerifier, Role, UserId};
use crate::config::SeedUser;

/// Identity of the configured administrator.
pub const ADMIN_USER_ID: UserId = 1;

/// A user identity record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: UserId,
    pub username: String,
    /// Output of the password verifier's one-way transform; never plaintext.
    pub password_verifier: String,
    pub role: Role,
}

/// Provisioning failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("identity id {0} already exists")]
    DuplicateId(UserId),
    #[error("username {0:?} already exists")]
    DuplicateUsername(String),
    #[error("failed to derive password verifier for {username:?}: {source}")]
    Password {
        username: String,
        #[source]
        source: PasswordError,
    },
}

/// Read access to identity records.
pub trait CredentialStore: Send + Sync {
    fn find_by_username(&self, username: &str) -> Option<Identity>;
    fn find_by_id(&self, id: UserId) -> Option<Identity>;
}

#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    by_id: HashMap<UserId, Identity>,
    id_by_username: HashMap<String, UserId>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Insert an identity. Ids and usernames must both be unique.
    pub fn insert(&mut self, identity: Identity) -> Result<(), StoreError> {
        if self.by_id.contains_key(&identity.id) {
            return Err(StoreError::DuplicateId(identity.id));
        }
        if self.id_by_username.contains_key(&identity.username) {
            return Err(StoreError::DuplicateUsername(identity.username));
        }
        self.id_by_username
            .insert(identity.username.clone(), identity.id);
        self.by_id.insert(identity.id, identity);
        Ok(())
    }

    /// Hash `user.password` and insert the resulting identity.
    pub fn provision(
        &mut self,
        id: UserId,
        user: &SeedUser,
        verifier: &dyn PasswordVerifier,
    ) -> Result<Identity, StoreError> {
        let password_verifier =
            verifier
                .hash(user.password.expose())
                .map_err(|source| StoreError::Password {
                    username: user.username.clone(),
                    source,
                })?;
        let identity = Identity {
            id,
            username: user.username.clone(),
            password_verifier,
            role: user.role,
        };
        self.insert(identity.clone())?;
        Ok(identity)
    }

    /// Provision the administrator as id 1 and seed users from id 2 upward.
    pub fn from_seed(
        admin: &SeedUser,
        seed_users: &[SeedUser],
        verifier: &dyn PasswordVerifier,
    ) -> Result<Self, StoreError> {
        let mut store = Self::new();
        store.provision(ADMIN_USER_ID, admin, verifier)?;
        for (offset, user) in seed_users.iter().enumerate() {
            let id = ADMIN_USER_ID + 1 + offset as UserId;
            store.provision(id, user, verifier)?;
        }
        Ok(store)
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn find_by_username(&self, username: &str) -> Option<Identity> {
        self.id_by_username
            .get(username)
            .and_then(|id| self.by_id.get(id))
            .cloned()
    }

    fn find_by_id(&self, id: UserId) -> Option<Identity> {
        self.by_id.get(&id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Argon2Verifier;
    use crate::config::Secret;
    use crate::test_support::fast_password_config;

    fn seed(username: &str, role: Role, password: &str) -> SeedUser {
        SeedUser {
            username: username.to_string(),
            role,
            password: Secret::new(password),
        }
    }

    fn identity(id: UserId, username: &str) -> Identity {
        Identity {
            id,
            username: username.to_string(),
            password_verifier: "x".to_string(),
            role: Role::User,
        }
    }

    #[test]
    fn lookups_by_id_and_username_agree() {
        let mut store = InMemoryCredentialStore::new();
        store.insert(identity(2, "bob")).unwrap();

        assert_eq!(store.find_by_username("bob").unwrap().id, 2);
        assert_eq!(store.find_by_id(2).unwrap().username, "bob");
        assert!(store.find_by_username("alice").is_none());
        assert!(store.find_by_id(3).is_none());
    }

    #[test]
    fn duplicate_id_or_username_is_rejected() {
        let mut store = InMemoryCredentialStore::new();
        store.insert(identity(2, "bob")).unwrap();

        assert!(matches!(
            store.insert(identity(2, "carol")),
            Err(StoreError::DuplicateId(2))
        ));
        assert!(matches!(
            store.insert(identity(3, "bob")),
            Err(StoreError::DuplicateUsername(_))
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn from_seed_assigns_ids_and_hashes_passwords() {
        let verifier = Argon2Verifier::new(fast_password_config()).unwrap();
        let store = InMemoryCredentialStore::from_seed(
            &seed("root", Role::Admin, "rootpw"),
            &[seed("bob", Role::User, "password1")],
            &verifier,
        )
        .unwrap();

        let admin = store.find_by_id(ADMIN_USER_ID).unwrap();
        assert_eq!(admin.username, "root");
        assert_eq!(admin.role, Role::Admin);
        assert_ne!(admin.password_verifier, "rootpw");
        assert!(verifier.verify("rootpw", &admin.password_verifier).unwrap());

        let bob = store.find_by_username("bob").unwrap();
        assert_eq!(bob.id, 2);
        assert!(verifier.verify("password1", &bob.password_verifier).unwrap());
    }

    #[test]
    fn seed_user_colliding_with_admin_fails() {
        let verifier = Argon2Verifier::new(fast_password_config()).unwrap();
        let result = InMemoryCredentialStore::from_seed(
            &seed("root", Role::Admin, "a"),
            &[seed("root", Role::User, "b")],
            &verifier,
        );
        assert!(matches!(result, Err(StoreError::DuplicateUsername(_))));
    }
}

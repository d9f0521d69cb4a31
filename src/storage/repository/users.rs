// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Pocket Butler

//! User repository: the credential store.
//!
//! Each user is stored as `users/{id}.json`. Email uniqueness is enforced by
//! an index file under `users/by_email/` whose atomic creation closes the
//! register/register race at the storage layer rather than by an
//! application-level existence check.
//!
//! The raw password never touches disk: `create` and `update_password` hash
//! before writing, and nothing else ever assigns the hash field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::super::{FsStore, StorageError, StorageResult};
use crate::auth::password;
use crate::auth::Role;

/// User record as persisted on disk.
///
/// The bcrypt hash is part of the storage representation only; outward
/// serialization goes through [`crate::models::PublicUser`], which has no
/// password field at all.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredUser {
    /// Unique user identifier (UUID)
    pub id: String,
    /// Email, normalized (trimmed, lowercased), globally unique
    pub email: String,
    /// Display name
    pub name: String,
    /// bcrypt hash of the password (salt embedded, self-describing)
    pub password_hash: String,
    /// Authorization role
    #[serde(default)]
    pub role: Role,
    /// Optional household the user shares an inventory with
    #[serde(skip_serializing_if = "Option::is_none")]
    pub household_id: Option<String>,
    /// When the record was created
    pub created_at: DateTime<Utc>,
    /// When the record was last modified
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Normalize an email for storage and lookup: trim and lowercase.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Repository for user operations.
pub struct UserRepository<'a> {
    store: &'a FsStore,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository.
    pub fn new(store: &'a FsStore) -> Self {
        Self { store }
    }

    /// Create a user, hashing the password internally.
    ///
    /// Fails with `AlreadyExists` if the (normalized) email is taken. The
    /// email-index file is claimed first with an atomic `create_new`, so two
    /// concurrent registrations for the same email resolve to exactly one
    /// winner.
    pub fn create(&self, new_user: NewUser) -> StorageResult<StoredUser> {
        let email = normalize_email(&new_user.email);
        let id = Uuid::new_v4().to_string();

        let index_path = self.store.paths().email_index(&email);
        self.store
            .create_unique(&index_path, &id)
            .map_err(|e| match e {
                StorageError::AlreadyExists(_) => StorageError::AlreadyExists(email.clone()),
                other => other,
            })?;

        let password_hash =
            password::hash_password(&new_user.password).map_err(StorageError::Hash)?;

        let now = Utc::now();
        let user = StoredUser {
            id: id.clone(),
            email,
            name: new_user.name,
            password_hash,
            role: Role::default(),
            household_id: None,
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = self.store.write_json(self.store.paths().user(&id), &user) {
            // Roll back the index claim so the email is not wedged.
            let _ = self.store.delete(&index_path);
            return Err(e);
        }

        Ok(user)
    }

    /// Look up a user by email. Returns `None` if absent.
    pub fn find_by_email(&self, email: &str) -> StorageResult<Option<StoredUser>> {
        let email = normalize_email(email);
        let index_path = self.store.paths().email_index(&email);
        if !self.store.exists(&index_path) {
            return Ok(None);
        }

        let id = self.store.read_unique(&index_path)?;
        self.find_by_id(&id)
    }

    /// Look up a user by id. Returns `None` if absent.
    pub fn find_by_id(&self, user_id: &str) -> StorageResult<Option<StoredUser>> {
        let path = self.store.paths().user(user_id);
        if !self.store.exists(&path) {
            return Ok(None);
        }
        let user = self.store.read_json(&path)?;
        Ok(Some(user))
    }

    /// Replace the password, re-hashing the new plaintext.
    ///
    /// This is the only mutation that touches the hash field; profile updates
    /// go through `update_profile` and leave it alone.
    pub fn update_password(&self, user_id: &str, new_password: &str) -> StorageResult<StoredUser> {
        let mut user = self
            .find_by_id(user_id)?
            .ok_or_else(|| StorageError::NotFound(format!("User {user_id}")))?;

        user.password_hash = password::hash_password(new_password).map_err(StorageError::Hash)?;
        user.updated_at = Utc::now();

        self.store
            .write_json(self.store.paths().user(user_id), &user)?;
        Ok(user)
    }

    /// Update mutable profile fields without touching credentials.
    pub fn update_profile(&self, user_id: &str, name: Option<String>) -> StorageResult<StoredUser> {
        let mut user = self
            .find_by_id(user_id)?
            .ok_or_else(|| StorageError::NotFound(format!("User {user_id}")))?;

        if let Some(name) = name {
            user.name = name;
        }
        user.updated_at = Utc::now();

        self.store
            .write_json(self.store.paths().user(user_id), &user)?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoragePaths;
    use tempfile::TempDir;

    fn test_store() -> (FsStore, TempDir) {
        let dir = TempDir::new().expect("temp dir");
        let mut store = FsStore::new(StoragePaths::new(dir.path()));
        store.initialize().expect("initialize");
        (store, dir)
    }

    fn sample_user(repo: &UserRepository) -> StoredUser {
        repo.create(NewUser {
            email: "Ann@X.com ".to_string(),
            password: "secret1".to_string(),
            name: "Ann".to_string(),
        })
        .expect("create user")
    }

    #[test]
    fn create_normalizes_email_and_hashes_password() {
        let (store, _dir) = test_store();
        let repo = UserRepository::new(&store);
        let user = sample_user(&repo);

        assert_eq!(user.email, "ann@x.com");
        assert_ne!(user.password_hash, "secret1");
        assert!(password::verify_password("secret1", &user.password_hash));
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let (store, _dir) = test_store();
        let repo = UserRepository::new(&store);
        sample_user(&repo);

        // Same email with different case and whitespace still collides.
        let err = repo
            .create(NewUser {
                email: "ANN@x.com".to_string(),
                password: "other".to_string(),
                name: "Impostor".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists(_)));
    }

    #[test]
    fn concurrent_registration_has_exactly_one_winner() {
        let dir = TempDir::new().expect("temp dir");
        let barrier = std::sync::Arc::new(std::sync::Barrier::new(2));

        let handles: Vec<_> = (0..2)
            .map(|i| {
                let path = dir.path().to_path_buf();
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    let mut store = FsStore::new(StoragePaths::new(&path));
                    store.initialize().expect("initialize");
                    let repo = UserRepository::new(&store);
                    barrier.wait();
                    repo.create(NewUser {
                        email: "race@x.com".to_string(),
                        password: "secret1".to_string(),
                        name: format!("Racer {i}"),
                    })
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        // Exactly one winner, and the loser sees the conflict, never an
        // I/O error or a second success.
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(StorageError::AlreadyExists(_)))));
    }

    #[test]
    fn find_by_email_roundtrips() {
        let (store, _dir) = test_store();
        let repo = UserRepository::new(&store);
        let created = sample_user(&repo);

        let found = repo.find_by_email("ann@x.com").unwrap().unwrap();
        assert_eq!(found, created);

        assert!(repo.find_by_email("nobody@x.com").unwrap().is_none());
    }

    #[test]
    fn find_by_id_roundtrips() {
        let (store, _dir) = test_store();
        let repo = UserRepository::new(&store);
        let created = sample_user(&repo);

        let found = repo.find_by_id(&created.id).unwrap().unwrap();
        assert_eq!(found.email, "ann@x.com");
        assert!(repo.find_by_id("missing").unwrap().is_none());
    }

    #[test]
    fn update_password_rehashes() {
        let (store, _dir) = test_store();
        let repo = UserRepository::new(&store);
        let created = sample_user(&repo);

        let updated = repo.update_password(&created.id, "newsecret").unwrap();
        assert_ne!(updated.password_hash, created.password_hash);
        assert!(password::verify_password("newsecret", &updated.password_hash));
        assert!(!password::verify_password("secret1", &updated.password_hash));
    }

    #[test]
    fn update_profile_leaves_hash_alone() {
        let (store, _dir) = test_store();
        let repo = UserRepository::new(&store);
        let created = sample_user(&repo);

        let updated = repo
            .update_profile(&created.id, Some("Ann B".to_string()))
            .unwrap();
        assert_eq!(updated.name, "Ann B");
        assert_eq!(updated.password_hash, created.password_hash);
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Pocket Butler

//! Path utilities for the on-disk storage layout.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

/// Default base directory for persistent storage.
pub const DATA_ROOT: &str = "data";

/// Storage path utilities.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl Default for StoragePaths {
    fn default() -> Self {
        Self::new(DATA_ROOT)
    }
}

impl StoragePaths {
    /// Create a new StoragePaths with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory for all persistent data.
    pub fn root(&self) -> &Path {
        &self.root
    }

    // ========== User Paths ==========

    /// Directory containing all user records.
    pub fn users_dir(&self) -> PathBuf {
        self.root.join("users")
    }

    /// Path to a specific user record.
    pub fn user(&self, user_id: &str) -> PathBuf {
        self.users_dir().join(format!("{user_id}.json"))
    }

    /// Directory containing the email uniqueness index.
    ///
    /// Each file in this directory maps a normalized email (hashed, so the
    /// filename is filesystem-safe) to the owning user id. The index file is
    /// created with `create_new`, which is what makes registration races
    /// resolve to exactly one winner.
    pub fn email_index_dir(&self) -> PathBuf {
        self.users_dir().join("by_email")
    }

    /// Path to the email index entry for an already-normalized email.
    pub fn email_index(&self, normalized_email: &str) -> PathBuf {
        let digest = Sha256::digest(normalized_email.as_bytes());
        self.email_index_dir().join(hex::encode(digest))
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Pocket Butler

//! # Storage Module
//!
//! Persistent storage for user credentials, backed by plain JSON files.
//!
//! ## Storage Layout
//!
//! ```text
//! data/
//!   users/
//!     {user_id}.json        # User record (email, name, bcrypt hash, role)
//!     by_email/
//!       {sha256(email)}     # Email uniqueness index -> owning user id
//! ```
//!
//! The email index file is created atomically (`create_new`), which is what
//! turns duplicate registration into a storage-layer conflict instead of an
//! application-level check-then-act race.

pub mod fs;
pub mod paths;
pub mod repository;

pub use fs::{FsStore, StorageError, StorageResult};
pub use paths::StoragePaths;
pub use repository::{normalize_email, NewUser, StoredUser, UserRepository};

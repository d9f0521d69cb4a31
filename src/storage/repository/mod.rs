// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Pocket Butler

//! Repository layer providing typed access to on-disk storage.

pub mod users;

pub use users::{normalize_email, NewUser, StoredUser, UserRepository};

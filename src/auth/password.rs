// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Pocket Butler

//! Password hashing and verification.
//!
//! bcrypt with cost 10: adaptive, salted, self-describing hash strings.
//! Verification returns a plain bool and never errors on a malformed hash,
//! so a corrupted record behaves exactly like a wrong password.

/// bcrypt cost factor. Deliberately slow to resist brute force.
pub const BCRYPT_COST: u32 = 10;

/// Hash a password with bcrypt.
///
/// The salt is generated per call and embedded in the returned hash string.
pub fn hash_password(plain: &str) -> Result<String, String> {
    bcrypt::hash(plain, BCRYPT_COST).map_err(|e| e.to_string())
}

/// Verify a password against a stored hash.
///
/// Returns `false` on mismatch or on any malformed hash.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    bcrypt::verify(plain, hash).unwrap_or(false)
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Pocket Butler

//! # Authentication Module
//!
//! Password-credential authentication with signed session tokens.
//!
//! ## Auth Flow
//!
//! 1. Client registers or logs in with email + password
//! 2. Server verifies credentials (bcrypt) and mints two HS256 tokens:
//!    - access token, returned in the response body
//!    - refresh token, set as an HTTP-only `SameSite=Strict` cookie
//! 3. Subsequent requests carry `Authorization: Bearer <access token>`
//!    (or a `token` cookie); the `Auth` extractor verifies the token and
//!    re-resolves the user from the credential store
//! 4. The client silently renews via `/api/auth/refresh-token`; the refresh
//!    token is rotated on every successful renewal
//!
//! ## Security
//!
//! - Passwords stored only as bcrypt hashes (cost 10)
//! - Login failures never reveal whether the email exists
//! - Token verification applies no grace window
//! - Refresh tokens carry a `kind` claim and are rejected by the guard

pub mod claims;
pub mod cookie;
pub mod error;
pub mod extractor;
pub mod password;
pub mod roles;
pub mod token;

pub use claims::{AuthenticatedUser, TokenClaims, TokenKind};
pub use error::AuthError;
pub use extractor::{AdminOnly, Auth};
pub use roles::Role;
pub use token::TokenService;

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Pocket Butler

//! Axum extractors for authenticated users — the per-request session guard.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```
//!
//! Extraction order: `Authorization: Bearer <token>` header first, then the
//! `token` cookie. The verified subject is re-resolved against the credential
//! store, so a deleted account fails authorization even while its token is
//! still cryptographically valid.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::claims::TokenKind;
use super::cookie::{extract_cookie, ACCESS_COOKIE};
use super::{AuthError, AuthenticatedUser, Role};
use crate::state::AppState;
use crate::storage::UserRepository;

/// Extractor for authenticated users.
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Middleware (or a test) may have resolved the user already.
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>().cloned() {
            return Ok(Auth(user));
        }

        let token = extract_token(parts)?;

        let claims = state.tokens.verify(&token, TokenKind::Access)?;

        let repo = UserRepository::new(&state.store);
        let user = repo
            .find_by_id(&claims.sub)
            .map_err(|e| AuthError::InternalError(e.to_string()))?
            .ok_or(AuthError::UserGone)?;

        Ok(Auth(AuthenticatedUser {
            user_id: user.id,
            email: user.email,
            role: user.role,
            expires_at: claims.exp,
        }))
    }
}

/// Pull the access token out of the request.
///
/// A present-but-malformed Authorization header is an error in its own right;
/// it does not fall through to the cookie.
fn extract_token(parts: &Parts) -> Result<String, AuthError> {
    if let Some(header) = parts.headers.get(AUTHORIZATION) {
        let value = header.to_str().map_err(|_| AuthError::InvalidAuthHeader)?;
        let token = value
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidAuthHeader)?;
        return Ok(token.trim().to_string());
    }

    extract_cookie(&parts.headers, ACCESS_COOKIE).ok_or(AuthError::MissingToken)
}

/// Extractor that requires admin role.
///
/// The check runs against the role stored on the account record, not a token
/// claim, so a demotion takes effect on the next request.
pub struct AdminOnly(pub AuthenticatedUser);

impl FromRequestParts<AppState> for AdminOnly {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Auth(user) = Auth::from_request_parts(parts, state).await?;

        if !user.has_role(Role::Admin) {
            return Err(AuthError::InsufficientPermissions);
        }

        Ok(AdminOnly(user))
    }
}

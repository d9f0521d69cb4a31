// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Pocket Butler

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Authentication error type.
///
/// Login failures collapse to `InvalidCredentials` regardless of whether the
/// email exists, and verification failures all surface as 401 without telling
/// the caller whether the token was malformed or merely expired.
#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    /// No token in the Authorization header or `token` cookie
    MissingToken,
    /// Malformed Authorization header
    InvalidAuthHeader,
    /// Token is malformed
    MalformedToken,
    /// Token signature is invalid
    InvalidSignature,
    /// Token has expired
    TokenExpired,
    /// Token kind does not match the operation (refresh where access expected, or vice versa)
    WrongTokenKind,
    /// Email/password pair did not match any account
    InvalidCredentials,
    /// No refresh-token cookie on a refresh request
    NoRefreshToken,
    /// Refresh-token cookie failed verification
    InvalidRefreshToken,
    /// Token subject no longer exists in the credential store
    UserGone,
    /// Insufficient permissions
    InsufficientPermissions,
    /// Internal error
    InternalError(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    success: bool,
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "not_authorized",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::MalformedToken => "invalid_token",
            AuthError::InvalidSignature => "invalid_token",
            AuthError::TokenExpired => "invalid_token",
            AuthError::WrongTokenKind => "invalid_token",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::NoRefreshToken => "no_refresh_token",
            AuthError::InvalidRefreshToken => "invalid_refresh_token",
            AuthError::UserGone => "not_authorized",
            AuthError::InsufficientPermissions => "insufficient_permissions",
            AuthError::InternalError(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    ///
    /// A vanished user is 401 here, not 404: authorization failures never
    /// leak resource-existence distinctions.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingToken
            | AuthError::InvalidAuthHeader
            | AuthError::MalformedToken
            | AuthError::InvalidSignature
            | AuthError::TokenExpired
            | AuthError::WrongTokenKind
            | AuthError::InvalidCredentials
            | AuthError::NoRefreshToken
            | AuthError::InvalidRefreshToken
            | AuthError::UserGone => StatusCode::UNAUTHORIZED,
            AuthError::InsufficientPermissions => StatusCode::FORBIDDEN,
            AuthError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingToken => write!(f, "Not authorized"),
            AuthError::InvalidAuthHeader => {
                write!(f, "Invalid authorization header format (expected 'Bearer <token>')")
            }
            // Same user-facing message for every verification failure.
            AuthError::MalformedToken
            | AuthError::InvalidSignature
            | AuthError::TokenExpired
            | AuthError::WrongTokenKind => write!(f, "Invalid or expired token"),
            AuthError::InvalidCredentials => write!(f, "Invalid email or password"),
            AuthError::NoRefreshToken => write!(f, "No refresh token provided"),
            AuthError::InvalidRefreshToken => write!(f, "Invalid or expired refresh token"),
            AuthError::UserGone => write!(f, "Not authorized"),
            AuthError::InsufficientPermissions => {
                write!(f, "Insufficient permissions for this operation")
            }
            AuthError::InternalError(msg) => write!(f, "Internal authentication error: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Internal detail stays in the logs, never on the wire.
        let error = if let AuthError::InternalError(detail) = &self {
            tracing::error!(%detail, "internal authentication error");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        let body = Json(AuthErrorBody {
            success: false,
            error,
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn missing_token_returns_401() {
        let response = AuthError::MissingToken.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error_code"], "not_authorized");
    }

    #[tokio::test]
    async fn insufficient_permissions_returns_403() {
        let response = AuthError::InsufficientPermissions.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn verification_failures_share_one_message() {
        // Malformed vs expired must be indistinguishable to the caller.
        assert_eq!(
            AuthError::MalformedToken.to_string(),
            AuthError::TokenExpired.to_string()
        );
        assert_eq!(
            AuthError::InvalidSignature.to_string(),
            AuthError::WrongTokenKind.to_string()
        );
    }

    #[test]
    fn vanished_user_is_401_not_404() {
        assert_eq!(AuthError::UserGone.status_code(), StatusCode::UNAUTHORIZED);
    }
}

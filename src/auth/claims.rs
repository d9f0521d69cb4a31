// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Pocket Butler

//! JWT claims and authenticated user representation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::roles::Role;

/// Which kind of session token a payload belongs to.
///
/// Access and refresh tokens share one signing secret; the `kind` claim is
/// what stops a refresh token from passing the session guard (and an access
/// token from minting new tokens).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived token proving identity for individual API calls
    Access,
    /// Long-lived token, transported only via the HTTP-only cookie,
    /// used solely to mint new access tokens
    Refresh,
}

/// Claims embedded in every signed token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user ID)
    pub sub: String,

    /// Subject email at issuance time
    pub email: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// Access or refresh
    pub kind: TokenKind,

    /// Unique token id; two tokens minted in the same second still differ
    pub jti: String,
}

/// Authenticated user information attached to a request.
///
/// Produced by the session guard after token verification *and* a credential
/// store lookup, so the role always reflects the stored record, not a stale
/// token claim.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Canonical user ID (token `sub` claim)
    pub user_id: String,

    /// User's email
    pub email: String,

    /// User's role, as currently stored
    pub role: Role,

    /// Token expiration (Unix timestamp, used for logging, not serialized)
    #[serde(skip)]
    pub expires_at: i64,
}

impl AuthenticatedUser {
    /// Check if the user has the required role.
    pub fn has_role(&self, required: Role) -> bool {
        self.role.has_privilege(required)
    }

    /// Check if this user is an admin.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(role: Role) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: "user_123".to_string(),
            email: "ann@x.com".to_string(),
            role,
            expires_at: 1_700_003_600,
        }
    }

    #[test]
    fn has_role_checks_privilege() {
        let admin = sample_user(Role::Admin);
        assert!(admin.has_role(Role::Admin));
        assert!(admin.has_role(Role::User));

        let user = sample_user(Role::User);
        assert!(!user.has_role(Role::Admin));
        assert!(user.has_role(Role::User));
    }

    #[test]
    fn token_kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TokenKind::Access).unwrap(),
            r#""access""#
        );
        assert_eq!(
            serde_json::to_string(&TokenKind::Refresh).unwrap(),
            r#""refresh""#
        );
    }

    #[test]
    fn expires_at_is_not_serialized() {
        let json = serde_json::to_value(sample_user(Role::User)).unwrap();
        assert!(json.get("expires_at").is_none());
        assert_eq!(json["user_id"], "user_123");
    }
}

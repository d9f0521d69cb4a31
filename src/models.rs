// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Pocket Butler

//! # API Data Models
//!
//! Request and response structures for the auth API. All types derive
//! `Serialize`/`Deserialize` and `ToSchema` for JSON handling and OpenAPI
//! documentation.
//!
//! [`PublicUser`] is the only outward user representation. It has no password
//! field at all, so no success path can serialize a hash.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::Role;
use crate::storage::StoredUser;

/// Public view of a user account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct PublicUser {
    /// Unique user identifier
    pub id: String,
    /// Email (normalized)
    pub email: String,
    /// Display name
    pub name: String,
    /// Authorization role
    pub role: Role,
    /// When the account was created
    pub created_at: DateTime<Utc>,
}

impl From<StoredUser> for PublicUser {
    fn from(user: StoredUser) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// Body for POST /api/auth/register
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Body for POST /api/auth/login
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body for POST /api/auth/reset-password
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ResetPasswordRequest {
    pub email: String,
}

/// Payload for successful register/login: the user plus an access token.
/// The refresh token travels separately in the HTTP-only cookie.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthPayload {
    pub user: PublicUser,
    pub token: String,
}

/// Payload for a successful refresh: a new access token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenPayload {
    pub token: String,
}

/// The uniform response envelope.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Free-form extras (pagination and the like); none of the auth
    /// endpoints populate it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

impl<T> Envelope<T> {
    /// Success envelope with data.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
            meta: None,
        }
    }

    /// Success envelope with a message and no data.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            error: None,
            meta: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_stored_user() -> StoredUser {
        StoredUser {
            id: "user-1".to_string(),
            email: "ann@x.com".to_string(),
            name: "Ann".to_string(),
            password_hash: "$2b$10$abcdefghijklmnopqrstuv".to_string(),
            role: Role::User,
            household_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn public_user_drops_the_hash() {
        let public: PublicUser = sample_stored_user().into();
        let json = serde_json::to_value(&public).unwrap();

        assert_eq!(json["email"], "ann@x.com");
        assert!(json.get("password").is_none());
        assert!(json.get("password_hash").is_none());
        assert!(!json.to_string().contains("$2b$"));
    }

    #[test]
    fn auth_payload_serializes_user_and_token() {
        let payload = AuthPayload {
            user: sample_stored_user().into(),
            token: "jwt-here".to_string(),
        };
        let json = serde_json::to_value(Envelope::ok(payload)).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["token"], "jwt-here");
        assert_eq!(json["data"]["user"]["name"], "Ann");
    }

    #[test]
    fn message_envelope_omits_data() {
        let env: Envelope<()> = Envelope::message("Logged out");
        let json = serde_json::to_value(env).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Logged out");
        assert!(json.get("data").is_none());
    }
}

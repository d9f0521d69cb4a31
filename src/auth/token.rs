// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Pocket Butler

//! Token issuance and verification.
//!
//! Both token kinds are HS256-signed with the single server-held secret and
//! carry `{sub, email, iat, exp, kind, jti}`. Lifetimes are independently
//! configurable; verification applies no grace window.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use super::claims::{TokenClaims, TokenKind};
use super::error::AuthError;

/// Issues and verifies the signed session tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    /// Create a token service from the signing secret and the two lifetimes.
    pub fn new(secret: &str, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl,
            refresh_ttl,
        }
    }

    /// Access-token lifetime.
    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Refresh-token lifetime (also the cookie Max-Age).
    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Mint a short-lived access token for a user.
    pub fn issue_access(&self, user_id: &str, email: &str) -> Result<String, AuthError> {
        self.issue(user_id, email, TokenKind::Access, self.access_ttl)
    }

    /// Mint a long-lived refresh token for a user.
    pub fn issue_refresh(&self, user_id: &str, email: &str) -> Result<String, AuthError> {
        self.issue(user_id, email, TokenKind::Refresh, self.refresh_ttl)
    }

    fn issue(
        &self,
        user_id: &str,
        email: &str,
        kind: TokenKind,
        ttl: Duration,
    ) -> Result<String, AuthError> {
        let now = unix_now();
        let claims = TokenClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now,
            exp: now + ttl.as_secs() as i64,
            kind,
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AuthError::InternalError(e.to_string()))
    }

    /// Verify a token's signature, expiry, and kind, returning its claims.
    ///
    /// No leeway: a token is rejected the second its `exp` passes.
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<TokenClaims, AuthError> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        let data =
            decode::<TokenClaims>(token, &self.decoding, &validation).map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::MalformedToken,
            })?;

        if data.claims.kind != expected {
            return Err(AuthError::WrongTokenKind);
        }

        Ok(data.claims)
    }
}

/// Decode a token's claims without verifying the signature.
///
/// For display and scheduling only (the client sizes its renewal interval
/// from `iat`/`exp`). Never an authorization decision; the server re-verifies
/// every request.
pub fn decode_claims_unverified(token: &str) -> Result<TokenClaims, AuthError> {
    let data = jsonwebtoken::dangerous::insecure_decode::<TokenClaims>(token)
        .map_err(|_| AuthError::MalformedToken)?;
    Ok(data.claims)
}

/// Current Unix timestamp in seconds.
pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> TokenService {
        TokenService::new(
            "test-secret",
            Duration::from_secs(900),
            Duration::from_secs(30 * 24 * 3600),
        )
    }

    #[test]
    fn issue_and_verify_access_token() {
        let svc = test_service();
        let token = svc.issue_access("user-1", "ann@x.com").unwrap();
        let claims = svc.verify(&token, TokenKind::Access).unwrap();

        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email, "ann@x.com");
        assert_eq!(claims.kind, TokenKind::Access);
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn refresh_token_rejected_as_access() {
        let svc = test_service();
        let refresh = svc.issue_refresh("user-1", "ann@x.com").unwrap();
        let err = svc.verify(&refresh, TokenKind::Access).unwrap_err();
        assert_eq!(err, AuthError::WrongTokenKind);

        // And the other way round.
        let access = svc.issue_access("user-1", "ann@x.com").unwrap();
        let err = svc.verify(&access, TokenKind::Refresh).unwrap_err();
        assert_eq!(err, AuthError::WrongTokenKind);
    }

    #[test]
    fn wrong_secret_fails_verification() {
        let svc = test_service();
        let other = TokenService::new(
            "other-secret",
            Duration::from_secs(900),
            Duration::from_secs(900),
        );

        let token = svc.issue_access("user-1", "ann@x.com").unwrap();
        let err = other.verify(&token, TokenKind::Access).unwrap_err();
        assert_eq!(err, AuthError::InvalidSignature);
    }

    #[test]
    fn expired_token_is_rejected() {
        // Zero TTL: the token is already at its expiry boundary.
        let svc = TokenService::new(
            "test-secret",
            Duration::from_secs(0),
            Duration::from_secs(0),
        );
        let token = svc.issue_access("user-1", "ann@x.com").unwrap();

        // With no leeway an exp in the past (or now) must fail.
        std::thread::sleep(Duration::from_millis(1100));
        let err = svc.verify(&token, TokenKind::Access).unwrap_err();
        assert_eq!(err, AuthError::TokenExpired);
    }

    #[test]
    fn token_accepted_before_expiry() {
        let svc = TokenService::new(
            "test-secret",
            Duration::from_secs(5),
            Duration::from_secs(5),
        );
        let token = svc.issue_access("user-1", "ann@x.com").unwrap();
        assert!(svc.verify(&token, TokenKind::Access).is_ok());
    }

    #[test]
    fn tokens_minted_in_the_same_second_differ() {
        let svc = test_service();
        let a = svc.issue_access("user-1", "ann@x.com").unwrap();
        let b = svc.issue_access("user-1", "ann@x.com").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn garbage_token_is_malformed() {
        let svc = test_service();
        let err = svc.verify("not.a.token", TokenKind::Access).unwrap_err();
        assert_eq!(err, AuthError::MalformedToken);
    }

    #[test]
    fn unverified_decode_exposes_schedule_claims() {
        let svc = test_service();
        let token = svc.issue_access("user-1", "ann@x.com").unwrap();
        let claims = decode_claims_unverified(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, 900);
    }
}

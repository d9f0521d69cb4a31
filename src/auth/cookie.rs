// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Pocket Butler

//! Refresh-token cookie handling.
//!
//! The refresh token only ever travels in an HTTP-only cookie scoped to the
//! auth routes. `Secure` is added in production; development stays plain so
//! local HTTP clients work.

use std::time::Duration;

use axum::http::HeaderMap;

/// Cookie carrying the refresh token.
pub const REFRESH_COOKIE: &str = "refreshToken";

/// Fallback cookie for the access token, checked after the Authorization
/// header by the session guard.
pub const ACCESS_COOKIE: &str = "token";

/// Cookie path: the refresh token is only useful on the auth routes.
const COOKIE_PATH: &str = "/api/auth";

/// Build the `Set-Cookie` value that installs a refresh token.
pub fn build_refresh_cookie(token: &str, max_age: Duration, secure: bool) -> String {
    let mut cookie = format!(
        "{REFRESH_COOKIE}={token}; Path={COOKIE_PATH}; Max-Age={}; HttpOnly; SameSite=Strict",
        max_age.as_secs()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Build the `Set-Cookie` value that clears the refresh token (immediate expiry).
pub fn clear_refresh_cookie(secure: bool) -> String {
    let mut cookie =
        format!("{REFRESH_COOKIE}=; Path={COOKIE_PATH}; Max-Age=0; HttpOnly; SameSite=Strict");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Extract a named cookie from the request headers.
///
/// Handles multiple `Cookie` headers and `; `-separated pairs; returns the
/// first match.
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    for header in headers.get_all(axum::http::header::COOKIE) {
        let Ok(raw) = header.to_str() else { continue };
        for pair in raw.split(';') {
            let pair = pair.trim();
            if let Some((key, value)) = pair.split_once('=') {
                if key == name && !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::COOKIE;

    #[test]
    fn refresh_cookie_has_required_attributes() {
        let cookie = build_refresh_cookie("abc.def.ghi", Duration::from_secs(2_592_000), false);
        assert!(cookie.starts_with("refreshToken=abc.def.ghi;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.contains("Max-Age=2592000"));
        assert!(cookie.contains("Path=/api/auth"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn secure_flag_only_in_production() {
        let cookie = build_refresh_cookie("t", Duration::from_secs(60), true);
        assert!(cookie.ends_with("; Secure"));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let cookie = clear_refresh_cookie(false);
        assert!(cookie.starts_with("refreshToken=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn extract_finds_named_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, "a=1; refreshToken=tok123; b=2".parse().unwrap());

        assert_eq!(
            extract_cookie(&headers, REFRESH_COOKIE),
            Some("tok123".to_string())
        );
        assert_eq!(extract_cookie(&headers, "a"), Some("1".to_string()));
        assert_eq!(extract_cookie(&headers, "missing"), None);
    }

    #[test]
    fn extract_ignores_empty_values() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, "refreshToken=".parse().unwrap());
        assert_eq!(extract_cookie(&headers, REFRESH_COOKIE), None);
    }

    #[test]
    fn extract_scans_multiple_cookie_headers() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, "a=1".parse().unwrap());
        headers.append(COOKIE, "token=tok".parse().unwrap());
        assert_eq!(
            extract_cookie(&headers, ACCESS_COOKIE),
            Some("tok".to_string())
        );
    }
}

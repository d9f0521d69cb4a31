// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Pocket Butler

//! Thin HTTP client for the auth endpoints.
//!
//! The reqwest client is built with a cookie jar so the HTTP-only refresh
//! cookie set by register/login rides along automatically on
//! `/api/auth/refresh-token`. Callers never see the refresh token.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::models::{AuthPayload, Envelope, PublicUser, TokenPayload};

use super::ClientError;

/// HTTP client bound to one server.
pub struct AuthApi {
    http: reqwest::Client,
    base_url: String,
}

impl AuthApi {
    /// Build a client for `base_url` (no trailing slash, e.g.
    /// `http://127.0.0.1:8080`).
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthPayload, ClientError> {
        let response = self
            .http
            .post(self.url("/api/auth/register"))
            .json(&json!({ "name": name, "email": email, "password": password }))
            .send()
            .await?;
        expect_data(response).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthPayload, ClientError> {
        let response = self
            .http
            .post(self.url("/api/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        expect_data(response).await
    }

    /// Trade the refresh cookie for a new access token. The rotated refresh
    /// cookie is absorbed by the jar.
    pub async fn refresh(&self) -> Result<TokenPayload, ClientError> {
        let response = self
            .http
            .post(self.url("/api/auth/refresh-token"))
            .send()
            .await?;
        expect_data(response).await
    }

    pub async fn profile(&self, access_token: &str) -> Result<PublicUser, ClientError> {
        let response = self
            .http
            .get(self.url("/api/auth/profile"))
            .bearer_auth(access_token)
            .send()
            .await?;
        expect_data(response).await
    }

    pub async fn logout(&self, access_token: &str) -> Result<(), ClientError> {
        let response = self
            .http
            .post(self.url("/api/auth/logout"))
            .bearer_auth(access_token)
            .send()
            .await?;
        expect_success::<()>(response).await.map(|_| ())
    }

    pub async fn reset_password(&self, email: &str) -> Result<String, ClientError> {
        let response = self
            .http
            .post(self.url("/api/auth/reset-password"))
            .json(&json!({ "email": email }))
            .send()
            .await?;
        let envelope = expect_success::<()>(response).await?;
        Ok(envelope.message.unwrap_or_default())
    }
}

/// Parse a response that must be a success envelope, mapping error
/// envelopes to [`ClientError::Api`].
async fn expect_success<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<Envelope<T>, ClientError> {
    let status = response.status();
    if !status.is_success() {
        return Err(api_error(status, response).await);
    }
    Ok(response.json::<Envelope<T>>().await?)
}

/// Like [`expect_success`] but additionally requires a `data` payload.
async fn expect_data<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let envelope = expect_success::<T>(response).await?;
    envelope.data.ok_or(ClientError::Api {
        status: 200,
        message: "response envelope had no data".to_string(),
    })
}

async fn api_error(status: StatusCode, response: reqwest::Response) -> ClientError {
    // The body may be an error envelope, a validation envelope, or (from a
    // proxy) not JSON at all.
    let message = match response.json::<Envelope<serde_json::Value>>().await {
        Ok(envelope) => envelope
            .error
            .or(envelope.message)
            .unwrap_or_else(|| format!("server returned {status}")),
        Err(_) => format!("server returned {status}"),
    };
    ClientError::Api {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_base_and_path() {
        let api = AuthApi::new("http://127.0.0.1:9999").unwrap();
        assert_eq!(
            api.url("/api/auth/login"),
            "http://127.0.0.1:9999/api/auth/login"
        );
    }

    #[tokio::test]
    async fn connection_failure_maps_to_http_error() {
        // Nothing listens on this port.
        let api = AuthApi::new("http://127.0.0.1:1").unwrap();
        let err = api.login("a@b.com", "secret1").await.unwrap_err();
        assert!(matches!(err, ClientError::Http(_)));
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Pocket Butler

//! Client-side session handling.
//!
//! Three layers, lowest first:
//!
//! | Layer                          | Responsibility                          |
//! |--------------------------------|-----------------------------------------|
//! | [`api::AuthApi`]               | HTTP calls, cookie jar, envelope parsing |
//! | [`token_store::TokenStore`]    | Access-token persistence                 |
//! | [`session::SessionClient`]     | State machine and timer-driven renewal   |
//!
//! The refresh token never touches [`token_store::TokenStore`]: it lives in
//! the HTTP-only cookie jar inside the reqwest client and is invisible to
//! the rest of the process.

use thiserror::Error;

pub mod api;
pub mod session;
pub mod token_store;

pub use api::AuthApi;
pub use session::{SessionClient, SessionState};
pub use token_store::{KeyringTokenStore, MemoryTokenStore, TokenStore};

/// Errors surfaced by the client stack.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure (connection refused, timeout, bad TLS).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an error envelope.
    #[error("{message}")]
    Api {
        status: u16,
        message: String,
    },

    /// The access token could not be parsed.
    #[error("malformed access token")]
    MalformedToken,

    /// The OS keyring (or other token store) failed.
    #[error("token store error: {0}")]
    Store(String),

    /// The refresh token was rejected; the user must log in again.
    #[error("Session expired")]
    SessionExpired,
}

impl ClientError {
    /// True when the server said 401, meaning the session is unrecoverable
    /// without a fresh login.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Api { status: 401, .. })
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Pocket Butler

//! Session controller: owns the access token, the signed-in user, and the
//! background renewal timer.
//!
//! ## Renewal
//!
//! After every successful login/register/refresh the controller reads the
//! token's own `iat`/`exp` claims (unverified; the client has no key and
//! does not need one for scheduling) and arms a timer at 80% of the token
//! lifetime. When it fires, the refresh endpoint rotates the session. A
//! rejected refresh means the session is gone: state is cleared and
//! `last_error` is set to "Session expired".
//!
//! ## Staleness
//!
//! Every state-changing operation bumps a generation counter and the timer
//! is re-armed with a fresh cancellation token. A completion (timer fire or
//! awaited response) whose generation no longer matches is discarded, so a
//! logout racing a renewal can never resurrect the old session.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex,
};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::auth::token::decode_claims_unverified;
use crate::models::PublicUser;

use super::{api::AuthApi, token_store::TokenStore, ClientError};

/// How long to wait before retrying a renewal that failed at the transport
/// level (server rejections never retry; they end the session).
const RENEWAL_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Snapshot of the client session.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub access_token: Option<String>,
    pub user: Option<PublicUser>,
    pub is_loading: bool,
    pub last_error: Option<String>,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some() && self.user.is_some()
    }
}

struct SessionInner {
    api: AuthApi,
    store: Arc<dyn TokenStore>,
    state: Mutex<SessionState>,
    generation: AtomicU64,
    renewal: Mutex<Option<CancellationToken>>,
}

/// Handle to the session controller. Cheap to clone; all clones share state.
#[derive(Clone)]
pub struct SessionClient {
    inner: Arc<SessionInner>,
}

impl SessionClient {
    pub fn new(api: AuthApi, store: Arc<dyn TokenStore>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                api,
                store,
                state: Mutex::new(SessionState::default()),
                generation: AtomicU64::new(0),
                renewal: Mutex::new(None),
            }),
        }
    }

    /// Current session snapshot.
    pub fn state(&self) -> SessionState {
        self.inner.state.lock().unwrap().clone()
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<(), ClientError> {
        let generation = self.begin();
        let result = self.inner.api.login(email, password).await;
        match result {
            Ok(payload) => {
                self.apply_session(generation, payload.token, Some(payload.user));
                Ok(())
            }
            Err(e) => {
                self.apply_error(generation, &e);
                Err(e)
            }
        }
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<(), ClientError> {
        let generation = self.begin();
        let result = self.inner.api.register(name, email, password).await;
        match result {
            Ok(payload) => {
                self.apply_session(generation, payload.token, Some(payload.user));
                Ok(())
            }
            Err(e) => {
                self.apply_error(generation, &e);
                Err(e)
            }
        }
    }

    /// Log out locally and best-effort on the server. Local state is cleared
    /// even when the server call fails.
    pub async fn logout(&self) {
        let generation = self.begin();
        self.cancel_renewal();

        let token = self.inner.state.lock().unwrap().access_token.clone();
        if let Some(token) = token {
            if let Err(e) = self.inner.api.logout(&token).await {
                tracing::debug!(error = %e, "server-side logout failed");
            }
        }

        if let Err(e) = self.inner.store.clear() {
            tracing::warn!(error = %e, "failed to clear token store");
        }
        if self.is_current(generation) {
            *self.inner.state.lock().unwrap() = SessionState::default();
        }
    }

    /// Boot-time check: restore a persisted session if one is still usable,
    /// otherwise end up cleanly logged out. Never surfaces an error.
    pub async fn check_auth_status(&self) {
        let generation = self.begin();

        let stored = match self.inner.store.get() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "token store unavailable");
                None
            }
        };

        let token = match stored {
            // No stored token means no session to restore; the cookie jar is
            // never consulted on its own.
            None => {
                if self.is_current(generation) {
                    *self.inner.state.lock().unwrap() = SessionState::default();
                }
                return;
            }
            Some(token) if !is_expired(&token) => token,
            // Stored but expired: the jar may still hold a live refresh
            // token from this process, so try one rotation before giving up.
            Some(_) => match self.inner.api.refresh().await {
                Ok(payload) => payload.token,
                Err(_) => {
                    let _ = self.inner.store.clear();
                    if self.is_current(generation) {
                        *self.inner.state.lock().unwrap() = SessionState::default();
                    }
                    return;
                }
            },
        };

        match self.inner.api.profile(&token).await {
            Ok(user) => self.apply_session(generation, token, Some(user)),
            Err(_) => {
                let _ = self.inner.store.clear();
                if self.is_current(generation) {
                    *self.inner.state.lock().unwrap() = SessionState::default();
                }
            }
        }
    }

    /// Fire-and-forget password reset request. Touches only the loading
    /// flag; messaging is the caller's responsibility.
    pub async fn reset_password(&self, email: &str) -> Result<String, ClientError> {
        {
            let mut state = self.inner.state.lock().unwrap();
            state.is_loading = true;
        }
        let result = self.inner.api.reset_password(email).await;
        {
            let mut state = self.inner.state.lock().unwrap();
            state.is_loading = false;
        }
        result
    }

    /// Rotate the session now. Used by the renewal timer and available to
    /// callers that just got a 401 on a short-lived token.
    ///
    /// Any server rejection (401, 404, anything else the API answers with)
    /// means the session is unrecoverable: state is cleared and the caller
    /// sees "Session expired". A transport failure keeps the session and
    /// re-arms a short retry timer instead, so a network blip does not log
    /// the user out but also does not leave the renewal loop dead.
    pub async fn refresh_now(&self) -> Result<(), ClientError> {
        let generation = self.current_generation();
        match self.inner.api.refresh().await {
            Ok(payload) => {
                // Keep the signed-in user; only the token changes.
                let user = self.inner.state.lock().unwrap().user.clone();
                self.apply_session(generation, payload.token, user);
                Ok(())
            }
            Err(e @ ClientError::Http(_)) => {
                tracing::debug!(error = %e, "token renewal hit a transport failure, will retry");
                self.arm_timer(RENEWAL_RETRY_DELAY, generation);
                Err(e)
            }
            Err(_) => {
                self.expire_session(generation);
                Err(ClientError::SessionExpired)
            }
        }
    }

    fn begin(&self) -> u64 {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let mut state = self.inner.state.lock().unwrap();
        state.is_loading = true;
        state.last_error = None;
        generation
    }

    fn current_generation(&self) -> u64 {
        self.inner.generation.load(Ordering::SeqCst)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.current_generation() == generation
    }

    fn apply_session(&self, generation: u64, token: String, user: Option<PublicUser>) {
        if !self.is_current(generation) {
            tracing::debug!(generation, "discarding stale session update");
            return;
        }

        if let Err(e) = self.inner.store.set(&token) {
            tracing::warn!(error = %e, "failed to persist access token");
        }

        {
            let mut state = self.inner.state.lock().unwrap();
            state.access_token = Some(token.clone());
            if user.is_some() {
                state.user = user;
            }
            state.is_loading = false;
            state.last_error = None;
        }

        self.arm_renewal(&token, generation);
    }

    fn apply_error(&self, generation: u64, error: &ClientError) {
        if !self.is_current(generation) {
            return;
        }
        let mut state = self.inner.state.lock().unwrap();
        state.is_loading = false;
        state.last_error = Some(error.to_string());
    }

    fn expire_session(&self, generation: u64) {
        self.cancel_renewal();
        let _ = self.inner.store.clear();
        if self.is_current(generation) {
            let mut state = self.inner.state.lock().unwrap();
            *state = SessionState::default();
            state.last_error = Some("Session expired".to_string());
        }
    }

    fn cancel_renewal(&self) {
        if let Some(token) = self.inner.renewal.lock().unwrap().take() {
            token.cancel();
        }
    }

    /// Arm (or re-arm) the renewal timer for a freshly issued token.
    fn arm_renewal(&self, access_token: &str, generation: u64) {
        let Some(delay) = renewal_delay(access_token) else {
            tracing::debug!("token has no usable lifetime; renewal timer not armed");
            return;
        };
        self.arm_timer(delay, generation);
    }

    /// Arm a one-shot timer that attempts a refresh after `delay`. Replaces
    /// (and cancels) any timer already armed, so only one is ever live.
    fn arm_timer(&self, delay: Duration, generation: u64) {
        let cancel = CancellationToken::new();
        {
            let mut slot = self.inner.renewal.lock().unwrap();
            if let Some(previous) = slot.replace(cancel.clone()) {
                previous.cancel();
            }
        }

        let client = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    if !client.is_current(generation) {
                        return;
                    }
                    if let Err(e) = client.refresh_now().await {
                        tracing::debug!(error = %e, "scheduled renewal failed");
                    }
                }
            }
        });
    }
}

/// When to renew: 80% of the token's own lifetime. `None` when the token is
/// unreadable or its lifetime is zero.
fn renewal_delay(token: &str) -> Option<Duration> {
    let claims = decode_claims_unverified(token).ok()?;
    let lifetime = claims.exp.saturating_sub(claims.iat).max(0) as u64;
    if lifetime == 0 {
        return None;
    }
    Some(Duration::from_secs(lifetime * 4 / 5))
}

/// True when the token's `exp` is in the past (or the token is unreadable).
fn is_expired(token: &str) -> bool {
    match decode_claims_unverified(token) {
        Ok(claims) => claims.exp <= crate::auth::token::unix_now(),
        Err(_) => true,
    }
}

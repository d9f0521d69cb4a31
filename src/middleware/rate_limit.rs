// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Pocket Butler

//! Per-IP fixed-window rate limiting for the auth routes.
//!
//! Enforced server-side; a self-limiting client is not a security control.
//! Window and budget come from [`crate::config::AppConfig`]
//! (default 100 requests per 60 seconds).

use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::state::AppState;

/// Request counter for one client within the current window.
#[derive(Debug)]
pub struct RateLimitEntry {
    requests: u32,
    window_start: Instant,
}

#[derive(Serialize)]
struct RateLimitBody {
    success: bool,
    error: String,
}

/// Rate limiter middleware.
pub async fn rate_limit(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    // Proxied deployments forward the client address; direct connections
    // fall back to a single shared bucket.
    let client_ip = request
        .headers()
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let max_requests = state.config.rate_limit_max;
    let window = state.config.rate_limit_window;

    let mut entry = state
        .rate_limits
        .entry(client_ip)
        .or_insert_with(|| RateLimitEntry {
            requests: 0,
            window_start: Instant::now(),
        });

    if entry.window_start.elapsed() > window {
        entry.requests = 0;
        entry.window_start = Instant::now();
    }

    if entry.requests >= max_requests {
        drop(entry);
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(RateLimitBody {
                success: false,
                error: "Too many requests, please try again later".to_string(),
            }),
        )
            .into_response();
    }

    entry.requests += 1;
    drop(entry);

    next.run(request).await
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Pocket Butler

//! HTTP surface: route table, OpenAPI document, and the middleware stack.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::Role,
    middleware::rate_limit::rate_limit,
    models::{
        AuthPayload, LoginRequest, PublicUser, RegisterRequest, ResetPasswordRequest, TokenPayload,
    },
    state::AppState,
    validation::FieldError,
};

pub mod auth;
pub mod health;

pub fn router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/refresh-token", post(auth::refresh))
        .route("/reset-password", post(auth::reset_password))
        .route("/profile", get(auth::profile))
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit));

    Router::new()
        .nest("/api/auth", auth_routes)
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register,
        auth::login,
        auth::logout,
        auth::refresh,
        auth::profile,
        auth::reset_password,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            PublicUser,
            Role,
            RegisterRequest,
            LoginRequest,
            ResetPasswordRequest,
            AuthPayload,
            TokenPayload,
            FieldError,
            health::HealthResponse,
            health::ReadyResponse,
            health::HealthChecks
        )
    ),
    tags(
        (name = "Auth", description = "Registration, login, and session tokens"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;

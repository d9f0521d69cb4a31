// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Pocket Butler

//! Authentication endpoints: the register/login/refresh/logout state machine.

use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    auth::{
        cookie::{build_refresh_cookie, clear_refresh_cookie, extract_cookie, REFRESH_COOKIE},
        password, Auth, AuthError, TokenKind,
    },
    error::ApiError,
    models::{
        AuthPayload, Envelope, LoginRequest, PublicUser, RegisterRequest, ResetPasswordRequest,
        TokenPayload,
    },
    state::AppState,
    storage::{NewUser, StorageError, UserRepository},
    validation::Validator,
};

/// Register a new account.
///
/// On success the refresh token is set as an HTTP-only cookie and the access
/// token is returned in the body.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthPayload),
        (status = 400, description = "Email already in use"),
        (status = 422, description = "Validation failed"),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Response, ApiError> {
    let mut validator = Validator::new();
    validator
        .required("name", &request.name)
        .email("email", &request.email)
        .password("password", &request.password);
    validator.finish().map_err(ApiError::validation)?;

    let repo = UserRepository::new(&state.store);
    let user = repo
        .create(NewUser {
            email: request.email,
            password: request.password,
            name: request.name.trim().to_string(),
        })
        .map_err(|e| match e {
            // Registration inherently confirms existence; an explicit
            // message is acceptable here, unlike login.
            StorageError::AlreadyExists(_) => ApiError::bad_request("Email already in use"),
            other => ApiError::from(other),
        })?;

    tracing::info!(user_id = %user.id, "account registered");

    let (payload, cookie) = issue_session(&state, &user.id, &user.email, user.clone())?;
    Ok((
        StatusCode::CREATED,
        [(SET_COOKIE, cookie)],
        Json(Envelope::ok(payload)),
    )
        .into_response())
}

/// Log in with email and password.
///
/// An unknown email and a wrong password produce byte-identical 401
/// responses; login never confirms account existence.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthPayload),
        (status = 401, description = "Invalid credentials"),
        (status = 422, description = "Validation failed"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let mut validator = Validator::new();
    validator
        .email("email", &request.email)
        .password("password", &request.password);
    validator.finish().map_err(ApiError::validation)?;

    let repo = UserRepository::new(&state.store);
    let user = repo
        .find_by_email(&request.email)?
        .ok_or(AuthError::InvalidCredentials)?;

    if !password::verify_password(&request.password, &user.password_hash) {
        tracing::warn!(user_id = %user.id, "login failed: wrong password");
        return Err(AuthError::InvalidCredentials.into());
    }

    tracing::info!(user_id = %user.id, "login succeeded");

    let (payload, cookie) = issue_session(&state, &user.id, &user.email, user.clone())?;
    Ok((
        StatusCode::OK,
        [(SET_COOKIE, cookie)],
        Json(Envelope::ok(payload)),
    )
        .into_response())
}

/// Log out: clear the refresh-token cookie.
///
/// Stateless otherwise; tokens expire on their own (there is no server-side
/// revocation list).
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Logged out, refresh cookie cleared"),
        (status = 401, description = "Not authorized"),
    )
)]
pub async fn logout(Auth(user): Auth, State(state): State<AppState>) -> Response {
    tracing::info!(user_id = %user.user_id, "logout");

    let cookie = clear_refresh_cookie(state.config.is_production());
    (
        StatusCode::OK,
        [(SET_COOKIE, cookie)],
        Json(Envelope::<()>::message("Logged out")),
    )
        .into_response()
}

/// Mint a new access token from the refresh-token cookie.
///
/// The refresh token is rotated: every successful call re-sets the cookie
/// with a newly minted refresh token.
#[utoipa::path(
    post,
    path = "/api/auth/refresh-token",
    tag = "Auth",
    responses(
        (status = 200, description = "New access token", body = TokenPayload),
        (status = 401, description = "Missing or invalid refresh token"),
        (status = 404, description = "User no longer exists"),
    )
)]
pub async fn refresh(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, ApiError> {
    let refresh_token =
        extract_cookie(&headers, REFRESH_COOKIE).ok_or(AuthError::NoRefreshToken)?;

    let claims = state
        .tokens
        .verify(&refresh_token, TokenKind::Refresh)
        .map_err(|_| AuthError::InvalidRefreshToken)?;

    let repo = UserRepository::new(&state.store);
    let user = repo
        .find_by_id(&claims.sub)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let access = state.tokens.issue_access(&user.id, &user.email)?;
    let rotated = state.tokens.issue_refresh(&user.id, &user.email)?;
    let cookie = build_refresh_cookie(
        &rotated,
        state.tokens.refresh_ttl(),
        state.config.is_production(),
    );

    tracing::debug!(user_id = %user.id, "access token refreshed");

    Ok((
        StatusCode::OK,
        [(SET_COOKIE, cookie)],
        Json(Envelope::ok(TokenPayload { token: access })),
    )
        .into_response())
}

/// Get the current account's profile.
#[utoipa::path(
    get,
    path = "/api/auth/profile",
    tag = "Auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Profile", body = PublicUser),
        (status = 401, description = "Not authorized"),
        (status = 404, description = "User no longer exists"),
    )
)]
pub async fn profile(
    Auth(authed): Auth,
    State(state): State<AppState>,
) -> Result<Json<Envelope<PublicUser>>, ApiError> {
    let repo = UserRepository::new(&state.store);
    let user = repo
        .find_by_id(&authed.user_id)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(Envelope::ok(user.into())))
}

/// Request a password reset.
///
/// Always answers 200 so the endpoint cannot be used to probe for accounts;
/// the actual mail dispatch is an external collaborator.
#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    tag = "Auth",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Accepted"),
        (status = 422, description = "Validation failed"),
    )
)]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let mut validator = Validator::new();
    validator.email("email", &request.email);
    validator.finish().map_err(ApiError::validation)?;

    let repo = UserRepository::new(&state.store);
    match repo.find_by_email(&request.email)? {
        Some(user) => tracing::info!(user_id = %user.id, "password reset requested"),
        None => tracing::info!("password reset requested for unknown email"),
    }

    Ok(Json(Envelope::message(
        "If that account exists, a reset link has been sent",
    )))
}

/// Mint the access/refresh pair for a freshly authenticated user.
fn issue_session(
    state: &AppState,
    user_id: &str,
    email: &str,
    user: crate::storage::StoredUser,
) -> Result<(AuthPayload, String), ApiError> {
    let access = state.tokens.issue_access(user_id, email)?;
    let refresh = state.tokens.issue_refresh(user_id, email)?;
    let cookie = build_refresh_cookie(
        &refresh,
        state.tokens.refresh_ttl(),
        state.config.is_production(),
    );

    Ok((
        AuthPayload {
            user: user.into(),
            token: access,
        },
        cookie,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_state() -> (AppState, TempDir) {
        let dir = TempDir::new().unwrap();
        let state = AppState::for_tests(dir.path(), "test-secret");
        (state, dir)
    }

    #[tokio::test]
    async fn register_validates_shape_before_storage() {
        let (state, _dir) = test_state();
        let err = register(
            State(state.clone()),
            Json(RegisterRequest {
                name: "".to_string(),
                email: "not-an-email".to_string(),
                password: "abc".to_string(),
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.errors.as_ref().map(Vec::len), Some(3));

        // Nothing was persisted.
        let repo = UserRepository::new(&state.store);
        assert!(repo.find_by_email("not-an-email").unwrap().is_none());
    }

    #[tokio::test]
    async fn login_unknown_email_and_wrong_password_are_identical() {
        let (state, _dir) = test_state();
        UserRepository::new(&state.store)
            .create(NewUser {
                email: "ann@x.com".to_string(),
                password: "secret1".to_string(),
                name: "Ann".to_string(),
            })
            .unwrap();

        let unknown = login(
            State(state.clone()),
            Json(LoginRequest {
                email: "nobody@x.com".to_string(),
                password: "secret1".to_string(),
            }),
        )
        .await
        .unwrap_err();

        let wrong_password = login(
            State(state),
            Json(LoginRequest {
                email: "ann@x.com".to_string(),
                password: "secret2".to_string(),
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
        assert_eq!(unknown.message, wrong_password.message);
    }

    #[tokio::test]
    async fn refresh_without_cookie_is_401() {
        let (state, _dir) = test_state();
        let err = refresh(State(state), HeaderMap::new()).await.unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn refresh_with_access_token_cookie_is_rejected() {
        let (state, _dir) = test_state();
        let user = UserRepository::new(&state.store)
            .create(NewUser {
                email: "ann@x.com".to_string(),
                password: "secret1".to_string(),
                name: "Ann".to_string(),
            })
            .unwrap();

        // An access token in the refresh cookie must not mint new tokens.
        let access = state.tokens.issue_access(&user.id, &user.email).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            format!("refreshToken={access}").parse().unwrap(),
        );

        let err = refresh(State(state), headers).await.unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn refresh_for_deleted_user_is_404() {
        let (state, _dir) = test_state();
        let token = state.tokens.issue_refresh("ghost", "ghost@x.com").unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            format!("refreshToken={token}").parse().unwrap(),
        );

        let err = refresh(State(state), headers).await.unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}

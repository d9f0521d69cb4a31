// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Pocket Butler

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup. A missing
//! `JWT_SECRET` is a fatal startup error, never a per-request error.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `JWT_SECRET` | Symmetric token-signing secret | Required |
//! | `JWT_EXPIRES_IN` | Access-token lifetime (`30s`, `15m`, `12h`, `30d`) | `15m` |
//! | `JWT_REFRESH_EXPIRES_IN` | Refresh-token lifetime / cookie Max-Age | `30d` |
//! | `APP_ENV` | `production` gates the cookie `Secure` flag and error verbosity | `development` |
//! | `DATA_DIR` | Root directory for user storage | `data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `RATE_LIMIT_MAX` | Requests per window per client IP on `/api/auth` | `100` |
//! | `RATE_LIMIT_WINDOW_SECS` | Rate-limit window length | `60` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Environment variable name for the token-signing secret.
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
/// Environment variable name for the access-token lifetime.
pub const JWT_EXPIRES_IN_ENV: &str = "JWT_EXPIRES_IN";
/// Environment variable name for the refresh-token lifetime.
pub const JWT_REFRESH_EXPIRES_IN_ENV: &str = "JWT_REFRESH_EXPIRES_IN";
/// Environment variable name for the deployment environment.
pub const APP_ENV: &str = "APP_ENV";
/// Environment variable name for the data directory path.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Configuration errors, all fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{JWT_SECRET_ENV} is not set; refusing to start without a signing secret")]
    MissingSecret,
    #[error("invalid duration {value:?} for {var}: expected e.g. 30s, 15m, 12h, 30d")]
    InvalidDuration { var: &'static str, value: String },
    #[error("invalid value {value:?} for {var}")]
    InvalidValue { var: &'static str, value: String },
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Symmetric secret for HS256 token signing
    pub jwt_secret: String,
    /// Access-token lifetime
    pub access_ttl: Duration,
    /// Refresh-token lifetime (also the refresh cookie Max-Age)
    pub refresh_ttl: Duration,
    /// Deployment environment
    pub environment: Environment,
    /// Root directory for user storage
    pub data_dir: PathBuf,
    /// Server bind address
    pub host: String,
    /// Server bind port
    pub port: u16,
    /// Requests per window per client IP on the auth routes
    pub rate_limit_max: u32,
    /// Rate-limit window length
    pub rate_limit_window: Duration,
}

impl AppConfig {
    /// Load configuration from the environment.
    ///
    /// Fails fast on a missing signing secret or an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = env::var(JWT_SECRET_ENV).map_err(|_| ConfigError::MissingSecret)?;
        if jwt_secret.is_empty() {
            return Err(ConfigError::MissingSecret);
        }

        let access_ttl = duration_from_env(JWT_EXPIRES_IN_ENV, Duration::from_secs(15 * 60))?;
        let refresh_ttl =
            duration_from_env(JWT_REFRESH_EXPIRES_IN_ENV, Duration::from_secs(30 * 86_400))?;

        let environment = match env::var(APP_ENV).as_deref() {
            Ok("production") => Environment::Production,
            _ => Environment::Development,
        };

        let data_dir = env::var(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = match env::var("PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                var: "PORT",
                value: raw.clone(),
            })?,
            Err(_) => 8080,
        };

        let rate_limit_max = match env::var("RATE_LIMIT_MAX") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                var: "RATE_LIMIT_MAX",
                value: raw.clone(),
            })?,
            Err(_) => 100,
        };
        let rate_limit_window =
            duration_from_env_secs("RATE_LIMIT_WINDOW_SECS", Duration::from_secs(60))?;

        Ok(Self {
            jwt_secret,
            access_ttl,
            refresh_ttl,
            environment,
            data_dir,
            host,
            port,
            rate_limit_max,
            rate_limit_window,
        })
    }

    /// Whether the service runs in production (gates cookie `Secure` flag and
    /// error detail verbosity).
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

fn duration_from_env(var: &'static str, default: Duration) -> Result<Duration, ConfigError> {
    match env::var(var) {
        Ok(raw) => parse_duration(&raw).ok_or(ConfigError::InvalidDuration { var, value: raw }),
        Err(_) => Ok(default),
    }
}

fn duration_from_env_secs(var: &'static str, default: Duration) -> Result<Duration, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw
            .parse()
            .map(Duration::from_secs)
            .map_err(|_| ConfigError::InvalidValue { var, value: raw.clone() }),
        Err(_) => Ok(default),
    }
}

/// Parse a duration with a unit suffix: `30s`, `15m`, `12h`, `30d`.
///
/// A bare number is seconds.
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let (number, multiplier) = match raw.chars().last() {
        Some('s') => (&raw[..raw.len() - 1], 1),
        Some('m') => (&raw[..raw.len() - 1], 60),
        Some('h') => (&raw[..raw.len() - 1], 3_600),
        Some('d') => (&raw[..raw.len() - 1], 86_400),
        Some(c) if c.is_ascii_digit() => (raw, 1),
        _ => return None,
    };

    let value: u64 = number.parse().ok()?;
    Some(Duration::from_secs(value * multiplier))
}

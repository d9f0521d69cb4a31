// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Pocket Butler

//! Request-shape validation.
//!
//! Runs before any handler logic; a failing request never reaches the
//! credential store. Failures surface as HTTP 422 with one entry per bad
//! field.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use utoipa::ToSchema;

/// Minimum password length
pub const MIN_PASSWORD_LENGTH: usize = 6;
/// Maximum password length (bcrypt truncates input past 72 bytes)
pub const MAX_PASSWORD_LENGTH: usize = 72;
/// Maximum email length (RFC 5321 SMTP limit)
pub const MAX_EMAIL_LENGTH: usize = 254;
/// Maximum display-name length
pub const MAX_NAME_LENGTH: usize = 100;

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

/// One field's validation failure, as serialized in the 422 body.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FieldError {
    /// Name of the offending field
    pub param: String,
    /// Human-readable message
    pub message: String,
    /// The rejected value (omitted for passwords)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Accumulates field errors across a request body.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate an email field.
    pub fn email(&mut self, param: &str, value: &str) -> &mut Self {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.push(param, "Email is required", Some(value));
        } else if trimmed.len() > MAX_EMAIL_LENGTH || !EMAIL_REGEX.is_match(trimmed) {
            self.push(param, "Invalid email format", Some(value));
        }
        self
    }

    /// Validate a password field. The rejected value is never echoed back.
    pub fn password(&mut self, param: &str, value: &str) -> &mut Self {
        if value.is_empty() {
            self.push(param, "Password is required", None);
        } else if value.len() < MIN_PASSWORD_LENGTH {
            self.push(
                param,
                format!("Password must be at least {MIN_PASSWORD_LENGTH} characters"),
                None,
            );
        } else if value.len() > MAX_PASSWORD_LENGTH {
            self.push(
                param,
                format!("Password must be at most {MAX_PASSWORD_LENGTH} characters"),
                None,
            );
        }
        self
    }

    /// Validate a required non-empty string field.
    pub fn required(&mut self, param: &str, value: &str) -> &mut Self {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.push(param, format!("{param} is required"), Some(value));
        } else if trimmed.len() > MAX_NAME_LENGTH {
            self.push(
                param,
                format!("{param} must be at most {MAX_NAME_LENGTH} characters"),
                Some(value),
            );
        }
        self
    }

    fn push(&mut self, param: &str, message: impl Into<String>, value: Option<&str>) {
        self.errors.push(FieldError {
            param: param.to_string(),
            message: message.into(),
            value: value.map(str::to_string),
        });
    }

    /// Finish: `Ok(())` if everything passed, otherwise the field list.
    pub fn finish(self) -> Result<(), Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_register_shape_passes() {
        let mut v = Validator::new();
        v.required("name", "Ann")
            .email("email", "ann@x.com")
            .password("password", "secret1");
        assert!(v.finish().is_ok());
    }

    #[test]
    fn bad_email_is_reported() {
        let mut v = Validator::new();
        v.email("email", "not-an-email");
        let errors = v.finish().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].param, "email");
        assert_eq!(errors[0].value.as_deref(), Some("not-an-email"));
    }

    #[test]
    fn short_password_is_reported_without_echo() {
        let mut v = Validator::new();
        v.password("password", "abc");
        let errors = v.finish().unwrap_err();
        assert_eq!(errors[0].param, "password");
        assert!(errors[0].value.is_none());
        assert!(errors[0].message.contains("at least 6"));
    }

    #[test]
    fn multiple_failures_accumulate() {
        let mut v = Validator::new();
        v.required("name", "  ")
            .email("email", "")
            .password("password", "");
        let errors = v.finish().unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn overlong_password_is_rejected() {
        let mut v = Validator::new();
        v.password("password", &"x".repeat(73));
        assert!(v.finish().is_err());
    }
}

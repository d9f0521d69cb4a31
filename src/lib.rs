// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Pocket Butler

//! Pocket Butler - Auth & Session Core
//!
//! This crate provides the authentication backbone of the Pocket Butler item
//! tracker: bcrypt password credentials, JWT access/refresh tokens with an
//! HTTP-only refresh cookie, and the device-side session client that keeps
//! a login alive through silent renewal.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Passwords, tokens, cookies, and the request guard
//! - `client` - Device-side session controller and token store
//! - `storage` - File-backed user repository
//! - `middleware` - Per-IP rate limiting

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod state;
pub mod storage;
pub mod validation;

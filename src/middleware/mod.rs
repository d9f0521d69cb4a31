// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Pocket Butler

//! HTTP middleware.

pub mod rate_limit;

pub use rate_limit::rate_limit;

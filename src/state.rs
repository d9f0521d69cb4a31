// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Pocket Butler

use std::sync::Arc;

use dashmap::DashMap;

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::middleware::rate_limit::RateLimitEntry;
use crate::storage::FsStore;

/// Shared application state, cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    /// Credential storage (all mutation goes through atomic file operations)
    pub store: Arc<FsStore>,
    /// Token issuer/verifier
    pub tokens: TokenService,
    /// Startup configuration
    pub config: Arc<AppConfig>,
    /// Per-IP request counters for the auth routes
    pub rate_limits: Arc<DashMap<String, RateLimitEntry>>,
}

impl AppState {
    pub fn new(store: FsStore, config: AppConfig) -> Self {
        let tokens = TokenService::new(&config.jwt_secret, config.access_ttl, config.refresh_ttl);
        Self {
            store: Arc::new(store),
            tokens,
            config: Arc::new(config),
            rate_limits: Arc::new(DashMap::new()),
        }
    }

    /// State over a throwaway directory with development defaults.
    ///
    /// Used by the test suites; panics rather than propagating storage
    /// errors.
    pub fn for_tests(data_dir: impl AsRef<std::path::Path>, secret: &str) -> Self {
        use crate::config::Environment;
        use crate::storage::StoragePaths;
        use std::time::Duration;

        let mut store = FsStore::new(StoragePaths::new(data_dir.as_ref()));
        store.initialize().expect("initialize test storage");

        let config = AppConfig {
            jwt_secret: secret.to_string(),
            access_ttl: Duration::from_secs(900),
            refresh_ttl: Duration::from_secs(30 * 86_400),
            environment: Environment::Development,
            data_dir: data_dir.as_ref().to_path_buf(),
            host: "127.0.0.1".to_string(),
            port: 0,
            rate_limit_max: 100,
            rate_limit_window: Duration::from_secs(60),
        };

        Self::new(store, config)
    }
}

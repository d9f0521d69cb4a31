// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Pocket Butler

//! Access-token persistence behind a trait so tests can run without an OS
//! keyring. Only the short-lived access token is ever stored; the refresh
//! token stays in the HTTP-only cookie jar.

use std::sync::Mutex;

use super::ClientError;

/// Where the client keeps its access token between calls.
pub trait TokenStore: Send + Sync {
    /// The currently stored token, if any.
    fn get(&self) -> Result<Option<String>, ClientError>;

    /// Replace the stored token.
    fn set(&self, token: &str) -> Result<(), ClientError>;

    /// Remove the stored token. Removing an absent token is not an error.
    fn clear(&self) -> Result<(), ClientError>;
}

/// Token store backed by the OS keyring (Keychain, Secret Service, or the
/// Windows credential manager).
pub struct KeyringTokenStore {
    service: String,
    account: String,
}

impl KeyringTokenStore {
    pub fn new(service: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            account: account.into(),
        }
    }

    fn entry(&self) -> Result<keyring::Entry, ClientError> {
        keyring::Entry::new(&self.service, &self.account)
            .map_err(|e| ClientError::Store(e.to_string()))
    }
}

impl Default for KeyringTokenStore {
    fn default() -> Self {
        Self::new("pocket-butler", "access-token")
    }
}

impl TokenStore for KeyringTokenStore {
    fn get(&self) -> Result<Option<String>, ClientError> {
        match self.entry()?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(ClientError::Store(e.to_string())),
        }
    }

    fn set(&self, token: &str) -> Result<(), ClientError> {
        let entry = self.entry()?;
        // Some keyring backends refuse to overwrite; delete first and
        // ignore the not-found case.
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => {}
            Err(e) => return Err(ClientError::Store(e.to_string())),
        }
        entry
            .set_password(token)
            .map_err(|e| ClientError::Store(e.to_string()))
    }

    fn clear(&self) -> Result<(), ClientError> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(ClientError::Store(e.to_string())),
        }
    }
}

/// In-memory token store for tests and short-lived tools.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Result<Option<String>, ClientError> {
        Ok(self.token.lock().unwrap().clone())
    }

    fn set(&self, token: &str) -> Result<(), ClientError> {
        *self.token.lock().unwrap() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        *self.token.lock().unwrap() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryTokenStore::new();
        assert!(store.get().unwrap().is_none());

        store.set("tok-1").unwrap();
        assert_eq!(store.get().unwrap().as_deref(), Some("tok-1"));

        store.set("tok-2").unwrap();
        assert_eq!(store.get().unwrap().as_deref(), Some("tok-2"));

        store.clear().unwrap();
        assert!(store.get().unwrap().is_none());
    }

    #[test]
    fn clearing_empty_store_is_fine() {
        let store = MemoryTokenStore::new();
        store.clear().unwrap();
        store.clear().unwrap();
    }
}

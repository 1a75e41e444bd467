// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Token store: holder of the access/refresh pair.

use parking_lot::RwLock;

use crate::auth::TokenPair;

/// Storage for the session's credential pair.
///
/// Operations never fail. A store with no backing storage behaves as if no
/// token was ever set, and callers treat the two cases identically.
pub trait TokenStore: Send + Sync {
    fn access_token(&self) -> Option<String>;

    fn refresh_token(&self) -> Option<String>;

    /// Overwrite both tokens (login, register).
    fn set_pair(&self, pair: &TokenPair);

    /// Overwrite only the access token (refresh). The refresh token is untouched.
    fn set_access_token(&self, token: &str);

    /// Store a token returned by the refresh endpoint, but only while a
    /// refresh token is still held. Returns whether the token was written.
    ///
    /// A logout that lands while a refresh is in flight must not be undone
    /// by the refresh completing afterwards.
    fn set_refreshed_access_token(&self, token: &str) -> bool;

    /// Forget both tokens (logout, unrecoverable refresh failure).
    fn clear(&self);
}

/// Process-local token store.
#[derive(Default)]
pub struct MemoryTokenStore {
    inner: RwLock<Slots>,
}

#[derive(Default)]
struct Slots {
    access: Option<String>,
    refresh: Option<String>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pair(pair: &TokenPair) -> Self {
        let store = Self::new();
        store.set_pair(pair);
        store
    }
}

impl TokenStore for MemoryTokenStore {
    fn access_token(&self) -> Option<String> {
        self.inner.read().access.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        self.inner.read().refresh.clone()
    }

    fn set_pair(&self, pair: &TokenPair) {
        let mut slots = self.inner.write();
        slots.access = Some(pair.access_token.clone());
        slots.refresh = Some(pair.refresh_token.clone());
    }

    fn set_access_token(&self, token: &str) {
        self.inner.write().access = Some(token.to_owned());
    }

    fn set_refreshed_access_token(&self, token: &str) -> bool {
        let mut slots = self.inner.write();
        if slots.refresh.is_none() {
            return false;
        }
        slots.access = Some(token.to_owned());
        true
    }

    fn clear(&self) {
        let mut slots = self.inner.write();
        slots.access = None;
        slots.refresh = None;
    }
}

/// Store used when no storage is available: reads are empty, writes vanish.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTokenStore;

impl TokenStore for NullTokenStore {
    fn access_token(&self) -> Option<String> {
        None
    }

    fn refresh_token(&self) -> Option<String> {
        None
    }

    fn set_pair(&self, _pair: &TokenPair) {}

    fn set_access_token(&self, _token: &str) {}

    fn set_refreshed_access_token(&self, _token: &str) -> bool {
        false
    }

    fn clear(&self) {}
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session credentials: token storage, the refresh protocol, and login/logout.
//!
//! The token pair is the only shared mutable state in the client. It is
//! written by [`session`] (login, register, logout) and by the retry
//! coordinator after a successful refresh, never by ordinary requests.

pub mod jwt;
pub mod persist;
pub mod refresh;
pub mod session;
pub mod store;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const LOGIN_PATH: &str = "/api/v1/auth/login";
pub const REGISTER_PATH: &str = "/api/v1/auth/register";
pub const REFRESH_PATH: &str = "/api/v1/auth/token/refresh";

/// Endpoints that bootstrap a session. A 401 from these is the caller's
/// answer and must never start a refresh.
const SESSION_ENDPOINTS: [&str; 3] = [LOGIN_PATH, REGISTER_PATH, REFRESH_PATH];

/// Whether `path` targets login, register or refresh.
pub fn is_session_endpoint(path: &str) -> bool {
    SESSION_ENDPOINTS.iter().any(|ep| path.contains(ep))
}

/// Access/refresh credential pair.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Response body of login and register.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

impl From<TokenResponse> for TokenPair {
    fn from(resp: TokenResponse) -> Self {
        Self { access_token: resp.access_token, refresh_token: resp.refresh_token }
    }
}

fn default_token_type() -> String {
    "bearer".to_owned()
}

/// Resolve the state directory for persisted tokens.
///
/// Checks `OBSER_STATE_DIR`, then `$XDG_STATE_HOME/obser`, then
/// `$HOME/.local/state/obser`. `None` means no storage is available.
pub fn state_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("OBSER_STATE_DIR") {
        return Some(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Some(PathBuf::from(xdg).join("obser"));
    }
    if let Ok(home) = std::env::var("HOME") {
        return Some(PathBuf::from(home).join(".local/state/obser"));
    }
    None
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

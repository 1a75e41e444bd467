// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, StatusCode};

/// Errors surfaced by the authenticated API client.
///
/// Cloneable so a single refresh outcome can settle every queued waiter.
#[derive(Debug, Clone)]
pub enum ClientError {
    /// The server answered with a status outside 2xx/3xx.
    Status { method: Method, path: String, status: StatusCode, detail: Option<String> },
    /// The request never produced a response (connect, timeout, body read).
    Transport(Arc<reqwest::Error>),
    /// A refresh was needed but no refresh token is stored.
    NoRefreshToken,
    /// The refresh endpoint answered 2xx without a usable access token.
    MalformedRefreshResponse(String),
    /// The refresh call did not settle within the configured timeout.
    RefreshTimeout(Duration),
    /// The refresh cycle ended without reporting an outcome.
    RefreshAbandoned,
    /// Request or response body could not be (de)serialized.
    Json(Arc<serde_json::Error>),
}

impl ClientError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Status { .. } => "HTTP_STATUS",
            Self::Transport(_) => "TRANSPORT",
            Self::NoRefreshToken => "NO_REFRESH_TOKEN",
            Self::MalformedRefreshResponse(_) => "MALFORMED_REFRESH_RESPONSE",
            Self::RefreshTimeout(_) => "REFRESH_TIMEOUT",
            Self::RefreshAbandoned => "REFRESH_ABANDONED",
            Self::Json(_) => "JSON",
        }
    }

    /// HTTP status of the failed response, if there was one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// Build a status error, lifting `detail` out of a `{"detail": ...}` body.
    pub(crate) fn from_status(method: Method, path: &str, status: StatusCode, body: &str) -> Self {
        Self::Status { method, path: path.to_owned(), status, detail: extract_detail(body) }
    }
}

/// Pull a human-readable message out of a backend error body.
///
/// The backend returns `{"detail": "..."}` for most errors and
/// `{"detail": [{"msg": "..."}, ...]}` for validation failures.
fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Array(items) => {
            let msgs: Vec<&str> =
                items.iter().filter_map(|i| i.get("msg").and_then(|m| m.as_str())).collect();
            if msgs.is_empty() {
                None
            } else {
                Some(msgs.join("; "))
            }
        }
        _ => None,
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status { method, path, status, detail: Some(detail) } => {
                write!(f, "{method} {path} failed ({status}): {detail}")
            }
            Self::Status { method, path, status, detail: None } => {
                write!(f, "{method} {path} failed ({status})")
            }
            Self::Transport(e) => write!(f, "transport error: {e}"),
            Self::NoRefreshToken => f.write_str("no refresh token"),
            Self::MalformedRefreshResponse(why) => {
                write!(f, "malformed refresh response: {why}")
            }
            Self::RefreshTimeout(after) => {
                write!(f, "token refresh timed out after {}ms", after.as_millis())
            }
            Self::RefreshAbandoned => f.write_str("token refresh ended without an outcome"),
            Self::Json(e) => write!(f, "json error: {e}"),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(e) => Some(e.as_ref()),
            Self::Json(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(Arc::new(e))
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(Arc::new(e))
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

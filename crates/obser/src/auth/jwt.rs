// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unverified JWT payload inspection, for display and role gating only.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

pub type Claims = serde_json::Map<String, serde_json::Value>;

/// Decode the payload segment of a JWT. Signatures are not checked.
///
/// Returns `None` unless the payload is a base64url-encoded JSON object.
pub fn decode_payload(token: &str) -> Option<Claims> {
    let mut parts = token.split('.');
    let _header = parts.next()?;
    let payload = parts.next()?;

    // Some issuers keep the padding.
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    match serde_json::from_slice(&bytes).ok()? {
        serde_json::Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Whether the token's claims mark the user as a superuser.
pub fn is_superuser(token: Option<&str>) -> bool {
    token
        .and_then(decode_payload)
        .and_then(|claims| claims.get("is_superuser").map(truthy))
        .unwrap_or(false)
}

fn truthy(v: &serde_json::Value) -> bool {
    match v {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
    }
}

#[cfg(test)]
#[path = "jwt_tests.rs"]
mod tests;

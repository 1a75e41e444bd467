// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Access-token refresh over a dedicated, uninstrumented HTTP client.
//!
//! The refresh call must never pass through the retry coordinator: a 401
//! from the refresh endpoint would otherwise start another refresh.

use reqwest::{Client, Method};
use serde::{Deserialize, Serialize};

use crate::auth::store::TokenStore;
use crate::auth::REFRESH_PATH;
use crate::client::{build_http, is_accepted};
use crate::error::ClientError;

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// Refresh endpoint response. The backend never rotates the refresh token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Exchanges a refresh token for a new access token.
pub struct RefreshClient {
    base_url: String,
    http: Client,
}

impl RefreshClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), http: build_http(None) }
    }

    /// Refresh using the token currently held by `store`.
    ///
    /// Does not write `store`; persisting the result is the caller's job.
    pub async fn refresh(&self, store: &dyn TokenStore) -> Result<String, ClientError> {
        let refresh_token = store.refresh_token().ok_or(ClientError::NoRefreshToken)?;
        self.exchange(&refresh_token).await
    }

    /// Perform a single refresh request.
    pub async fn exchange(&self, refresh_token: &str) -> Result<String, ClientError> {
        let url = format!("{}{}", self.base_url, REFRESH_PATH);
        let resp = self.http.post(url).json(&RefreshRequest { refresh_token }).send().await?;

        let status = resp.status();
        if !is_accepted(status) {
            let text = resp.text().await.unwrap_or_default();
            return Err(ClientError::from_status(Method::POST, REFRESH_PATH, status, &text));
        }

        let bytes = resp.bytes().await?;
        let body: RefreshResponse = serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::MalformedRefreshResponse(e.to_string()))?;
        match body.access_token {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(ClientError::MalformedRefreshResponse("missing access_token".to_owned())),
        }
    }
}

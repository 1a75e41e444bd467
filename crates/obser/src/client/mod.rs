// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authenticated HTTP client for the dashboard backend.

pub mod coordinator;
pub mod request;

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::auth::refresh::RefreshClient;
use crate::auth::store::TokenStore;
use crate::config::ClientConfig;
use crate::error::ClientError;

pub use coordinator::RetryCoordinator;
pub use request::{authorize, ApiRequest, RequestBody};

/// Statuses treated as success. Redirects are never followed, so a 3xx
/// reaches the caller as-is.
pub fn is_accepted(status: StatusCode) -> bool {
    status.is_success() || status.is_redirection()
}

/// Build a reqwest client that never follows redirects.
pub(crate) fn build_http(timeout: Option<Duration>) -> Client {
    crate::tls::ensure_crypto_provider();
    let mut builder = Client::builder().redirect(reqwest::redirect::Policy::none());
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().unwrap_or_default()
}

/// API client: attaches the bearer token to every call and transparently
/// refreshes it on 401.
pub struct ApiClient {
    base_url: String,
    http: Client,
    store: Arc<dyn TokenStore>,
    coordinator: Arc<RetryCoordinator>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, store: Arc<dyn TokenStore>) -> Self {
        let base_url = config.base_url.trim_end_matches('/').to_owned();
        let refresher = RefreshClient::new(base_url.clone());
        let coordinator =
            RetryCoordinator::new(Arc::clone(&store), refresher, config.refresh_timeout());
        Self { base_url, http: build_http(Some(config.request_timeout())), store, coordinator }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    pub fn coordinator(&self) -> &Arc<RetryCoordinator> {
        &self.coordinator
    }

    /// Send a request, refreshing the access token and replaying once on 401.
    pub async fn send(&self, mut req: ApiRequest) -> Result<Response, ClientError> {
        let err = match self.dispatch(&req, None).await {
            Ok(resp) => return Ok(resp),
            Err(e) => e,
        };

        let token = self.coordinator.recover(&req, err).await?;
        req.mark_retried();
        tracing::debug!(method = %req.method(), path = req.path(), "replaying with refreshed token");
        self.dispatch(&req, Some(&token)).await
    }

    /// Send and decode a JSON response body.
    pub async fn json<T: DeserializeOwned>(&self, req: ApiRequest) -> Result<T, ClientError> {
        let resp = self.send(req).await?;
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Send and discard the response body.
    pub async fn execute(&self, req: ApiRequest) -> Result<(), ClientError> {
        self.send(req).await?;
        Ok(())
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.json(ApiRequest::get(path)).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.json(ApiRequest::post(path).json(body)?).await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.json(ApiRequest::patch(path).json(body)?).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.execute(ApiRequest::delete(path)).await
    }

    /// Issue one attempt. `token` overrides the stored access token on replay.
    async fn dispatch(
        &self,
        req: &ApiRequest,
        token: Option<&str>,
    ) -> Result<Response, ClientError> {
        let builder = req.to_builder(&self.http, &self.base_url);
        let builder = match token {
            Some(token) => builder.bearer_auth(token),
            None => authorize(builder, self.store.as_ref()),
        };

        let resp = builder.send().await?;
        let status = resp.status();
        if is_accepted(status) {
            return Ok(resp);
        }

        let text = resp.text().await.unwrap_or_default();
        tracing::debug!(method = %req.method(), path = req.path(), %status, "request rejected");
        Err(ClientError::from_status(req.method().clone(), req.path(), status, &text))
    }
}

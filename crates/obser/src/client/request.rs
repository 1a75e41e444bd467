// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Re-issuable request descriptions and the bearer-token interceptor.

use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;

use crate::auth::store::TokenStore;
use crate::error::ClientError;

/// Request payload, kept in owned form so the request can be replayed.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    Form(Vec<(String, String)>),
}

/// An outbound API call.
///
/// `path` is relative to the client's base URL and may carry a query string.
/// Once a request has been replayed after a refresh it is marked retried, and
/// a second 401 is surfaced instead of starting another refresh.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    body: RequestBody,
    retried: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), body: RequestBody::Empty, retried: false }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ClientError> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Attach a form-encoded body.
    pub fn form(mut self, fields: &[(&str, &str)]) -> Self {
        self.body = RequestBody::Form(
            fields.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect(),
        );
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    pub fn is_retried(&self) -> bool {
        self.retried
    }

    pub fn mark_retried(&mut self) {
        self.retried = true;
    }

    /// Build a fresh reqwest builder for this request (no auth header).
    pub(crate) fn to_builder(&self, http: &Client, base_url: &str) -> RequestBuilder {
        let req = http.request(self.method.clone(), format!("{base_url}{}", self.path));
        match &self.body {
            RequestBody::Empty => req,
            RequestBody::Json(value) => req.json(value),
            RequestBody::Form(fields) => req.form(fields),
        }
    }
}

/// Request interceptor: attach the stored access token, if any.
///
/// With no token the request goes out unauthenticated and the server's 401
/// drives the refresh protocol.
pub fn authorize(req: RequestBuilder, store: &dyn TokenStore) -> RequestBuilder {
    match store.access_token() {
        Some(token) => req.bearer_auth(token),
        None => req,
    }
}

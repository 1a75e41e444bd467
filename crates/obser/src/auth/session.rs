// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session lifecycle: login, register, logout.

use serde::Serialize;

use crate::auth::jwt::{self, Claims};
use crate::auth::{TokenPair, TokenResponse, LOGIN_PATH, REGISTER_PATH};
use crate::client::{ApiClient, ApiRequest};
use crate::error::ClientError;

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    email: &'a str,
    password: &'a str,
    full_name: Option<&'a str>,
}

/// Log in with email and password (form-encoded, OAuth2 password style) and
/// store the issued pair.
pub async fn login(client: &ApiClient, email: &str, password: &str) -> Result<TokenPair, ClientError> {
    let req = ApiRequest::post(LOGIN_PATH).form(&[("username", email), ("password", password)]);
    let resp: TokenResponse = client.json(req).await?;
    let pair = TokenPair::from(resp);
    client.store().set_pair(&pair);
    tracing::info!(email, "logged in");
    Ok(pair)
}

/// Create an account and store the issued pair.
pub async fn register(
    client: &ApiClient,
    email: &str,
    password: &str,
    full_name: Option<&str>,
) -> Result<TokenPair, ClientError> {
    let body = RegisterRequest { email, password, full_name };
    let resp: TokenResponse = client.json(ApiRequest::post(REGISTER_PATH).json(&body)?).await?;
    let pair = TokenPair::from(resp);
    client.store().set_pair(&pair);
    tracing::info!(email, "registered");
    Ok(pair)
}

/// Forget the stored session.
pub fn logout(client: &ApiClient) {
    client.store().clear();
    tracing::info!("logged out");
}

/// Claims of the stored access token, if it decodes.
pub fn current_claims(client: &ApiClient) -> Option<Claims> {
    client.store().access_token().as_deref().and_then(jwt::decode_payload)
}

/// Whether the stored access token belongs to a superuser.
pub fn is_superuser(client: &ApiClient) -> bool {
    jwt::is_superuser(client.store().access_token().as_deref())
}

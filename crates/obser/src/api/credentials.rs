// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project credentials (references to secrets, never the secrets themselves).

use serde::{Deserialize, Serialize};

use crate::api::project_path;
use crate::client::ApiClient;
use crate::error::ClientError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub id: i64,
    pub project_id: i64,
    pub kind: String,
    pub secret_ref: String,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialCreate {
    pub kind: String,
    pub secret_ref: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

fn credentials_path(project_id: i64) -> String {
    format!("{}/credentials", project_path(project_id))
}

pub async fn list(client: &ApiClient, project_id: i64) -> Result<Vec<Credential>, ClientError> {
    client.get(&credentials_path(project_id)).await
}

pub async fn get(
    client: &ApiClient,
    project_id: i64,
    credential_id: i64,
) -> Result<Credential, ClientError> {
    client.get(&format!("{}/{credential_id}", credentials_path(project_id))).await
}

pub async fn create(
    client: &ApiClient,
    project_id: i64,
    data: &CredentialCreate,
) -> Result<Credential, ClientError> {
    client.post(&credentials_path(project_id), data).await
}

pub async fn update(
    client: &ApiClient,
    project_id: i64,
    credential_id: i64,
    data: &CredentialUpdate,
) -> Result<Credential, ClientError> {
    client.patch(&format!("{}/{credential_id}", credentials_path(project_id)), data).await
}

pub async fn delete(
    client: &ApiClient,
    project_id: i64,
    credential_id: i64,
) -> Result<(), ClientError> {
    client.delete(&format!("{}/{credential_id}", credentials_path(project_id))).await
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Service instances deployed for a project.

use serde::{Deserialize, Serialize};

use crate::api::project_path;
use crate::client::ApiClient;
use crate::error::ClientError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInstance {
    pub id: i64,
    pub project_id: i64,
    pub service_type_id: i64,
    #[serde(default)]
    pub environment_id: Option<i64>,
    pub name: String,
    pub endpoint: String,
    #[serde(default)]
    pub port: Option<u16>,
    pub status: String,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInstanceCreate {
    pub service_type_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_id: Option<i64>,
    pub name: String,
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceInstanceUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_type_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

fn services_path(project_id: i64) -> String {
    format!("{}/services", project_path(project_id))
}

pub async fn list(client: &ApiClient, project_id: i64) -> Result<Vec<ServiceInstance>, ClientError> {
    client.get(&services_path(project_id)).await
}

pub async fn get(
    client: &ApiClient,
    project_id: i64,
    service_id: i64,
) -> Result<ServiceInstance, ClientError> {
    client.get(&format!("{}/{service_id}", services_path(project_id))).await
}

pub async fn create(
    client: &ApiClient,
    project_id: i64,
    data: &ServiceInstanceCreate,
) -> Result<ServiceInstance, ClientError> {
    client.post(&services_path(project_id), data).await
}

pub async fn update(
    client: &ApiClient,
    project_id: i64,
    service_id: i64,
    data: &ServiceInstanceUpdate,
) -> Result<ServiceInstance, ClientError> {
    client.patch(&format!("{}/{service_id}", services_path(project_id)), data).await
}

pub async fn delete(
    client: &ApiClient,
    project_id: i64,
    service_id: i64,
) -> Result<(), ClientError> {
    client.delete(&format!("{}/{service_id}", services_path(project_id))).await
}

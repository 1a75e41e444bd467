// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Projects, project members, and the user directory.

use serde::{Deserialize, Serialize};

use crate::api::project_path;
use crate::client::ApiClient;
use crate::error::ClientError;

pub const DEFAULT_PAGE_SIZE: u32 = 25;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub code: String,
    pub display_name: String,
    #[serde(default)]
    pub kind: Option<String>,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectCreate {
    pub code: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// Partial update; `None` fields are left out of the request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMember {
    pub id: i64,
    pub project_id: i64,
    pub user_id: i64,
    pub role: String,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMemberCreate {
    pub user_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
}

/// List projects a page at a time.
///
/// The collection path keeps its trailing slash; the backend answers the
/// slash-less form with a redirect, which this client does not follow.
pub async fn list(client: &ApiClient, skip: u32, limit: u32) -> Result<Vec<Project>, ClientError> {
    client.get(&format!("/api/v1/projects/?skip={skip}&limit={limit}")).await
}

pub async fn get(client: &ApiClient, project_id: i64) -> Result<Project, ClientError> {
    client.get(&project_path(project_id)).await
}

pub async fn create(client: &ApiClient, data: &ProjectCreate) -> Result<Project, ClientError> {
    client.post("/api/v1/projects/", data).await
}

pub async fn update(
    client: &ApiClient,
    project_id: i64,
    data: &ProjectUpdate,
) -> Result<Project, ClientError> {
    client.patch(&project_path(project_id), data).await
}

pub async fn delete(client: &ApiClient, project_id: i64) -> Result<(), ClientError> {
    client.delete(&project_path(project_id)).await
}

pub async fn list_members(
    client: &ApiClient,
    project_id: i64,
) -> Result<Vec<ProjectMember>, ClientError> {
    client.get(&format!("{}/members", project_path(project_id))).await
}

pub async fn add_member(
    client: &ApiClient,
    project_id: i64,
    data: &ProjectMemberCreate,
) -> Result<ProjectMember, ClientError> {
    client.post(&format!("{}/members", project_path(project_id)), data).await
}

pub async fn remove_member(
    client: &ApiClient,
    project_id: i64,
    user_id: i64,
) -> Result<(), ClientError> {
    client.delete(&format!("{}/members/{user_id}", project_path(project_id))).await
}

/// Users that can be added as project members.
pub async fn list_users(client: &ApiClient) -> Result<Vec<User>, ClientError> {
    client.get("/api/v1/projects/users").await
}

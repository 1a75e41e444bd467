// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed project administration endpoints. Every call goes through
//! [`ApiClient`](crate::client::ApiClient), so 401s refresh transparently.

pub mod credentials;
pub mod projects;
pub mod services;

pub use credentials::{Credential, CredentialCreate, CredentialUpdate};
pub use projects::{Project, ProjectCreate, ProjectMember, ProjectMemberCreate, ProjectUpdate, User};
pub use services::{ServiceInstance, ServiceInstanceCreate, ServiceInstanceUpdate};

pub(crate) fn project_path(project_id: i64) -> String {
    format!("/api/v1/projects/{project_id}")
}

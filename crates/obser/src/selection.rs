// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remembered project selection.
//!
//! Project-scoped commands act on the selected project unless one is given
//! explicitly. The selection lives beside the token file and is re-checked
//! against the project list each time it is used.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::api::{projects, Project};
use crate::auth::persist::write_atomic;
use crate::auth::state_dir;
use crate::client::ApiClient;

pub const SELECTION_FILE: &str = "selection.json";

/// How many projects are scanned when validating a selection.
pub const SELECTION_SCAN_LIMIT: u32 = 1000;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct PersistedSelection {
    #[serde(rename = "obser_selected_project_id", default, skip_serializing_if = "Option::is_none")]
    project_id: Option<i64>,
}

/// File-backed selected project id. Without a path nothing is remembered.
#[derive(Debug, Clone, Default)]
pub struct SelectionStore {
    path: Option<PathBuf>,
}

impl SelectionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: Some(path.into()) }
    }

    /// A store that never remembers anything.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// An explicit path wins; otherwise `<state_dir>/selection.json`.
    pub fn open(explicit: Option<&Path>) -> Self {
        let path = match explicit {
            Some(p) => Some(p.to_path_buf()),
            None => state_dir().map(|dir| dir.join(SELECTION_FILE)),
        };
        Self { path }
    }

    pub fn get(&self) -> Option<i64> {
        let path = self.path.as_deref()?;
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %path.display(), err = %e, "unreadable selection file");
                return None;
            }
        };
        match serde_json::from_str::<PersistedSelection>(&contents) {
            Ok(sel) => sel.project_id,
            Err(e) => {
                tracing::warn!(path = %path.display(), err = %e, "corrupt selection file");
                None
            }
        }
    }

    /// Remember `project_id`; `None` forgets the selection.
    pub fn set(&self, project_id: Option<i64>) {
        let Some(path) = self.path.as_deref() else {
            return;
        };
        let result = match project_id {
            Some(_) => serde_json::to_vec_pretty(&PersistedSelection { project_id })
                .map_err(anyhow::Error::from)
                .and_then(|json| write_atomic(path, &json)),
            None => match std::fs::remove_file(path) {
                Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
                _ => Ok(()),
            },
        };
        if let Err(e) = result {
            tracing::warn!(path = %path.display(), err = %e, "failed to persist project selection");
        }
    }
}

/// Pick the project to act on: the requested id, then the stored id, then
/// the first listed project. Only ids present in `available` qualify.
pub fn resolve(requested: Option<i64>, stored: Option<i64>, available: &[Project]) -> Option<i64> {
    let first = available.first().map(|p| p.id);
    [requested, stored, first]
        .into_iter()
        .flatten()
        .find(|id| available.iter().any(|p| p.id == *id))
}

/// Resolve and remember the project to act on.
///
/// An explicitly requested id must be listed; it never falls back.
pub async fn select_project(
    client: &ApiClient,
    selection: &SelectionStore,
    requested: Option<i64>,
) -> anyhow::Result<Project> {
    let available = projects::list(client, 0, SELECTION_SCAN_LIMIT).await?;
    if let Some(id) = requested {
        if !available.iter().any(|p| p.id == id) {
            anyhow::bail!("project {id} not found");
        }
    }

    let chosen = resolve(requested, selection.get(), &available);
    selection.set(chosen);
    let project = chosen
        .and_then(|id| available.into_iter().find(|p| p.id == id))
        .ok_or_else(|| anyhow::anyhow!("no projects available"))?;
    tracing::debug!(project = project.id, code = %project.code, "project selected");
    Ok(project)
}

#[cfg(test)]
#[path = "selection_tests.rs"]
mod tests;

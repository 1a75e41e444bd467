// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Token persistence: JSON file under the state dir with atomic writes.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::auth::store::{NullTokenStore, TokenStore};
use crate::auth::{state_dir, TokenPair};

pub const TOKEN_FILE: &str = "tokens.json";

/// On-disk shape. Keys are fixed so other tools sharing the state dir agree.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedTokens {
    #[serde(rename = "obser_access_token", default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(rename = "obser_refresh_token", default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// Load persisted tokens. A missing file is `Ok(None)`.
pub fn load(path: &Path) -> anyhow::Result<Option<PersistedTokens>> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let tokens: PersistedTokens = serde_json::from_str(&contents)?;
    Ok(Some(tokens))
}

/// Save tokens atomically, creating the parent dir.
pub fn save(path: &Path, tokens: &PersistedTokens) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(tokens)?;
    write_atomic(path, json.as_bytes())
}

/// Write `contents` to a private temp file beside `path`, then rename it
/// into place.
///
/// The temp name carries PID + counter so concurrent saves never share a
/// `.tmp` file. On unix the temp file is created 0600, so the contents are
/// never visible to other users.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> anyhow::Result<()> {
    use std::io::Write;
    use std::sync::atomic::{AtomicU32, Ordering};
    static COUNTER: AtomicU32 = AtomicU32::new(0);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    let tmp_name = format!(
        "{}.{}.{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy(),
        std::process::id(),
        seq,
    );
    let tmp_path = path.with_file_name(tmp_name);

    let mut file = private_file(&tmp_path)?;
    file.write_all(contents)?;
    file.sync_all()?;
    drop(file);
    // A stale temp file from a crashed run keeps its old mode.
    restrict_permissions(&tmp_path)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(unix)]
fn private_file(path: &Path) -> std::io::Result<std::fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    std::fs::OpenOptions::new().write(true).create(true).truncate(true).mode(0o600).open(path)
}

#[cfg(not(unix))]
fn private_file(path: &Path) -> std::io::Result<std::fs::File> {
    std::fs::OpenOptions::new().write(true).create(true).truncate(true).open(path)
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

/// Token store backed by a JSON file.
///
/// Every read goes to disk so separate processes sharing the file see each
/// other's logins and refreshes. I/O failures are logged and read as "no token".
pub struct FileTokenStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> PersistedTokens {
        match load(&self.path) {
            Ok(tokens) => tokens.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), err = %e, "unreadable token file");
                PersistedTokens::default()
            }
        }
    }

    fn write(&self, tokens: &PersistedTokens) {
        if let Err(e) = save(&self.path, tokens) {
            tracing::warn!(path = %self.path.display(), err = %e, "failed to persist tokens");
        }
    }
}

impl TokenStore for FileTokenStore {
    fn access_token(&self) -> Option<String> {
        self.read().access_token
    }

    fn refresh_token(&self) -> Option<String> {
        self.read().refresh_token
    }

    fn set_pair(&self, pair: &TokenPair) {
        let _guard = self.write_lock.lock();
        self.write(&PersistedTokens {
            access_token: Some(pair.access_token.clone()),
            refresh_token: Some(pair.refresh_token.clone()),
        });
    }

    fn set_access_token(&self, token: &str) {
        let _guard = self.write_lock.lock();
        let mut tokens = self.read();
        tokens.access_token = Some(token.to_owned());
        self.write(&tokens);
    }

    fn set_refreshed_access_token(&self, token: &str) -> bool {
        let _guard = self.write_lock.lock();
        let mut tokens = self.read();
        if tokens.refresh_token.is_none() {
            return false;
        }
        tokens.access_token = Some(token.to_owned());
        self.write(&tokens);
        true
    }

    fn clear(&self) {
        let _guard = self.write_lock.lock();
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), err = %e, "failed to remove token file");
            }
        }
    }
}

/// Open the token store for this process.
///
/// An explicit path wins; otherwise `<state_dir>/tokens.json`. With no
/// resolvable state dir the session runs without storage.
pub fn open_store(explicit: Option<&Path>) -> Arc<dyn TokenStore> {
    let path = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => state_dir().map(|dir| dir.join(TOKEN_FILE)),
    };
    match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "using file token store");
            Arc::new(FileTokenStore::new(path))
        }
        None => {
            tracing::debug!("no state dir available, tokens will not persist");
            Arc::new(NullTokenStore)
        }
    }
}

#[cfg(test)]
#[path = "persist_tests.rs"]
mod tests;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::types::UserRecord;

/// Key under which the pre-redirect path is saved.
pub const RETURN_URL_KEY: &str = "returnUrl";

const SESSION_FILE: &str = "user-storage.json";

/// Persisted part of the user store. The authentication flag is derived and
/// never written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersistedSession {
    pub user: Option<UserRecord>,
}

/// File-backed persistence for the signed-in user.
/// The file lives in the application config directory.
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(config_dir: &Path) -> Self {
        Self {
            path: config_dir.join(SESSION_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the session, creating the directory if needed.
    pub fn store(&self, session: &PersistedSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create session directory")?;
        }

        let json = serde_json::to_string_pretty(session)
            .context("Failed to serialize session")?;

        fs::write(&self.path, &json).context("Failed to write session file")?;

        tracing::debug!("Stored session at {:?}", self.path);
        Ok(())
    }

    /// Read the session. A missing file is an empty session.
    pub fn retrieve(&self) -> Result<PersistedSession> {
        if !self.path.exists() {
            return Ok(PersistedSession::default());
        }

        let json = fs::read_to_string(&self.path).context("Failed to read session file")?;

        let session: PersistedSession =
            serde_json::from_str(&json).context("Failed to deserialize session")?;

        Ok(session)
    }

    pub fn delete(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path).context("Failed to delete session file")?;
            tracing::info!("Deleted session file {:?}", self.path);
        }
        Ok(())
    }
}

/// Per-session key/value storage that does not survive a restart.
#[derive(Debug, Clone, Default)]
pub struct SessionStorage {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl SessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    pub fn set(&self, key: &str, value: impl Into<String>) {
        self.values.lock().insert(key.to_string(), value.into());
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        self.values.lock().remove(key)
    }

    pub fn save_return_url(&self, path: &str) {
        self.set(RETURN_URL_KEY, path);
    }

    /// Take the saved return path, clearing it.
    pub fn take_return_url(&self) -> Option<String> {
        self.remove(RETURN_URL_KEY)
    }
}

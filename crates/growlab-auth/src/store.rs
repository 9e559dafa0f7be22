//! Current-user store.
//!
//! Holds the signed-in user and persists it across restarts. Whether the
//! user is authenticated is always computed from the record, so the two can
//! never disagree.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::watch;

use crate::storage::{PersistedSession, SessionFile};
use crate::types::UserRecord;

#[derive(Clone)]
pub struct UserStore {
    user: Arc<watch::Sender<Option<UserRecord>>>,
    file: Option<SessionFile>,
}

impl UserStore {
    /// Store without persistence.
    pub fn in_memory() -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            user: Arc::new(tx),
            file: None,
        }
    }

    /// Store backed by `user-storage.json` in `config_dir`, rehydrated from it.
    ///
    /// An unreadable file is discarded so a corrupt session can't block startup.
    pub fn persistent(config_dir: &Path) -> Self {
        let file = SessionFile::new(config_dir);
        let user = match file.retrieve() {
            Ok(session) => session.user,
            Err(e) => {
                tracing::warn!("Discarding unreadable session file: {:#}", e);
                if let Err(e) = file.delete() {
                    tracing::error!("Failed to delete session file: {:#}", e);
                }
                None
            }
        };

        if let Some(u) = &user {
            tracing::info!(email = %u.email, "Restored session");
        }

        let (tx, _) = watch::channel(user);
        Self {
            user: Arc::new(tx),
            file: Some(file),
        }
    }

    /// Replace the current user. A persistent store rewrites its session file
    /// synchronously before returning, blocking the calling thread briefly.
    pub fn set_user(&self, user: Option<UserRecord>) {
        self.user.send_replace(user);
        self.persist();
    }

    pub fn logout(&self) {
        if self.user.borrow().is_some() {
            tracing::info!("Clearing user session");
        }
        self.set_user(None);
    }

    pub fn user(&self) -> Option<UserRecord> {
        self.user.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.borrow().is_some()
    }

    /// Subscribe to user changes (sign-in, sign-out, invalidation).
    pub fn subscribe(&self) -> watch::Receiver<Option<UserRecord>> {
        self.user.subscribe()
    }

    fn persist(&self) {
        let Some(file) = &self.file else {
            return;
        };
        let session = PersistedSession { user: self.user() };
        if let Err(e) = file.store(&session) {
            tracing::error!("Failed to persist session: {:#}", e);
        }
    }
}

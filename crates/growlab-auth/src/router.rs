//! In-process navigation state.
//!
//! Tracks the current path and notifies subscribers on navigation. A real UI
//! shell mirrors these pushes into its own router.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

#[derive(Clone)]
pub struct Router {
    path: Arc<watch::Sender<String>>,
    refreshes: Arc<AtomicU64>,
}

impl Router {
    pub fn new(initial_path: &str) -> Self {
        let (tx, _) = watch::channel(initial_path.to_string());
        Self {
            path: Arc::new(tx),
            refreshes: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn current_path(&self) -> String {
        self.path.borrow().clone()
    }

    /// Navigate to `path`. Subscribers are notified even when the path is
    /// unchanged, matching a fresh navigation.
    pub fn push(&self, path: &str) {
        tracing::debug!(from = %*self.path.borrow(), to = %path, "navigate");
        self.path.send_replace(path.to_string());
    }

    /// Ask the current page to reload its data.
    pub fn refresh(&self) {
        self.refreshes.fetch_add(1, Ordering::Relaxed);
        self.path.send_modify(|_| {});
    }

    pub fn refresh_count(&self) -> u64 {
        self.refreshes.load(Ordering::Relaxed)
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.path.subscribe()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new("/")
    }
}

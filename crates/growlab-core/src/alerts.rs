//! Transient notification store.
//!
//! Alerts are appended by auth flows and read by whatever renders
//! notifications. Each alert removes itself after the configured TTL.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Severity of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertMessage {
    pub id: String,
    pub kind: AlertKind,
    pub message: String,
}

/// Shared alert list. Cloning yields another handle to the same list.
#[derive(Clone)]
pub struct AlertStore {
    alerts: Arc<watch::Sender<Vec<AlertMessage>>>,
    ttl: Duration,
}

impl AlertStore {
    pub fn new(ttl: Duration) -> Self {
        let (tx, _) = watch::channel(Vec::new());
        Self {
            alerts: Arc::new(tx),
            ttl,
        }
    }

    /// Append an alert and schedule its removal. Returns the alert id.
    ///
    /// Outside a tokio runtime the alert cannot expire on its own and stays
    /// until `remove_alert` is called.
    pub fn add_alert(&self, kind: AlertKind, message: impl Into<String>) -> String {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let alert = AlertMessage {
            id: id.clone(),
            kind,
            message: message.into(),
        };
        tracing::debug!(id = %alert.id, kind = ?alert.kind, "alert added: {}", alert.message);
        self.alerts.send_modify(|list| list.push(alert));

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let alerts = Arc::clone(&self.alerts);
                let ttl = self.ttl;
                let expired = id.clone();
                handle.spawn(async move {
                    tokio::time::sleep(ttl).await;
                    alerts.send_modify(|list| list.retain(|a| a.id != expired));
                });
            }
            Err(_) => tracing::warn!("No runtime available; alert {} will not expire", id),
        }

        id
    }

    /// Dismiss an alert before its timeout.
    pub fn remove_alert(&self, id: &str) {
        self.alerts.send_modify(|list| list.retain(|a| a.id != id));
    }

    /// Snapshot of the current alerts, oldest first.
    pub fn alerts(&self) -> Vec<AlertMessage> {
        self.alerts.borrow().clone()
    }

    /// Subscribe to alert list changes.
    pub fn subscribe(&self) -> watch::Receiver<Vec<AlertMessage>> {
        self.alerts.subscribe()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl Default for AlertStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(3))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_alert_visible_until_ttl() {
        let store = AlertStore::default();
        let id = store.add_alert(AlertKind::Warning, "please login!");

        let alerts = store.alerts();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].id, id);
        assert_eq!(alerts[0].kind, AlertKind::Warning);

        tokio::time::sleep(Duration::from_millis(2900)).await;
        assert_eq!(store.alerts().len(), 1);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(store.alerts().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_alert_expires_independently() {
        let store = AlertStore::default();
        let first = store.add_alert(AlertKind::Info, "first");
        tokio::time::sleep(Duration::from_secs(2)).await;
        let second = store.add_alert(AlertKind::Success, "second");

        tokio::time::sleep(Duration::from_millis(1500)).await;
        let ids: Vec<_> = store.alerts().into_iter().map(|a| a.id).collect();
        assert!(!ids.contains(&first));
        assert!(ids.contains(&second));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(store.alerts().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_alert_dismisses_early() {
        let store = AlertStore::default();
        let id = store.add_alert(AlertKind::Error, "boom");
        store.remove_alert(&id);
        assert!(store.alerts().is_empty());

        // expiry of an already dismissed alert is harmless
        tokio::time::sleep(Duration::from_secs(4)).await;
        assert!(store.alerts().is_empty());
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let store = AlertStore::new(Duration::from_secs(60));
        let mut rx = store.subscribe();
        store.add_alert(AlertKind::Success, "signout success!");
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().len(), 1);
        assert_eq!(rx.borrow()[0].message, "signout success!");
    }

    #[test]
    fn test_add_outside_runtime_keeps_alert() {
        let store = AlertStore::default();
        let id = store.add_alert(AlertKind::Info, "no runtime");
        assert_eq!(store.alerts().len(), 1);
        store.remove_alert(&id);
        assert!(store.alerts().is_empty());
    }

    #[test]
    fn test_alert_kind_serializes_lowercase() {
        let json = serde_json::to_string(&AlertKind::Warning).unwrap();
        assert_eq!(json, "\"warning\"");
    }
}

//! OAuth redirect landing.
//!
//! Counts down, exchanges the authorization code exactly once, then sends the
//! user back to wherever they were headed before signing in.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use growlab_core::{AlertKind, AlertStore, CallbackConfig};
use tokio::sync::watch;
use url::Url;

use crate::client::AuthBackend;
use crate::error::AuthError;
use crate::router::Router;
use crate::storage::SessionStorage;
use crate::store::UserStore;

pub const PROCESSING_MESSAGE: &str = "Processing Authorization...";
pub const SUCCESS_MESSAGE: &str = "Authorization successful!";
pub const MISSING_CODE_MESSAGE: &str = "Authorization code not found. Please try again.";
pub const EXCHANGE_FAILED_MESSAGE: &str =
    "Failed to fetch access token. Please refresh the page or try again later.";
pub const LOGIN_SUCCESS_ALERT: &str = "login success!";
pub const LOGIN_FAIL_ALERT: &str = "login fail, please contact the administrator !";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackPhase {
    CountingDown,
    Exchanging,
    Succeeded,
    Failed,
}

/// Status shown on the callback page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackView {
    pub phase: CallbackPhase,
    pub message: String,
    pub seconds_left: u32,
}

/// Extract the `code` query parameter from a callback URL. Relative URLs
/// (`/auth/callback?code=..`) are accepted.
pub fn code_from_url(raw: &str) -> Option<String> {
    let url = Url::parse(raw)
        .or_else(|_| Url::parse("http://localhost").and_then(|base| base.join(raw)))
        .ok()?;

    url.query_pairs()
        .find(|(key, _)| key == "code")
        .map(|(_, value)| value.into_owned())
        .filter(|code| !code.is_empty())
}

pub struct OAuthCallback {
    backend: Arc<dyn AuthBackend>,
    users: UserStore,
    router: Router,
    session: SessionStorage,
    alerts: AlertStore,
    redirect_uri: String,
    countdown_secs: u32,
    redirect_delay: Duration,
    view: watch::Sender<CallbackView>,
    started: AtomicBool,
}

impl OAuthCallback {
    pub fn new(
        backend: Arc<dyn AuthBackend>,
        users: UserStore,
        router: Router,
        session: SessionStorage,
        alerts: AlertStore,
        redirect_uri: &str,
        config: &CallbackConfig,
    ) -> Self {
        let (view, _) = watch::channel(CallbackView {
            phase: CallbackPhase::CountingDown,
            message: PROCESSING_MESSAGE.to_string(),
            seconds_left: config.countdown_secs,
        });
        Self {
            backend,
            users,
            router,
            session,
            alerts,
            redirect_uri: redirect_uri.to_string(),
            countdown_secs: config.countdown_secs,
            redirect_delay: config.redirect_delay(),
            view,
            started: AtomicBool::new(false),
        }
    }

    pub fn view(&self) -> CallbackView {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CallbackView> {
        self.view.subscribe()
    }

    /// Whether the one-shot exchange has already been claimed.
    pub fn has_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    /// Drive the page: count down one tick per second, then process the code
    /// found in `url`. Returns the final phase.
    pub async fn run(&self, url: &str) -> CallbackPhase {
        let code = code_from_url(url);
        tracing::info!(has_code = code.is_some(), "oauth callback started");

        for remaining in (1..=self.countdown_secs).rev() {
            self.view.send_modify(|v| v.seconds_left = remaining);
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
        self.view.send_modify(|v| v.seconds_left = 0);

        self.process_authorization(code).await;
        self.view().phase
    }

    /// Exchange `code` for a session. Only the first call does anything;
    /// later calls return `false` immediately.
    pub async fn process_authorization(&self, code: Option<String>) -> bool {
        if self.started.swap(true, Ordering::AcqRel) {
            tracing::debug!("authorization already processed, ignoring");
            return false;
        }

        let Some(code) = code else {
            let err = AuthError::MissingCode;
            tracing::warn!("Callback reached without a code: {}", err);
            let message = err.user_message();
            self.set_phase(CallbackPhase::Failed, &message);
            self.alerts.add_alert(AlertKind::Error, message);
            return true;
        };

        self.set_phase(CallbackPhase::Exchanging, PROCESSING_MESSAGE);

        match self.backend.google_login(&code, &self.redirect_uri).await {
            Ok(user) => {
                tracing::info!(email = %user.email, "authorization successful");
                self.users.set_user(Some(user));
                self.set_phase(CallbackPhase::Succeeded, SUCCESS_MESSAGE);

                tokio::time::sleep(self.redirect_delay).await;

                let target = self
                    .session
                    .take_return_url()
                    .unwrap_or_else(|| "/".to_string());
                self.router.push(&target);
                self.router.refresh();
                self.alerts.add_alert(AlertKind::Success, LOGIN_SUCCESS_ALERT);
            }
            Err(e) => {
                tracing::error!("Error fetching token: {}", e);
                self.set_phase(CallbackPhase::Failed, EXCHANGE_FAILED_MESSAGE);
                self.alerts.add_alert(AlertKind::Error, LOGIN_FAIL_ALERT);
            }
        }
        true
    }

    fn set_phase(&self, phase: CallbackPhase, message: &str) {
        self.view.send_modify(|v| {
            v.phase = phase;
            v.message = message.to_string();
        });
    }
}

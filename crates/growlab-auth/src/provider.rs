//! Route gate.
//!
//! Validates the session against the backend whenever the route or the user
//! changes and on a fixed interval, and keeps unauthenticated users off
//! protected routes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use growlab_core::{AlertKind, AlertStore, AuthConfig};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::client::AuthBackend;
use crate::router::Router;
use crate::storage::SessionStorage;
use crate::store::UserStore;

pub const LOGIN_REQUIRED_ALERT: &str = "please login!";

/// Result of one validation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// Public route and nobody signed in; no backend call was made.
    Skipped,
    Valid,
    /// The backend rejected the session (or could not be reached) and the
    /// local user was cleared.
    Invalidated { redirected: bool },
    /// Protected route reached without a local user.
    SignedOut,
}

/// What the layout may render for the current route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateView {
    /// First validation still pending.
    Loading,
    /// Protected route without a user; a redirect is underway.
    Hidden,
    Render { is_authenticated: bool },
}

pub struct AuthProvider {
    backend: Arc<dyn AuthBackend>,
    users: UserStore,
    router: Router,
    session: SessionStorage,
    alerts: AlertStore,
    protected_routes: Vec<String>,
    interval: Duration,
    loading: AtomicBool,
}

impl AuthProvider {
    pub fn new(
        backend: Arc<dyn AuthBackend>,
        users: UserStore,
        router: Router,
        session: SessionStorage,
        alerts: AlertStore,
        config: &AuthConfig,
    ) -> Self {
        Self {
            backend,
            users,
            router,
            session,
            alerts,
            protected_routes: config.protected_routes.clone(),
            interval: config.validate_interval(),
            loading: AtomicBool::new(true),
        }
    }

    pub fn is_protected(&self, path: &str) -> bool {
        self.protected_routes
            .iter()
            .any(|route| path.starts_with(route.as_str()))
    }

    /// Run one validation pass for the current route.
    pub async fn validate(&self) -> ValidationOutcome {
        let path = self.router.current_path();
        let protected = self.is_protected(&path);
        let outcome = self.validate_path(&path, protected).await;
        self.loading.store(false, Ordering::Release);
        tracing::debug!(%path, protected, ?outcome, "session validation");
        outcome
    }

    async fn validate_path(&self, path: &str, protected: bool) -> ValidationOutcome {
        if !protected && !self.users.is_authenticated() {
            return ValidationOutcome::Skipped;
        }

        match self.backend.validate().await {
            Ok(()) if protected && !self.users.is_authenticated() => {
                self.redirect_home(path);
                ValidationOutcome::SignedOut
            }
            Ok(()) => ValidationOutcome::Valid,
            Err(e) => {
                if e.is_rejection() {
                    tracing::warn!("Auth validation failed: {}", e);
                } else {
                    tracing::error!("Auth validation error: {}", e);
                }
                self.users.logout();
                if protected {
                    self.redirect_home(path);
                }
                ValidationOutcome::Invalidated {
                    redirected: protected,
                }
            }
        }
    }

    fn redirect_home(&self, path: &str) {
        tracing::info!(%path, "redirecting unauthenticated user home");
        self.session.save_return_url(path);
        self.router.push("/");
        self.alerts.add_alert(AlertKind::Warning, LOGIN_REQUIRED_ALERT);
    }

    /// Render decision for the current route.
    pub fn view(&self) -> GateView {
        if self.loading.load(Ordering::Acquire) {
            return GateView::Loading;
        }
        let is_authenticated = self.users.is_authenticated();
        if self.is_protected(&self.router.current_path()) && !is_authenticated {
            return GateView::Hidden;
        }
        GateView::Render { is_authenticated }
    }

    /// Validate now, then again on every route or user change and whenever
    /// the interval elapses without one. Returns when `shutdown` fires.
    pub async fn run(self: Arc<Self>, shutdown: CancellationToken) {
        let mut routes = self.router.subscribe();
        let mut users = self.users.subscribe();
        routes.borrow_and_update();
        users.borrow_and_update();

        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(interval_secs = self.interval.as_secs(), "auth provider started");
        self.validate().await;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                changed = routes.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    routes.borrow_and_update();
                }
                changed = users.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    users.borrow_and_update();
                }
                _ = ticker.tick() => {}
            }

            self.validate().await;
            ticker.reset();
        }

        tracing::info!("auth provider stopped");
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use crate::testing::{sample_user, FakeAuthBackend, Reply};

    struct Harness {
        backend: Arc<FakeAuthBackend>,
        users: UserStore,
        router: Router,
        session: SessionStorage,
        alerts: AlertStore,
        provider: Arc<AuthProvider>,
    }

    fn harness(path: &str, reply: Reply) -> Harness {
        let backend = Arc::new(FakeAuthBackend::with_validate(reply));
        let users = UserStore::in_memory();
        let router = Router::new(path);
        let session = SessionStorage::new();
        let alerts = AlertStore::default();
        let provider = Arc::new(AuthProvider::new(
            backend.clone(),
            users.clone(),
            router.clone(),
            session.clone(),
            alerts.clone(),
            &AuthConfig::default(),
        ));
        Harness {
            backend,
            users,
            router,
            session,
            alerts,
            provider,
        }
    }

    #[tokio::test]
    async fn test_public_route_without_user_skips_backend() {
        let h = harness("/", Reply::Ok);
        assert_eq!(h.provider.view(), GateView::Loading);

        assert_eq!(h.provider.validate().await, ValidationOutcome::Skipped);
        assert_eq!(h.backend.validate_calls(), 0);
        assert_eq!(
            h.provider.view(),
            GateView::Render {
                is_authenticated: false
            }
        );
    }

    #[tokio::test]
    async fn test_protected_route_without_user_redirects_even_when_cookie_valid() {
        let h = harness("/calendar", Reply::Ok);

        assert_eq!(h.provider.validate().await, ValidationOutcome::SignedOut);
        assert_eq!(h.router.current_path(), "/");
        assert_eq!(h.session.take_return_url().as_deref(), Some("/calendar"));
    }

    #[tokio::test]
    async fn test_protected_route_without_user_redirects_on_rejection() {
        for reply in [Reply::Status(401), Reply::Unreachable] {
            let h = harness("/calendar/week", reply);

            let outcome = h.provider.validate().await;
            assert_eq!(outcome, ValidationOutcome::Invalidated { redirected: true });
            assert_eq!(h.router.current_path(), "/");
            assert_eq!(
                h.session.take_return_url().as_deref(),
                Some("/calendar/week")
            );
            let alerts = h.alerts.alerts();
            assert_eq!(alerts.len(), 1);
            assert_eq!(alerts[0].kind, AlertKind::Warning);
            assert_eq!(alerts[0].message, LOGIN_REQUIRED_ALERT);
        }
    }

    #[tokio::test]
    async fn test_signed_in_user_on_public_route_is_cleared_without_redirect() {
        let h = harness("/", Reply::Status(401));
        h.users.set_user(Some(sample_user()));

        let outcome = h.provider.validate().await;
        assert_eq!(outcome, ValidationOutcome::Invalidated { redirected: false });
        assert!(!h.users.is_authenticated());
        assert_eq!(h.router.current_path(), "/");
        assert!(h.session.take_return_url().is_none());
        assert!(h.alerts.alerts().is_empty());
    }

    #[tokio::test]
    async fn test_valid_session_renders_children() {
        let h = harness("/calendar", Reply::Ok);
        h.users.set_user(Some(sample_user()));

        assert_eq!(h.provider.validate().await, ValidationOutcome::Valid);
        assert_eq!(h.backend.validate_calls(), 1);
        assert_eq!(
            h.provider.view(),
            GateView::Render {
                is_authenticated: true
            }
        );
    }

    #[tokio::test]
    async fn test_hidden_while_protected_and_signed_out() {
        let h = harness("/", Reply::Ok);
        h.provider.validate().await;
        // navigating without the run loop leaves the gate to hide the page
        h.router.push("/calendar");
        assert_eq!(h.provider.view(), GateView::Hidden);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_revalidates_on_route_change_and_interval() {
        let h = harness("/", Reply::Ok);
        h.users.set_user(Some(sample_user()));
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(h.provider.clone().run(shutdown.clone()));

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(h.backend.validate_calls(), 1);

        h.router.push("/calendar");
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(h.backend.validate_calls(), 2);

        tokio::time::sleep(Duration::from_secs(5 * 60)).await;
        assert_eq!(h.backend.validate_calls(), 3);

        shutdown.cancel();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_redirects_when_session_expires() {
        let h = harness("/calendar", Reply::Ok);
        h.users.set_user(Some(sample_user()));
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(h.provider.clone().run(shutdown.clone()));

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(h.router.current_path(), "/calendar");

        *h.backend.validate_reply.lock() = Reply::Status(401);
        tokio::time::sleep(Duration::from_secs(5 * 60)).await;

        assert!(!h.users.is_authenticated());
        assert_eq!(h.router.current_path(), "/");
        assert_eq!(h.session.take_return_url().as_deref(), Some("/calendar"));

        shutdown.cancel();
        task.await.unwrap();
    }
}

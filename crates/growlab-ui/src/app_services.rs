//! Centralized application services.
//!
//! This module provides a single `AppServices` struct that holds all shared
//! state (stores, router, backends) and hands out the view-models built on it.
//!
//! Every backend shares one cookie-carrying HTTP client so the session set at
//! login is sent with calendar and validation calls.

use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use growlab_auth::{
    AuthBackend, AuthClient, AuthProvider, GoogleSignIn, OAuthCallback, Router, SessionStorage,
    UserStore,
};
use growlab_calendar::{CalendarBackend, CalendarClient};
use growlab_core::{AlertStore, Config};

use crate::models::{AuthButtonModel, CalendarModel};
use crate::pages::{self, Page};

/// Application services container.
pub struct AppServices {
    config: Config,

    /// Runtime all background work is spawned on
    runtime: Handle,

    /// Cancels the auth revalidation loop
    shutdown_token: CancellationToken,

    alerts: AlertStore,
    users: UserStore,
    router: Router,
    session: SessionStorage,

    auth_backend: Arc<dyn AuthBackend>,
    calendar_backend: Arc<dyn CalendarBackend>,

    auth_provider: Arc<AuthProvider>,

    /// Revalidation loop, present once `start` has run
    provider_task: Mutex<Option<JoinHandle<()>>>,
}

impl AppServices {
    /// Build services talking to the configured backend. The user store is
    /// rehydrated from the config directory.
    pub fn new(config: Config, runtime: Handle) -> Result<Arc<Self>> {
        let http = growlab_core::http::build_client(&config.api)
            .context("Failed to create backend HTTP client")?;

        let auth_backend: Arc<dyn AuthBackend> =
            Arc::new(AuthClient::new(http.clone(), &config.api.base_url));
        let calendar_backend: Arc<dyn CalendarBackend> = Arc::new(
            CalendarClient::new(http, &config.api.base_url)
                .with_event_color(&config.calendar.event_color),
        );
        let users = UserStore::persistent(&config.config_dir);

        tracing::info!(base_url = %config.api.base_url, "AppServices initialized");
        Ok(Self::with_backends(
            config,
            runtime,
            auth_backend,
            calendar_backend,
            users,
        ))
    }

    /// Build services on explicit backends.
    pub fn with_backends(
        config: Config,
        runtime: Handle,
        auth_backend: Arc<dyn AuthBackend>,
        calendar_backend: Arc<dyn CalendarBackend>,
        users: UserStore,
    ) -> Arc<Self> {
        let alerts = AlertStore::new(config.alerts.ttl());
        let router = Router::default();
        let session = SessionStorage::new();

        let auth_provider = Arc::new(AuthProvider::new(
            auth_backend.clone(),
            users.clone(),
            router.clone(),
            session.clone(),
            alerts.clone(),
            &config.auth,
        ));

        Arc::new(Self {
            config,
            runtime,
            shutdown_token: CancellationToken::new(),
            alerts,
            users,
            router,
            session,
            auth_backend,
            calendar_backend,
            auth_provider,
            provider_task: Mutex::new(None),
        })
    }

    /// Start the auth revalidation loop. Calling it again is a no-op.
    pub fn start(&self) {
        let mut task = self.provider_task.lock();
        if task.is_some() {
            return;
        }
        let provider = self.auth_provider.clone();
        let token = self.shutdown_token.clone();
        *task = Some(self.runtime.spawn(provider.run(token)));
        tracing::info!("AppServices started");
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn alerts(&self) -> &AlertStore {
        &self.alerts
    }

    pub fn users(&self) -> &UserStore {
        &self.users
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn session(&self) -> &SessionStorage {
        &self.session
    }

    pub fn auth_provider(&self) -> Arc<AuthProvider> {
        self.auth_provider.clone()
    }

    /// Navigate and return the page now shown.
    pub fn navigate(&self, path: &str) -> &'static Page {
        self.router.push(path);
        pages::route(path)
    }

    /// Page for the current route.
    pub fn current_page(&self) -> &'static Page {
        pages::route(&self.router.current_path())
    }

    // =========== View-models ===========

    pub fn sign_in(&self) -> GoogleSignIn {
        GoogleSignIn::from_config(&self.config.oauth)
    }

    /// Handler for one visit to the OAuth callback page.
    pub fn oauth_callback(&self) -> OAuthCallback {
        OAuthCallback::new(
            self.auth_backend.clone(),
            self.users.clone(),
            self.router.clone(),
            self.session.clone(),
            self.alerts.clone(),
            &self.config.oauth.redirect_uri,
            &self.config.callback,
        )
    }

    pub fn auth_button(&self) -> AuthButtonModel {
        AuthButtonModel::new(
            self.auth_backend.clone(),
            self.users.clone(),
            self.alerts.clone(),
            self.runtime.clone(),
        )
    }

    pub fn calendar_model(&self) -> CalendarModel {
        CalendarModel::new(
            self.calendar_backend.clone(),
            self.runtime.clone(),
            &self.config.calendar,
        )
    }

    // =========== Shutdown ===========

    /// Signal application shutdown and wait for background work to stop.
    pub async fn shutdown(&self) {
        tracing::info!("AppServices shutdown initiated");

        self.shutdown_token.cancel();

        let task = self.provider_task.lock().take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                tracing::error!("Auth provider task failed: {}", e);
            }
        }

        tracing::info!("AppServices shutdown complete");
    }
}

//! Header auth button.
//!
//! Shows a sign-in link to anonymous visitors and an avatar with a dropdown
//! to signed-in users. Sign-out runs through the auth service channel.

use std::sync::Arc;

use growlab_auth::{AuthBackend, UserStore};
use growlab_core::{AlertKind, AlertStore, AppError};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::services::{request_sign_out, AuthServiceMessage};

pub const SIGN_IN_HREF: &str = "/signin";
pub const SIGN_OUT_LABEL: &str = "Sign out";
pub const SIGNING_OUT_LABEL: &str = "Signing out...";
pub const SIGN_OUT_SUCCESS_ALERT: &str = "signout success!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthButtonView {
    SignInLink {
        href: &'static str,
    },
    Avatar {
        /// Picture URL, or `None` to draw `initial` instead.
        picture: Option<String>,
        initial: String,
        dropdown: Option<DropdownView>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropdownView {
    pub name: String,
    pub email: String,
    pub button_label: &'static str,
    pub button_disabled: bool,
}

pub struct AuthButtonModel {
    backend: Arc<dyn AuthBackend>,
    users: UserStore,
    alerts: AlertStore,
    runtime: Handle,
    tx: UnboundedSender<AuthServiceMessage>,
    rx: UnboundedReceiver<AuthServiceMessage>,
    dropdown_open: bool,
    signing_out: bool,
}

impl AuthButtonModel {
    pub fn new(
        backend: Arc<dyn AuthBackend>,
        users: UserStore,
        alerts: AlertStore,
        runtime: Handle,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            backend,
            users,
            alerts,
            runtime,
            tx,
            rx,
            dropdown_open: false,
            signing_out: false,
        }
    }

    pub fn view(&self) -> AuthButtonView {
        let Some(user) = self.users.user() else {
            return AuthButtonView::SignInLink { href: SIGN_IN_HREF };
        };

        let dropdown = self.dropdown_open.then(|| DropdownView {
            name: user.name.clone(),
            email: user.email.clone(),
            button_label: if self.signing_out {
                SIGNING_OUT_LABEL
            } else {
                SIGN_OUT_LABEL
            },
            button_disabled: self.signing_out,
        });

        AuthButtonView::Avatar {
            picture: user.picture_url().map(str::to_string),
            initial: user.initial(),
            dropdown,
        }
    }

    pub fn toggle_dropdown(&mut self) {
        self.dropdown_open = !self.dropdown_open;
    }

    /// Click outside the dropdown.
    pub fn close_dropdown(&mut self) {
        self.dropdown_open = false;
    }

    /// Start sign-out. Ignored while one is already in flight.
    pub fn sign_out(&mut self) -> bool {
        if self.signing_out {
            return false;
        }
        self.signing_out = true;
        tracing::info!("signing out");
        request_sign_out(&self.tx, &self.runtime, self.backend.clone());
        true
    }

    pub fn is_signing_out(&self) -> bool {
        self.signing_out
    }

    /// Apply every result that has arrived.
    pub fn poll_channel(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(msg) = self.rx.try_recv() {
            self.apply(msg);
            applied += 1;
        }
        applied
    }

    /// Wait for the next result and apply it.
    pub async fn process_next(&mut self) -> bool {
        match self.rx.recv().await {
            Some(msg) => {
                self.apply(msg);
                true
            }
            None => false,
        }
    }

    fn apply(&mut self, msg: AuthServiceMessage) {
        match msg {
            AuthServiceMessage::SignOutDone(result) => {
                self.signing_out = false;
                match result {
                    Ok(()) => {
                        self.users.logout();
                        self.dropdown_open = false;
                        self.alerts.add_alert(AlertKind::Success, SIGN_OUT_SUCCESS_ALERT);
                    }
                    Err(e) => {
                        // session is kept; the user can try again
                        let hint = AppError::from(e.clone()).user_message();
                        tracing::error!(hint, "signout error: {}", e);
                    }
                }
            }
        }
    }
}

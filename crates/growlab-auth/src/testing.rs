//! In-memory backend used by the flow tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::client::AuthBackend;
use crate::error::AuthError;
use crate::types::UserRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reply {
    Ok,
    Status(u16),
    /// Stand-in for a transport failure.
    Unreachable,
}

impl Reply {
    fn into_result(self) -> Result<(), AuthError> {
        match self {
            Reply::Ok => Ok(()),
            Reply::Status(status) => Err(AuthError::Http {
                status,
                message: None,
            }),
            Reply::Unreachable => Err(AuthError::InvalidResponse("connection refused".into())),
        }
    }
}

pub(crate) struct FakeAuthBackend {
    pub validate_reply: Mutex<Reply>,
    pub login_reply: Mutex<Reply>,
    pub login_delay: Duration,
    pub validate_calls: AtomicUsize,
    pub login_calls: AtomicUsize,
}

impl FakeAuthBackend {
    pub fn new() -> Self {
        Self {
            validate_reply: Mutex::new(Reply::Ok),
            login_reply: Mutex::new(Reply::Ok),
            login_delay: Duration::ZERO,
            validate_calls: AtomicUsize::new(0),
            login_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_validate(reply: Reply) -> Self {
        let fake = Self::new();
        *fake.validate_reply.lock() = reply;
        fake
    }

    pub fn validate_calls(&self) -> usize {
        self.validate_calls.load(Ordering::SeqCst)
    }

    pub fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }
}

pub(crate) fn sample_user() -> UserRecord {
    UserRecord {
        id: "1099".into(),
        email: "ada@example.com".into(),
        verified_email: true,
        name: "Ada Lovelace".into(),
        given_name: "Ada".into(),
        family_name: "Lovelace".into(),
        picture: String::new(),
    }
}

#[async_trait]
impl AuthBackend for FakeAuthBackend {
    async fn google_login(
        &self,
        _code: &str,
        _redirect_uri: &str,
    ) -> Result<UserRecord, AuthError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        if !self.login_delay.is_zero() {
            tokio::time::sleep(self.login_delay).await;
        }
        let reply = *self.login_reply.lock();
        reply.into_result().map(|()| sample_user())
    }

    async fn validate(&self) -> Result<(), AuthError> {
        self.validate_calls.fetch_add(1, Ordering::SeqCst);
        let reply = *self.validate_reply.lock();
        reply.into_result()
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        Ok(())
    }
}

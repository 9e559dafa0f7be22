use crate::services::auth_service::AuthError as UiAuthError;
use growlab_core::{AppError, AuthError, NetworkError};

impl From<UiAuthError> for AppError {
    fn from(e: UiAuthError) -> Self {
        match e {
            UiAuthError::SignOut(s) => AppError::Auth(AuthError::SignOutFailed(s)),
            UiAuthError::Network(s) => AppError::Network(NetworkError::ConnectionFailed(s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_out_failure_maps_to_auth() {
        let app: AppError = UiAuthError::SignOut("nope".into()).into();
        assert!(matches!(app, AppError::Auth(AuthError::SignOutFailed(_))));
        assert_eq!(app.user_message(), "Sign-out failed. Please try again.");
    }
}

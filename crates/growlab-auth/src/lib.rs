pub mod callback;
pub mod client;
pub mod error;
pub mod google;
pub mod provider;
pub mod router;
pub mod storage;
pub mod store;
pub mod types;

#[cfg(test)]
mod testing;

pub use callback::{code_from_url, CallbackPhase, CallbackView, OAuthCallback};
pub use client::{AuthBackend, AuthClient};
pub use error::AuthError;
pub use google::GoogleSignIn;
pub use provider::{AuthProvider, GateView, ValidationOutcome};
pub use router::Router;
pub use storage::{SessionFile, SessionStorage, RETURN_URL_KEY};
pub use store::UserStore;
pub use types::UserRecord;

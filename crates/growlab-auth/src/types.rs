//! Wire types for the authorize endpoints.

use serde::{Deserialize, Serialize};

/// Signed-in user as returned by the backend (Google userinfo shape).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub verified_email: bool,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub given_name: String,
    #[serde(default)]
    pub family_name: String,
    #[serde(default)]
    pub picture: String,
}

impl UserRecord {
    /// Letter shown in place of a missing avatar picture.
    pub fn initial(&self) -> String {
        self.name
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_else(|| "U".to_string())
    }

    pub fn picture_url(&self) -> Option<&str> {
        if self.picture.is_empty() {
            None
        } else {
            Some(&self.picture)
        }
    }
}

/// Body of `POST /api/authorize/googleLogin`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest<'a> {
    pub code: &'a str,
    pub redirect_uri: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub data: UserRecord,
}

/// Error payloads: login failures use `error`, sign-out failures use `message`.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    pub error: Option<String>,
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.error.or(self.message)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    fn user(name: &str, picture: &str) -> UserRecord {
        UserRecord {
            id: "1".into(),
            email: "ada@example.com".into(),
            verified_email: true,
            name: name.into(),
            given_name: String::new(),
            family_name: String::new(),
            picture: picture.into(),
        }
    }

    #[test]
    fn test_login_request_is_camel_case() {
        let req = LoginRequest {
            code: "4/abc",
            redirect_uri: "http://localhost:3000/auth/callback",
        };
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(
            json,
            r#"{"code":"4/abc","redirectUri":"http://localhost:3000/auth/callback"}"#
        );
    }

    #[test]
    fn test_login_response_parses_user() {
        let json = r#"{"data": {
            "id": "1099",
            "email": "ada@example.com",
            "verified_email": true,
            "name": "Ada Lovelace",
            "given_name": "Ada",
            "family_name": "Lovelace",
            "picture": "https://lh3.googleusercontent.com/a/pic"
        }}"#;
        let resp: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.data.given_name, "Ada");
        assert!(resp.data.verified_email);
    }

    #[test]
    fn test_initial_falls_back_to_u() {
        assert_eq!(user("ada", "").initial(), "A");
        assert_eq!(user("", "").initial(), "U");
        assert_eq!(user("", "").picture_url(), None);
        assert_eq!(user("x", "http://pic").picture_url(), Some("http://pic"));
    }

    #[test]
    fn test_error_body_prefers_error_field() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"error":"bad code","message":"ignored"}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("bad code"));

        let body: ErrorBody = serde_json::from_str(r#"{"message":"not signed in"}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("not signed in"));
    }
}

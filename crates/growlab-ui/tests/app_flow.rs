//! End-to-end flow against a mock backend using wiremock.
//!
//! Protected route redirect, OAuth callback, cookie-authenticated calendar
//! fetch and sign-out, all through `AppServices`.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::time::Duration;

use growlab_auth::{CallbackPhase, RETURN_URL_KEY};
use growlab_calendar::Month;
use growlab_core::{AlertKind, Config};
use growlab_ui::{AppServices, AuthButtonView, CalendarView};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SESSION_COOKIE: &str = "session=abc123";

async fn mock_backend() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/authorize/googleLogin"))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("Set-Cookie", "session=abc123; Path=/")
                .set_body_json(serde_json::json!({
                    "data": {
                        "id": "108",
                        "email": "mei@example.com",
                        "verified_email": true,
                        "name": "mei",
                        "given_name": "Mei",
                        "family_name": "Chen",
                        "picture": ""
                    }
                })),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/authorize/validate"))
        .and(header("cookie", SESSION_COOKIE))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/authorize/validate"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/calendar/events"))
        .and(header("cookie", SESSION_COOKIE))
        .and(query_param("userId", "test-user"))
        .and(query_param("startDate", "2024-02-01T00:00:00.000Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "events": [
                {
                    "id": "ev1",
                    "summary": "Planning",
                    "start": {"dateTime": "2024-02-12T09:00:00Z", "timeZone": "UTC"},
                    "end": {"dateTime": "2024-02-12T10:00:00Z", "timeZone": "UTC"}
                }
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/authorize/googleSignOut"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"message": "bye"})),
        )
        .mount(&server)
        .await;

    server
}

fn test_config(server: &MockServer, dir: &tempfile::TempDir) -> Config {
    let mut config = Config {
        config_dir: dir.path().to_path_buf(),
        ..Config::default()
    };
    config.api.base_url = server.uri();
    config.callback.countdown_secs = 0;
    config.callback.redirect_delay_ms = 0;
    config
}

/// Poll `cond` until it holds or two seconds pass.
async fn wait_for(what: &str, cond: impl Fn() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !cond() {
        if tokio::time::Instant::now() > deadline {
            panic!("timed out waiting for {}", what);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn test_sign_in_flow_returns_to_calendar() {
    let server = mock_backend().await;
    let dir = tempfile::tempdir().unwrap();
    let services =
        AppServices::new(test_config(&server, &dir), tokio::runtime::Handle::current()).unwrap();
    services.start();

    // Protected route without a session bounces home
    services.navigate("/calendar");
    wait_for("redirect home", || services.router().current_path() == "/").await;
    assert_eq!(
        services.session().get(RETURN_URL_KEY).as_deref(),
        Some("/calendar")
    );
    wait_for("login alert", || {
        services
            .alerts()
            .alerts()
            .iter()
            .any(|a| a.kind == AlertKind::Warning && a.message == "please login!")
    })
    .await;

    // Google sends the user back with a code
    let callback_url = "/auth/callback?code=4%2F0AX4&scope=email";
    services.navigate(callback_url);
    let callback = services.oauth_callback();
    assert_eq!(callback.run(callback_url).await, CallbackPhase::Succeeded);

    assert_eq!(services.router().current_path(), "/calendar");
    assert!(services.session().get(RETURN_URL_KEY).is_none());
    assert!(services.users().is_authenticated());

    // The session cookie from login keeps the user signed in
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(services.users().is_authenticated());
    assert_eq!(services.router().current_path(), "/calendar");

    // Persisted for the next launch
    assert!(dir.path().join("user-storage.json").exists());

    let mut calendar = services
        .calendar_model()
        .with_month(Month::new(2024, 2).unwrap());
    calendar.mount();
    while calendar.is_loading() {
        assert!(calendar.process_next().await);
    }
    assert_eq!(calendar.view(), CalendarView::Grid);
    assert_eq!(calendar.events().len(), 1);
    assert_eq!(calendar.events()[0].title, "Planning");
    assert_eq!(calendar.toolbar().month_label, "February 2024");

    services.shutdown().await;
}

#[tokio::test]
async fn test_sign_out_clears_session() {
    let server = mock_backend().await;
    let dir = tempfile::tempdir().unwrap();
    let services =
        AppServices::new(test_config(&server, &dir), tokio::runtime::Handle::current()).unwrap();

    let callback = services.oauth_callback();
    assert_eq!(
        callback.run("/auth/callback?code=xyz").await,
        CallbackPhase::Succeeded
    );
    assert_eq!(services.router().current_path(), "/");

    let mut button = services.auth_button();
    assert!(matches!(button.view(), AuthButtonView::Avatar { ref initial, .. } if initial == "M"));

    button.toggle_dropdown();
    assert!(button.sign_out());
    assert!(button.process_next().await);

    assert!(!services.users().is_authenticated());
    assert!(matches!(button.view(), AuthButtonView::SignInLink { .. }));
    assert!(services
        .alerts()
        .alerts()
        .iter()
        .any(|a| a.message == "signout success!"));
}

//! Backend client for `/api/calendar/events`.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use growlab_core::http::endpoint;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::error::CalendarError;
use crate::types::*;

const EVENTS_PATH: &str = "/api/calendar/events";

/// Parameters of a month fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    pub user_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Event operations the calendar view depends on.
#[async_trait]
pub trait CalendarBackend: Send + Sync {
    /// List events in the query window. Resolves to `Cancelled` as soon as
    /// `cancel` fires.
    async fn list_events(
        &self,
        query: &EventQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<CalendarEvent>, CalendarError>;

    async fn create_event(&self, payload: &EventPayload) -> Result<(), CalendarError>;

    async fn update_event(
        &self,
        event_id: &str,
        payload: &EventPayload,
    ) -> Result<(), CalendarError>;

    async fn delete_event(&self, event_id: &str) -> Result<(), CalendarError>;
}

pub struct CalendarClient {
    client: reqwest::Client,
    base_url: String,
    event_color: String,
}

impl CalendarClient {
    /// `client` should be the shared cookie-carrying client.
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            event_color: DEFAULT_EVENT_COLOR.to_string(),
        }
    }

    pub fn with_event_color(mut self, color: &str) -> Self {
        self.event_color = color.to_string();
        self
    }

    fn event_url(&self, event_id: &str) -> String {
        format!(
            "{}/{}",
            endpoint(&self.base_url, EVENTS_PATH),
            urlencoding::encode(event_id)
        )
    }

    async fn fetch_events(&self, query: &EventQuery) -> Result<Vec<CalendarEvent>, CalendarError> {
        let start = query.start.to_rfc3339_opts(SecondsFormat::Millis, true);
        let end = query.end.to_rfc3339_opts(SecondsFormat::Millis, true);

        let response = self
            .client
            .get(endpoint(&self.base_url, EVENTS_PATH))
            .query(&[
                ("userId", query.user_id.as_str()),
                ("startDate", start.as_str()),
                ("endDate", end.as_str()),
            ])
            .send()
            .await?;

        let list: EventListResponse = self.handle_response(response).await?;
        let total = list.events.len();
        let events: Vec<CalendarEvent> = list
            .events
            .into_iter()
            .filter_map(|api| match CalendarEvent::from_api(api, &self.event_color) {
                Ok(event) => Some(event),
                Err(e) => {
                    tracing::warn!("Skipping event: {}", e);
                    None
                }
            })
            .collect();

        tracing::debug!(total, kept = events.len(), "fetched calendar events");
        Ok(events)
    }

    /// Helper to handle API responses and errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, CalendarError> {
        let response = Self::check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| CalendarError::ApiError(format!("JSON parse error: {}", e)))
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, CalendarError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(CalendarError::Http {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl CalendarBackend for CalendarClient {
    #[instrument(
        skip(self, cancel),
        fields(start = %query.start, end = %query.end),
        level = "info"
    )]
    async fn list_events(
        &self,
        query: &EventQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!("event fetch cancelled");
                Err(CalendarError::Cancelled)
            }
            result = self.fetch_events(query) => result,
        }
    }

    #[instrument(skip(self, payload), level = "info")]
    async fn create_event(&self, payload: &EventPayload) -> Result<(), CalendarError> {
        let response = self
            .client
            .post(endpoint(&self.base_url, EVENTS_PATH))
            .json(payload)
            .send()
            .await?;

        Self::check_status(response).await?;
        Ok(())
    }

    #[instrument(skip(self, payload), level = "info")]
    async fn update_event(
        &self,
        event_id: &str,
        payload: &EventPayload,
    ) -> Result<(), CalendarError> {
        let response = self
            .client
            .put(self.event_url(event_id))
            .json(payload)
            .send()
            .await?;

        Self::check_status(response).await?;
        Ok(())
    }

    #[instrument(skip(self), level = "info")]
    async fn delete_event(&self, event_id: &str) -> Result<(), CalendarError> {
        let response = self.client.delete(self.event_url(event_id)).send().await?;

        // Delete may answer 204 No Content
        Self::check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> CalendarClient {
        CalendarClient::new(reqwest::Client::new(), &server.uri())
    }

    fn february() -> EventQuery {
        EventQuery {
            user_id: "test-user".into(),
            start: DateTime::parse_from_rfc3339("2024-02-01T00:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            end: DateTime::parse_from_rfc3339("2024-02-29T23:59:59Z")
                .unwrap()
                .with_timezone(&Utc),
        }
    }

    #[tokio::test]
    async fn test_list_events() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/calendar/events"))
            .and(query_param("userId", "test-user"))
            .and(query_param("startDate", "2024-02-01T00:00:00.000Z"))
            .and(query_param("endDate", "2024-02-29T23:59:59.000Z"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "events": [
                    {
                        "id": "event1",
                        "summary": "Meeting",
                        "start": {"dateTime": "2024-02-01T10:00:00Z", "timeZone": "UTC"},
                        "end": {"dateTime": "2024-02-01T11:00:00Z"}
                    },
                    {"id": "broken", "summary": "No start"}
                ]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server).with_event_color("#ff0000");
        let events = client
            .list_events(&february(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Meeting");
        assert_eq!(events[0].color, "#ff0000");
    }

    #[tokio::test]
    async fn test_list_events_http_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/calendar/events"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&mock_server)
            .await;

        let result = client_for(&mock_server)
            .list_events(&february(), &CancellationToken::new())
            .await;

        match result {
            Err(CalendarError::Http { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected HTTP error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_list_events_cancelled() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/calendar/events"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"events": []}))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let cancel = CancellationToken::new();
        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            canceller.cancel();
        });

        let result = client.list_events(&february(), &cancel).await;
        assert!(matches!(result, Err(CalendarError::Cancelled)));
    }

    #[tokio::test]
    async fn test_create_event() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/calendar/events"))
            .and(body_partial_json(serde_json::json!({
                "userId": "test-user",
                "summary": "Standup",
                "title": "Standup"
            })))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": "new"})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let draft = EventDraft {
            title: "Standup".into(),
            ..EventDraft::default()
        };
        client_for(&mock_server)
            .create_event(&EventPayload::create(&draft, "test-user"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_event() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/api/calendar/events/event%20123"))
            .and(body_partial_json(serde_json::json!({"userId": "test-user"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let draft = EventDraft {
            title: "Renamed".into(),
            ..EventDraft::default()
        };
        client_for(&mock_server)
            .update_event("event 123", &EventPayload::update(&draft, "test-user"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_event() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/api/calendar/events/event123"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&mock_server)
            .await;

        let result = client_for(&mock_server).delete_event("event123").await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_delete_event_not_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/api/calendar/events/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let result = client_for(&mock_server).delete_event("missing").await;

        assert!(matches!(result, Err(CalendarError::Http { status: 404, .. })));
    }
}

//! Calendar backend: async operations on the shared runtime, channel pattern.
//! All network work runs off the caller; results are sent over mpsc.

use std::sync::Arc;

use growlab_calendar::{
    CalendarBackend, CalendarError as BackendError, CalendarEvent, EventPayload, EventQuery, Month,
};
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

/// Error type for Calendar operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    /// Request superseded by a newer one or the view was closed.
    Cancelled,
    /// Backend answered with a non-2xx status.
    Http(u16),
    Network(String),
    InvalidEvent(String),
}

impl std::fmt::Display for CalendarError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CalendarError::Cancelled => write!(f, "Request cancelled"),
            CalendarError::Http(status) => write!(f, "HTTP error! status: {}", status),
            CalendarError::Network(s) => write!(f, "{}", s),
            CalendarError::InvalidEvent(s) => write!(f, "{}", s),
        }
    }
}

impl std::error::Error for CalendarError {}

impl From<BackendError> for CalendarError {
    fn from(e: BackendError) -> Self {
        match e {
            BackendError::Cancelled => CalendarError::Cancelled,
            BackendError::Http { status, .. } => CalendarError::Http(status),
            BackendError::InvalidEventData(s) => CalendarError::InvalidEvent(s),
            other => CalendarError::Network(other.to_string()),
        }
    }
}

/// Which mutation a `MutationDone` message reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Create,
    Update,
    Delete,
}

/// Messages sent from async operations back to the model.
#[derive(Debug)]
pub enum CalendarServiceMessage {
    /// Result of a month fetch, tagged with the request generation.
    FetchEventsDone {
        generation: u64,
        month: Month,
        result: Result<Vec<CalendarEvent>, CalendarError>,
    },
    /// Result of a create, update or delete.
    MutationDone {
        mutation: Mutation,
        result: Result<(), CalendarError>,
    },
}

/// Request the events of one month. Sends `FetchEventsDone` when the request
/// settles, including when it is cancelled.
pub fn request_fetch_events(
    tx: &UnboundedSender<CalendarServiceMessage>,
    runtime: &Handle,
    backend: Arc<dyn CalendarBackend>,
    query: EventQuery,
    month: Month,
    generation: u64,
    cancel: CancellationToken,
) {
    let tx = tx.clone();
    runtime.spawn(async move {
        let result = backend
            .list_events(&query, &cancel)
            .await
            .map_err(CalendarError::from);
        let _ = tx.send(CalendarServiceMessage::FetchEventsDone {
            generation,
            month,
            result,
        });
    });
}

pub fn request_create(
    tx: &UnboundedSender<CalendarServiceMessage>,
    runtime: &Handle,
    backend: Arc<dyn CalendarBackend>,
    payload: EventPayload,
) {
    let tx = tx.clone();
    runtime.spawn(async move {
        let result = backend
            .create_event(&payload)
            .await
            .map_err(CalendarError::from);
        let _ = tx.send(CalendarServiceMessage::MutationDone {
            mutation: Mutation::Create,
            result,
        });
    });
}

pub fn request_update(
    tx: &UnboundedSender<CalendarServiceMessage>,
    runtime: &Handle,
    backend: Arc<dyn CalendarBackend>,
    event_id: String,
    payload: EventPayload,
) {
    let tx = tx.clone();
    runtime.spawn(async move {
        let result = backend
            .update_event(&event_id, &payload)
            .await
            .map_err(CalendarError::from);
        let _ = tx.send(CalendarServiceMessage::MutationDone {
            mutation: Mutation::Update,
            result,
        });
    });
}

pub fn request_delete(
    tx: &UnboundedSender<CalendarServiceMessage>,
    runtime: &Handle,
    backend: Arc<dyn CalendarBackend>,
    event_id: String,
) {
    let tx = tx.clone();
    runtime.spawn(async move {
        let result = backend
            .delete_event(&event_id)
            .await
            .map_err(CalendarError::from);
        let _ = tx.send(CalendarServiceMessage::MutationDone {
            mutation: Mutation::Delete,
            result,
        });
    });
}

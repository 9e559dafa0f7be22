//! Calendar API types and data structures.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CalendarError;

pub const DEFAULT_EVENT_COLOR: &str = "#3788d8";
pub const EMPTY_TITLE_MESSAGE: &str = "Please enter an event title";

/// Calendar event as displayed on the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start: EventTime,
    pub end: Option<EventTime>,
    pub all_day: bool,
    pub color: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub attendees: Vec<String>,
    pub time_zone: Option<String>,
}

/// Event time - can be a specific datetime or an all-day date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventTime {
    DateTime(DateTime<Utc>),
    Date(NaiveDate),
}

impl EventTime {
    pub fn as_datetime(&self) -> DateTime<Utc> {
        match self {
            EventTime::DateTime(dt) => *dt,
            EventTime::Date(d) => d.and_time(NaiveTime::MIN).and_utc(),
        }
    }

    /// Wire form: RFC 3339 for date-times, `YYYY-MM-DD` for dates.
    pub fn to_wire(&self) -> String {
        match self {
            EventTime::DateTime(dt) => dt.to_rfc3339(),
            EventTime::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }
}

// API Response Types

/// Event as returned by `GET /api/calendar/events`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEvent {
    pub id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: Option<ApiEventTime>,
    pub end: Option<ApiEventTime>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEventTime {
    pub date_time: Option<String>,
    pub date: Option<String>,
    pub time_zone: Option<String>,
}

/// API response for event list.
#[derive(Debug, Deserialize)]
pub struct EventListResponse {
    #[serde(default)]
    pub events: Vec<ApiEvent>,
}

impl CalendarEvent {
    /// Convert an API event, painting it with `color`.
    pub fn from_api(api: ApiEvent, color: &str) -> Result<Self, CalendarError> {
        let start_time = api.start.ok_or_else(|| {
            CalendarError::InvalidEventData(format!("event {} has no start", api.id))
        })?;
        let (start, all_day) = parse_event_time(&start_time).ok_or_else(|| {
            CalendarError::InvalidEventData(format!("event {} has an unreadable start", api.id))
        })?;
        let end = api.end.as_ref().and_then(parse_event_time).map(|(t, _)| t);

        Ok(Self {
            id: api.id,
            title: api.summary.unwrap_or_default(),
            start,
            end,
            all_day,
            color: color.to_string(),
            description: api.description,
            location: api.location,
            attendees: Vec::new(),
            time_zone: start_time.time_zone,
        })
    }
}

/// Parse an API time. All-day when only `date` is present.
fn parse_event_time(api: &ApiEventTime) -> Option<(EventTime, bool)> {
    if let Some(dt_str) = &api.date_time {
        // Try parsing as RFC3339
        if let Ok(dt) = DateTime::parse_from_rfc3339(dt_str) {
            return Some((EventTime::DateTime(dt.with_timezone(&Utc)), false));
        }
    }
    if let Some(date_str) = &api.date {
        if let Ok(date) = NaiveDate::parse_from_str(date_str, "%Y-%m-%d") {
            return Some((EventTime::Date(date), true));
        }
    }
    None
}

// Request Types

/// Contents of the create/edit form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventDraft {
    pub title: String,
    pub start: Option<EventTime>,
    pub end: Option<EventTime>,
    pub all_day: bool,
    pub description: String,
    pub location: String,
}

impl EventDraft {
    /// Draft prefilled from a selected date range.
    pub fn for_range(start: EventTime, end: EventTime, all_day: bool) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            all_day,
            ..Self::default()
        }
    }

    /// Draft for editing an existing event.
    pub fn from_event(event: &CalendarEvent) -> Self {
        Self {
            title: event.title.clone(),
            start: Some(event.start),
            end: event.end,
            all_day: event.all_day,
            description: event.description.clone().unwrap_or_default(),
            location: event.location.clone().unwrap_or_default(),
        }
    }

    /// Reject drafts the backend would store without a title.
    pub fn validate(&self) -> Result<(), CalendarError> {
        if self.title.trim().is_empty() {
            return Err(CalendarError::InvalidEventData(EMPTY_TITLE_MESSAGE.to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtendedProps {
    pub description: String,
    pub location: String,
}

/// Body of the create (`POST`) and update (`PUT`) event requests.
///
/// Create additionally carries the backend's own field names (`summary`,
/// `startTime`, `endTime`) alongside the form fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    pub user_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    pub all_day: bool,
    pub extended_props: ExtendedProps,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
}

impl EventPayload {
    pub fn update(draft: &EventDraft, user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            title: draft.title.trim().to_string(),
            start: draft.start.map(|t| t.to_wire()),
            end: draft.end.map(|t| t.to_wire()),
            all_day: draft.all_day,
            extended_props: ExtendedProps {
                description: draft.description.clone(),
                location: draft.location.clone(),
            },
            summary: None,
            start_time: None,
            end_time: None,
        }
    }

    pub fn create(draft: &EventDraft, user_id: &str) -> Self {
        let mut payload = Self::update(draft, user_id);
        payload.summary = Some(payload.title.clone());
        payload.start_time = payload.start.clone();
        payload.end_time = payload.end.clone();
        payload
    }
}

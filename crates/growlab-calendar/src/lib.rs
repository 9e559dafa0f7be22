//! Calendar backend integration for GrowLab.
//!
//! Provides the events API client, wire types and month arithmetic.

pub mod client;
pub mod error;
pub mod month;
pub mod types;

pub use client::{CalendarBackend, CalendarClient, EventQuery};
pub use error::CalendarError;
pub use month::{visible_month, Month};
pub use types::{
    CalendarEvent, EventDraft, EventPayload, EventTime, ExtendedProps, DEFAULT_EVENT_COLOR,
    EMPTY_TITLE_MESSAGE,
};

pub mod auth_service;
pub mod calendar_service;

pub use auth_service::{request_sign_out, AuthError, AuthServiceMessage};
pub use calendar_service::{
    request_create as request_calendar_create, request_delete as request_calendar_delete,
    request_fetch_events as request_calendar_fetch_events,
    request_update as request_calendar_update, CalendarError, CalendarServiceMessage, Mutation,
};

//! Headless view layer: view-models, service channels and the app container.
//!
//! A renderer (web, desktop or terminal) draws the view structs exposed here
//! and forwards user input to the models.

pub mod app_services;
mod error_mapping;
pub mod models;
pub mod pages;
pub mod services;

pub use app_services::AppServices;
pub use models::{AuthButtonModel, AuthButtonView, CalendarModel, CalendarView, ToolbarView};
pub use pages::{route, Page, PageKind};

pub mod auth_button_model;
pub mod calendar_model;

pub use auth_button_model::{AuthButtonModel, AuthButtonView, DropdownView};
pub use calendar_model::{CalendarModel, CalendarView, ToolbarView};

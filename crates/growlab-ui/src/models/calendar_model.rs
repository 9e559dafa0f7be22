//! Calendar view-model.
//!
//! Owns the visible month, its events and the modal state of the calendar
//! page. Network work is handed to the calendar service; results come back on
//! a channel the owner drains with `poll_channel` or awaits with
//! `process_next`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use growlab_calendar::{
    visible_month, CalendarBackend, CalendarEvent, EventDraft, EventPayload, EventQuery,
    EventTime, Month,
};
use growlab_core::{AppError, CalendarConfig};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_util::sync::CancellationToken;

use crate::services::{
    request_calendar_create, request_calendar_delete, request_calendar_fetch_events,
    request_calendar_update, CalendarError, CalendarServiceMessage, Mutation,
};

pub const DELETE_CONFIRM_PROMPT: &str = "Are you sure you want to delete this event?";
pub const FETCH_FAILED_TITLE: &str = "Failed to load the calendar";

/// Dialog text shown after a mutation settles.
pub fn mutation_message(mutation: Mutation, succeeded: bool) -> &'static str {
    match (mutation, succeeded) {
        (Mutation::Create, true) => "Event created successfully!",
        (Mutation::Create, false) => "Failed to create event, please try again later",
        (Mutation::Update, true) => "Event updated successfully!",
        (Mutation::Update, false) => "Failed to update event, please try again later",
        (Mutation::Delete, true) => "Event deleted successfully!",
        (Mutation::Delete, false) => "Failed to delete event, please try again later",
    }
}

/// Toolbar above the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolbarView {
    pub month_label: String,
    pub event_count: usize,
}

/// What the calendar area shows instead of (or on top of) the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarView {
    /// Skeleton while a fetch is in flight.
    Loading,
    /// Inline error panel with a retry button.
    Error { title: &'static str, message: String },
    Grid,
}

pub struct CalendarModel {
    backend: Arc<dyn CalendarBackend>,
    runtime: Handle,
    tx: UnboundedSender<CalendarServiceMessage>,
    rx: UnboundedReceiver<CalendarServiceMessage>,
    user_id: String,
    tz: Tz,

    current_month: Month,
    events: Vec<CalendarEvent>,
    loading: bool,
    error_message: Option<String>,
    dialog_message: Option<String>,

    /// Incremented per fetch; results tagged with an older value are dropped.
    generation: u64,
    fetch_cancel: Option<CancellationToken>,
    settled_fetches: u64,
    mounted: bool,

    selected_event: Option<CalendarEvent>,
    show_event_modal: bool,
    show_create_modal: bool,
    selected_range: Option<(EventTime, EventTime)>,
    draft: EventDraft,
    pending_mutations: usize,
}

impl CalendarModel {
    pub fn new(
        backend: Arc<dyn CalendarBackend>,
        runtime: Handle,
        config: &CalendarConfig,
    ) -> Self {
        let tz = config.tz();
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            backend,
            runtime,
            tx,
            rx,
            user_id: config.user_id.clone(),
            tz,
            current_month: Month::current(tz),
            events: Vec::new(),
            loading: true,
            error_message: None,
            dialog_message: None,
            generation: 0,
            fetch_cancel: None,
            settled_fetches: 0,
            mounted: false,
            selected_event: None,
            show_event_modal: false,
            show_create_modal: false,
            selected_range: None,
            draft: EventDraft::default(),
            pending_mutations: 0,
        }
    }

    /// Start on `month` instead of the current one.
    pub fn with_month(mut self, month: Month) -> Self {
        self.current_month = month;
        self
    }

    /// Show the page and load the current month.
    pub fn mount(&mut self) {
        self.mounted = true;
        self.fetch_events();
    }

    /// Leave the page. Any in-flight fetch is cancelled and late results are
    /// ignored.
    pub fn unmount(&mut self) {
        self.mounted = false;
        if let Some(cancel) = self.fetch_cancel.take() {
            cancel.cancel();
        }
        tracing::debug!("calendar unmounted");
    }

    /// Fetch the current month, cancelling any fetch still in flight.
    pub fn fetch_events(&mut self) {
        if let Some(previous) = self.fetch_cancel.take() {
            previous.cancel();
        }

        self.generation += 1;
        let cancel = CancellationToken::new();
        self.fetch_cancel = Some(cancel.clone());
        self.loading = true;
        self.error_message = None;

        let (start, end) = self.current_month.range(self.tz);
        let query = EventQuery {
            user_id: self.user_id.clone(),
            start,
            end,
        };
        tracing::info!(
            month = %self.current_month,
            generation = self.generation,
            "fetching calendar events"
        );

        request_calendar_fetch_events(
            &self.tx,
            &self.runtime,
            self.backend.clone(),
            query,
            self.current_month,
            self.generation,
            cancel,
        );
    }

    /// Retry after a failed fetch.
    pub fn retry(&mut self) {
        self.fetch_events();
    }

    /// The grid moved to show `start..end`. Refetches when that crosses into
    /// another month. Returns whether the month changed.
    pub fn dates_set(&mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        let month = visible_month(start, end, self.tz);
        if month == self.current_month {
            return false;
        }
        self.go_to_month(month);
        true
    }

    pub fn go_to_month(&mut self, month: Month) {
        tracing::info!(from = %self.current_month, to = %month, "calendar month changed");
        self.current_month = month;
        self.fetch_events();
    }

    pub fn next_month(&mut self) {
        self.go_to_month(self.current_month.next());
    }

    pub fn prev_month(&mut self) {
        self.go_to_month(self.current_month.prev());
    }

    // Modals

    /// A date range was selected on the grid: open the create form prefilled.
    pub fn select_range(&mut self, start: EventTime, end: EventTime, all_day: bool) {
        self.selected_range = Some((start, end));
        self.draft = EventDraft::for_range(start, end, all_day);
        self.show_create_modal = true;
    }

    /// Toolbar "add event" button: open an empty create form.
    pub fn open_create(&mut self) {
        self.draft = match self.selected_range {
            Some((start, end)) => EventDraft::for_range(start, end, false),
            None => EventDraft::default(),
        };
        self.show_create_modal = true;
    }

    pub fn close_create_modal(&mut self) {
        self.show_create_modal = false;
        self.selected_range = None;
        self.draft = EventDraft::default();
    }

    /// An event was clicked: open its detail modal. Returns false for unknown ids.
    pub fn click_event(&mut self, event_id: &str) -> bool {
        let Some(event) = self.events.iter().find(|e| e.id == event_id) else {
            tracing::warn!(%event_id, "clicked event is not loaded");
            return false;
        };
        self.selected_event = Some(event.clone());
        self.show_event_modal = true;
        true
    }

    pub fn close_event_modal(&mut self) {
        self.show_event_modal = false;
        self.selected_event = None;
    }

    /// Create form being edited.
    pub fn draft_mut(&mut self) -> &mut EventDraft {
        &mut self.draft
    }

    // Mutations

    /// Submit the create form. A blank title is reported in the dialog and
    /// nothing is sent. Returns whether a request was started.
    pub fn submit_create(&mut self) -> bool {
        if let Err(e) = self.draft.validate() {
            self.dialog_message = Some(e.user_message());
            return false;
        }
        let payload = EventPayload::create(&self.draft, &self.user_id);
        self.pending_mutations += 1;
        request_calendar_create(&self.tx, &self.runtime, self.backend.clone(), payload);
        true
    }

    pub fn update_event(&mut self, event_id: &str, draft: &EventDraft) {
        let payload = EventPayload::update(draft, &self.user_id);
        self.pending_mutations += 1;
        request_calendar_update(
            &self.tx,
            &self.runtime,
            self.backend.clone(),
            event_id.to_string(),
            payload,
        );
    }

    /// Delete after the user answered `DELETE_CONFIRM_PROMPT`.
    pub fn delete_event(&mut self, event_id: &str, confirmed: bool) -> bool {
        if !confirmed {
            return false;
        }
        self.pending_mutations += 1;
        request_calendar_delete(
            &self.tx,
            &self.runtime,
            self.backend.clone(),
            event_id.to_string(),
        );
        true
    }

    /// Delete the event in the detail modal.
    pub fn delete_selected(&mut self, confirmed: bool) -> bool {
        match self.selected_event.as_ref().map(|e| e.id.clone()) {
            Some(id) => self.delete_event(&id, confirmed),
            None => false,
        }
    }

    // Channel

    /// Apply every result that has arrived. Returns how many were applied.
    pub fn poll_channel(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(msg) = self.rx.try_recv() {
            self.apply(msg);
            applied += 1;
        }
        applied
    }

    /// Wait for the next result and apply it.
    pub async fn process_next(&mut self) -> bool {
        match self.rx.recv().await {
            Some(msg) => {
                self.apply(msg);
                true
            }
            None => false,
        }
    }

    fn apply(&mut self, msg: CalendarServiceMessage) {
        match msg {
            CalendarServiceMessage::FetchEventsDone {
                generation,
                month,
                result,
            } => {
                if generation != self.generation || !self.mounted {
                    tracing::debug!(%month, generation, "discarding superseded fetch");
                    return;
                }
                self.fetch_cancel = None;
                self.loading = false;

                match result {
                    Ok(events) => {
                        tracing::info!(%month, count = events.len(), "calendar events loaded");
                        self.events = events;
                        self.error_message = None;
                        self.settled_fetches += 1;
                    }
                    Err(CalendarError::Cancelled) => {}
                    Err(e) => {
                        let hint = AppError::from(e.clone()).user_message();
                        tracing::error!(hint, "Failed to fetch calendar events: {}", e);
                        self.error_message = Some(e.to_string());
                        self.settled_fetches += 1;
                    }
                }
            }
            CalendarServiceMessage::MutationDone { mutation, result } => {
                self.pending_mutations = self.pending_mutations.saturating_sub(1);
                let succeeded = result.is_ok();
                if let Err(e) = &result {
                    tracing::error!(?mutation, "calendar mutation failed: {}", e);
                }

                if self.mounted {
                    self.fetch_events();
                }

                if succeeded {
                    match mutation {
                        Mutation::Create => self.close_create_modal(),
                        Mutation::Update | Mutation::Delete => self.close_event_modal(),
                    }
                }
                self.dialog_message = Some(mutation_message(mutation, succeeded).to_string());
            }
        }
    }

    // View

    pub fn view(&self) -> CalendarView {
        if self.loading {
            return CalendarView::Loading;
        }
        match &self.error_message {
            Some(message) => CalendarView::Error {
                title: FETCH_FAILED_TITLE,
                message: message.clone(),
            },
            None => CalendarView::Grid,
        }
    }

    pub fn toolbar(&self) -> ToolbarView {
        ToolbarView {
            month_label: self.current_month.label(),
            event_count: self.events.len(),
        }
    }

    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    pub fn current_month(&self) -> Month {
        self.current_month
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn dialog_message(&self) -> Option<&str> {
        self.dialog_message.as_deref()
    }

    /// Dismiss the dialog, returning its text.
    pub fn take_dialog(&mut self) -> Option<String> {
        self.dialog_message.take()
    }

    pub fn selected_event(&self) -> Option<&CalendarEvent> {
        self.selected_event.as_ref()
    }

    pub fn show_event_modal(&self) -> bool {
        self.show_event_modal && self.selected_event.is_some()
    }

    pub fn show_create_modal(&self) -> bool {
        self.show_create_modal
    }

    pub fn draft(&self) -> &EventDraft {
        &self.draft
    }

    /// Whether a create/update/delete is still in flight.
    pub fn is_submitting(&self) -> bool {
        self.pending_mutations > 0
    }

    /// Fetches that settled with a result (success or error) since creation.
    pub fn settled_fetches(&self) -> u64 {
        self.settled_fetches
    }
}

impl Drop for CalendarModel {
    fn drop(&mut self) {
        if let Some(cancel) = self.fetch_cancel.take() {
            cancel.cancel();
        }
    }
}

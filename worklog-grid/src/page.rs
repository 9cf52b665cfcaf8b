//! The daily worklog page: selected date, live totals, and the submit workflow.

use std::sync::Arc;

use time::Date;
use tokio::sync::{broadcast, watch};
use tracing::{debug, error, info, warn};
use worklog_api::{SubmitApi, SubmitError, SubmitRequest, WorklogRow};

use crate::grid::GridView;
use crate::row_store::RowStore;
use crate::storage::{SharedStore, StorageEvent, ROWS_KEY, SELECTED_DATE_KEY};
use crate::time_utils;

pub const NO_ROWS_MESSAGE: &str = "No worklog entries for the selected date.";
pub const CLIENT_REQUIRED_MESSAGE: &str = "Client is required for every worklog entry.";
pub const TIME_REQUIRED_MESSAGE: &str = "Set time is required for every worklog entry.";
pub const SUBMITTING_MESSAGE: &str = "Submitting...";
pub const SUCCESS_MESSAGE: &str = "Submitted successfully.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitPhase {
    #[default]
    Ready,
    /// A request is in flight; another submit is refused.
    Submitting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A precondition failed and no request was sent.
    Invalid(String),
    /// A previous submit has not settled yet.
    InFlight,
    Succeeded,
    Failed(String),
}

impl SubmitOutcome {
    /// The status line shown for this outcome.
    pub fn message(&self) -> String {
        match self {
            SubmitOutcome::Invalid(message) => message.clone(),
            SubmitOutcome::InFlight => SUBMITTING_MESSAGE.to_string(),
            SubmitOutcome::Succeeded => SUCCESS_MESSAGE.to_string(),
            SubmitOutcome::Failed(detail) => format!("Submit failed: {detail}"),
        }
    }
}

pub struct DailyWorklogPage {
    grid: GridView,
    store: SharedStore,
    api: Arc<dyn SubmitApi>,
    row_changes: watch::Receiver<Vec<WorklogRow>>,
    storage_events: broadcast::Receiver<StorageEvent>,
    local_total: String,
    payload: Vec<WorklogRow>,
    phase: SubmitPhase,
    status_message: Option<String>,
    last_outcome: Option<SubmitOutcome>,
}

impl DailyWorklogPage {
    pub fn open(store: SharedStore, api: Arc<dyn SubmitApi>) -> Self {
        Self::open_on(store, api, time_utils::today_local())
    }

    /// Open the page as if the current date were `today`.
    ///
    /// The selected date is the persisted one when readable, otherwise `today`.
    pub fn open_on(store: SharedStore, api: Arc<dyn SubmitApi>, today: Date) -> Self {
        let selected = read_selected_date(&store).unwrap_or(today);
        let storage_events = store.subscribe();
        let rows = RowStore::open(Arc::clone(&store));
        let row_changes = rows.subscribe();

        let mut page = Self {
            grid: GridView::new(rows, selected, today),
            store,
            api,
            row_changes,
            storage_events,
            local_total: String::new(),
            payload: Vec::new(),
            phase: SubmitPhase::Ready,
            status_message: None,
            last_outcome: None,
        };
        page.grid.ensure_row_for_selected_date();
        page.persist_selected_date();
        page.refresh();
        page
    }

    pub fn grid(&self) -> &GridView {
        &self.grid
    }

    /// Grid access for edits. Call [`process_events`](Self::process_events)
    /// afterwards to refresh the total and payload.
    pub fn grid_mut(&mut self) -> &mut GridView {
        &mut self.grid
    }

    pub fn selected_date(&self) -> Date {
        self.grid.selected_date()
    }

    /// Total of the selected date as of the last row change seen.
    pub fn local_total(&self) -> &str {
        &self.local_total
    }

    /// Rows that a submit would send, as of the last row change seen.
    pub fn payload(&self) -> &[WorklogRow] {
        &self.payload
    }

    pub fn phase(&self) -> SubmitPhase {
        self.phase
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == SubmitPhase::Submitting
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn last_outcome(&self) -> Option<&SubmitOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    /// Select `date`, persist it, and make sure it has at least one row.
    pub fn set_selected_date(&mut self, date: Date) {
        self.grid.set_selected_date(date);
        if let Some(id) = self.grid.ensure_row_for_selected_date() {
            debug!("Created row {} for {}", id, date);
        }
        self.persist_selected_date();
        self.refresh();
    }

    /// Move the selected date by `days`, like the date picker arrows.
    pub fn shift_date(&mut self, days: i64) {
        let date = time_utils::shift_days(self.selected_date(), days);
        self.set_selected_date(date);
    }

    /// Drain pending storage notifications and row changes.
    ///
    /// Returns `true` when the rows were reloaded from storage.
    pub fn process_events(&mut self) -> bool {
        let mut reloaded = false;
        loop {
            match self.storage_events.try_recv() {
                Ok(event) => reloaded |= self.handle_storage_event(&event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!("Missed {} storage notifications, reloading rows", skipped);
                    self.grid.reload();
                    reloaded = true;
                }
                Err(broadcast::error::TryRecvError::Empty)
                | Err(broadcast::error::TryRecvError::Closed) => break,
            }
        }

        if self.row_changes.has_changed().unwrap_or(false) {
            self.refresh();
        }
        reloaded
    }

    /// React to another context writing the store. Only the rows key matters.
    pub fn handle_storage_event(&mut self, event: &StorageEvent) -> bool {
        if event.key != ROWS_KEY {
            return false;
        }
        debug!("Rows changed in another context, reloading");
        self.grid.reload();
        self.refresh();
        true
    }

    /// Validate and enter `Submitting`, returning the request to send.
    ///
    /// On `Err` the outcome is already recorded and nothing should be sent.
    pub fn begin_submit(&mut self) -> Result<SubmitRequest, SubmitOutcome> {
        if self.is_submitting() {
            return Err(SubmitOutcome::InFlight);
        }

        self.grid.commit_if_editing();
        self.refresh();

        if let Err(message) = validate(&self.payload) {
            let outcome = SubmitOutcome::Invalid(message.to_string());
            self.record(outcome.clone());
            return Err(outcome);
        }

        self.phase = SubmitPhase::Submitting;
        self.status_message = Some(SUBMITTING_MESSAGE.to_string());
        Ok(SubmitRequest {
            date: self.selected_date(),
            items: self.payload.clone(),
        })
    }

    /// Settle the in-flight submit with the transport result.
    pub fn finish_submit(&mut self, result: Result<(), SubmitError>) -> SubmitOutcome {
        let outcome = match result {
            Ok(()) => {
                info!("Submitted worklog for {}", self.selected_date());
                SubmitOutcome::Succeeded
            }
            Err(e) => {
                error!("Failed to submit worklog: {}", e);
                SubmitOutcome::Failed(e.to_string())
            }
        };
        self.phase = SubmitPhase::Ready;
        self.record(outcome.clone());
        outcome
    }

    /// Run the whole submit workflow against the configured backend.
    pub async fn submit(&mut self) -> SubmitOutcome {
        let request = match self.begin_submit() {
            Ok(request) => request,
            Err(outcome) => return outcome,
        };
        let api = Arc::clone(&self.api);
        let result = api.submit(&request).await;
        self.finish_submit(result)
    }

    fn record(&mut self, outcome: SubmitOutcome) {
        self.status_message = Some(outcome.message());
        self.last_outcome = Some(outcome);
    }

    fn refresh(&mut self) {
        self.row_changes.mark_unchanged();
        self.payload = self.grid.filtered_rows().into_iter().cloned().collect();
        self.local_total = self.grid.total_label();
    }

    fn persist_selected_date(&self) {
        let raw = time_utils::format_iso_date(self.selected_date());
        if let Err(e) = self.store.set(SELECTED_DATE_KEY, &raw) {
            warn!("Failed to persist selected date: {}", e);
        }
    }
}

/// Preconditions in order. The first failure wins.
fn validate(rows: &[WorklogRow]) -> Result<(), &'static str> {
    if rows.is_empty() {
        return Err(NO_ROWS_MESSAGE);
    }
    if rows.iter().any(|row| row.client.is_empty()) {
        return Err(CLIENT_REQUIRED_MESSAGE);
    }
    if rows.iter().any(|row| row.set_time.is_empty()) {
        return Err(TIME_REQUIRED_MESSAGE);
    }
    Ok(())
}

fn read_selected_date(store: &SharedStore) -> Option<Date> {
    let raw = match store.get(SELECTED_DATE_KEY) {
        Ok(raw) => raw?,
        Err(e) => {
            warn!("Failed to read selected date: {}", e);
            return None;
        }
    };
    let date = time_utils::parse_iso_date(&raw);
    if date.is_none() {
        warn!("Ignoring malformed selected date {:?}", raw);
    }
    date
}

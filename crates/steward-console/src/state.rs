//! The console's owning state struct and its reducer-style transitions.
//!
//! Every mutable slot lives here; transitions are pure methods so the whole
//! machine can be unit tested without a runtime or a rendering layer. The
//! async driver in `console` is a thin wrapper that feeds remote results
//! into these transitions.

use std::collections::VecDeque;

use serde_json::Value;
use steward_api::types::RunsPage;

use crate::actions::ConfirmState;
use crate::audit::AuditTrail;
use crate::error::ConsoleError;
use crate::events::{derive_event_view, EventView};
use crate::filter::{filter_runs, ClientFilters, Pagination, ServerFilters};
use crate::format::fmt_number;
use crate::poll::PollInterval;
use crate::redaction::has_redaction;
use crate::run_view::{derive_run_view, RunView};
use crate::selection::{effective_run, pair_present, SelectionEffect};
use crate::status_view::{
    derive_kpis, derive_metrics_view, derive_status_view, KpiSet, MetricsView, StatusView,
};

/// Notices older than this are dropped, oldest first.
pub const MAX_NOTICES: usize = 32;

/// Transient operator notification (the toast contract).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

/// Whether a reload should try to preserve the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeepSelection {
    Keep,
    Reset,
}

/// Every slot the console owns.
#[derive(Debug, Clone, Default)]
pub struct ConsoleState {
    /// Raw status payload as received, retained for detail display.
    pub status_raw: Option<Value>,
    pub status: Option<StatusView>,
    pub metrics: Option<MetricsView>,

    /// Projected runs of the current server page, in service order.
    pub runs: Vec<RunView>,
    /// Paging echo from the last page response.
    pub page_limit_echo: Option<u32>,
    pub page_offset_echo: Option<u64>,
    pub pagination: Pagination,

    pub server_filters: ServerFilters,
    pub client_filters: ClientFilters,

    pub selected_job_id: Option<String>,
    pub selected_run_id: Option<String>,

    pub events: Vec<EventView>,
    pub events_loading: bool,
    pub events_error: Option<String>,
    /// Issuance counter for event fetches; completions carrying a stale
    /// generation are discarded (last issued wins).
    events_generation: u64,

    pub loading: bool,
    pub base_error: Option<String>,

    pub audit: AuditTrail,
    pub action_in_flight: bool,
    pub confirm: Option<ConfirmState>,

    notices: VecDeque<Notice>,
    pub poll_interval: PollInterval,
}

impl ConsoleState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ── Base reload ──

    pub fn begin_base_load(&mut self) {
        self.loading = true;
        self.base_error = None;
    }

    /// Apply one grouped reload. All three payloads land together; partial
    /// results never reach this method.
    pub fn apply_base_success(
        &mut self,
        status: Value,
        metrics: Value,
        page: RunsPage,
        keep: KeepSelection,
    ) -> SelectionEffect {
        self.status = Some(derive_status_view(&status));
        self.status_raw = Some(status);
        self.metrics = Some(derive_metrics_view(&metrics));
        self.runs = page.runs.iter().map(derive_run_view).collect();
        self.page_limit_echo = page.limit;
        self.page_offset_echo = page.offset;
        self.loading = false;
        self.base_error = None;

        let keep_pair = matches!(keep, KeepSelection::Keep)
            && pair_present(
                &self.runs,
                self.selected_job_id.as_deref(),
                self.selected_run_id.as_deref(),
            );
        if !keep_pair {
            self.selected_run_id = self.runs.first().and_then(|r| r.id.clone());
        }
        self.reconcile_selection()
    }

    /// A failed reload keeps all previously displayed data intact.
    pub fn apply_base_failure(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.base_error = Some(message.into());
    }

    // ── Selection ──

    /// Advance the selection pointer to the effective run and report what
    /// the driver must do about the events view.
    pub fn reconcile_selection(&mut self) -> SelectionEffect {
        let (job_id, run_id) = {
            let filtered = filter_runs(&self.runs, &self.client_filters.resolve());
            match effective_run(&filtered, &self.runs, self.selected_run_id.as_deref()) {
                Some(run) => (run.job_id.clone(), run.id.clone()),
                None => (None, None),
            }
        };

        self.selected_run_id = run_id;
        if self.selected_job_id == job_id {
            return SelectionEffect::None;
        }
        self.selected_job_id = job_id.clone();
        match job_id {
            Some(job_id) => {
                let generation = self.begin_events_fetch();
                SelectionEffect::FetchEvents { job_id, generation }
            }
            None => {
                self.clear_events();
                SelectionEffect::ClearEvents
            }
        }
    }

    /// Select a run from the current page by id. Unknown ids are ignored.
    pub fn select_run(&mut self, run_id: &str) -> SelectionEffect {
        if !self.runs.iter().any(|r| r.id.as_deref() == Some(run_id)) {
            return SelectionEffect::None;
        }
        self.selected_run_id = Some(run_id.to_string());
        self.reconcile_selection()
    }

    /// Select the first run belonging to `job_id`, if the page has one.
    pub fn select_job(&mut self, job_id: &str) -> SelectionEffect {
        let run_id = self
            .runs
            .iter()
            .find(|r| r.job_id.as_deref() == Some(job_id))
            .and_then(|r| r.id.clone());
        match run_id {
            Some(run_id) => self.select_run(&run_id),
            None => SelectionEffect::None,
        }
    }

    // ── Events ──

    /// Stamp a new fetch generation; any earlier in-flight fetch is now
    /// stale.
    pub fn begin_events_fetch(&mut self) -> u64 {
        self.events_generation = self.events_generation.wrapping_add(1);
        self.events_loading = true;
        self.events_error = None;
        self.events_generation
    }

    /// Apply a fetched event list. Returns `false` (and changes nothing)
    /// when the result is stale.
    pub fn apply_events_success(&mut self, generation: u64, events: &[Value]) -> bool {
        if generation != self.events_generation {
            return false;
        }
        self.events = events.iter().map(derive_event_view).collect();
        self.events_loading = false;
        self.events_error = None;
        true
    }

    /// Record an events-load failure unless the fetch was superseded.
    pub fn apply_events_failure(&mut self, generation: u64, message: impl Into<String>) -> bool {
        if generation != self.events_generation {
            return false;
        }
        self.events_loading = false;
        self.events_error = Some(message.into());
        true
    }

    /// Drop the events view and invalidate any in-flight fetch.
    pub fn clear_events(&mut self) {
        self.events_generation = self.events_generation.wrapping_add(1);
        self.events.clear();
        self.events_loading = false;
        self.events_error = None;
    }

    // ── Filters & pagination ──

    pub fn set_server_filters(&mut self, filters: ServerFilters) {
        self.server_filters = filters;
    }

    /// Client filters refine the loaded page immediately, so the selection
    /// is re-reconciled against the new filtered view.
    pub fn set_client_filters(&mut self, filters: ClientFilters) -> SelectionEffect {
        self.client_filters = filters;
        self.reconcile_selection()
    }

    /// Clear both filter stages and rewind paging. Does not reload; the
    /// next reload is explicit.
    pub fn reset_filters(&mut self) -> SelectionEffect {
        self.server_filters = ServerFilters::default();
        self.client_filters = ClientFilters::default();
        self.pagination.offset = 0;
        self.reconcile_selection()
    }

    // ── Actions ──

    /// Acquire the single-flight action slot.
    pub fn begin_action(&mut self) -> Result<(), ConsoleError> {
        if self.action_in_flight {
            return Err(ConsoleError::ActionInFlight);
        }
        self.action_in_flight = true;
        Ok(())
    }

    /// Release the single-flight action slot. Called on every exit path.
    pub fn end_action(&mut self) {
        self.action_in_flight = false;
    }

    // ── Notices ──

    pub fn push_notice(&mut self, kind: NoticeKind, message: impl Into<String>) {
        if self.notices.len() >= MAX_NOTICES {
            self.notices.pop_front();
        }
        self.notices.push_back(Notice {
            kind,
            message: message.into(),
        });
    }

    /// Drain queued notices for the presentation layer.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    #[must_use]
    pub fn notice_count(&self) -> usize {
        self.notices.len()
    }

    // ── Derived reads ──

    /// The current page after the client filter stage, in page order.
    #[must_use]
    pub fn filtered_runs(&self) -> Vec<&RunView> {
        filter_runs(&self.runs, &self.client_filters.resolve())
    }

    /// The run the console treats as selected.
    #[must_use]
    pub fn effective_run(&self) -> Option<&RunView> {
        let filtered = self.filtered_runs();
        effective_run(&filtered, &self.runs, self.selected_run_id.as_deref())
    }

    /// True when the selected run's input, output, or any loaded event
    /// payload carries a redaction marker.
    #[must_use]
    pub fn selected_has_redaction(&self) -> bool {
        let Some(run) = self.effective_run() else {
            return false;
        };
        has_redaction(&run.input)
            || has_redaction(&run.output)
            || self.events.iter().any(|event| has_redaction(&event.data))
    }

    #[must_use]
    pub fn kpis(&self) -> KpiSet {
        derive_kpis(self.metrics.as_ref())
    }

    /// A full page suggests more rows exist past this one.
    #[must_use]
    pub fn has_next_page(&self) -> bool {
        self.runs.len() as u32 >= self.pagination.limit
    }

    /// The "offset - offset+count" range label for the current page.
    #[must_use]
    pub fn page_range(&self) -> String {
        let offset = self.page_offset_echo.unwrap_or(self.pagination.offset);
        let end = offset.saturating_add(self.runs.len() as u64);
        format!(
            "{} - {}",
            fmt_number(offset as i64),
            fmt_number(end as i64)
        )
    }

    /// The "visible X of Y" label for the filter footer.
    #[must_use]
    pub fn visible_summary(&self) -> String {
        format!(
            "Visible {} of {} rows in current page",
            self.filtered_runs().len(),
            self.runs.len()
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use serde_json::{json, Value};
    use steward_api::types::RunsPage;

    use super::{ConsoleState, KeepSelection, NoticeKind, MAX_NOTICES};
    use crate::error::ConsoleError;
    use crate::filter::ClientFilters;
    use crate::selection::SelectionEffect;

    fn run(id: &str, job_id: &str) -> Value {
        json!({"id": id, "job_id": job_id, "status": "succeeded"})
    }

    fn page(runs: Vec<Value>) -> RunsPage {
        RunsPage {
            limit: Some(50),
            offset: Some(0),
            runs,
        }
    }

    fn loaded_state(runs: Vec<Value>) -> (ConsoleState, SelectionEffect) {
        let mut state = ConsoleState::new();
        let effect =
            state.apply_base_success(json!({}), json!({}), page(runs), KeepSelection::Reset);
        (state, effect)
    }

    #[test]
    fn first_load_selects_head_and_requests_events() {
        let (state, effect) = loaded_state(vec![run("r1", "j1"), run("r2", "j2")]);
        assert_eq!(state.selected_run_id.as_deref(), Some("r1"));
        assert_eq!(state.selected_job_id.as_deref(), Some("j1"));
        assert!(matches!(
            effect,
            SelectionEffect::FetchEvents { ref job_id, .. } if job_id == "j1"
        ));
        assert!(state.events_loading);
    }

    #[test]
    fn vanished_selection_moves_to_new_page_head() {
        let (mut state, _) = loaded_state(vec![run("r1", "j1")]);
        let effect = state.apply_base_success(
            json!({}),
            json!({}),
            page(vec![run("r2", "j2"), run("r3", "j3")]),
            KeepSelection::Keep,
        );
        assert_eq!(state.selected_job_id.as_deref(), Some("j2"));
        assert_eq!(state.selected_run_id.as_deref(), Some("r2"));
        assert!(matches!(
            effect,
            SelectionEffect::FetchEvents { ref job_id, .. } if job_id == "j2"
        ));
    }

    #[test]
    fn surviving_pair_is_kept_without_event_refetch() {
        let (mut state, _) = loaded_state(vec![run("r1", "j1"), run("r2", "j2")]);
        let _ = state.select_run("r2");

        let effect = state.apply_base_success(
            json!({}),
            json!({}),
            page(vec![run("r1", "j1"), run("r2", "j2")]),
            KeepSelection::Keep,
        );
        assert_eq!(state.selected_run_id.as_deref(), Some("r2"));
        assert_eq!(state.selected_job_id.as_deref(), Some("j2"));
        assert_eq!(effect, SelectionEffect::None);
    }

    #[test]
    fn reset_reload_moves_selection_even_when_pair_survives() {
        let (mut state, _) = loaded_state(vec![run("r1", "j1"), run("r2", "j2")]);
        let _ = state.select_run("r2");

        let effect = state.apply_base_success(
            json!({}),
            json!({}),
            page(vec![run("r1", "j1"), run("r2", "j2")]),
            KeepSelection::Reset,
        );
        assert_eq!(state.selected_run_id.as_deref(), Some("r1"));
        assert!(matches!(effect, SelectionEffect::FetchEvents { .. }));
    }

    #[test]
    fn empty_page_clears_selection_and_events() {
        let (mut state, _) = loaded_state(vec![run("r1", "j1")]);
        assert!(state.apply_events_success(1, &[json!({"id": "e1"})]));

        let effect =
            state.apply_base_success(json!({}), json!({}), page(vec![]), KeepSelection::Keep);
        assert_eq!(state.selected_run_id, None);
        assert_eq!(state.selected_job_id, None);
        assert_eq!(effect, SelectionEffect::ClearEvents);
        assert!(state.events.is_empty());
    }

    #[test]
    fn base_failure_retains_previous_data() {
        let (mut state, _) = loaded_state(vec![run("r1", "j1")]);
        state.begin_base_load();
        state.apply_base_failure("connection refused");

        assert_eq!(state.base_error.as_deref(), Some("connection refused"));
        assert_eq!(state.runs.len(), 1);
        assert_eq!(state.selected_run_id.as_deref(), Some("r1"));
        assert!(!state.loading);
    }

    #[test]
    fn stale_event_results_are_discarded() {
        let (mut state, effect) = loaded_state(vec![run("r1", "j1"), run("r2", "j2")]);
        let SelectionEffect::FetchEvents { generation: first, .. } = effect else {
            panic!("expected events fetch");
        };

        // A newer selection supersedes the first fetch.
        let SelectionEffect::FetchEvents { generation: second, .. } = state.select_run("r2")
        else {
            panic!("expected events fetch for new job");
        };

        assert!(!state.apply_events_success(first, &[json!({"id": "stale"})]));
        assert!(state.events.is_empty());
        assert!(!state.apply_events_failure(first, "late failure"));
        assert_eq!(state.events_error, None);

        assert!(state.apply_events_success(second, &[json!({"id": "fresh"})]));
        assert_eq!(state.events.len(), 1);
        assert!(!state.events_loading);
    }

    #[test]
    fn client_filter_change_reconciles_selection() {
        let (mut state, _) = loaded_state(vec![
            json!({"id": "r1", "job_id": "j1", "total_tokens": 10}),
            json!({"id": "r2", "job_id": "j2", "total_tokens": 500}),
        ]);

        // Filtering out the selected run keeps it addressable through the
        // unfiltered page, so selection identity does not move.
        let effect = state.set_client_filters(ClientFilters {
            token_min: "100".to_string(),
            ..ClientFilters::default()
        });
        assert_eq!(effect, SelectionEffect::None);
        assert_eq!(state.filtered_runs().len(), 1);
        assert_eq!(state.selected_run_id.as_deref(), Some("r1"));
        assert_eq!(state.visible_summary(), "Visible 1 of 2 rows in current page");
    }

    #[test]
    fn reset_filters_clears_both_stages_without_reload() {
        let (mut state, _) = loaded_state(vec![run("r1", "j1")]);
        state.server_filters.job_type = "consolidation".to_string();
        state.client_filters.token_max = "10".to_string();
        state.pagination.offset = 100;

        let _ = state.reset_filters();
        assert_eq!(state.server_filters, Default::default());
        assert_eq!(state.client_filters, Default::default());
        assert_eq!(state.pagination.offset, 0);
        // Data from the last load is untouched.
        assert_eq!(state.runs.len(), 1);
    }

    #[test]
    fn action_slot_is_single_flight() {
        let mut state = ConsoleState::new();
        assert!(state.begin_action().is_ok());
        assert_eq!(state.begin_action(), Err(ConsoleError::ActionInFlight));
        state.end_action();
        assert!(state.begin_action().is_ok());
    }

    #[test]
    fn notices_are_bounded_and_drain_in_order() {
        let mut state = ConsoleState::new();
        for i in 0..(MAX_NOTICES + 4) {
            state.push_notice(NoticeKind::Info, format!("n{i}"));
        }
        assert_eq!(state.notice_count(), MAX_NOTICES);

        let drained = state.take_notices();
        assert_eq!(drained.len(), MAX_NOTICES);
        assert_eq!(drained.first().unwrap().message, "n4");
        assert_eq!(state.notice_count(), 0);
    }

    #[test]
    fn page_labels_use_echo_offset() {
        let mut state = ConsoleState::new();
        let _ = state.apply_base_success(
            json!({}),
            json!({}),
            RunsPage {
                runs: vec![run("r1", "j1"), run("r2", "j2")],
                limit: Some(50),
                offset: Some(1_000),
            },
            KeepSelection::Reset,
        );
        assert_eq!(state.page_range(), "1,000 - 1,002");
        assert!(!state.has_next_page());
    }

    #[test]
    fn redaction_flag_covers_run_payloads_and_events() {
        let (mut state, _) = loaded_state(vec![json!({
            "id": "r1",
            "job_id": "j1",
            "input_snapshot": {"note": "clean"},
        })]);
        assert!(!state.selected_has_redaction());

        assert!(state.apply_events_success(1, &[json!({"data": {"secret": "REDACTED"}})]));
        assert!(state.selected_has_redaction());
    }
}

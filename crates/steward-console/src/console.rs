//! Async console driver: wires the remote service to the state machine.
//!
//! The state mutex is a short critical section around transitions and is
//! never held across an await. Concurrent reloads (manual vs. poll tick)
//! race last-write-wins per grouped result, which is acceptable because
//! each group is applied atomically and the service timestamps its data.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use serde_json::Value;
use steward_api::error::ApiError;
use steward_api::service::StewardApi;
use steward_api::types::{ModeChange, RunsPage};

use crate::actions::{ConfirmState, ConsoleAction};
use crate::audit::{ActionOutcome, AuditEntry};
use crate::error::ConsoleError;
use crate::filter::{ClientFilters, ServerFilters};
use crate::poll::{spawn_poll_worker, PollHandle, PollInterval};
use crate::selection::SelectionEffect;
use crate::state::{ConsoleState, KeepSelection, Notice, NoticeKind};

/// What became of an action request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionDisposition {
    /// The action ran to completion with this outcome.
    Executed(ActionOutcome),
    /// The action is held behind this confirm prompt.
    NeedsConfirm(String),
    /// A pending confirmation was declined.
    Cancelled,
    /// The request was refused without executing.
    Rejected(ConsoleError),
}

/// The steward console: owns all state and drives it against the service.
pub struct Console<S: StewardApi> {
    api: Arc<S>,
    state: Mutex<ConsoleState>,
    actor: String,
    poll: Mutex<Option<PollHandle>>,
    /// Weak self-reference handed to the poll worker so an abandoned
    /// console cannot be kept alive by its own timer.
    self_ref: Weak<Console<S>>,
}

impl<S: StewardApi + 'static> Console<S> {
    pub fn new(api: Arc<S>) -> Arc<Self> {
        Self::with_actor(api, "console")
    }

    /// Construct with an explicit actor identity for the audit trail.
    pub fn with_actor(api: Arc<S>, actor: impl Into<String>) -> Arc<Self> {
        let actor = actor.into();
        Arc::new_cyclic(|self_ref| Self {
            api,
            state: Mutex::new(ConsoleState::new()),
            actor,
            poll: Mutex::new(None),
            self_ref: self_ref.clone(),
        })
    }

    /// Cloned state for the presentation layer.
    #[must_use]
    pub fn snapshot(&self) -> ConsoleState {
        self.lock_state().clone()
    }

    /// Drain queued notices for the presentation layer.
    #[must_use]
    pub fn take_notices(&self) -> Vec<Notice> {
        self.lock_state().take_notices()
    }

    // ── Base reload ──

    /// Fetch status, metrics, and the current run page as one group and
    /// apply them together. Any failure leaves prior data untouched and
    /// fills the base error slot instead.
    pub async fn reload(&self, keep: KeepSelection) {
        let query = {
            let mut state = self.lock_state();
            state.begin_base_load();
            state.server_filters.to_query(&state.pagination)
        };

        let (status, metrics, runs) = tokio::join!(
            self.api.status(),
            self.api.metrics(),
            self.api.runs(query)
        );

        let effect = {
            let mut state = self.lock_state();
            match (status, metrics, runs) {
                (Ok(status), Ok(metrics), Ok(page)) => {
                    state.apply_base_success(status, metrics, page, keep)
                }
                (status, metrics, runs) => {
                    state.apply_base_failure(first_error(status, metrics, runs));
                    SelectionEffect::None
                }
            }
        };
        self.follow(effect).await;
    }

    // ── Selection & events ──

    /// Select a run from the current page, fetching its job's events when
    /// the job changed.
    pub async fn select_run(&self, run_id: &str) {
        let effect = self.lock_state().select_run(run_id);
        self.follow(effect).await;
    }

    /// Re-fetch events for the current selection.
    pub async fn refresh_events(&self) {
        let effect = {
            let mut state = self.lock_state();
            match state.selected_job_id.clone() {
                Some(job_id) => {
                    let generation = state.begin_events_fetch();
                    SelectionEffect::FetchEvents { job_id, generation }
                }
                None => SelectionEffect::None,
            }
        };
        self.follow(effect).await;
    }

    async fn follow(&self, effect: SelectionEffect) {
        match effect {
            SelectionEffect::FetchEvents { job_id, generation } => {
                let result = self.api.job_events(&job_id).await;
                let mut state = self.lock_state();
                match result {
                    Ok(page) => {
                        let _ = state.apply_events_success(generation, &page.events);
                    }
                    Err(err) => {
                        let _ = state.apply_events_failure(generation, err.to_string());
                    }
                }
            }
            // The state transition already cleared the events view.
            SelectionEffect::ClearEvents | SelectionEffect::None => {}
        }
    }

    // ── Filters & pagination ──

    pub fn set_server_filters(&self, filters: ServerFilters) {
        self.lock_state().set_server_filters(filters);
    }

    pub async fn set_client_filters(&self, filters: ClientFilters) {
        let effect = self.lock_state().set_client_filters(filters);
        self.follow(effect).await;
    }

    /// Apply the server filter stage: rewind to the first page and reload
    /// with a fresh selection.
    pub async fn apply_filters(&self) {
        self.lock_state().pagination.offset = 0;
        self.restart_poll();
        self.reload(KeepSelection::Reset).await;
    }

    /// Clear both filter stages without reloading.
    pub async fn reset_filters(&self) {
        let effect = self.lock_state().reset_filters();
        self.follow(effect).await;
    }

    pub async fn set_page_limit(&self, limit: u32) {
        self.lock_state().pagination.set_limit(limit);
        self.restart_poll();
        self.reload(KeepSelection::Reset).await;
    }

    pub async fn next_page(&self) {
        {
            let mut state = self.lock_state();
            if !state.has_next_page() {
                return;
            }
            state.pagination.next();
        }
        self.restart_poll();
        self.reload(KeepSelection::Reset).await;
    }

    pub async fn prev_page(&self) {
        {
            let mut state = self.lock_state();
            if state.pagination.offset == 0 {
                return;
            }
            state.pagination.prev();
        }
        self.restart_poll();
        self.reload(KeepSelection::Reset).await;
    }

    // ── Actions ──

    /// Trigger an action. Gated actions come back as `NeedsConfirm` and
    /// wait for `confirm`; ungated actions execute immediately.
    pub async fn request_action(&self, action: ConsoleAction) -> ActionDisposition {
        {
            let mut state = self.lock_state();
            if state.action_in_flight {
                return ActionDisposition::Rejected(ConsoleError::ActionInFlight);
            }
            if let Err(err) = check_preconditions(&state, &action) {
                return ActionDisposition::Rejected(err);
            }
            if action.requires_confirmation() {
                let confirm = ConfirmState::for_action(action);
                let prompt = confirm.prompt.clone();
                state.confirm = Some(confirm);
                return ActionDisposition::NeedsConfirm(prompt);
            }
        }
        self.execute(action).await
    }

    /// Resolve the pending confirmation. Declining drops the action.
    pub async fn confirm(&self, accept: bool) -> ActionDisposition {
        let pending = {
            let mut state = self.lock_state();
            state.confirm.take()
        };
        let Some(pending) = pending else {
            return ActionDisposition::Rejected(ConsoleError::NothingPending);
        };
        if !accept {
            self.lock_state()
                .push_notice(NoticeKind::Info, "Action cancelled");
            return ActionDisposition::Cancelled;
        }
        self.execute(pending.action).await
    }

    /// Run one action end to end: acquire the single-flight slot, call the
    /// service, record the audit entry and notice, and on success reload
    /// and follow the involved job. The slot is released on every path.
    async fn execute(&self, action: ConsoleAction) -> ActionDisposition {
        let mode = {
            let mut state = self.lock_state();
            // Preconditions are re-checked here so the executor stands on
            // its own even when the confirm path is bypassed.
            if let Err(err) = check_preconditions(&state, &action) {
                return ActionDisposition::Rejected(err);
            }
            if let Err(err) = state.begin_action() {
                return ActionDisposition::Rejected(err);
            }
            state.status.as_ref().and_then(|s| action.target_mode(s))
        };

        let result = self.call_remote(&action, mode).await;
        let job_id = action.job_id().map(str::to_string);

        let outcome = {
            let mut state = self.lock_state();
            state.end_action();
            match &result {
                Ok(()) => {
                    state.audit.record(AuditEntry::new(
                        self.actor.clone(),
                        ActionOutcome::Success,
                        action.key(),
                        job_id.clone(),
                    ));
                    state.push_notice(NoticeKind::Success, action.done_label());
                    ActionOutcome::Success
                }
                Err(err) => {
                    state.audit.record(AuditEntry::new(
                        self.actor.clone(),
                        ActionOutcome::Failed,
                        action.key(),
                        job_id.clone(),
                    ));
                    let message = match err {
                        ApiError::Status { message, .. } if !message.is_empty() => {
                            message.clone()
                        }
                        other => other.to_string(),
                    };
                    let message = if message.is_empty() {
                        "action failed".to_string()
                    } else {
                        message
                    };
                    state.push_notice(NoticeKind::Error, message);
                    ActionOutcome::Failed
                }
            }
        };

        if outcome == ActionOutcome::Success {
            self.reload(KeepSelection::Keep).await;
            if let Some(job_id) = job_id {
                let effect = self.lock_state().select_job(&job_id);
                self.follow(effect).await;
            }
        }
        ActionDisposition::Executed(outcome)
    }

    async fn call_remote(
        &self,
        action: &ConsoleAction,
        mode: Option<ModeChange>,
    ) -> Result<(), ApiError> {
        match action {
            ConsoleAction::RunOnce => self.api.run_once().await,
            ConsoleAction::Retry { job_id } => self.api.retry_job(job_id).await,
            ConsoleAction::Cancel { job_id } => self.api.cancel_job(job_id).await,
            ConsoleAction::Pause
            | ConsoleAction::Resume
            | ConsoleAction::DryRunOn
            | ConsoleAction::DryRunOff => match mode {
                Some(mode) => self.api.set_mode(mode).await,
                // Preconditions guarantee a loaded status; this is the
                // defensive arm.
                None => Err(ApiError::InvalidArgument(
                    "worker status has not loaded yet".to_string(),
                )),
            },
        }
    }

    // ── Polling ──

    /// Change the reload cadence, replacing any active worker.
    pub fn set_poll_interval(&self, interval: PollInterval) {
        self.lock_state().poll_interval = interval;
        self.restart_poll();
    }

    /// Stop polling and drop the worker.
    pub fn shutdown(&self) {
        if let Some(handle) = self.take_poll_handle() {
            handle.cancel();
        }
    }

    fn restart_poll(&self) {
        if let Some(handle) = self.take_poll_handle() {
            handle.cancel();
        }
        let interval = self.lock_state().poll_interval;
        let Some(every) = interval.as_duration() else {
            return;
        };
        let handle = spawn_poll_worker(self.self_ref.clone(), every);
        match self.poll.lock() {
            Ok(mut slot) => *slot = Some(handle),
            Err(poisoned) => *poisoned.into_inner() = Some(handle),
        }
    }

    fn take_poll_handle(&self) -> Option<PollHandle> {
        match self.poll.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, ConsoleState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Pure precondition check, shared by the request path and the executor.
fn check_preconditions(state: &ConsoleState, action: &ConsoleAction) -> Result<(), ConsoleError> {
    if action.is_mode_change() && state.status.is_none() {
        return Err(ConsoleError::StatusUnavailable);
    }
    if let Some(job_id) = action.job_id() {
        let run = state
            .runs
            .iter()
            .find(|r| r.job_id.as_deref() == Some(job_id))
            .ok_or_else(|| ConsoleError::UnknownJob(job_id.to_string()))?;
        if !action.eligible_for(run.status) {
            return Err(ConsoleError::NotEligible {
                action: action.key(),
                status: run.status.as_str().to_string(),
            });
        }
    }
    Ok(())
}

fn first_error(
    status: Result<Value, ApiError>,
    metrics: Result<Value, ApiError>,
    runs: Result<RunsPage, ApiError>,
) -> String {
    status
        .err()
        .or(metrics.err())
        .or(runs.err())
        .map(|err| err.to_string())
        .unwrap_or_else(|| "load failed".to_string())
}

//! Effective-run resolution for the selection reconciler.
//!
//! The selection pointer must never reference a run absent from all
//! currently available data once any data is available. Resolution order:
//! the selected id in the filtered view, then in the unfiltered page, then
//! the first filtered run, then the first of the page.

use crate::run_view::RunView;

/// What the driver must do after a selection transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEffect {
    /// Selection identity unchanged; events stay as they are.
    None,
    /// The selected job changed; fetch its events under this generation.
    /// A completion whose generation is no longer current is discarded.
    FetchEvents { job_id: String, generation: u64 },
    /// Selection became empty or jobless; the events view was cleared
    /// without a network call.
    ClearEvents,
}

/// Resolve the run the console should treat as selected.
#[must_use]
pub fn effective_run<'a>(
    filtered: &[&'a RunView],
    all: &'a [RunView],
    selected_run_id: Option<&str>,
) -> Option<&'a RunView> {
    if let Some(id) = selected_run_id {
        if let Some(run) = filtered.iter().find(|r| r.id.as_deref() == Some(id)) {
            return Some(run);
        }
        if let Some(run) = all.iter().find(|r| r.id.as_deref() == Some(id)) {
            return Some(run);
        }
    }
    filtered.first().copied().or_else(|| all.first())
}

/// Whether the previously selected (job, run) pair is still present in the
/// freshly loaded page. Decides the keep-selection path on reload.
#[must_use]
pub fn pair_present(runs: &[RunView], job_id: Option<&str>, run_id: Option<&str>) -> bool {
    runs.iter()
        .any(|r| r.job_id.as_deref() == job_id && r.id.as_deref() == run_id)
}

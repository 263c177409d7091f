//! Local audit trail for operator actions.
//!
//! One entry is retained per job id (latest overwrites) plus a single
//! most-recent slot regardless of job. Entries live only for the console
//! instance's lifetime.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

/// Outcome of an executed action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Success,
    Failed,
}

impl ActionOutcome {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ActionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded action.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEntry {
    pub actor: String,
    pub timestamp: DateTime<Utc>,
    pub outcome: ActionOutcome,
    pub action_key: String,
    pub job_id: Option<String>,
}

impl AuditEntry {
    pub fn new(
        actor: impl Into<String>,
        outcome: ActionOutcome,
        action_key: impl Into<String>,
        job_id: Option<String>,
    ) -> Self {
        Self {
            actor: actor.into(),
            timestamp: Utc::now(),
            outcome,
            action_key: action_key.into(),
            job_id,
        }
    }
}

/// The per-job audit map plus the single most-recent slot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AuditTrail {
    pub last: Option<AuditEntry>,
    pub by_job: HashMap<String, AuditEntry>,
}

impl AuditTrail {
    /// Record an entry: always into the most-recent slot, and into the
    /// per-job map when a job id is present (overwriting any prior entry).
    pub fn record(&mut self, entry: AuditEntry) {
        if let Some(job_id) = &entry.job_id {
            self.by_job.insert(job_id.clone(), entry.clone());
        }
        self.last = Some(entry);
    }

    #[must_use]
    pub fn for_job(&self, job_id: &str) -> Option<&AuditEntry> {
        self.by_job.get(job_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::{ActionOutcome, AuditEntry, AuditTrail};

    #[test]
    fn record_fills_last_and_per_job_slots() {
        let mut trail = AuditTrail::default();
        trail.record(AuditEntry::new(
            "console",
            ActionOutcome::Success,
            "retry:j1",
            Some("j1".to_string()),
        ));

        assert_eq!(trail.last.as_ref().unwrap().action_key, "retry:j1");
        assert_eq!(trail.for_job("j1").unwrap().outcome, ActionOutcome::Success);
        assert!(trail.for_job("j2").is_none());
    }

    #[test]
    fn latest_entry_overwrites_per_job_slot() {
        let mut trail = AuditTrail::default();
        trail.record(AuditEntry::new(
            "console",
            ActionOutcome::Failed,
            "retry:j1",
            Some("j1".to_string()),
        ));
        trail.record(AuditEntry::new(
            "console",
            ActionOutcome::Success,
            "cancel:j1",
            Some("j1".to_string()),
        ));

        assert_eq!(trail.by_job.len(), 1);
        assert_eq!(trail.for_job("j1").unwrap().action_key, "cancel:j1");
    }

    #[test]
    fn jobless_actions_only_touch_the_last_slot() {
        let mut trail = AuditTrail::default();
        trail.record(AuditEntry::new(
            "console",
            ActionOutcome::Success,
            "run_once",
            None,
        ));

        assert_eq!(trail.last.as_ref().unwrap().action_key, "run_once");
        assert!(trail.by_job.is_empty());
    }
}

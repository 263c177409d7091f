//! Operator actions, their audit keys, and the confirmation policy.
//!
//! The gating is asymmetric on purpose: pausing the worker and enabling
//! dry-run reduce risk and execute immediately, while resuming, re-enabling
//! writes, retrying, and cancelling all route through a confirm prompt.

use steward_api::types::ModeChange;

use crate::run_view::RunStatus;
use crate::status_view::StatusView;

/// An action the operator can trigger from the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleAction {
    RunOnce,
    Pause,
    Resume,
    DryRunOn,
    DryRunOff,
    Retry { job_id: String },
    Cancel { job_id: String },
}

impl ConsoleAction {
    /// The key recorded in the audit trail for this action.
    #[must_use]
    pub fn key(&self) -> String {
        match self {
            Self::RunOnce => "run_once".to_string(),
            Self::Pause => "mode_pause".to_string(),
            Self::Resume => "mode_resume".to_string(),
            Self::DryRunOn => "mode_dry_run_on".to_string(),
            Self::DryRunOff => "mode_dry_run_off".to_string(),
            Self::Retry { job_id } => format!("retry:{job_id}"),
            Self::Cancel { job_id } => format!("cancel:{job_id}"),
        }
    }

    #[must_use]
    pub fn job_id(&self) -> Option<&str> {
        match self {
            Self::Retry { job_id } | Self::Cancel { job_id } => Some(job_id),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_mode_change(&self) -> bool {
        matches!(
            self,
            Self::Pause | Self::Resume | Self::DryRunOn | Self::DryRunOff
        )
    }

    /// Whether the action must pass a confirm prompt before executing.
    #[must_use]
    pub fn requires_confirmation(&self) -> bool {
        match self {
            Self::RunOnce | Self::Pause | Self::DryRunOn => false,
            Self::Resume | Self::DryRunOff | Self::Retry { .. } | Self::Cancel { .. } => true,
        }
    }

    /// Prompt text for the confirm step.
    #[must_use]
    pub fn confirm_prompt(&self) -> String {
        match self {
            Self::RunOnce => "Trigger one steward pass now? [y/N]".to_string(),
            Self::Pause => "Pause the steward worker? [y/N]".to_string(),
            Self::Resume => "Resume the steward worker and process queued jobs? [y/N]".to_string(),
            Self::DryRunOn => "Enable dry-run (evaluate without side effects)? [y/N]".to_string(),
            Self::DryRunOff => "Re-enable side-effect writes? [y/N]".to_string(),
            Self::Retry { job_id } => format!("Retry job {job_id}? [y/N]"),
            Self::Cancel { job_id } => format!("Cancel job {job_id}? [y/N]"),
        }
    }

    /// Past-tense label for success notices.
    #[must_use]
    pub fn done_label(&self) -> String {
        match self {
            Self::RunOnce => "Steward pass triggered".to_string(),
            Self::Pause => "Worker paused".to_string(),
            Self::Resume => "Worker resumed".to_string(),
            Self::DryRunOn => "Dry-run enabled".to_string(),
            Self::DryRunOff => "Writes enabled".to_string(),
            Self::Retry { job_id } => format!("Job {job_id} re-enqueued"),
            Self::Cancel { job_id } => format!("Job {job_id} cancelled"),
        }
    }

    /// The `(paused, dry_run)` pair this mode action requests, computed
    /// from the current status by changing exactly one dimension.
    /// `None` for non-mode actions.
    #[must_use]
    pub fn target_mode(&self, status: &StatusView) -> Option<ModeChange> {
        match self {
            Self::Pause => Some(ModeChange {
                paused: true,
                dry_run: status.dry_run,
            }),
            Self::Resume => Some(ModeChange {
                paused: false,
                dry_run: status.dry_run,
            }),
            Self::DryRunOn => Some(ModeChange {
                paused: status.paused,
                dry_run: true,
            }),
            Self::DryRunOff => Some(ModeChange {
                paused: status.paused,
                dry_run: false,
            }),
            Self::RunOnce | Self::Retry { .. } | Self::Cancel { .. } => None,
        }
    }

    /// Whether a run in `status` may be targeted by this action. Job-less
    /// actions are always eligible here; mode preconditions are checked
    /// separately against the status snapshot.
    #[must_use]
    pub fn eligible_for(&self, status: RunStatus) -> bool {
        match self {
            Self::Retry { .. } => status.is_retryable(),
            Self::Cancel { .. } => status.is_cancellable(),
            _ => true,
        }
    }
}

/// A pending confirm prompt held until the operator accepts or declines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmState {
    pub action: ConsoleAction,
    pub prompt: String,
}

impl ConfirmState {
    #[must_use]
    pub fn for_action(action: ConsoleAction) -> Self {
        let prompt = action.confirm_prompt();
        Self { action, prompt }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use steward_api::types::ModeChange;

    use super::{ConfirmState, ConsoleAction};
    use crate::run_view::RunStatus;
    use crate::status_view::derive_status_view;

    #[test]
    fn audit_keys_are_stable() {
        assert_eq!(ConsoleAction::RunOnce.key(), "run_once");
        assert_eq!(ConsoleAction::Pause.key(), "mode_pause");
        assert_eq!(ConsoleAction::Resume.key(), "mode_resume");
        assert_eq!(ConsoleAction::DryRunOn.key(), "mode_dry_run_on");
        assert_eq!(ConsoleAction::DryRunOff.key(), "mode_dry_run_off");
        assert_eq!(
            ConsoleAction::Retry {
                job_id: "j1".to_string()
            }
            .key(),
            "retry:j1"
        );
        assert_eq!(
            ConsoleAction::Cancel {
                job_id: "j1".to_string()
            }
            .key(),
            "cancel:j1"
        );
    }

    #[test]
    fn confirmation_policy_is_asymmetric() {
        assert!(!ConsoleAction::RunOnce.requires_confirmation());
        assert!(!ConsoleAction::Pause.requires_confirmation());
        assert!(!ConsoleAction::DryRunOn.requires_confirmation());

        assert!(ConsoleAction::Resume.requires_confirmation());
        assert!(ConsoleAction::DryRunOff.requires_confirmation());
        assert!(ConsoleAction::Retry {
            job_id: "j1".to_string()
        }
        .requires_confirmation());
        assert!(ConsoleAction::Cancel {
            job_id: "j1".to_string()
        }
        .requires_confirmation());
    }

    #[test]
    fn mode_actions_change_exactly_one_dimension() {
        let status = derive_status_view(&serde_json::json!({
            "paused": true,
            "dry_run": true,
        }));

        assert_eq!(
            ConsoleAction::Resume.target_mode(&status),
            Some(ModeChange {
                paused: false,
                dry_run: true
            })
        );
        assert_eq!(
            ConsoleAction::DryRunOff.target_mode(&status),
            Some(ModeChange {
                paused: true,
                dry_run: false
            })
        );
        assert_eq!(
            ConsoleAction::Pause.target_mode(&status),
            Some(ModeChange {
                paused: true,
                dry_run: true
            })
        );
        assert_eq!(ConsoleAction::RunOnce.target_mode(&status), None);
    }

    #[test]
    fn eligibility_matches_run_status() {
        let retry = ConsoleAction::Retry {
            job_id: "j1".to_string(),
        };
        assert!(retry.eligible_for(RunStatus::Failed));
        assert!(retry.eligible_for(RunStatus::DeadLetter));
        assert!(!retry.eligible_for(RunStatus::Succeeded));

        let cancel = ConsoleAction::Cancel {
            job_id: "j1".to_string(),
        };
        assert!(cancel.eligible_for(RunStatus::Queued));
        assert!(cancel.eligible_for(RunStatus::Running));
        assert!(!cancel.eligible_for(RunStatus::Failed));

        assert!(ConsoleAction::RunOnce.eligible_for(RunStatus::Unknown));
    }

    #[test]
    fn confirm_state_carries_the_prompt() {
        let confirm = ConfirmState::for_action(ConsoleAction::Cancel {
            job_id: "j1".to_string(),
        });
        assert_eq!(confirm.prompt, "Cancel job j1? [y/N]");
    }
}

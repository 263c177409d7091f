//! Polling controller: a single cancellable worker that reloads the
//! console on a fixed cadence.
//!
//! Exactly one worker is alive at any time; interval changes and
//! filter/pagination changes replace it, and the handle cancels its worker
//! on drop so a torn-down console cannot leave a stale timer running.

use std::sync::Weak;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::console::Console;
use crate::state::KeepSelection;
use steward_api::service::StewardApi;

/// Reload cadence offered by the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollInterval {
    #[default]
    Off,
    Every5s,
    Every10s,
    Every30s,
}

impl PollInterval {
    pub const ALL: [PollInterval; 4] = [
        PollInterval::Off,
        PollInterval::Every5s,
        PollInterval::Every10s,
        PollInterval::Every30s,
    ];

    /// `None` when polling is off.
    #[must_use]
    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            Self::Off => None,
            Self::Every5s => Some(Duration::from_secs(5)),
            Self::Every10s => Some(Duration::from_secs(10)),
            Self::Every30s => Some(Duration::from_secs(30)),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Every5s => "5s",
            Self::Every10s => "10s",
            Self::Every30s => "30s",
        }
    }
}

impl std::fmt::Display for PollInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle to the active poll worker. Cancelling (or dropping) stops it.
#[derive(Debug)]
pub struct PollHandle {
    token: CancellationToken,
}

impl PollHandle {
    pub fn cancel(&self) {
        self.token.cancel();
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Spawn a worker that reloads the console every `every`, preserving the
/// current selection on each tick, until cancelled.
///
/// The worker holds only a weak reference so it cannot keep an abandoned
/// console alive; it exits on its own once the console is gone.
pub(crate) fn spawn_poll_worker<S>(console: Weak<Console<S>>, every: Duration) -> PollHandle
where
    S: StewardApi + 'static,
{
    let token = CancellationToken::new();
    let worker_token = token.clone();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                _ = worker_token.cancelled() => break,
                _ = tokio::time::sleep(every) => {
                    let Some(console) = console.upgrade() else {
                        break;
                    };
                    console.reload(KeepSelection::Keep).await;
                }
            }
        }
    });
    PollHandle { token }
}

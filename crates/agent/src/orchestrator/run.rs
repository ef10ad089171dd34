//! Run lifecycle tracking and the polling budget.

use std::time::Duration;

use serde::Serialize;
use sunbae_core::RunStatus;

/// Local view of one remote run.
///
/// `Created → Queued → InProgress → {Completed | Failed | TimedOut}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Created,
    Queued,
    InProgress,
    Completed,
    Failed,
    TimedOut,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::TimedOut)
    }
}

/// Forward-only state machine fed with remote statuses.
#[derive(Debug, Clone)]
pub struct RunTracker {
    history: Vec<RunState>,
}

impl Default for RunTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl RunTracker {
    pub fn new() -> Self {
        Self {
            history: vec![RunState::Created],
        }
    }

    pub fn state(&self) -> RunState {
        self.history.last().copied().unwrap_or(RunState::Created)
    }

    /// Every state entered, in order, starting with `Created`.
    pub fn history(&self) -> &[RunState] {
        &self.history
    }

    /// Fold one remote status into the tracker.
    ///
    /// Anything other than queued, in progress or completed counts as a
    /// failure. Statuses that would move backwards, or arrive after a
    /// terminal state, are ignored.
    pub fn observe(&mut self, status: RunStatus) -> RunState {
        let next = match status {
            RunStatus::Queued => RunState::Queued,
            RunStatus::InProgress => RunState::InProgress,
            RunStatus::Completed => RunState::Completed,
            _ => RunState::Failed,
        };
        self.advance(next)
    }

    /// The polling budget ran out while the run was still pending.
    pub fn time_out(&mut self) -> RunState {
        self.advance(RunState::TimedOut)
    }

    fn advance(&mut self, next: RunState) -> RunState {
        let current = self.state();
        if !current.is_terminal() && next > current {
            self.history.push(next);
        }
        self.state()
    }
}

/// Fixed-interval polling with a hard cap on the number of waits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: 60,
        }
    }
}

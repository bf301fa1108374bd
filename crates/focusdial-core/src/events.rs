use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{BreakKind, Phase, Snapshot};

/// Every observable change of the session produces an Event.
/// Front ends subscribe through the [`Notifier`](crate::notifier::Notifier).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Event {
    /// A phase counted down to zero.
    PhaseCompleted {
        phase: Phase,
        at: DateTime<Utc>,
    },
    WorkSessionCompleted {
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    BreakCompleted {
        kind: BreakKind,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    /// The configured number of work sessions is done and a long break is
    /// waiting for the user to continue or leave session mode.
    CycleCompleted {
        completed_work_sessions: u32,
        at: DateTime<Utc>,
    },
    /// Observable state changed; front ends refresh from `snapshot`.
    StateChanged {
        snapshot: Snapshot,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::PhaseCompleted { .. } => "phase-completed",
            Event::WorkSessionCompleted { .. } => "work-session-completed",
            Event::BreakCompleted { .. } => "break-completed",
            Event::CycleCompleted { .. } => "cycle-completed",
            Event::StateChanged { .. } => "state-changed",
        }
    }
}

//! Phase history subscriber.
//!
//! Records every completed phase into the `phases` table so front ends can
//! show daily and all-time totals.

use crate::events::Event;
use crate::notifier::{Subscriber, SubscriberError};
use crate::storage::Database;
use crate::timer::Phase;

pub struct HistoryRecorder {
    db: Database,
}

impl HistoryRecorder {
    /// `db` should be a separate connection to the session's database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

impl Subscriber for HistoryRecorder {
    fn name(&self) -> &str {
        "history"
    }

    fn on_event(&self, event: &Event) -> Result<(), SubscriberError> {
        let (phase, duration_secs, at) = match event {
            Event::WorkSessionCompleted { duration_secs, at } => (Phase::Work, *duration_secs, *at),
            Event::BreakCompleted {
                kind,
                duration_secs,
                at,
            } => {
                let phase = match kind {
                    crate::timer::BreakKind::Short => Phase::ShortBreak,
                    crate::timer::BreakKind::Long => Phase::LongBreak,
                };
                (phase, *duration_secs, *at)
            }
            _ => return Ok(()),
        };
        self.db.record_phase(phase, duration_secs, at)?;
        tracing::debug!(%phase, duration_secs, "recorded completed phase");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::BreakKind;
    use chrono::Utc;

    #[test]
    fn records_completions_and_ignores_the_rest() {
        let recorder = HistoryRecorder::new(Database::open_memory().unwrap());
        let at = Utc::now();
        recorder
            .on_event(&Event::WorkSessionCompleted {
                duration_secs: 1500,
                at,
            })
            .unwrap();
        recorder
            .on_event(&Event::BreakCompleted {
                kind: BreakKind::Long,
                duration_secs: 900,
                at,
            })
            .unwrap();
        recorder
            .on_event(&Event::PhaseCompleted {
                phase: Phase::Work,
                at,
            })
            .unwrap();

        let summary = recorder.database().summary_all().unwrap();
        assert_eq!(summary.work_sessions, 1);
        assert_eq!(summary.long_breaks, 1);
        assert_eq!(summary.break_secs, 900);
    }
}

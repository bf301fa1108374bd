//! The session engine façade.
//!
//! [`PomodoroSession`] owns the state machine, its persistence and the
//! notifier. Every command follows the same path: mutate the machine, write
//! a snapshot if an observable field changed, then notify subscribers
//! (completion events first, `StateChanged` last).

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::engine::SessionMachine;
use super::persistence::{Persistence, PreviousTimer, Snapshot};
use super::phase::{Phase, SessionConfig};
use super::settings::RawSettings;
use crate::events::Event;
use crate::notifier::{Notifier, Subscriber, SubscriptionId};
use crate::storage::PreferenceStore;

/// Display-ready view of the session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    #[serde(flatten)]
    pub snapshot: Snapshot,
    pub remaining_display: String,
    pub total_seconds: u64,
    pub phase_progress: f64,
    pub config: SessionConfig,
}

pub struct PomodoroSession<S> {
    machine: SessionMachine,
    persistence: Persistence<S>,
    notifier: Notifier,
}

impl<S: PreferenceStore> PomodoroSession<S> {
    /// Fresh idle session using the persisted config (or defaults).
    pub fn new(store: S) -> Self {
        let persistence = Persistence::new(store);
        let config = persistence.load_config();
        Self {
            machine: SessionMachine::new(config),
            persistence,
            notifier: Notifier::new(),
        }
    }

    /// Session rebuilt from the store: resumes where the last process left
    /// off when session mode was active, otherwise idle.
    pub fn restore(store: S, now: DateTime<Utc>) -> Self {
        let mut session = Self::new(store);
        if let Some(snapshot) = session.persistence.load_snapshot() {
            let config = *session.machine.config();
            session.machine = SessionMachine::from_snapshot(config, &snapshot, now);
            tracing::info!(
                phase = %snapshot.phase,
                remaining = snapshot.remaining_seconds,
                running = snapshot.is_running,
                "resumed persisted session"
            );
        }
        session
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn machine(&self) -> &SessionMachine {
        &self.machine
    }

    pub fn config(&self) -> &SessionConfig {
        self.machine.config()
    }

    pub fn phase(&self) -> Phase {
        self.machine.phase()
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.machine.remaining_seconds()
    }

    pub fn completed_work_sessions(&self) -> u32 {
        self.machine.completed_work_sessions()
    }

    pub fn is_running(&self) -> bool {
        self.machine.is_running()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.machine.snapshot()
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            snapshot: self.machine.snapshot(),
            remaining_display: format_clock(self.machine.remaining_seconds()),
            total_seconds: self.machine.total_seconds(),
            phase_progress: self.machine.phase_progress(),
            config: *self.machine.config(),
        }
    }

    pub fn is_store_degraded(&self) -> bool {
        self.persistence.is_degraded()
    }

    pub fn store(&self) -> &S {
        self.persistence.store()
    }

    // ── Subscribers ──────────────────────────────────────────────────

    pub fn subscribe(&mut self, subscriber: impl Subscriber + 'static) -> SubscriptionId {
        self.notifier.subscribe(subscriber)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Enter session mode. `previous` is the plain timer setting to hand
    /// back on [`deactivate`](Self::deactivate).
    pub fn activate(&mut self, previous: Option<PreviousTimer>) {
        if self.machine.phase().is_ticking() {
            return;
        }
        if let Some(previous) = previous {
            self.persistence.write_previous_timer(previous);
        }
        self.mutate(|machine| {
            machine.activate();
            Vec::new()
        });
        tracing::info!(work_seconds = self.config().work_seconds(), "session mode on");
    }

    /// Leave session mode: back to idle, persisted snapshot cleared.
    /// Returns the plain timer setting saved on activation.
    pub fn deactivate(&mut self) -> Option<PreviousTimer> {
        let was_active = self.machine.phase().is_ticking();
        self.machine.deactivate();
        self.persistence.clear_snapshot();
        if was_active {
            tracing::info!("session mode off");
            self.notifier.emit(&Event::StateChanged {
                snapshot: self.machine.snapshot(),
            });
        }
        self.persistence.load_previous_timer()
    }

    pub fn start(&mut self, now: DateTime<Utc>) {
        self.mutate(|machine| {
            machine.start(now);
            Vec::new()
        });
    }

    pub fn pause(&mut self) {
        self.mutate(|machine| {
            machine.pause();
            Vec::new()
        });
    }

    pub fn reset(&mut self) {
        self.mutate(|machine| {
            machine.reset();
            Vec::new()
        });
    }

    /// Answer the long-break decision point with "start the next cycle".
    pub fn continue_cycle(&mut self, now: DateTime<Utc>) {
        self.mutate(|machine| {
            machine.continue_cycle(now);
            Vec::new()
        });
    }

    /// Advance the countdown; returns the completion events it produced.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        self.mutate(|machine| machine.tick(now))
    }

    /// Resolve `raw`, persist it field by field and apply it to the running
    /// session.
    pub fn apply_settings(&mut self, raw: &RawSettings, now: DateTime<Utc>) -> SessionConfig {
        let config = raw.resolve();
        self.apply_config(config, now);
        config
    }

    pub fn apply_config(&mut self, config: SessionConfig, now: DateTime<Utc>) {
        self.persistence.write_config(&config);
        self.mutate(|machine| {
            machine.apply_config(config, now);
            Vec::new()
        });
    }

    pub fn into_store(self) -> S {
        self.persistence.into_store()
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn mutate(&mut self, f: impl FnOnce(&mut SessionMachine) -> Vec<Event>) -> Vec<Event> {
        let before = self.machine.snapshot();
        let events = f(&mut self.machine);
        let after = self.machine.snapshot();

        if after != before {
            tracing::debug!(
                phase = %after.phase,
                remaining = after.remaining_seconds,
                running = after.is_running,
                "session state changed"
            );
            if after.phase.is_ticking() {
                self.persistence.write_snapshot(&after);
            }
        }
        self.notifier.emit_all(&events);
        if after != before {
            self.notifier.emit(&Event::StateChanged { snapshot: after });
        }
        events
    }
}

impl<S> std::fmt::Debug for PomodoroSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PomodoroSession")
            .field("machine", &self.machine)
            .field("notifier", &self.notifier)
            .finish_non_exhaustive()
    }
}

/// `MM:SS`, or `H:MM:SS` from one hour up.
pub fn format_clock(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::SubscriberError;
    use crate::storage::{keys, MemoryStore};
    use chrono::{Duration, TimeZone};
    use std::sync::{Arc, Mutex};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap()
    }

    fn recorder(session: &mut PomodoroSession<MemoryStore>) -> Arc<Mutex<Vec<&'static str>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        session.subscribe(move |e: &Event| -> Result<(), SubscriberError> {
            sink.lock().unwrap().push(e.name());
            Ok(())
        });
        seen
    }

    #[test]
    fn format_clock_pads() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(1500), "25:00");
        assert_eq!(format_clock(59), "00:59");
        assert_eq!(format_clock(3661), "1:01:01");
    }

    #[test]
    fn every_observable_change_is_persisted() {
        let mut session = PomodoroSession::new(MemoryStore::new());
        session.activate(None);
        assert!(session.store().get_bool_or(keys::SESSION_MODE, false));
        assert_eq!(session.store().get_int_or(keys::CURRENT_SECONDS, 0), 1500);

        session.start(t0());
        assert!(session.store().get_bool_or(keys::IS_RUNNING, false));
        session.tick(t0() + Duration::seconds(5));
        assert_eq!(session.store().get_int_or(keys::CURRENT_SECONDS, 0), 1495);
    }

    #[test]
    fn sub_second_tick_writes_and_notifies_nothing() {
        let mut session = PomodoroSession::new(MemoryStore::new());
        session.activate(None);
        session.start(t0());
        let seen = recorder(&mut session);
        session.tick(t0() + Duration::milliseconds(300));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn completion_events_precede_state_change() {
        let mut session = PomodoroSession::new(MemoryStore::new());
        session.apply_config(SessionConfig::new(2, 1, 3, 4).unwrap(), t0());
        session.activate(None);
        session.start(t0());
        let seen = recorder(&mut session);
        let events = session.tick(t0() + Duration::seconds(2));
        assert_eq!(events.len(), 2);
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["phase-completed", "work-session-completed", "state-changed"]
        );
    }

    #[test]
    fn deactivate_clears_and_returns_previous_timer() {
        let mut session = PomodoroSession::new(MemoryStore::new());
        let previous = PreviousTimer {
            hours: 0,
            minutes: 45,
        };
        session.activate(Some(previous));
        session.start(t0());
        assert_eq!(session.deactivate(), Some(previous));
        assert_eq!(session.phase(), Phase::Idle);
        assert!(!session.store().get_bool_or(keys::SESSION_MODE, true));

        let store = session.into_store();
        let restored = PomodoroSession::restore(store, t0());
        assert_eq!(restored.phase(), Phase::Idle);
    }

    #[test]
    fn restore_resumes_from_persisted_seconds() {
        let mut session = PomodoroSession::new(MemoryStore::new());
        session.activate(None);
        session.start(t0());
        session.tick(t0() + Duration::seconds(100));
        let store = session.into_store();

        let reopened = t0() + Duration::hours(2);
        let mut restored = PomodoroSession::restore(store, reopened);
        assert_eq!(restored.phase(), Phase::Work);
        assert_eq!(restored.remaining_seconds(), 1400);
        assert!(restored.is_running());
        restored.tick(reopened + Duration::seconds(1));
        assert_eq!(restored.remaining_seconds(), 1399);
    }

    #[test]
    fn settings_change_persists_each_field() {
        let mut session = PomodoroSession::new(MemoryStore::new());
        let raw = RawSettings {
            hours: "0".into(),
            minutes: "50".into(),
            short_break_minutes: "10".into(),
            long_break_minutes: "".into(),
            cycles: "3".into(),
        };
        let cfg = session.apply_settings(&raw, t0());
        assert_eq!(cfg.work_seconds(), 3000);
        assert_eq!(session.store().get_int_or(keys::WORK_DURATION, 0), 3000);
        assert_eq!(session.store().get_int_or(keys::SHORT_BREAK_DURATION, 0), 600);
        assert_eq!(session.store().get_int_or(keys::LONG_BREAK_DURATION, 0), 900);
        assert_eq!(session.store().get_int_or(keys::CYCLES_BEFORE_LONG_BREAK, 0), 3);

        let reopened = PomodoroSession::new(session.into_store());
        assert_eq!(*reopened.config(), cfg);
    }

    #[test]
    fn status_reports_display_fields() {
        let mut session = PomodoroSession::new(MemoryStore::new());
        session.activate(None);
        let status = session.status();
        assert_eq!(status.remaining_display, "25:00");
        assert_eq!(status.total_seconds, 1500);
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["phase"], "work");
        assert_eq!(json["remainingSeconds"], 1500);
        assert_eq!(json["remainingDisplay"], "25:00");
    }
}

//! Session state machine.
//!
//! The machine is wall-clock based. It does not use internal threads or read
//! the clock itself: the caller passes `now` to every time-dependent command
//! and is responsible for calling `tick()` periodically.
//!
//! ## State Transitions
//!
//! ```text
//! Idle --activate--> Work
//! Work --0--> ShortBreak (auto-start)   when (completed + 1) % cycles != 0
//! Work --0--> LongBreak  (paused, awaiting the cycle decision) otherwise
//! ShortBreak --0--> Work (auto-start)
//! LongBreak  --0--> Work (auto-start, completed = 0)
//! *  --deactivate--> Idle
//! ```
//!
//! Invalid commands (starting while idle, continuing without a pending
//! decision) are ignored and return no events.

use chrono::{DateTime, Duration, Utc};

use super::persistence::Snapshot;
use super::phase::{Phase, SessionConfig};
use crate::events::Event;

#[derive(Debug, Clone)]
pub struct SessionMachine {
    config: SessionConfig,
    phase: Phase,
    remaining_seconds: u64,
    completed_work_sessions: u32,
    is_running: bool,
    /// Wall-clock instant of the last applied whole-second tick.
    last_tick: Option<DateTime<Utc>>,
    awaiting_cycle_decision: bool,
}

impl SessionMachine {
    /// Create an idle machine.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            phase: Phase::Idle,
            remaining_seconds: 0,
            completed_work_sessions: 0,
            is_running: false,
            last_tick: None,
            awaiting_cycle_decision: false,
        }
    }

    /// Rebuild a machine from a persisted snapshot.
    ///
    /// The countdown resumes from the stored value; time that passed while
    /// nothing was running is not deducted, and a stored countdown longer
    /// than the phase is cut to the phase length. Returns an idle machine
    /// when the snapshot does not describe an active session.
    pub fn from_snapshot(config: SessionConfig, snapshot: &Snapshot, now: DateTime<Utc>) -> Self {
        let mut machine = Self::new(config);
        if !snapshot.phase.is_ticking() {
            return machine;
        }
        machine.phase = snapshot.phase;
        machine.remaining_seconds = snapshot
            .remaining_seconds
            .min(config.duration_of(snapshot.phase));
        machine.completed_work_sessions = snapshot.completed_work_sessions;
        machine.awaiting_cycle_decision =
            snapshot.awaiting_cycle_decision && snapshot.phase == Phase::LongBreak;
        if snapshot.is_running && !machine.awaiting_cycle_decision {
            machine.is_running = true;
            machine.last_tick = Some(now);
        }
        machine
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    pub fn completed_work_sessions(&self) -> u32 {
        self.completed_work_sessions
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn last_tick(&self) -> Option<DateTime<Utc>> {
        self.last_tick
    }

    pub fn awaiting_cycle_decision(&self) -> bool {
        self.awaiting_cycle_decision
    }

    /// Configured length of the current phase.
    pub fn total_seconds(&self) -> u64 {
        self.config.duration_of(self.phase)
    }

    /// 0.0 .. 1.0 progress within the current phase.
    pub fn phase_progress(&self) -> f64 {
        let total = self.total_seconds();
        if total == 0 {
            return 0.0;
        }
        (1.0 - (self.remaining_seconds as f64 / total as f64)).clamp(0.0, 1.0)
    }

    /// Observable fields, as persisted.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            remaining_seconds: self.remaining_seconds,
            completed_work_sessions: self.completed_work_sessions,
            is_running: self.is_running,
            awaiting_cycle_decision: self.awaiting_cycle_decision,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Enter session mode at the start of a work phase, paused.
    /// Ignored when a session is already active.
    pub fn activate(&mut self) {
        if self.phase.is_ticking() {
            return;
        }
        self.phase = Phase::Work;
        self.remaining_seconds = self.config.work_seconds();
        self.completed_work_sessions = 0;
        self.is_running = false;
        self.last_tick = None;
        self.awaiting_cycle_decision = false;
    }

    /// Leave session mode from any state.
    pub fn deactivate(&mut self) {
        *self = Self::new(self.config);
    }

    pub fn start(&mut self, now: DateTime<Utc>) {
        if self.is_running || !self.phase.is_ticking() || self.awaiting_cycle_decision {
            return;
        }
        self.is_running = true;
        self.last_tick = Some(now);
    }

    pub fn pause(&mut self) {
        self.is_running = false;
        self.last_tick = None;
    }

    /// Restore the full duration of the current phase and stop the countdown.
    pub fn reset(&mut self) {
        if !self.phase.is_ticking() {
            return;
        }
        self.remaining_seconds = self.total_seconds();
        self.pause();
    }

    /// The "start next cycle" decision at the long-break decision point:
    /// clears the work-session counter and starts the long break.
    pub fn continue_cycle(&mut self, now: DateTime<Utc>) {
        if !self.awaiting_cycle_decision {
            return;
        }
        self.awaiting_cycle_decision = false;
        self.completed_work_sessions = 0;
        self.start(now);
    }

    /// Swap in a new configuration.
    ///
    /// When a session is active and the current phase's duration changed,
    /// the countdown restarts from the new duration. A running countdown
    /// keeps running, re-anchored at `now` so the next tick counts from the
    /// reassignment.
    pub fn apply_config(&mut self, config: SessionConfig, now: DateTime<Utc>) {
        let old_duration = self.total_seconds();
        self.config = config;
        if !self.phase.is_ticking() {
            return;
        }
        let new_duration = self.total_seconds();
        if new_duration != old_duration {
            self.remaining_seconds = new_duration;
            if self.is_running {
                self.last_tick = Some(now);
            }
        }
    }

    /// Advance the countdown to `now`.
    ///
    /// Only whole elapsed seconds are applied; the anchor moves by exactly
    /// that many seconds so the sub-second remainder carries into the next
    /// call. Returns the completion events of a phase that reached zero.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        if !self.is_running {
            return Vec::new();
        }
        let Some(last) = self.last_tick else {
            self.last_tick = Some(now);
            return Vec::new();
        };

        let elapsed = now - last;
        if elapsed < Duration::zero() {
            // Wall clock stepped backwards.
            self.last_tick = Some(now);
            return Vec::new();
        }
        let whole_seconds = elapsed.num_seconds();
        if whole_seconds < 1 {
            return Vec::new();
        }

        self.last_tick = Some(last + Duration::seconds(whole_seconds));
        self.remaining_seconds = self.remaining_seconds.saturating_sub(whole_seconds as u64);
        if self.remaining_seconds == 0 {
            return self.complete_phase(now);
        }
        Vec::new()
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn complete_phase(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let finished = self.phase;
        let mut events = vec![Event::PhaseCompleted {
            phase: finished,
            at: now,
        }];

        match finished {
            Phase::Work => {
                self.completed_work_sessions += 1;
                events.push(Event::WorkSessionCompleted {
                    duration_secs: self.config.work_seconds(),
                    at: now,
                });
                if self.completed_work_sessions % self.config.cycles_before_long_break() != 0 {
                    self.enter(Phase::ShortBreak);
                } else {
                    self.enter(Phase::LongBreak);
                    self.pause();
                    self.awaiting_cycle_decision = true;
                    events.push(Event::CycleCompleted {
                        completed_work_sessions: self.completed_work_sessions,
                        at: now,
                    });
                }
            }
            Phase::ShortBreak | Phase::LongBreak => {
                if let Some(kind) = finished.break_kind() {
                    events.push(Event::BreakCompleted {
                        kind,
                        duration_secs: self.config.duration_of(finished),
                        at: now,
                    });
                }
                if finished == Phase::LongBreak {
                    self.completed_work_sessions = 0;
                }
                self.enter(Phase::Work);
            }
            Phase::Idle => {}
        }

        tracing::info!(
            from = %finished,
            to = %self.phase,
            completed = self.completed_work_sessions,
            "phase completed"
        );
        events
    }

    fn enter(&mut self, phase: Phase) {
        self.phase = phase;
        self.remaining_seconds = self.config.duration_of(phase);
    }
}

//! Snapshot persistence on top of a [`PreferenceStore`].
//!
//! Every observable mutation of the session is written through
//! [`Persistence::write_snapshot`]. The first failed write switches the
//! adapter into degraded mode: the session keeps running in memory and no
//! further writes are attempted for the lifetime of the process. A snapshot
//! that fails partway is withdrawn by turning session mode off, so a later
//! process never resumes a mix of old and new fields.

use serde::{Deserialize, Serialize};

use super::phase::{Phase, SessionConfig};
use super::settings;
use crate::storage::{keys, PrefValue, PreferenceStore};

/// Persisted form of the session's observable fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub phase: Phase,
    pub remaining_seconds: u64,
    pub completed_work_sessions: u32,
    pub is_running: bool,
    #[serde(default)]
    pub awaiting_cycle_decision: bool,
}

/// Hours and minutes of the plain (non-session) timer, kept while session
/// mode is active so the caller can restore it on exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviousTimer {
    pub hours: u32,
    pub minutes: u32,
}

#[derive(Debug)]
pub struct Persistence<S> {
    store: S,
    degraded: bool,
}

impl<S: PreferenceStore> Persistence<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            degraded: false,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// True once a write has failed; nothing is written after that.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn write_snapshot(&mut self, snapshot: &Snapshot) {
        let remaining = i64::try_from(snapshot.remaining_seconds).unwrap_or(i64::MAX);
        let written = self.write_all(&[
            (keys::SESSION_MODE, PrefValue::Bool(snapshot.phase.is_ticking())),
            (keys::CURRENT_PHASE, PrefValue::from(snapshot.phase.as_str())),
            (keys::CURRENT_SECONDS, PrefValue::Int(remaining)),
            (
                keys::COMPLETED_SESSIONS,
                PrefValue::from(snapshot.completed_work_sessions),
            ),
            (keys::IS_RUNNING, PrefValue::Bool(snapshot.is_running)),
            (
                keys::AWAITING_CYCLE_DECISION,
                PrefValue::Bool(snapshot.awaiting_cycle_decision),
            ),
        ]);
        if written == Some(false) {
            if let Err(e) = self.store.set(keys::SESSION_MODE, PrefValue::Bool(false)) {
                tracing::warn!(error = %e, "could not withdraw partial session snapshot");
            }
        }
    }

    /// The persisted snapshot, when session mode was left active on a
    /// ticking phase.
    pub fn load_snapshot(&self) -> Option<Snapshot> {
        if !self.store.get_bool_or(keys::SESSION_MODE, false) {
            return None;
        }
        let phase_name = self.store.get_str_or(keys::CURRENT_PHASE, "");
        let phase = match Phase::parse(&phase_name) {
            Some(phase) if phase.is_ticking() => phase,
            _ => {
                tracing::warn!(phase = %phase_name, "session mode set without a valid phase");
                return None;
            }
        };
        Some(Snapshot {
            phase,
            remaining_seconds: self.store.get_int_or(keys::CURRENT_SECONDS, 0).max(0) as u64,
            completed_work_sessions: u32::try_from(
                self.store.get_int_or(keys::COMPLETED_SESSIONS, 0).max(0),
            )
            .unwrap_or(u32::MAX),
            is_running: self.store.get_bool_or(keys::IS_RUNNING, false),
            awaiting_cycle_decision: self.store.get_bool_or(keys::AWAITING_CYCLE_DECISION, false),
        })
    }

    /// Remove the session snapshot and mark session mode off.
    ///
    /// Attempted even in degraded mode, so a recovered store does not resume
    /// a session the user already left.
    pub fn clear_snapshot(&mut self) {
        let result = self
            .store
            .set(keys::SESSION_MODE, PrefValue::Bool(false))
            .and_then(|()| {
                [
                    keys::CURRENT_PHASE,
                    keys::CURRENT_SECONDS,
                    keys::COMPLETED_SESSIONS,
                    keys::IS_RUNNING,
                    keys::AWAITING_CYCLE_DECISION,
                ]
                .iter()
                .try_for_each(|key| self.store.remove(key))
            });
        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to clear persisted session");
            self.degraded = true;
        }
    }

    pub fn write_config(&mut self, config: &SessionConfig) {
        self.write_all(&settings::config_entries(config));
    }

    pub fn load_config(&self) -> SessionConfig {
        settings::load_config(&self.store)
    }

    pub fn write_previous_timer(&mut self, previous: PreviousTimer) {
        self.write_all(&[
            (keys::PREVIOUS_TIMER_HOURS, PrefValue::from(previous.hours)),
            (keys::PREVIOUS_TIMER_MINUTES, PrefValue::from(previous.minutes)),
        ]);
    }

    pub fn load_previous_timer(&self) -> Option<PreviousTimer> {
        let hours = self.store.get(keys::PREVIOUS_TIMER_HOURS).ok().flatten()?;
        let minutes = self.store.get(keys::PREVIOUS_TIMER_MINUTES).ok().flatten()?;
        Some(PreviousTimer {
            hours: u32::try_from(hours.as_int()?).ok()?,
            minutes: u32::try_from(minutes.as_int()?).ok()?,
        })
    }

    /// `None` when skipped in degraded mode, otherwise whether every entry
    /// was written.
    fn write_all(&mut self, entries: &[(&str, PrefValue)]) -> Option<bool> {
        if self.degraded {
            tracing::debug!("store degraded, keeping state in memory only");
            return None;
        }
        for (key, value) in entries {
            if let Err(e) = self.store.set(key, value.clone()) {
                tracing::warn!(
                    key,
                    error = %e,
                    "preference write failed, continuing in memory only"
                );
                self.degraded = true;
                return Some(false);
            }
        }
        Some(true)
    }
}

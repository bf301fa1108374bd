//! Key/value preference store contract.
//!
//! The session engine reads and writes scalar preferences through
//! [`PreferenceStore`]. Two backends ship with the crate: [`MemoryStore`]
//! and the SQLite-backed [`Database`](super::Database).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Stable preference keys shared with the rest of the application.
pub mod keys {
    pub const WORK_DURATION: &str = "pomodoroWorkDuration";
    pub const SHORT_BREAK_DURATION: &str = "pomodoroShortBreakDuration";
    pub const LONG_BREAK_DURATION: &str = "pomodoroLongBreakDuration";
    pub const CYCLES_BEFORE_LONG_BREAK: &str = "pomodoroCyclesBeforeLongBreak";
    pub const SESSION_MODE: &str = "isPomodoroMode";
    pub const CURRENT_PHASE: &str = "currentPomodoroState";
    pub const CURRENT_SECONDS: &str = "currentPomodoroSeconds";
    pub const COMPLETED_SESSIONS: &str = "completedPomodoros";
    pub const IS_RUNNING: &str = "isPomodoroRunning";
    pub const AWAITING_CYCLE_DECISION: &str = "pomodoroAwaitingCycleDecision";
    pub const PREVIOUS_TIMER_HOURS: &str = "previousTimerHours";
    pub const PREVIOUS_TIMER_MINUTES: &str = "previousTimerMinutes";
}

/// A primitive preference value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrefValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl PrefValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            PrefValue::Int(n) => Some(*n),
            // Values written by a string-typed settings panel.
            PrefValue::Text(s) => s.trim().parse().ok(),
            PrefValue::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PrefValue::Bool(b) => Some(*b),
            PrefValue::Text(s) => s.trim().parse().ok(),
            PrefValue::Int(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PrefValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for PrefValue {
    fn from(value: bool) -> Self {
        PrefValue::Bool(value)
    }
}

impl From<i64> for PrefValue {
    fn from(value: i64) -> Self {
        PrefValue::Int(value)
    }
}

impl From<u64> for PrefValue {
    fn from(value: u64) -> Self {
        PrefValue::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<u32> for PrefValue {
    fn from(value: u32) -> Self {
        PrefValue::Int(i64::from(value))
    }
}

impl From<&str> for PrefValue {
    fn from(value: &str) -> Self {
        PrefValue::Text(value.to_string())
    }
}

impl From<String> for PrefValue {
    fn from(value: String) -> Self {
        PrefValue::Text(value)
    }
}

/// Named scalar preferences with default fallback.
///
/// Implementations may be local or remotely backed; callers on the tick path
/// never wait on anything but this trait.
pub trait PreferenceStore: Send {
    fn get(&self, key: &str) -> Result<Option<PrefValue>, StoreError>;

    fn set(&mut self, key: &str, value: PrefValue) -> Result<(), StoreError>;

    fn remove(&mut self, key: &str) -> Result<(), StoreError>;

    /// Integer preference, or `default` when missing, mistyped or unreadable.
    fn get_int_or(&self, key: &str, default: i64) -> i64 {
        match self.get(key) {
            Ok(Some(value)) => value.as_int().unwrap_or_else(|| {
                tracing::debug!(key, ?value, "preference is not an integer, using default");
                default
            }),
            Ok(None) => default,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read preference, using default");
                default
            }
        }
    }

    /// Boolean preference, or `default` when missing, mistyped or unreadable.
    fn get_bool_or(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            Ok(Some(value)) => value.as_bool().unwrap_or(default),
            Ok(None) => default,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read preference, using default");
                default
            }
        }
    }

    /// String preference, or `default` when missing, mistyped or unreadable.
    fn get_str_or(&self, key: &str, default: &str) -> String {
        match self.get(key) {
            Ok(Some(PrefValue::Text(s))) => s,
            Ok(_) => default.to_string(),
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read preference, using default");
                default.to_string()
            }
        }
    }
}

impl<T: PreferenceStore + ?Sized> PreferenceStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<PrefValue>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: PrefValue) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// In-process store. Nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, PrefValue>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<PrefValue>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: PrefValue) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.values.remove(key);
        Ok(())
    }
}

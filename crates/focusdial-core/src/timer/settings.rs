//! Settings resolver.
//!
//! Turns the raw strings of a settings form into a [`SessionConfig`].
//! Malformed input never fails: each field falls back to its default.

use serde::{Deserialize, Serialize};

use super::phase::SessionConfig;
use crate::storage::{keys, PrefValue, PreferenceStore};

/// Settings exactly as the user typed them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSettings {
    pub hours: String,
    pub minutes: String,
    pub short_break_minutes: String,
    pub long_break_minutes: String,
    pub cycles: String,
}

impl RawSettings {
    pub fn resolve(&self) -> SessionConfig {
        resolve(
            &self.hours,
            &self.minutes,
            &self.short_break_minutes,
            &self.long_break_minutes,
            &self.cycles,
        )
    }
}

/// Build a config from raw form input.
///
/// Work length is `(hours * 60 + minutes) * 60` seconds. An unparsable hours
/// or minutes field counts as zero as long as the other one parses; when both
/// are unusable, or the total is zero, the 25 minute default applies. Break
/// lengths and the cycle count fall back individually.
pub fn resolve(
    raw_hours: &str,
    raw_minutes: &str,
    raw_short_break_minutes: &str,
    raw_long_break_minutes: &str,
    raw_cycles: &str,
) -> SessionConfig {
    let work_seconds = match (parse_count(raw_hours), parse_count(raw_minutes)) {
        (None, None) => None,
        (hours, minutes) => {
            let total_minutes = hours
                .unwrap_or(0)
                .saturating_mul(60)
                .saturating_add(minutes.unwrap_or(0));
            Some(total_minutes.saturating_mul(60)).filter(|secs| *secs > 0)
        }
    }
    .unwrap_or(SessionConfig::DEFAULT_WORK_MINUTES * 60);

    let short_break_seconds = parse_positive(raw_short_break_minutes)
        .unwrap_or(SessionConfig::DEFAULT_SHORT_BREAK_MINUTES)
        .saturating_mul(60);
    let long_break_seconds = parse_positive(raw_long_break_minutes)
        .unwrap_or(SessionConfig::DEFAULT_LONG_BREAK_MINUTES)
        .saturating_mul(60);
    let cycles = parse_positive(raw_cycles)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(SessionConfig::DEFAULT_CYCLES);

    SessionConfig::new(work_seconds, short_break_seconds, long_break_seconds, cycles)
        .unwrap_or_default()
}

/// Store entries for `config`, one key per field, durations in seconds.
pub fn config_entries(config: &SessionConfig) -> [(&'static str, PrefValue); 4] {
    [
        (keys::WORK_DURATION, PrefValue::from(config.work_seconds())),
        (
            keys::SHORT_BREAK_DURATION,
            PrefValue::from(config.short_break_seconds()),
        ),
        (
            keys::LONG_BREAK_DURATION,
            PrefValue::from(config.long_break_seconds()),
        ),
        (
            keys::CYCLES_BEFORE_LONG_BREAK,
            PrefValue::from(config.cycles_before_long_break()),
        ),
    ]
}

/// Read the persisted config, defaulting each missing or invalid field.
pub fn load_config(store: &impl PreferenceStore) -> SessionConfig {
    let defaults = SessionConfig::default();
    let seconds = |key: &str, default: u64| -> u64 {
        u64::try_from(store.get_int_or(key, 0))
            .ok()
            .filter(|v| *v > 0)
            .unwrap_or(default)
    };
    let cycles = u32::try_from(store.get_int_or(keys::CYCLES_BEFORE_LONG_BREAK, 0))
        .ok()
        .filter(|v| *v > 0)
        .unwrap_or(defaults.cycles_before_long_break());

    SessionConfig::new(
        seconds(keys::WORK_DURATION, defaults.work_seconds()),
        seconds(keys::SHORT_BREAK_DURATION, defaults.short_break_seconds()),
        seconds(keys::LONG_BREAK_DURATION, defaults.long_break_seconds()),
        cycles,
    )
    .unwrap_or(defaults)
}

fn parse_count(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok()
}

fn parse_positive(raw: &str) -> Option<u64> {
    parse_count(raw).filter(|n| *n > 0)
}

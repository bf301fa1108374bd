use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Countdown mode of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    /// Session mode is off.
    #[default]
    Idle,
    Work,
    ShortBreak,
    LongBreak,
}

impl Phase {
    /// Name used in the preference store and history table.
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Work => "work",
            Phase::ShortBreak => "short-break",
            Phase::LongBreak => "long-break",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "idle" => Some(Phase::Idle),
            "work" => Some(Phase::Work),
            "short-break" => Some(Phase::ShortBreak),
            "long-break" => Some(Phase::LongBreak),
            _ => None,
        }
    }

    /// Work or one of the breaks.
    pub fn is_ticking(self) -> bool {
        self != Phase::Idle
    }

    pub fn break_kind(self) -> Option<BreakKind> {
        match self {
            Phase::ShortBreak => Some(BreakKind::Short),
            Phase::LongBreak => Some(BreakKind::Long),
            _ => None,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakKind {
    Short,
    Long,
}

/// Validated phase durations. Only [`SessionConfig::new`] builds one, so
/// every field is positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    work_seconds: u64,
    short_break_seconds: u64,
    long_break_seconds: u64,
    cycles_before_long_break: u32,
}

impl SessionConfig {
    pub const DEFAULT_WORK_MINUTES: u64 = 25;
    pub const DEFAULT_SHORT_BREAK_MINUTES: u64 = 5;
    pub const DEFAULT_LONG_BREAK_MINUTES: u64 = 15;
    pub const DEFAULT_CYCLES: u32 = 4;

    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] when any field is zero.
    pub fn new(
        work_seconds: u64,
        short_break_seconds: u64,
        long_break_seconds: u64,
        cycles_before_long_break: u32,
    ) -> Result<Self, ConfigError> {
        let fields = [
            ("work_seconds", work_seconds),
            ("short_break_seconds", short_break_seconds),
            ("long_break_seconds", long_break_seconds),
            ("cycles_before_long_break", u64::from(cycles_before_long_break)),
        ];
        if let Some((key, _)) = fields.iter().find(|(_, v)| *v == 0) {
            return Err(ConfigError::InvalidValue {
                key: (*key).to_string(),
                message: "must be greater than zero".into(),
            });
        }
        Ok(Self {
            work_seconds,
            short_break_seconds,
            long_break_seconds,
            cycles_before_long_break,
        })
    }

    pub fn work_seconds(&self) -> u64 {
        self.work_seconds
    }

    pub fn short_break_seconds(&self) -> u64 {
        self.short_break_seconds
    }

    pub fn long_break_seconds(&self) -> u64 {
        self.long_break_seconds
    }

    pub fn cycles_before_long_break(&self) -> u32 {
        self.cycles_before_long_break
    }

    /// Configured length of `phase`; zero for `Idle`.
    pub fn duration_of(&self, phase: Phase) -> u64 {
        match phase {
            Phase::Idle => 0,
            Phase::Work => self.work_seconds,
            Phase::ShortBreak => self.short_break_seconds,
            Phase::LongBreak => self.long_break_seconds,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            work_seconds: Self::DEFAULT_WORK_MINUTES * 60,
            short_break_seconds: Self::DEFAULT_SHORT_BREAK_MINUTES * 60,
            long_break_seconds: Self::DEFAULT_LONG_BREAK_MINUTES * 60,
            cycles_before_long_break: Self::DEFAULT_CYCLES,
        }
    }
}

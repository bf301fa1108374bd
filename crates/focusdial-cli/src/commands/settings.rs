use chrono::Utc;
use clap::{Args, Subcommand};
use focusdial_core::{Config, ConfigError, PomodoroSession, RawSettings, SessionConfig};

use super::open_database;

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Change Pomodoro durations; omitted fields keep their current value
    Set(SettingsForm),
    /// Print the current durations as JSON
    Show,
}

/// Settings form fields as typed. Unparsable values fall back to defaults.
#[derive(Args)]
pub struct SettingsForm {
    /// Work length, hours part
    #[arg(long)]
    hours: Option<String>,
    /// Work length, minutes part
    #[arg(long)]
    minutes: Option<String>,
    /// Short break in minutes
    #[arg(long)]
    short_break: Option<String>,
    /// Long break in minutes
    #[arg(long)]
    long_break: Option<String>,
    /// Work sessions per cycle
    #[arg(long)]
    cycles: Option<String>,
}

/// Resolve the given form fields and keep every omitted one from `current`
/// exactly, seconds included.
fn merge(current: &SessionConfig, form: &SettingsForm) -> Result<SessionConfig, ConfigError> {
    let work_given = form.hours.is_some() || form.minutes.is_some();
    let field = |value: &Option<String>| value.clone().unwrap_or_default();
    let resolved = RawSettings {
        hours: field(&form.hours),
        minutes: field(&form.minutes),
        short_break_minutes: field(&form.short_break),
        long_break_minutes: field(&form.long_break),
        cycles: field(&form.cycles),
    }
    .resolve();

    let pick = |given: bool, new: u64, old: u64| if given { new } else { old };
    SessionConfig::new(
        pick(work_given, resolved.work_seconds(), current.work_seconds()),
        pick(
            form.short_break.is_some(),
            resolved.short_break_seconds(),
            current.short_break_seconds(),
        ),
        pick(
            form.long_break.is_some(),
            resolved.long_break_seconds(),
            current.long_break_seconds(),
        ),
        if form.cycles.is_some() {
            resolved.cycles_before_long_break()
        } else {
            current.cycles_before_long_break()
        },
    )
}

pub fn run(action: SettingsAction, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let now = Utc::now();
    let mut session = PomodoroSession::restore(open_database(config)?, now);

    match action {
        SettingsAction::Set(form) => {
            let merged = merge(session.config(), &form)?;
            session.apply_config(merged, now);
            println!("{}", serde_json::to_string_pretty(&merged)?);
        }
        SettingsAction::Show => {
            println!("{}", serde_json::to_string_pretty(session.config())?);
        }
    }
    Ok(())
}

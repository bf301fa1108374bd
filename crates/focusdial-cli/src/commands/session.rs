use chrono::Utc;
use clap::Subcommand;
use focusdial_core::{
    Config, Event, HistoryRecorder, Phase, PomodoroSession, PreviousTimer, SessionDriver,
    SessionStatus, SubscriberError,
};

use super::open_database;

#[derive(Subcommand)]
pub enum SessionAction {
    /// Enter session mode (Work phase, paused)
    Activate {
        /// Hours of the countdown timer shown before session mode
        #[arg(long)]
        hours: Option<u32>,
        /// Minutes of the countdown timer shown before session mode
        #[arg(long)]
        minutes: Option<u32>,
    },
    /// Leave session mode and clear the persisted session
    Deactivate,
    /// Start or resume the countdown
    Start,
    /// Pause the countdown
    Pause,
    /// Restore the current phase to its full length, paused
    Reset,
    /// Begin the long break after a completed cycle
    Continue,
    /// Print the current session as JSON
    Status,
    /// Keep ticking in the foreground, printing events as JSON lines
    Run {
        /// Start the long break automatically instead of exiting
        #[arg(long)]
        auto_continue: bool,
        /// Also print a state-changed line on every tick
        #[arg(long)]
        all_events: bool,
    },
}

fn print_status(status: &SessionStatus) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(status)?);
    Ok(())
}

pub fn run(action: SessionAction, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    if let SessionAction::Run {
        auto_continue,
        all_events,
    } = action
    {
        return run_foreground(config, auto_continue, all_events);
    }

    let now = Utc::now();
    let mut session = PomodoroSession::restore(open_database(config)?, now);
    session.subscribe(HistoryRecorder::new(open_database(config)?));

    match action {
        SessionAction::Activate { hours, minutes } => {
            let previous = (hours.is_some() || minutes.is_some()).then(|| PreviousTimer {
                hours: hours.unwrap_or(0),
                minutes: minutes.unwrap_or(0),
            });
            session.activate(previous);
        }
        SessionAction::Deactivate => {
            let previous = session.deactivate();
            println!("{}", serde_json::to_string_pretty(&previous)?);
            return Ok(());
        }
        SessionAction::Start => {
            if session.phase() == Phase::Idle {
                return Err("session mode is not active; run `session activate` first".into());
            }
            session.start(now);
        }
        SessionAction::Pause => session.pause(),
        SessionAction::Reset => session.reset(),
        SessionAction::Continue => session.continue_cycle(now),
        SessionAction::Status | SessionAction::Run { .. } => {}
    }

    if session.is_store_degraded() {
        tracing::warn!("session state could not be saved; changes are lost on exit");
    }
    print_status(&session.status())
}

/// Host the tick scheduler until the session goes idle, a cycle completes
/// (unless `auto_continue`), or Ctrl-C.
fn run_foreground(
    config: &Config,
    auto_continue: bool,
    all_events: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let mut session = PomodoroSession::restore(open_database(config)?, Utc::now());
    session.subscribe(HistoryRecorder::new(open_database(config)?));
    session.subscribe(move |event: &Event| -> Result<(), SubscriberError> {
        if all_events || !matches!(event, Event::StateChanged { .. }) {
            println!("{}", serde_json::to_string(event)?);
        }
        Ok(())
    });

    let period = config.tick_period();
    runtime.block_on(async move {
        let mut driver = SessionDriver::new(session, period);
        let status = driver.status();
        if status.snapshot.phase == Phase::Idle {
            driver.activate(None);
        }
        if status.snapshot.awaiting_cycle_decision {
            if !auto_continue {
                tracing::info!("cycle complete, waiting for `session continue`");
                return;
            }
            driver.continue_cycle();
        } else {
            driver.start();
        }

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);
        let mut watch = tokio::time::interval(period);
        loop {
            tokio::select! {
                _ = &mut ctrl_c => {
                    tracing::info!("interrupted, pausing session");
                    driver.pause();
                    break;
                }
                _ = watch.tick() => {
                    let status = driver.status();
                    if status.snapshot.phase == Phase::Idle {
                        break;
                    }
                    if status.snapshot.awaiting_cycle_decision {
                        if !auto_continue {
                            break;
                        }
                        driver.continue_cycle();
                    }
                }
            }
        }
    });

    Ok(())
}

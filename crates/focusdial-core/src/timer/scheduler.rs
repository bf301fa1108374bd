//! Tick scheduler and session driver.
//!
//! [`TickScheduler`] owns at most one tokio interval task that calls
//! `tick(clock.now())` on the shared session. It carries no session logic:
//! the countdown is anchored to the wall clock inside the state machine, so a
//! late or skipped interval only delays the display.
//!
//! [`SessionDriver`] is what a front end talks to. It applies user actions
//! under the session lock and then starts or stops the scheduler to match
//! `is_running`.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;

use super::persistence::PreviousTimer;
use super::phase::SessionConfig;
use super::session::{PomodoroSession, SessionStatus};
use super::settings::RawSettings;
use crate::storage::PreferenceStore;

pub type SharedSession<S> = Arc<Mutex<PomodoroSession<S>>>;

/// Source of wall-clock time.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Lock the session, recovering from a poisoned mutex: a panicking
/// subscriber must not take the timer down with it.
pub fn lock_session<S>(session: &Mutex<PomodoroSession<S>>) -> MutexGuard<'_, PomodoroSession<S>> {
    session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug)]
pub struct TickScheduler {
    period: Duration,
    handle: Option<JoinHandle<()>>,
}

impl TickScheduler {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            handle: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Spawn the interval task, aborting any previous one first.
    ///
    /// The task ends on its own once the session stops running. Must be
    /// called inside a tokio runtime.
    pub fn start_update_interval<S, C>(&mut self, session: SharedSession<S>, clock: C)
    where
        S: PreferenceStore + 'static,
        C: Clock,
    {
        self.stop_update_interval();

        let period = self.period;
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick of a tokio interval completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                let mut guard = lock_session(&session);
                if !guard.is_running() {
                    tracing::debug!("session stopped running, ending tick task");
                    break;
                }
                guard.tick(clock.now());
            }
        });
        self.handle = Some(handle);
        tracing::debug!(period_ms = period.as_millis() as u64, "tick scheduler started");
    }

    pub fn stop_update_interval(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::debug!("tick scheduler stopped");
        }
    }

    /// True while an interval task is alive.
    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for TickScheduler {
    fn drop(&mut self) {
        self.stop_update_interval();
    }
}

/// Front-end entry point: user actions plus scheduler bookkeeping.
pub struct SessionDriver<S, C = SystemClock> {
    session: SharedSession<S>,
    scheduler: TickScheduler,
    clock: Arc<C>,
}

impl<S: PreferenceStore + 'static> SessionDriver<S, SystemClock> {
    pub fn new(session: PomodoroSession<S>, period: Duration) -> Self {
        Self::with_clock(session, period, SystemClock)
    }
}

impl<S, C> SessionDriver<S, C>
where
    S: PreferenceStore + 'static,
    C: Clock,
{
    /// Wrap `session`; if it was restored in a running state the scheduler
    /// starts right away.
    pub fn with_clock(session: PomodoroSession<S>, period: Duration, clock: C) -> Self {
        let mut driver = Self {
            session: Arc::new(Mutex::new(session)),
            scheduler: TickScheduler::new(period),
            clock: Arc::new(clock),
        };
        driver.sync_scheduler();
        driver
    }

    pub fn session(&self) -> SharedSession<S> {
        self.session.clone()
    }

    pub fn scheduler(&self) -> &TickScheduler {
        &self.scheduler
    }

    pub fn status(&self) -> SessionStatus {
        lock_session(&self.session).status()
    }

    pub fn activate(&mut self, previous: Option<PreviousTimer>) {
        lock_session(&self.session).activate(previous);
        self.sync_scheduler();
    }

    /// Stop ticking and leave session mode in one step.
    pub fn deactivate(&mut self) -> Option<PreviousTimer> {
        self.scheduler.stop_update_interval();
        lock_session(&self.session).deactivate()
    }

    pub fn start(&mut self) {
        let now = self.clock.now();
        lock_session(&self.session).start(now);
        self.sync_scheduler();
    }

    pub fn pause(&mut self) {
        lock_session(&self.session).pause();
        self.sync_scheduler();
    }

    pub fn reset(&mut self) {
        lock_session(&self.session).reset();
        self.sync_scheduler();
    }

    pub fn continue_cycle(&mut self) {
        let now = self.clock.now();
        lock_session(&self.session).continue_cycle(now);
        self.sync_scheduler();
    }

    /// Apply new settings without losing or double counting a second.
    ///
    /// The scheduler is stopped before the durations change and restarted
    /// afterwards; the state machine re-anchors its tick at the reassignment.
    pub fn apply_settings(&mut self, raw: &RawSettings) -> SessionConfig {
        self.scheduler.stop_update_interval();
        let config = {
            let now = self.clock.now();
            lock_session(&self.session).apply_settings(raw, now)
        };
        self.sync_scheduler();
        config
    }

    /// Align the scheduler with the session: ticking iff running.
    fn sync_scheduler(&mut self) {
        let running = lock_session(&self.session).is_running();
        if running {
            if !self.scheduler.is_active() {
                self.scheduler
                    .start_update_interval(self.session.clone(), self.clock.clone());
            }
        } else {
            self.scheduler.stop_update_interval();
        }
    }
}

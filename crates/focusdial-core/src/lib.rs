//! # Focusdial Core Library
//!
//! This library provides the Pomodoro session engine behind Focusdial. Front
//! ends (the bundled CLI, or any UI) drive it through a small set of user
//! actions and receive events back; all state survives restarts through a
//! key/value preference store.
//!
//! ## Architecture
//!
//! - **Session State Machine**: a wall-clock-anchored countdown over
//!   Work / ShortBreak / LongBreak phases that requires the caller to
//!   periodically invoke `tick(now)`
//! - **Tick Scheduler**: a tokio interval that supplies those ticks
//! - **Settings Resolver**: raw form input to a validated `SessionConfig`
//! - **Persistence**: snapshot writes to a `PreferenceStore` on every change
//! - **Notifier**: explicit subscribers for completion and refresh events
//!
//! ## Key Components
//!
//! - [`PomodoroSession`]: engine façade owning machine, persistence, notifier
//! - [`SessionDriver`]: user actions plus scheduler bookkeeping
//! - [`PreferenceStore`]: storage contract, with [`MemoryStore`] and [`Database`]
//! - [`Config`]: application configuration management

pub mod error;
pub mod events;
pub mod history;
pub mod notifier;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, StoreError};
pub use events::Event;
pub use history::HistoryRecorder;
pub use notifier::{Notifier, Subscriber, SubscriberError, SubscriptionId};
pub use storage::{Config, Database, HistorySummary, MemoryStore, PrefValue, PreferenceStore};
pub use timer::{
    BreakKind, Clock, Phase, PomodoroSession, PreviousTimer, RawSettings, SessionConfig,
    SessionDriver, SessionMachine, SessionStatus, Snapshot, SystemClock, TickScheduler,
};

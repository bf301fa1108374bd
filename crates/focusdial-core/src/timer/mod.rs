mod engine;
mod persistence;
mod phase;
mod scheduler;
mod session;
pub mod settings;

pub use engine::SessionMachine;
pub use persistence::{Persistence, PreviousTimer, Snapshot};
pub use phase::{BreakKind, Phase, SessionConfig};
pub use scheduler::{
    lock_session, Clock, SessionDriver, SharedSession, SystemClock, TickScheduler,
};
pub use session::{format_clock, PomodoroSession, SessionStatus};
pub use settings::{resolve, RawSettings};

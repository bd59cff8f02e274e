//! Output Module
//!
//! Files the engine writes for the user, as opposed to persisted state.
//!
//! ## Files
//! - Operation log: one `timestamp, command, status` line per command,
//!   appended across runs
//! - Search output: one line per `search record`, truncated each run
//!
//! Timestamps come from a [`Clock`] so tests can pin them.

mod oplog;
mod results;

pub use oplog::OperationLogger;
pub use results::SearchOutput;

/// Source of operation-log timestamps
pub trait Clock: Send {
    /// Seconds since the unix epoch
    fn now(&self) -> i64;
}

/// Wall clock via chrono
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// A clock that always reports the same instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now(&self) -> i64 {
        self.0
    }
}

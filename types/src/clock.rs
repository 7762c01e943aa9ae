//! Time source abstraction.
//!
//! The age gate needs "today" and the runtime stamps log lines; both go
//! through [`Clock`] so tests can pin time with a nullable clock.

use crate::Timestamp;

/// A source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// The operating system wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

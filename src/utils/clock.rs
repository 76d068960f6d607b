use chrono::{Local, NaiveDateTime, Timelike};

/// Represents an entity responsible for providing the current moment across
/// the application. This allows the timer to be driven by tests.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall-clock time truncated to whole seconds, the precision the
/// session table stores.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        let now = Local::now().naive_local();
        now.with_nanosecond(0).unwrap_or(now)
    }
}

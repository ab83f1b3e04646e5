//! Injected time source
//!
//! Everything that needs "now" or "today" takes a [`Clock`] instead of
//! reading the system time directly.

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, Timelike};
use std::sync::Mutex;

/// Source of the current local date and time
pub trait Clock: Send + Sync {
    /// Current local wall time, second precision
    fn now(&self) -> NaiveDateTime;

    /// Current local calendar date
    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Reads the process-local wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        let now = Local::now().naive_local();
        now.with_nanosecond(0).unwrap_or(now)
    }
}

/// Always returns the same instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl FixedClock {
    /// Midnight of the given date
    pub fn on(date: NaiveDate) -> Self {
        Self(date.and_time(chrono::NaiveTime::MIN))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Advances by `step` after every read
#[derive(Debug)]
pub struct SteppingClock {
    next: Mutex<NaiveDateTime>,
    step: Duration,
}

impl SteppingClock {
    pub fn new(start: NaiveDateTime, step: Duration) -> Self {
        Self {
            next: Mutex::new(start),
            step,
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> NaiveDateTime {
        let mut next = self.next.lock().unwrap_or_else(|e| e.into_inner());
        let current = *next;
        *next = current + self.step;
        current
    }
}

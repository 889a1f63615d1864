//! Host clock contract used as the cache staleness reference.

use std::cell::Cell;
use std::time::{SystemTime, UNIX_EPOCH};

/// Integer seconds since the Unix epoch.
pub type Timestamp = i64;

/// Source of the current integer time.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Wall clock with one-second resolution.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| {
                Timestamp::try_from(elapsed.as_secs()).unwrap_or(Timestamp::MAX)
            })
    }
}

/// Clock that only moves when told to. Useful for hosts replaying a pass.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Timestamp>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn set(&self, value: Timestamp) {
        self.now.set(value);
    }

    pub fn advance(&self, seconds: Timestamp) {
        self.now.set(self.now.get().saturating_add(seconds));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.get()
    }
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

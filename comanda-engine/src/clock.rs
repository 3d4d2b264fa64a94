//! Injectable time source
//!
//! Every timestamp-dependent decision (operative date, journal window,
//! promotion temporal criteria, audit fields) reads from a [`Clock`].
//! Production uses [`SystemClock`]; tests pin time with [`FixedClock`].

use chrono::NaiveDateTime;
use parking_lot::RwLock;

/// Wall-clock abstraction, in the local system zone
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Production clock reading the system's local time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// Pinned clock for tests; the current instant can be advanced explicitly
#[derive(Debug)]
pub struct FixedClock {
    now: RwLock<NaiveDateTime>,
}

impl FixedClock {
    pub fn new(at: NaiveDateTime) -> Self {
        Self {
            now: RwLock::new(at),
        }
    }

    /// Move the pinned instant
    pub fn set(&self, at: NaiveDateTime) {
        *self.now.write() = at;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.read()
    }
}

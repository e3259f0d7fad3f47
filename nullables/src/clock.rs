//! Nullable clock: deterministic time for testing.

use guild_types::Timestamp;
use std::cell::Cell;

/// A deterministic clock for testing.
///
/// Time only advances when you tell it to.
pub struct NullClock {
    current: Cell<u64>,
}

impl NullClock {
    pub fn new(initial_secs: u64) -> Self {
        Self {
            current: Cell::new(initial_secs),
        }
    }

    pub fn now(&self) -> Timestamp {
        Timestamp::new(self.current.get())
    }

    /// Advance time by a number of seconds and return the new time.
    pub fn advance(&self, secs: u64) -> Timestamp {
        self.current.set(self.current.get() + secs);
        self.now()
    }

    /// Jump to `deadline` plus `extra` seconds (never moves backwards).
    pub fn advance_past(&self, deadline: Timestamp, extra: u64) -> Timestamp {
        let target = deadline.as_secs() + extra;
        if target > self.current.get() {
            self.current.set(target);
        }
        self.now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_past_never_rewinds() {
        let clock = NullClock::new(100);
        assert_eq!(clock.advance_past(Timestamp::new(50), 1).as_secs(), 100);
        assert_eq!(clock.advance_past(Timestamp::new(150), 1).as_secs(), 151);
        assert_eq!(clock.advance(9).as_secs(), 160);
    }
}

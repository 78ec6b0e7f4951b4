//! Time sources.
//!
//! Trigger evaluation depends on the local calendar (day of month, day of
//! week), so the engine asks for a zoned instant rather than a bare
//! timestamp.

use std::sync::{Mutex, PoisonError};

use jiff::{tz::TimeZone, Timestamp, Zoned};

/// Supplies the current instant.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> Zoned;
}

/// Wall clock in a fixed time zone.
#[derive(Debug, Clone)]
pub struct SystemClock {
    time_zone: TimeZone,
}

impl SystemClock {
    pub fn new(time_zone: TimeZone) -> Self {
        Self { time_zone }
    }

    pub fn time_zone(&self) -> &TimeZone {
        &self.time_zone
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(TimeZone::system())
    }
}

impl TimeSource for SystemClock {
    fn now(&self) -> Zoned {
        Timestamp::now().to_zoned(self.time_zone.clone())
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<Zoned>,
}

impl FixedClock {
    pub fn new(now: Zoned) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: Zoned) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }
}

impl TimeSource for FixedClock {
    fn now(&self) -> Zoned {
        self.now
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;

    #[test]
    fn test_fixed_clock_set() {
        let start = date(2024, 3, 15).at(8, 0, 0, 0).to_zoned(TimeZone::UTC).unwrap();
        let clock = FixedClock::new(start.clone());
        assert_eq!(clock.now(), start);

        let later = date(2024, 3, 16).at(0, 0, 0, 0).to_zoned(TimeZone::UTC).unwrap();
        clock.set(later.clone());
        assert_eq!(clock.now(), later);
    }

    #[test]
    fn test_system_clock_uses_zone() {
        let clock = SystemClock::new(TimeZone::UTC);
        assert_eq!(clock.now().time_zone().iana_name(), Some("UTC"));
    }
}

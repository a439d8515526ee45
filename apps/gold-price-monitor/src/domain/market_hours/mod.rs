//! Market Hours
//!
//! Weekday trading-hours predicate for spot gold. The check is a pure
//! function of a local wall-clock time: open Monday through Friday while the
//! hour of day lies within `[open_hour, close_hour]`, both ends inclusive.
//!
//! Holidays are not modelled, and the wall clock is whatever local time zone
//! the caller supplies.

use chrono::{Datelike, NaiveDateTime, Timelike};

/// Default first trading hour (08:00).
pub const DEFAULT_OPEN_HOUR: u32 = 8;

/// Default last trading hour (20:00 through 20:59).
pub const DEFAULT_CLOSE_HOUR: u32 = 20;

/// Weekday trading window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketHours {
    open_hour: u32,
    close_hour: u32,
}

impl Default for MarketHours {
    fn default() -> Self {
        Self::new(DEFAULT_OPEN_HOUR, DEFAULT_CLOSE_HOUR)
    }
}

impl MarketHours {
    /// Create a trading window from inclusive hour bounds.
    #[must_use]
    pub const fn new(open_hour: u32, close_hour: u32) -> Self {
        Self {
            open_hour,
            close_hour,
        }
    }

    /// Check whether the market is open at the given local time.
    #[must_use]
    pub fn is_open_at(&self, at: NaiveDateTime) -> bool {
        let weekday = at.weekday().number_from_monday() <= 5;
        let hour = at.hour();
        weekday && hour >= self.open_hour && hour <= self.close_hour
    }
}

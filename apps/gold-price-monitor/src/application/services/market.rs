//! Market schedule backed by a clock port.

use std::sync::Arc;

use crate::application::ports::{Clock, SystemClock};
use crate::domain::market_hours::MarketHours;
use crate::domain::quote::MarketStatus;

/// Trading hours evaluated against a clock.
#[derive(Clone)]
pub struct MarketSchedule {
    hours: MarketHours,
    clock: Arc<dyn Clock>,
}

impl MarketSchedule {
    /// Create a schedule with an explicit clock.
    #[must_use]
    pub fn new(hours: MarketHours, clock: Arc<dyn Clock>) -> Self {
        Self { hours, clock }
    }

    /// Create a schedule using the process's local time.
    #[must_use]
    pub fn system(hours: MarketHours) -> Self {
        Self::new(hours, Arc::new(SystemClock))
    }

    /// Trading window.
    #[must_use]
    pub const fn hours(&self) -> MarketHours {
        self.hours
    }

    /// Check whether the market is open right now.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.hours.is_open_at(self.clock.now_local())
    }

    /// Market status right now.
    #[must_use]
    pub fn status(&self) -> MarketStatus {
        MarketStatus::from_open(self.is_open())
    }
}

impl std::fmt::Debug for MarketSchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketSchedule")
            .field("hours", &self.hours)
            .finish_non_exhaustive()
    }
}

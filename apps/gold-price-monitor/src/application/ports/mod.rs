//! Port Interfaces
//!
//! Defines the interfaces (ports) for external systems following
//! the Hexagonal Architecture pattern. These are the contracts that
//! infrastructure adapters must implement.
//!
//! ## Driven Ports (Outbound)
//!
//! - `PriceSourcePort`: Where quotes come from (live feed or synthetic)
//! - `QuoteStorePort`: Single-slot holder of the latest quote
//! - `QuotePublisherPort`: Fan-out of quotes to real-time subscribers
//! - `Clock`: Local wall-clock time for the market-hours check

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::domain::quote::Quote;

/// Source of gold price quotes.
///
/// Implementations must always produce a quote: upstream failures are
/// recovered inside the adapter, never returned to the caller.
#[async_trait]
pub trait PriceSourcePort: Send + Sync {
    /// Fetch the latest quote.
    async fn fetch(&self) -> Quote;

    /// Whether the source only ever synthesizes quotes.
    fn is_mock_mode(&self) -> bool;
}

/// Single-slot store for the most recent quote.
pub trait QuoteStorePort: Send + Sync {
    /// Read the current quote, if any cycle has completed.
    fn read(&self) -> Option<Arc<Quote>>;

    /// Replace the current quote.
    fn write(&self, quote: Arc<Quote>);
}

/// Publish/subscribe fan-out of quotes.
pub trait QuotePublisherPort: Send + Sync {
    /// Publish a quote to every current subscriber.
    ///
    /// Returns the number of subscribers reached, or `None` if nobody is
    /// listening.
    fn publish(&self, quote: Arc<Quote>) -> Option<usize>;
}

/// Local wall-clock time.
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    /// Current local date and time.
    fn now_local(&self) -> NaiveDateTime;
}

/// Clock backed by the process's local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_local(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

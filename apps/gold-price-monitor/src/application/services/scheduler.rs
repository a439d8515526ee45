//! Price Update Scheduler
//!
//! Drives the fetch → cache → publish cycle on a fixed-delay timer.
//!
//! # Cycle
//!
//! 1. Skip unless the market is open or updates are forced
//! 2. Fetch a quote from the price source (never fails)
//! 3. Replace the cached quote
//! 4. Publish the quote to real-time subscribers
//!
//! Steps 2-4 run on a spawned task, so a panic inside a cycle is reported as
//! [`CycleError::Panicked`] and the timer keeps running.
//!
//! At most one cycle runs at a time. The cycle lock is held by the spawned
//! task, so it outlives a caller that stops waiting. A scheduled tick that
//! finds a cycle in flight is skipped; a manual refresh waits for it.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::prelude::ToPrimitive;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio_util::sync::CancellationToken;

use super::MarketSchedule;
use crate::application::ports::{PriceSourcePort, QuotePublisherPort, QuoteStorePort};
use crate::domain::quote::Quote;
use crate::infrastructure::metrics;

// =============================================================================
// Configuration
// =============================================================================

/// Default delay between the end of one cycle and the start of the next.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(30);

/// Default delay before the first cycle after startup.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(5);

/// Scheduler timing and gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Delay between cycles.
    pub interval: Duration,
    /// Delay before the first cycle.
    pub initial_delay: Duration,
    /// Run cycles even when the market is closed.
    pub force_enabled: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_UPDATE_INTERVAL,
            initial_delay: DEFAULT_INITIAL_DELAY,
            force_enabled: false,
        }
    }
}

// =============================================================================
// Cycle Results
// =============================================================================

/// What started a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleTrigger {
    /// Timer tick.
    Scheduled,
    /// Explicit refresh request.
    Manual,
}

impl CycleTrigger {
    /// Metric label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Manual => "manual",
        }
    }
}

/// Result of a completed cycle.
#[derive(Debug, Clone)]
pub enum CycleOutcome {
    /// A quote was cached and published.
    Published {
        /// The new quote.
        quote: Arc<Quote>,
        /// Subscribers reached.
        receivers: usize,
    },
    /// Market closed and updates not forced.
    Suppressed,
    /// Another cycle was already running.
    Skipped,
}

impl CycleOutcome {
    /// Metric label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Published { .. } => "published",
            Self::Suppressed => "suppressed",
            Self::Skipped => "skipped",
        }
    }

    /// The published quote, if any.
    #[must_use]
    pub fn quote(&self) -> Option<&Arc<Quote>> {
        match self {
            Self::Published { quote, .. } => Some(quote),
            Self::Suppressed | Self::Skipped => None,
        }
    }
}

/// Errors raised by a cycle.
#[derive(Debug, Error)]
pub enum CycleError {
    /// The cycle task panicked.
    #[error("price update cycle panicked: {0}")]
    Panicked(String),

    /// The cycle task was cancelled before completing.
    #[error("price update cycle was cancelled")]
    Cancelled,
}

impl From<tokio::task::JoinError> for CycleError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_panic() {
            Self::Panicked(err.to_string())
        } else {
            Self::Cancelled
        }
    }
}

// =============================================================================
// Scheduler
// =============================================================================

/// Fixed-delay driver of the fetch → cache → publish cycle.
pub struct PriceScheduler {
    config: SchedulerConfig,
    source: Arc<dyn PriceSourcePort>,
    store: Arc<dyn QuoteStorePort>,
    publisher: Arc<dyn QuotePublisherPort>,
    market: MarketSchedule,
    cycle_lock: Arc<Mutex<()>>,
}

impl PriceScheduler {
    /// Create a new scheduler.
    #[must_use]
    pub fn new(
        config: SchedulerConfig,
        source: Arc<dyn PriceSourcePort>,
        store: Arc<dyn QuoteStorePort>,
        publisher: Arc<dyn QuotePublisherPort>,
        market: MarketSchedule,
    ) -> Self {
        Self {
            config,
            source,
            store,
            publisher,
            market,
            cycle_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Scheduler configuration.
    #[must_use]
    pub const fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Market schedule gating the cycles.
    #[must_use]
    pub const fn market(&self) -> &MarketSchedule {
        &self.market
    }

    /// Whether the price source only synthesizes quotes.
    #[must_use]
    pub fn is_mock_mode(&self) -> bool {
        self.source.is_mock_mode()
    }

    /// Run cycles on the timer until cancelled.
    ///
    /// The first cycle fires after the initial delay. Each later cycle starts
    /// one update interval after the previous one completed.
    pub async fn run(self: Arc<Self>, cancel: CancellationToken) {
        tracing::info!(
            interval_secs = self.config.interval.as_secs(),
            initial_delay_secs = self.config.initial_delay.as_secs(),
            force_enabled = self.config.force_enabled,
            mock_mode = self.is_mock_mode(),
            "Price scheduler started"
        );

        let mut delay = self.config.initial_delay;

        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(delay) => {}
            }

            tokio::select! {
                () = cancel.cancelled() => break,
                result = self.run_cycle(CycleTrigger::Scheduled) => {
                    if let Err(e) = result {
                        tracing::error!(error = %e, "Scheduled price update failed");
                    }
                }
            }

            delay = self.config.interval;
        }

        tracing::info!("Price scheduler stopping");
    }

    /// Run one cycle now, outside the timer.
    ///
    /// Waits for any in-flight cycle to finish first.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError`] if the cycle task panicked or was cancelled.
    pub async fn refresh(&self) -> Result<CycleOutcome, CycleError> {
        tracing::info!("Manual price refresh requested");
        self.run_cycle(CycleTrigger::Manual).await
    }

    async fn run_cycle(&self, trigger: CycleTrigger) -> Result<CycleOutcome, CycleError> {
        let guard = match trigger {
            CycleTrigger::Scheduled => {
                if let Ok(guard) = Arc::clone(&self.cycle_lock).try_lock_owned() {
                    guard
                } else {
                    tracing::debug!("Previous price update still running, skipping tick");
                    metrics::record_cycle(trigger.as_str(), CycleOutcome::Skipped.label());
                    return Ok(CycleOutcome::Skipped);
                }
            }
            CycleTrigger::Manual => Arc::clone(&self.cycle_lock).lock_owned().await,
        };

        let result = self.execute(guard).await;
        match &result {
            Ok(outcome) => metrics::record_cycle(trigger.as_str(), outcome.label()),
            Err(_) => metrics::record_cycle(trigger.as_str(), "failed"),
        }
        result
    }

    async fn execute(&self, guard: OwnedMutexGuard<()>) -> Result<CycleOutcome, CycleError> {
        if !self.config.force_enabled && !self.market.is_open() {
            tracing::debug!("Market closed, skipping price update");
            return Ok(CycleOutcome::Suppressed);
        }

        let source = Arc::clone(&self.source);
        let store = Arc::clone(&self.store);
        let publisher = Arc::clone(&self.publisher);

        let handle = tokio::spawn(async move {
            let _guard = guard;
            let quote = Arc::new(source.fetch().await);
            store.write(Arc::clone(&quote));
            let receivers = publisher.publish(Arc::clone(&quote)).unwrap_or(0);
            (quote, receivers)
        });
        let (quote, receivers) = handle.await?;

        if receivers == 0 {
            tracing::debug!(price = %quote.price(), "Price updated with no active subscribers");
        } else {
            tracing::info!(
                price = %quote.price(),
                change_percent = %quote.change_percent(),
                source = quote.source().as_str(),
                receivers,
                "Broadcast gold price"
            );
        }
        metrics::record_quote_published(quote.source(), receivers as u64);
        if let Some(price) = quote.price().to_f64() {
            metrics::set_last_price(price);
        }

        Ok(CycleOutcome::Published { quote, receivers })
    }
}

impl std::fmt::Debug for PriceScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriceScheduler")
            .field("config", &self.config)
            .field("market", &self.market)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================

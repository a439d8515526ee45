//! Price Source Adapters
//!
//! Implementation of `PriceSourcePort` backed by the goldprice.org feed, with
//! synthetic quotes for demo mode and for every live-feed failure.
//!
//! # Modes
//!
//! - **Mock**: the API key is a demo placeholder. No network I/O happens.
//! - **Live**: one GET per fetch, bounded by the configured timeout. Any
//!   failure is logged at WARN and replaced by a synthetic quote.

pub mod goldprice;
pub mod mock;

use std::time::Instant;

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

pub use goldprice::{GoldPriceClient, parse_payload};
pub use mock::MockQuoteGenerator;

use crate::application::ports::PriceSourcePort;
use crate::application::services::MarketSchedule;
use crate::domain::quote::Quote;
use crate::infrastructure::config::FeedSettings;
use crate::infrastructure::metrics::{self, FetchOutcome};

// =============================================================================
// Errors
// =============================================================================

/// Live feed failure. Recovered inside the adapter, never surfaced to
/// callers of [`PriceSourcePort::fetch`].
#[derive(Debug, Error)]
pub enum PriceSourceError {
    /// HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    /// Request exceeded the fetch timeout.
    #[error("request timed out")]
    Timeout,

    /// Connection or transport failure.
    #[error("network error: {0}")]
    Network(String),

    /// Upstream answered with a non-success status.
    #[error("upstream returned HTTP {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// Body was not the expected JSON shape.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// Payload had no price items.
    #[error("payload contains no price items")]
    EmptyItems,

    /// First item had no `xauPrice`.
    #[error("payload is missing xauPrice")]
    MissingPrice,

    /// Price was zero or negative.
    #[error("non-positive price: {0}")]
    NonPositivePrice(Decimal),
}

impl PriceSourceError {
    fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(err.to_string())
        }
    }

    /// Short machine-readable failure class, used as a metric label.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Client(_) => "client",
            Self::Timeout => "timeout",
            Self::Network(_) => "network",
            Self::Status { .. } => "status",
            Self::InvalidPayload(_) => "invalid_payload",
            Self::EmptyItems => "empty_items",
            Self::MissingPrice => "missing_price",
            Self::NonPositivePrice(_) => "non_positive_price",
        }
    }
}

// =============================================================================
// Adapter
// =============================================================================

enum SourceMode {
    Mock,
    Live(GoldPriceClient),
}

/// Gold price source with mock fallback.
pub struct GoldPriceSource {
    mode: SourceMode,
    generator: MockQuoteGenerator,
    market: MarketSchedule,
}

impl GoldPriceSource {
    /// Create a source from feed settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the live HTTP client cannot be built.
    pub fn new(settings: &FeedSettings, market: MarketSchedule) -> Result<Self, PriceSourceError> {
        let mode = if settings.is_mock_mode() {
            tracing::info!("Demo API key configured, gold prices will be synthesized");
            SourceMode::Mock
        } else {
            SourceMode::Live(GoldPriceClient::new(
                settings.api_url.clone(),
                settings.fetch_timeout,
            )?)
        };

        Ok(Self {
            mode,
            generator: MockQuoteGenerator::new(),
            market,
        })
    }

    /// Replace the synthetic quote generator.
    #[must_use]
    pub fn with_generator(mut self, generator: MockQuoteGenerator) -> Self {
        self.generator = generator;
        self
    }

    async fn fetch_live(&self, client: &GoldPriceClient) -> Quote {
        let started = Instant::now();
        let result = client.fetch_quote(self.market.status()).await;
        metrics::record_fetch_duration(started.elapsed());

        match result {
            Ok(quote) => {
                metrics::record_fetch(FetchOutcome::Live);
                tracing::info!(
                    price = %quote.price(),
                    currency = quote.currency(),
                    "Fetched gold price"
                );
                quote
            }
            Err(e) => {
                metrics::record_fetch(FetchOutcome::Fallback);
                metrics::record_feed_fallback(e.reason());
                tracing::warn!(
                    error = %e,
                    url = %client.url(),
                    "Gold price fetch failed, falling back to mock data"
                );
                self.generator.generate()
            }
        }
    }
}

#[async_trait]
impl PriceSourcePort for GoldPriceSource {
    async fn fetch(&self) -> Quote {
        match &self.mode {
            SourceMode::Mock => {
                metrics::record_fetch(FetchOutcome::Mock);
                self.generator.generate()
            }
            SourceMode::Live(client) => self.fetch_live(client).await,
        }
    }

    fn is_mock_mode(&self) -> bool {
        matches!(self.mode, SourceMode::Mock)
    }
}

impl std::fmt::Debug for GoldPriceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mode = match &self.mode {
            SourceMode::Mock => "mock",
            SourceMode::Live(_) => "live",
        };
        f.debug_struct("GoldPriceSource")
            .field("mode", &mode)
            .field("market", &self.market)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================

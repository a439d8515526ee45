//! Broadcast Channel Adapter
//!
//! Implements quote distribution using a tokio broadcast channel for
//! fan-out to every WebSocket session subscribed to the price topic.
//!
//! # Semantics
//!
//! - No replay: a receiver created after a publish never sees it
//! - Bounded: a receiver that falls more than `capacity` quotes behind
//!   skips ahead and sees `RecvError::Lagged`
//! - Publishing with no receivers is not an error

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::application::ports::QuotePublisherPort;
use crate::domain::quote::Quote;
use crate::infrastructure::config::BroadcastSettings;

/// Default channel capacity.
pub const DEFAULT_CAPACITY: usize = 64;

// =============================================================================
// Broadcast Messages
// =============================================================================

/// Gold price broadcast message.
#[derive(Debug, Clone)]
pub struct PriceBroadcast {
    /// The quote data.
    pub quote: Arc<Quote>,
}

// =============================================================================
// Broadcast Hub
// =============================================================================

/// Configuration for the broadcast channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastConfig {
    /// Capacity for the quote channel.
    pub capacity: usize,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl From<BroadcastSettings> for BroadcastConfig {
    fn from(settings: BroadcastSettings) -> Self {
        Self {
            capacity: settings.capacity,
        }
    }
}

/// Central hub for quote fan-out.
///
/// # Example
///
/// ```rust
/// use gold_price_monitor::infrastructure::broadcast::BroadcastHub;
///
/// let hub = BroadcastHub::with_defaults();
///
/// // Get a receiver for quotes
/// let _rx = hub.quotes_rx();
/// assert_eq!(hub.receiver_count(), 1);
/// ```
#[derive(Debug)]
pub struct BroadcastHub {
    quotes_tx: broadcast::Sender<PriceBroadcast>,
}

impl BroadcastHub {
    /// Create a new broadcast hub with the given configuration.
    ///
    /// A zero capacity is raised to one.
    #[must_use]
    pub fn new(config: BroadcastConfig) -> Self {
        Self {
            quotes_tx: broadcast::channel(config.capacity.max(1)).0,
        }
    }

    /// Create a new broadcast hub with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(BroadcastConfig::default())
    }

    /// Send a quote to all subscribers.
    ///
    /// Returns the number of receivers that received the message, or `None`
    /// if there are no active receivers.
    #[must_use]
    pub fn send_quote(&self, quote: Arc<Quote>) -> Option<usize> {
        self.quotes_tx.send(PriceBroadcast { quote }).ok()
    }

    /// Get a new receiver for quotes.
    #[must_use]
    pub fn quotes_rx(&self) -> broadcast::Receiver<PriceBroadcast> {
        self.quotes_tx.subscribe()
    }

    /// Get the number of active quote receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.quotes_tx.receiver_count()
    }
}

impl QuotePublisherPort for BroadcastHub {
    fn publish(&self, quote: Arc<Quote>) -> Option<usize> {
        self.send_quote(quote)
    }
}

/// Shared broadcast hub reference.
pub type SharedBroadcastHub = Arc<BroadcastHub>;

// =============================================================================
// Tests
// =============================================================================

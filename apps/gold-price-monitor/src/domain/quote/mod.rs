//! Gold Price Quote
//!
//! A `Quote` is one immutable spot price observation. It is built in a single
//! step from either a parsed upstream payload or synthesized values, and is
//! never modified afterwards: fields are private and there are no setters.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Weight unit every quote is denominated in (troy ounce).
pub const TROY_OUNCE: &str = "oz";

/// Default quote currency when the feed does not report one.
pub const DEFAULT_CURRENCY: &str = "USD";

// =============================================================================
// Provenance
// =============================================================================

/// Where a quote came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuoteSource {
    /// The goldprice.org spot feed.
    #[serde(rename = "GOLDPRICE.ORG")]
    GoldPriceOrg,
    /// Locally synthesized data (demo mode or feed fallback).
    #[serde(rename = "MOCK")]
    Mock,
}

impl QuoteSource {
    /// Get the provenance tag.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::GoldPriceOrg => "GOLDPRICE.ORG",
            Self::Mock => "MOCK",
        }
    }
}

/// Market status at the time a quote was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MarketStatus {
    /// Market is trading.
    Open,
    /// Market is outside trading hours.
    Closed,
}

impl MarketStatus {
    /// Build a status from an open flag.
    #[must_use]
    pub const fn from_open(open: bool) -> Self {
        if open { Self::Open } else { Self::Closed }
    }

    /// Check if the market is open.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// Get the status tag.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Closed => "CLOSED",
        }
    }
}

// =============================================================================
// Quote
// =============================================================================

/// Spot gold price observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    id: String,
    price: Decimal,
    currency: String,
    unit: String,
    change: Decimal,
    change_percent: Decimal,
    timestamp: DateTime<Utc>,
    source: QuoteSource,
    market_status: MarketStatus,
}

impl Quote {
    /// Create a new quote observed now.
    ///
    /// The quote receives a fresh UUID and the current UTC time. The unit is
    /// always troy ounces.
    #[must_use]
    pub fn new(
        price: Decimal,
        currency: impl Into<String>,
        change: Decimal,
        change_percent: Decimal,
        source: QuoteSource,
        market_status: MarketStatus,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            price,
            currency: currency.into(),
            unit: TROY_OUNCE.to_string(),
            change,
            change_percent,
            timestamp: Utc::now(),
            source,
            market_status,
        }
    }

    /// Unique quote identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Price per unit.
    #[must_use]
    pub const fn price(&self) -> Decimal {
        self.price
    }

    /// Currency code.
    #[must_use]
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Weight unit.
    #[must_use]
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Absolute change versus the previous close.
    #[must_use]
    pub const fn change(&self) -> Decimal {
        self.change
    }

    /// Percentage change versus the previous close.
    #[must_use]
    pub const fn change_percent(&self) -> Decimal {
        self.change_percent
    }

    /// Observation time.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Provenance tag.
    #[must_use]
    pub const fn source(&self) -> QuoteSource {
        self.source
    }

    /// Market status at creation.
    #[must_use]
    pub const fn market_status(&self) -> MarketStatus {
        self.market_status
    }
}

/// Round to cents, half away from zero.
#[must_use]
pub fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Percentage that `change` represents of `price`, rounded to cents.
///
/// Returns zero for a zero price.
#[must_use]
pub fn percent_of(change: Decimal, price: Decimal) -> Decimal {
    if price.is_zero() {
        return Decimal::ZERO;
    }
    round_cents(change / price * Decimal::ONE_HUNDRED)
}

// =============================================================================
// Tests
// =============================================================================

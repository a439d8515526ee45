//! Synthetic quote generator.
//!
//! Used in demo mode and as the fallback whenever the live feed fails.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

use crate::domain::quote::{
    DEFAULT_CURRENCY, MarketStatus, Quote, QuoteSource, percent_of, round_cents,
};

/// Centre of the synthetic price band, in cents.
const BASE_PRICE_CENTS: i64 = 200_000;

/// Maximum deviation from the base price, in cents.
const PRICE_SPREAD_CENTS: i64 = 5_000;

/// Maximum absolute change, in cents.
const CHANGE_SPREAD_CENTS: i64 = 1_000;

/// Generates plausible spot gold quotes around $2000/oz.
///
/// Price is uniform in `[1950.00, 2050.00]`, change uniform in
/// `[-10.00, 10.00]`, both on whole cents.
pub struct MockQuoteGenerator {
    rng: Mutex<StdRng>,
}

impl MockQuoteGenerator {
    /// Create a generator seeded from the OS.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Create a deterministic generator.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Generate a synthetic quote.
    #[must_use]
    pub fn generate(&self) -> Quote {
        let (price_offset, change_cents) = {
            let mut rng = self.rng.lock();
            (
                rng.random_range(-PRICE_SPREAD_CENTS..=PRICE_SPREAD_CENTS),
                rng.random_range(-CHANGE_SPREAD_CENTS..=CHANGE_SPREAD_CENTS),
            )
        };

        let price = round_cents(Decimal::new(BASE_PRICE_CENTS + price_offset, 2));
        let change = round_cents(Decimal::new(change_cents, 2));
        let quote = Quote::new(
            price,
            DEFAULT_CURRENCY,
            change,
            percent_of(change, price),
            QuoteSource::Mock,
            MarketStatus::Open,
        );

        tracing::debug!(price = %quote.price(), "Generated mock gold price");
        quote
    }
}

impl Default for MockQuoteGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MockQuoteGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockQuoteGenerator").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn mock_quote_is_tagged() {
        let quote = MockQuoteGenerator::new().generate();
        assert_eq!(quote.source(), QuoteSource::Mock);
        assert_eq!(quote.market_status(), MarketStatus::Open);
        assert_eq!(quote.currency(), "USD");
        assert_eq!(quote.unit(), "oz");
    }

    #[test]
    fn same_seed_same_prices() {
        let a = MockQuoteGenerator::seeded(7);
        let b = MockQuoteGenerator::seeded(7);
        for _ in 0..10 {
            let (qa, qb) = (a.generate(), b.generate());
            assert_eq!(qa.price(), qb.price());
            assert_eq!(qa.change(), qb.change());
            assert_ne!(qa.id(), qb.id());
        }
    }

    proptest! {
        #[test]
        fn synthetic_quotes_stay_in_band(seed in any::<u64>()) {
            let generator = MockQuoteGenerator::seeded(seed);
            let quote = generator.generate();

            prop_assert!(quote.price() >= Decimal::new(195_000, 2));
            prop_assert!(quote.price() <= Decimal::new(205_000, 2));
            prop_assert!(quote.change() >= Decimal::new(-1_000, 2));
            prop_assert!(quote.change() <= Decimal::new(1_000, 2));
            prop_assert!(quote.price().scale() <= 2);
            prop_assert_eq!(
                quote.change_percent(),
                round_cents(quote.change() / quote.price() * Decimal::ONE_HUNDRED)
            );
        }
    }
}

//! Latest-Quote Cache
//!
//! Single-slot holder of the most recent quote. Writers swap the whole
//! `Arc<Quote>` under a write lock, so a reader always sees one complete
//! quote.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::application::ports::QuoteStorePort;
use crate::domain::quote::Quote;

/// Last-write-wins quote cache.
#[derive(Debug, Default)]
pub struct PriceCache {
    slot: RwLock<Option<Arc<Quote>>>,
}

impl PriceCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

}

impl QuoteStorePort for PriceCache {
    fn read(&self) -> Option<Arc<Quote>> {
        self.slot.read().clone()
    }

    fn write(&self, quote: Arc<Quote>) {
        *self.slot.write() = Some(quote);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rust_decimal::Decimal;

    use super::*;
    use crate::domain::quote::{MarketStatus, QuoteSource};

    fn quote(price: i64) -> Arc<Quote> {
        Arc::new(Quote::new(
            Decimal::from(price),
            "USD",
            Decimal::ZERO,
            Decimal::ZERO,
            QuoteSource::Mock,
            MarketStatus::Open,
        ))
    }

    #[test]
    fn empty_until_first_write() {
        let cache = PriceCache::new();
        assert!(cache.read().is_none());
    }

    #[test]
    fn last_write_wins() {
        let cache = PriceCache::new();
        cache.write(quote(1990));
        cache.write(quote(2010));

        assert_eq!(cache.read().unwrap().price(), Decimal::from(2010));
    }

    #[test]
    fn concurrent_readers_see_whole_quotes() {
        let cache = Arc::new(PriceCache::new());
        let written: Vec<_> = (0..50).map(|i| quote(1950 + i)).collect();
        let prices: HashMap<String, Decimal> = written
            .iter()
            .map(|q| (q.id().to_string(), q.price()))
            .collect();

        let writer = {
            let cache = Arc::clone(&cache);
            std::thread::spawn(move || {
                for q in written {
                    cache.write(q);
                }
            })
        };
        let reader = {
            let cache = Arc::clone(&cache);
            std::thread::spawn(move || (0..500).filter_map(|_| cache.read()).collect::<Vec<_>>())
        };

        writer.join().unwrap();
        for q in reader.join().unwrap() {
            assert_eq!(prices.get(q.id()), Some(&q.price()));
        }
    }
}

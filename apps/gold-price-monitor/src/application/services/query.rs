//! Price Query Service
//!
//! Read-only view over the cached quote plus a manual refresh trigger. Every
//! query reads the cache; only [`PriceQueryService::refresh`] fetches.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use super::{CycleError, CycleOutcome, PriceScheduler};
use crate::application::ports::QuoteStorePort;
use crate::domain::quote::Quote;
use crate::domain::subscription::{GOLD_PRICE_TOPIC, TopicSubscriptions};

/// Human-readable service name reported by status and health queries.
pub const SERVICE_NAME: &str = "Gold Price Monitor";

/// Service identity reported by status and health queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceInfo {
    /// Display name.
    pub name: String,
    /// Version string.
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            name: SERVICE_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Service status snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    /// Service name.
    pub service: String,
    /// Service version.
    pub version: String,
    /// Always `"running"` while the process serves requests.
    pub status: &'static str,
    /// Whether the market is open right now.
    pub market_open: bool,
    /// Seconds between scheduled updates.
    pub update_interval_seconds: u64,
    /// Whether updates run outside market hours.
    pub force_enabled: bool,
    /// Whether quotes are synthesized.
    pub mock_mode: bool,
    /// WebSocket clients subscribed to the price topic.
    pub subscribers: usize,
    /// Snapshot time in epoch milliseconds.
    pub timestamp: i64,
}

/// Liveness report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    /// Always `"UP"`.
    pub status: &'static str,
    /// Service name.
    pub service: String,
}

/// Query surface over the latest quote and scheduler state.
#[derive(Clone)]
pub struct PriceQueryService {
    info: ServiceInfo,
    store: Arc<dyn QuoteStorePort>,
    scheduler: Arc<PriceScheduler>,
    subscriptions: Arc<TopicSubscriptions>,
}

impl PriceQueryService {
    /// Create a new query service.
    #[must_use]
    pub fn new(
        info: ServiceInfo,
        store: Arc<dyn QuoteStorePort>,
        scheduler: Arc<PriceScheduler>,
        subscriptions: Arc<TopicSubscriptions>,
    ) -> Self {
        Self {
            info,
            store,
            scheduler,
            subscriptions,
        }
    }

    /// Latest cached quote, or `None` before the first completed cycle.
    #[must_use]
    pub fn current_price(&self) -> Option<Arc<Quote>> {
        self.store.read()
    }

    /// Run one price update cycle now.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError`] if the cycle task failed.
    pub async fn refresh(&self) -> Result<CycleOutcome, CycleError> {
        self.scheduler.refresh().await
    }

    /// Current service status.
    #[must_use]
    pub fn status(&self) -> ServiceStatus {
        let config = self.scheduler.config();
        ServiceStatus {
            service: self.info.name.clone(),
            version: self.info.version.clone(),
            status: "running",
            market_open: self.scheduler.market().is_open(),
            update_interval_seconds: config.interval.as_secs(),
            force_enabled: config.force_enabled,
            mock_mode: self.scheduler.is_mock_mode(),
            subscribers: self.subscriptions.subscriber_count(GOLD_PRICE_TOPIC),
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    /// Constant liveness report.
    #[must_use]
    pub fn health(&self) -> HealthReport {
        HealthReport {
            status: "UP",
            service: self.info.name.clone(),
        }
    }
}

impl std::fmt::Debug for PriceQueryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriceQueryService")
            .field("info", &self.info)
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}

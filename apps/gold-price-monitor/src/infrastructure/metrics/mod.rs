//! Prometheus Metrics Module
//!
//! Exposes application metrics via Prometheus format for monitoring.
//!
//! # Metrics Categories
//!
//! - **Feed**: Fetches by outcome, fallbacks by reason, fetch latency
//! - **Scheduler**: Cycles by trigger and outcome
//! - **Broadcast**: Published quotes, deliveries, last price
//! - **Connections**: Active WebSocket clients
//!
//! # Integration
//!
//! Metrics are exposed at `/metrics` on the HTTP server port.

use std::sync::OnceLock;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

use crate::domain::quote::QuoteSource;

// =============================================================================
// Global Metrics Handle
// =============================================================================

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the Prometheus metrics recorder.
///
/// Subsequent calls return the handle installed by the first.
///
/// # Errors
///
/// Returns an error if another global recorder is already installed.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    if let Some(handle) = PROMETHEUS_HANDLE.get() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    register_metrics();
    Ok(PROMETHEUS_HANDLE.get_or_init(|| handle).clone())
}

/// Get the Prometheus handle for rendering metrics.
///
/// Returns `None` if metrics have not been initialized.
#[must_use]
pub fn get_metrics_handle() -> Option<PrometheusHandle> {
    PROMETHEUS_HANDLE.get().cloned()
}

// =============================================================================
// Metric Registration
// =============================================================================

fn register_metrics() {
    // Feed
    describe_counter!(
        "gold_monitor_fetches_total",
        "Total price fetches by outcome (live, fallback, mock)"
    );
    describe_counter!(
        "gold_monitor_feed_fallbacks_total",
        "Total live feed failures replaced by synthetic quotes, by reason"
    );
    describe_histogram!(
        "gold_monitor_fetch_duration_seconds",
        "Latency of live feed requests"
    );

    // Scheduler
    describe_counter!(
        "gold_monitor_cycles_total",
        "Total update cycles by trigger and outcome"
    );

    // Broadcast
    describe_counter!(
        "gold_monitor_quotes_published_total",
        "Total quotes published, by source"
    );
    describe_counter!(
        "gold_monitor_quote_deliveries_total",
        "Total quote deliveries to broadcast receivers"
    );
    describe_gauge!("gold_monitor_last_price", "Most recently published price");

    // Connections
    describe_gauge!(
        "gold_monitor_websocket_clients",
        "Number of connected WebSocket clients"
    );
}

// =============================================================================
// Metric Recording Functions
// =============================================================================

/// Metric labels for fetch outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Live quote parsed from the feed.
    Live,
    /// Live feed failed; synthetic quote returned.
    Fallback,
    /// Demo mode; synthetic quote returned.
    Mock,
}

impl FetchOutcome {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Fallback => "fallback",
            Self::Mock => "mock",
        }
    }
}

/// Record a completed fetch.
pub fn record_fetch(outcome: FetchOutcome) {
    counter!("gold_monitor_fetches_total", "outcome" => outcome.as_str()).increment(1);
}

/// Record a live feed failure.
pub fn record_feed_fallback(reason: &'static str) {
    counter!("gold_monitor_feed_fallbacks_total", "reason" => reason).increment(1);
}

/// Record live feed request latency.
pub fn record_fetch_duration(duration: Duration) {
    histogram!("gold_monitor_fetch_duration_seconds").record(duration.as_secs_f64());
}

/// Record an update cycle.
pub fn record_cycle(trigger: &'static str, outcome: &'static str) {
    counter!(
        "gold_monitor_cycles_total",
        "trigger" => trigger,
        "outcome" => outcome
    )
    .increment(1);
}

/// Record a published quote and how many receivers got it.
pub fn record_quote_published(source: QuoteSource, receivers: u64) {
    counter!(
        "gold_monitor_quotes_published_total",
        "source" => source.as_str()
    )
    .increment(1);
    counter!("gold_monitor_quote_deliveries_total").increment(receivers);
}

/// Update the last published price.
pub fn set_last_price(price: f64) {
    gauge!("gold_monitor_last_price").set(price);
}

/// Update the WebSocket client count.
pub fn set_websocket_clients(count: f64) {
    gauge!("gold_monitor_websocket_clients").set(count);
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_outcome_as_str() {
        assert_eq!(FetchOutcome::Live.as_str(), "live");
        assert_eq!(FetchOutcome::Fallback.as_str(), "fallback");
        assert_eq!(FetchOutcome::Mock.as_str(), "mock");
    }

    #[test]
    fn recording_without_recorder_is_noop() {
        record_fetch(FetchOutcome::Live);
        record_cycle("manual", "published");
        record_quote_published(QuoteSource::Mock, 3);
        set_websocket_clients(1.0);
    }
}

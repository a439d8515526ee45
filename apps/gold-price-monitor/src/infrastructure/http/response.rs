//! HTTP response DTOs.

use chrono::Utc;
use serde::Serialize;

use crate::application::services::CycleOutcome;
use crate::domain::quote::Quote;

/// Message returned before the first completed cycle.
pub const NO_PRICE_MESSAGE: &str = "no price data available yet";

/// Response from the current price query.
#[derive(Debug, Clone, Serialize)]
pub struct PriceResponse {
    /// Whether a quote is available.
    pub success: bool,
    /// The cached quote.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Quote>,
    /// Explanation when no quote is available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Response time in epoch milliseconds.
    pub timestamp: i64,
}

impl PriceResponse {
    /// Build from the cache contents.
    #[must_use]
    pub fn from_cached(quote: Option<&Quote>) -> Self {
        match quote {
            Some(quote) => Self {
                success: true,
                data: Some(quote.clone()),
                message: None,
                timestamp: now_millis(),
            },
            None => Self {
                success: false,
                data: None,
                message: Some(NO_PRICE_MESSAGE.to_string()),
                timestamp: now_millis(),
            },
        }
    }
}

/// Response from a manual refresh.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshResponse {
    /// Whether the refresh ran.
    pub success: bool,
    /// What happened.
    pub message: String,
    /// The newly published quote.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Quote>,
    /// Response time in epoch milliseconds.
    pub timestamp: i64,
}

impl RefreshResponse {
    /// Build from a completed cycle.
    #[must_use]
    pub fn from_outcome(outcome: &CycleOutcome) -> Self {
        let message = match outcome {
            CycleOutcome::Published { receivers, .. } => {
                format!("gold price refreshed and sent to {receivers} subscriber(s)")
            }
            CycleOutcome::Suppressed => "market is closed, price not updated".to_string(),
            CycleOutcome::Skipped => "an update is already in progress".to_string(),
        };
        Self {
            success: true,
            message,
            data: outcome.quote().map(|quote| (**quote).clone()),
            timestamp: now_millis(),
        }
    }

    /// Build from a failed refresh.
    #[must_use]
    pub fn failed(reason: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            message: format!("refresh failed: {reason}"),
            data: None,
            timestamp: now_millis(),
        }
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

//! Monitor Configuration Settings
//!
//! Configuration types for the gold price monitor, loaded from environment
//! variables.

use std::str::FromStr;
use std::time::Duration;

use reqwest::Url;

use crate::application::services::SchedulerConfig;
use crate::domain::market_hours::{DEFAULT_CLOSE_HOUR, DEFAULT_OPEN_HOUR, MarketHours};

/// Default spot gold endpoint.
pub const DEFAULT_API_URL: &str = "https://data-asg.goldprice.org/dbXRates/USD";

/// API key placeholder that selects mock mode.
pub const DEMO_API_KEY: &str = "demo_key";

const DEMO_SENTINELS: [&str; 3] = [DEMO_API_KEY, "demo", ""];

/// Upstream price feed API key.
///
/// The key only selects between live and mock mode; it is never sent
/// upstream.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a raw key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Check if the key is a demo placeholder (`demo_key`, `demo` or empty).
    #[must_use]
    pub fn is_demo(&self) -> bool {
        let key = self.0.trim();
        DEMO_SENTINELS
            .iter()
            .any(|sentinel| key.eq_ignore_ascii_case(sentinel))
    }

    /// Get the raw key.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl Default for ApiKey {
    fn default() -> Self {
        Self::new(DEMO_API_KEY)
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ApiKey").field(&"[REDACTED]").finish()
    }
}

/// Upstream feed settings.
#[derive(Debug, Clone)]
pub struct FeedSettings {
    /// Spot price endpoint.
    pub api_url: Url,
    /// API key (demo placeholder selects mock mode).
    pub api_key: ApiKey,
    /// Upper bound on one fetch.
    pub fetch_timeout: Duration,
}

impl FeedSettings {
    /// Check if the feed runs in mock mode.
    #[must_use]
    pub fn is_mock_mode(&self) -> bool {
        self.api_key.is_demo()
    }
}

impl Default for FeedSettings {
    #[allow(clippy::expect_used)]
    fn default() -> Self {
        Self {
            api_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            api_key: ApiKey::default(),
            fetch_timeout: Duration::from_secs(10),
        }
    }
}

/// Update scheduler settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerSettings {
    /// Delay between updates.
    pub update_interval: Duration,
    /// Delay before the first update.
    pub initial_delay: Duration,
    /// Run updates outside market hours.
    pub force_enabled: bool,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        let config = SchedulerConfig::default();
        Self {
            update_interval: config.interval,
            initial_delay: config.initial_delay,
            force_enabled: config.force_enabled,
        }
    }
}

impl From<SchedulerSettings> for SchedulerConfig {
    fn from(settings: SchedulerSettings) -> Self {
        Self {
            interval: settings.update_interval,
            initial_delay: settings.initial_delay,
            force_enabled: settings.force_enabled,
        }
    }
}

/// Trading hours settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketSettings {
    /// First trading hour.
    pub open_hour: u32,
    /// Last trading hour (inclusive).
    pub close_hour: u32,
}

impl MarketSettings {
    /// Trading window.
    #[must_use]
    pub const fn hours(&self) -> MarketHours {
        MarketHours::new(self.open_hour, self.close_hour)
    }
}

impl Default for MarketSettings {
    fn default() -> Self {
        Self {
            open_hour: DEFAULT_OPEN_HOUR,
            close_hour: DEFAULT_CLOSE_HOUR,
        }
    }
}

/// Broadcast channel settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastSettings {
    /// Capacity of the quote broadcast channel.
    pub capacity: usize,
}

impl Default for BroadcastSettings {
    fn default() -> Self {
        Self { capacity: 64 }
    }
}

/// Server port settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerSettings {
    /// HTTP port serving the API, WebSocket endpoint, probes and metrics.
    pub http_port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { http_port: 8080 }
    }
}

/// Complete monitor configuration.
#[derive(Debug, Clone, Default)]
pub struct MonitorConfig {
    /// Upstream feed settings.
    pub feed: FeedSettings,
    /// Scheduler settings.
    pub scheduler: SchedulerSettings,
    /// Trading hours.
    pub market: MarketSettings,
    /// Server port settings.
    pub server: ServerSettings,
    /// Broadcast channel settings.
    pub broadcast: BroadcastSettings,
}

impl MonitorConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a value is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup.
    ///
    /// Missing or unparsable optional values fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error for a malformed URL, a zero interval or timeout, or
    /// an invalid trading window.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_url = match lookup("GOLD_API_URL") {
            Some(raw) if !raw.trim().is_empty() => {
                Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidUrl {
                    key: "GOLD_API_URL".to_string(),
                    reason: e.to_string(),
                })?
            }
            _ => defaults.feed.api_url,
        };

        let feed = FeedSettings {
            api_url,
            api_key: lookup("GOLD_API_KEY").map_or_else(ApiKey::default, ApiKey::new),
            fetch_timeout: parse_duration_secs(
                &lookup,
                "GOLD_FETCH_TIMEOUT_SECS",
                defaults.feed.fetch_timeout,
            ),
        };

        let scheduler = SchedulerSettings {
            update_interval: parse_duration_secs(
                &lookup,
                "GOLD_UPDATE_INTERVAL_SECS",
                defaults.scheduler.update_interval,
            ),
            initial_delay: parse_duration_secs(
                &lookup,
                "GOLD_INITIAL_DELAY_SECS",
                defaults.scheduler.initial_delay,
            ),
            force_enabled: parse_bool(
                &lookup,
                "GOLD_FORCE_ENABLED",
                defaults.scheduler.force_enabled,
            ),
        };

        let market = MarketSettings {
            open_hour: parse_or(&lookup, "GOLD_MARKET_OPEN_HOUR", defaults.market.open_hour),
            close_hour: parse_or(&lookup, "GOLD_MARKET_CLOSE_HOUR", defaults.market.close_hour),
        };

        let server = ServerSettings {
            http_port: parse_or(&lookup, "GOLD_MONITOR_HTTP_PORT", defaults.server.http_port),
        };

        let broadcast = BroadcastSettings {
            capacity: parse_or(
                &lookup,
                "GOLD_MONITOR_BROADCAST_CAPACITY",
                defaults.broadcast.capacity,
            ),
        };

        let config = Self {
            feed,
            scheduler,
            market,
            server,
            broadcast,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.feed.fetch_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "GOLD_FETCH_TIMEOUT_SECS".to_string(),
                reason: "must be at least 1 second".to_string(),
            });
        }
        if self.scheduler.update_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "GOLD_UPDATE_INTERVAL_SECS".to_string(),
                reason: "must be at least 1 second".to_string(),
            });
        }
        if self.market.close_hour > 23 {
            return Err(ConfigError::InvalidValue {
                key: "GOLD_MARKET_CLOSE_HOUR".to_string(),
                reason: "must be an hour of day (0-23)".to_string(),
            });
        }
        if self.market.open_hour > self.market.close_hour {
            return Err(ConfigError::InvalidValue {
                key: "GOLD_MARKET_OPEN_HOUR".to_string(),
                reason: "must not be after GOLD_MARKET_CLOSE_HOUR".to_string(),
            });
        }
        if self.broadcast.capacity == 0 {
            return Err(ConfigError::InvalidValue {
                key: "GOLD_MONITOR_BROADCAST_CAPACITY".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// URL variable could not be parsed.
    #[error("invalid URL in {key}: {reason}")]
    InvalidUrl {
        /// Environment variable name.
        key: String,
        /// Parser message.
        reason: String,
    },
    /// Value parsed but is out of range.
    #[error("invalid value for {key}: {reason}")]
    InvalidValue {
        /// Environment variable name.
        key: String,
        /// Constraint that was violated.
        reason: String,
    },
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_duration_secs<F>(lookup: &F, key: &str, default: Duration) -> Duration
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map_or(default, Duration::from_secs)
}

fn parse_bool<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).map_or(default, |v| match v.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => true,
        "false" | "0" | "no" | "off" => false,
        _ => default,
    })
}

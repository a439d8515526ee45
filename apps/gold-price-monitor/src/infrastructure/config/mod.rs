//! Configuration Module
//!
//! Configuration loading for the gold price monitor.

mod settings;

pub use settings::{
    ApiKey, BroadcastSettings, ConfigError, DEFAULT_API_URL, DEMO_API_KEY, FeedSettings,
    MarketSettings, MonitorConfig, SchedulerSettings, ServerSettings,
};

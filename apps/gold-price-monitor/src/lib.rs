#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::needless_collect,
        clippy::option_if_let_else,
        clippy::default_trait_access,
        clippy::items_after_statements,
        clippy::or_fun_call
    )
)]

//! Gold Price Monitor - Spot Gold Price Broadcaster
//!
//! Polls a spot gold price feed on a fixed interval during market hours,
//! caches the latest quote and pushes it to WebSocket subscribers. When the
//! feed is unconfigured or failing, synthetic quotes keep the stream alive.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Core price types and rules
//!   - `quote`: Quote value type, provenance and rounding
//!   - `market_hours`: Trading-hours predicate
//!   - `subscription`: Topic subscription tracking
//!
//! - **Application**: Use cases and port definitions
//!   - `ports`: Price source, quote store, publisher and clock interfaces
//!   - `services`: Market schedule, refresh scheduler, query surface
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `price_source`: goldprice.org client and mock generator
//!   - `cache`: Latest-quote slot
//!   - `broadcast`: Channel-based quote distribution
//!   - `http`: Query API, probes, metrics
//!   - `websocket`: Price stream sessions
//!   - `config`: Environment configuration
//!
//! # Data Flow
//!
//! ```text
//!                      ┌─────────────┐
//! goldprice.org ──────►│             │     ┌─────────┐
//!   (or mock)          │  Scheduler  │────►│  Cache  │◄──── GET /api/gold/*
//!                      │             │     └─────────┘
//!  POST /refresh ─────►│             │     ┌─────────────┐
//!                      └─────────────┘────►│  Broadcast  │──► WS client 1
//!                                          │   Channel   │──► WS client 2
//!                                          └─────────────┘──► WS client N
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Core price types with no I/O.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::market_hours::MarketHours;
pub use domain::quote::{MarketStatus, Quote, QuoteSource};
pub use domain::subscription::{
    ConsumerId, GOLD_PRICE_TOPIC, TopicSubscriptions,
};

// Application services
pub use application::ports::{
    Clock, PriceSourcePort, QuotePublisherPort, QuoteStorePort, SystemClock,
};
pub use application::services::{
    CycleError, CycleOutcome, CycleTrigger, MarketSchedule, PriceQueryService, PriceScheduler,
    SchedulerConfig, ServiceInfo,
};

// Infrastructure config
pub use infrastructure::config::{
    ApiKey, BroadcastSettings, ConfigError, FeedSettings, MarketSettings, MonitorConfig,
    SchedulerSettings, ServerSettings,
};

// Adapters (for integration tests)
pub use infrastructure::broadcast::{
    BroadcastConfig, BroadcastHub, SharedBroadcastHub,
};
pub use infrastructure::cache::PriceCache;
pub use infrastructure::price_source::{GoldPriceSource, MockQuoteGenerator, PriceSourceError};

// HTTP + WebSocket server
pub use infrastructure::http::{AppState, HttpServer, HttpServerError, create_router};
pub use infrastructure::websocket::{MessageRouter, WebSocketState};

// Metrics
pub use infrastructure::metrics::init_metrics;

// Telemetry
pub use infrastructure::telemetry::{TelemetryConfig, TelemetryGuard, init as init_telemetry};

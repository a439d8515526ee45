//! Infrastructure Layer - Adapters and external integrations.
//!
//! This layer contains the concrete implementations of the port interfaces
//! defined in the application layer.

/// Upstream spot price feed and synthetic fallback.
pub mod price_source;

/// Latest-quote cache.
pub mod cache;

/// Broadcast channel adapters for quote distribution.
pub mod broadcast;

/// Configuration loaded from the environment.
pub mod config;

/// HTTP query API, probes and metrics endpoint.
pub mod http;

/// WebSocket price stream sessions.
pub mod websocket;

/// Prometheus metrics instrumentation.
pub mod metrics;

/// OpenTelemetry tracing integration.
pub mod telemetry;

//! Domain Layer - Core price types and business rules.
//!
//! This layer contains the core domain types for the gold price monitor
//! with no I/O. All types here are pure Rust with serialization support.

/// Gold price quotes and their provenance.
pub mod quote;

/// Trading-hours predicate for the spot gold market.
pub mod market_hours;

/// Topic subscription tracking for real-time consumers.
pub mod subscription;

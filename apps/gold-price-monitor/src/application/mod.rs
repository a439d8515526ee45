//! Application Layer - Use cases and port definitions.
//!
//! This layer contains the application services and port interfaces
//! that define how the domain interacts with external systems.

/// Port interfaces for external systems (price feed, cache, broadcast, clock).
pub mod ports;

/// Application services for the refresh cycle and the query surface.
pub mod services;

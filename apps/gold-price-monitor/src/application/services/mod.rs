//! Application Services
//!
//! Services that orchestrate domain logic and coordinate between ports.
//!
//! - `MarketSchedule`: Market-hours check against the local clock
//! - `PriceScheduler`: Timed fetch → cache → publish cycle
//! - `PriceQueryService`: Read-only query surface plus manual refresh

mod market;
mod query;
mod scheduler;

pub use market::MarketSchedule;
pub use query::{HealthReport, PriceQueryService, SERVICE_NAME, ServiceInfo, ServiceStatus};
pub use scheduler::{
    CycleError, CycleOutcome, CycleTrigger, DEFAULT_INITIAL_DELAY, DEFAULT_UPDATE_INTERVAL,
    PriceScheduler, SchedulerConfig,
};

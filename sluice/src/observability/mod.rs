//! Observability utilities.

mod logging;
mod stats;

pub use logging::{init_logging, LogFormat, DEFAULT_FILTER};
pub use stats::{InFlightGuard, PipelineStats, PipelineStatsSnapshot};

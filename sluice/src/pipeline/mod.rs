//! Pipeline building and execution.
//!
//! This module provides:
//! - The [`Pipeline`] and its per-item execution protocol
//! - A [`PipelineBuilder`]
//! - Error observers notified when an item fails

mod builder;
mod observers;
mod runner;

pub use builder::PipelineBuilder;
pub use observers::{ErrorObserver, ErrorObservers, ObserverId};
pub use runner::{FailureStage, Pipeline};

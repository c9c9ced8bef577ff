//! Testing utilities for sluice pipelines.
//!
//! This module provides:
//! - [`ManualSource`], a source the test feeds by hand
//! - Recording and failing middleware that write to a shared [`ExecutionLog`]
//! - Assertions over execution order and emitted events

mod assertions;
mod fixtures;
mod mocks;

pub use assertions::{assert_event_types, assert_execution_order, assert_not_executed};
pub use fixtures::ManualSource;
pub use mocks::{ExecutionLog, FailingMiddleware, RecordingMiddleware};

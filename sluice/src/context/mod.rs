//! Per-item context for pipeline execution.
//!
//! This module provides:
//! - The [`Context`] every item travels in, with its one-way done flag
//! - A thread-safe [`Annotations`] bag middleware share data through

mod bags;
#[cfg(test)]
mod context_tests;
mod execution;

pub use bags::Annotations;
pub use execution::{Context, ContextState};

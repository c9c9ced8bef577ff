//! # Sluice
//!
//! Source-driven async middleware pipelines.
//!
//! A [`Source`](source::Source) produces items from whatever it adapts (a
//! socket, a queue consumer, a file watcher) and hands each one to the
//! [`Pipeline`](pipeline::Pipeline) it feeds. The pipeline wraps the item in
//! a [`Context`](context::Context) and runs it through its middleware one
//! step at a time:
//!
//! - **Strict ordering**: each middleware finishes before the next starts
//! - **Short-circuiting**: any step, or the source's context hook, can mark
//!   the item done and skip the rest of the chain
//! - **Per-item failure**: errors reach the error observers and the source,
//!   and never stop the pipeline
//! - **Concurrent items**: separate items are processed independently
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sluice::prelude::*;
//!
//! let pipeline = Pipeline::builder(queue_consumer)
//!     .name("orders")
//!     .middleware(middleware_fn("decode", |ctx| async move { decode(&ctx).await }))
//!     .sink(middleware_fn("store", |ctx| async move { store(&ctx).await }))
//!     .build();
//!
//! pipeline.on_error(|err, ctx| tracing::error!(item_id = %ctx.id(), %err, "order failed"));
//! pipeline.start().await?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod context;
pub mod errors;
pub mod events;
pub mod middleware;
pub mod observability;
pub mod pipeline;
pub mod source;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::PipelineConfig;
    pub use crate::context::{Annotations, Context, ContextState};
    pub use crate::errors::{HookKind, SluiceError};
    pub use crate::events::{
        CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink,
    };
    pub use crate::middleware::{middleware_fn, FnMiddleware, Middleware, Terminal};
    pub use crate::observability::{init_logging, LogFormat, PipelineStatsSnapshot};
    pub use crate::pipeline::{FailureStage, ObserverId, Pipeline, PipelineBuilder};
    pub use crate::source::{ItemHandler, Source};
}

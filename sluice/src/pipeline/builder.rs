//! Pipeline builder.

use super::runner::PipelineInner;
use super::{ErrorObservers, Pipeline};
use crate::config::PipelineConfig;
use crate::events::{EventSink, NoOpEventSink};
use crate::middleware::{BoxedMiddleware, Middleware, MiddlewareChain, Terminal};
use crate::observability::PipelineStats;
use crate::source::Source;
use std::sync::Arc;

/// Builder for [`Pipeline`]s.
///
/// Middleware can be registered here or on the built pipeline; either way
/// they run in the order they were added.
pub struct PipelineBuilder<S: Source> {
    source: S,
    config: PipelineConfig,
    event_sink: Arc<dyn EventSink>,
    middleware: Vec<BoxedMiddleware<S::Item, S::Error>>,
}

impl<S: Source> PipelineBuilder<S> {
    /// Creates a builder for a pipeline fed by `source`.
    pub fn new(source: S) -> Self {
        Self {
            source,
            config: PipelineConfig::default(),
            event_sink: Arc::new(NoOpEventSink),
            middleware: Vec::new(),
        }
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the pipeline name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Sets the event sink.
    #[must_use]
    pub fn event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = sink;
        self
    }

    /// Appends a middleware.
    #[must_use]
    pub fn middleware<M>(mut self, middleware: M) -> Self
    where
        M: Middleware<S::Item, S::Error> + 'static,
    {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Appends a terminal middleware.
    #[must_use]
    pub fn sink<M>(self, middleware: M) -> Self
    where
        M: Middleware<S::Item, S::Error> + 'static,
    {
        self.middleware(Terminal::new(middleware))
    }

    /// Returns the number of middleware registered so far.
    #[must_use]
    pub fn middleware_count(&self) -> usize {
        self.middleware.len()
    }

    /// Builds the pipeline and subscribes it to the source.
    pub fn build(self) -> Pipeline<S> {
        let chain = MiddlewareChain::new();
        for middleware in self.middleware {
            chain.push(middleware);
        }

        Pipeline::from_inner(PipelineInner {
            config: self.config,
            source: self.source,
            chain,
            observers: ErrorObservers::new(),
            event_sink: self.event_sink,
            stats: PipelineStats::new(),
        })
    }
}

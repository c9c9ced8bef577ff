//! The pipeline and its per-item execution protocol.

use super::{ErrorObserver, ErrorObservers, ObserverId, PipelineBuilder};
use crate::config::PipelineConfig;
use crate::context::Context;
use crate::errors::{HookKind, SluiceError};
use crate::events::{types, EventSink};
use crate::middleware::{FnMiddleware, Middleware, MiddlewareChain, Terminal};
use crate::observability::{PipelineStats, PipelineStatsSnapshot};
use crate::source::{ItemHandler, Source};
use futures::FutureExt;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Weak};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Where an item's processing failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureStage {
    /// One of the source hooks.
    Hook(HookKind),
    /// A middleware step.
    Middleware {
        /// Position in the chain.
        index: usize,
        /// Middleware name.
        name: String,
    },
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hook(hook) => write!(f, "{hook} hook"),
            Self::Middleware { index, name } => write!(f, "middleware #{index} ({name})"),
        }
    }
}

/// How an item that did not fail finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemOutcome {
    /// The context-create hook marked the item done.
    Rejected,
    /// A middleware marked the item done with more middleware after it.
    ShortCircuited { at: usize },
    /// The chain ran to its end.
    Completed,
}

pub(super) struct PipelineInner<S: Source> {
    pub(super) config: PipelineConfig,
    pub(super) source: S,
    pub(super) chain: MiddlewareChain<S::Item, S::Error>,
    pub(super) observers: ErrorObservers<S::Item, S::Error>,
    pub(super) event_sink: Arc<dyn EventSink>,
    pub(super) stats: PipelineStats,
}

/// A sequential middleware pipeline fed by a [`Source`].
///
/// Every item the source produces gets its own [`Context`] and runs through
/// the registered middleware in registration order. Items are independent:
/// a failure is reported to the error observers and to whoever awaits that
/// item's handler future, and the pipeline keeps accepting items.
///
/// Cloning is cheap and yields another handle to the same pipeline.
///
/// # Example
///
/// ```rust,ignore
/// let pipeline = Pipeline::new(queue_consumer);
/// pipeline.add_fn("decode", |ctx| async move { decode(ctx.payload()).await });
/// pipeline.sink_fn("store", |ctx| async move { store(ctx.payload()).await });
/// pipeline.on_error(|err, ctx| eprintln!("item {} failed: {err}", ctx.id()));
/// pipeline.start().await?;
/// ```
pub struct Pipeline<S: Source> {
    inner: Arc<PipelineInner<S>>,
}

impl<S: Source> Pipeline<S> {
    /// Creates a pipeline with the default configuration and subscribes to
    /// `source`.
    pub fn new(source: S) -> Self {
        PipelineBuilder::new(source).build()
    }

    /// Creates a builder for a pipeline fed by `source`.
    pub fn builder(source: S) -> PipelineBuilder<S> {
        PipelineBuilder::new(source)
    }

    pub(super) fn from_inner(inner: PipelineInner<S>) -> Self {
        let inner = Arc::new(inner);
        inner.source.subscribe(handler_for(Arc::downgrade(&inner)));
        Self { inner }
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.config.name
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.inner.config
    }

    /// Returns the source this pipeline is bound to.
    #[must_use]
    pub fn source(&self) -> &S {
        &self.inner.source
    }

    /// Appends a middleware to the end of the chain.
    pub fn add<M>(&self, middleware: M)
    where
        M: Middleware<S::Item, S::Error> + 'static,
    {
        self.inner.chain.push(Arc::new(middleware));
    }

    /// Appends an async closure as middleware.
    pub fn add_fn<F, Fut>(&self, name: impl Into<String>, func: F)
    where
        F: Fn(Arc<Context<S::Item>>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), S::Error>> + Send + 'static,
    {
        self.add(FnMiddleware::new(name, func));
    }

    /// Appends a terminal middleware: once it succeeds the item is done.
    pub fn sink<M>(&self, middleware: M)
    where
        M: Middleware<S::Item, S::Error> + 'static,
    {
        self.add(Terminal::new(middleware));
    }

    /// Appends an async closure as terminal middleware.
    pub fn sink_fn<F, Fut>(&self, name: impl Into<String>, func: F)
    where
        F: Fn(Arc<Context<S::Item>>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), S::Error>> + Send + 'static,
    {
        self.sink(FnMiddleware::new(name, func));
    }

    /// Subscribes to item failures.
    ///
    /// Observers run synchronously, in registration order, before the
    /// failure is returned to the source.
    pub fn on_error<F>(&self, observer: F) -> ObserverId
    where
        F: Fn(&S::Error, &Context<S::Item>) + Send + Sync + 'static,
    {
        let observer: ErrorObserver<S::Item, S::Error> = Arc::new(observer);
        self.inner.observers.register(observer)
    }

    /// Unsubscribes an error observer. Returns false if it was not registered.
    pub fn remove_error_observer(&self, id: ObserverId) -> bool {
        self.inner.observers.remove(id)
    }

    /// Returns the number of middleware in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.chain.len()
    }

    /// Returns true if no middleware is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.chain.is_empty()
    }

    /// Returns the middleware names in chain order.
    #[must_use]
    pub fn middleware_names(&self) -> Vec<String> {
        self.inner.chain.names()
    }

    /// Returns a copy of the item counters.
    #[must_use]
    pub fn stats(&self) -> PipelineStatsSnapshot {
        self.inner.stats.snapshot()
    }

    /// Starts the source.
    pub async fn start(&self) -> Result<(), S::Error> {
        info!(pipeline = %self.name(), middleware = self.len(), "starting source");
        self.inner.source.start().await
    }

    /// Stops the source. Items already in flight are not aborted.
    pub async fn stop(&self) -> Result<(), S::Error> {
        info!(pipeline = %self.name(), "stopping source");
        self.inner.source.stop().await
    }

    /// Processes one item, exactly as if the source had produced it.
    pub async fn process(&self, item: S::Item) -> Result<(), S::Error> {
        self.inner.process(item).await
    }
}

impl<S: Source> Clone for Pipeline<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: Source> fmt::Debug for Pipeline<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.inner.config.name)
            .field("middleware", &self.inner.chain)
            .field("observers", &self.inner.observers)
            .finish_non_exhaustive()
    }
}

/// Builds the handler a source calls for each item.
///
/// The handler only holds a weak reference so that the source, which the
/// pipeline owns, does not keep the pipeline alive.
fn handler_for<S: Source>(inner: Weak<PipelineInner<S>>) -> ItemHandler<S::Item, S::Error> {
    ItemHandler::new(move |item| {
        let inner = inner.upgrade();
        async move {
            match inner {
                Some(inner) => inner.process(item).await,
                None => Err(S::Error::from(SluiceError::PipelineDropped)),
            }
        }
        .boxed()
    })
}

impl<S: Source> PipelineInner<S> {
    async fn process(&self, item: S::Item) -> Result<(), S::Error> {
        let _in_flight = self.stats.record_received();
        let ctx = Arc::new(Context::new(item));
        let started = Instant::now();

        self.emit(
            types::ITEM_RECEIVED,
            serde_json::json!({
                "pipeline": self.config.name,
                "item_id": ctx.id().to_string(),
            }),
        );

        match self.run(&ctx).await {
            Ok(outcome) => {
                self.finish(&ctx, outcome, started);
                Ok(())
            }
            Err((stage, error)) => {
                self.fail(&ctx, &stage, &error, started);
                Err(error)
            }
        }
    }

    async fn run(
        &self,
        ctx: &Arc<Context<S::Item>>,
    ) -> Result<ItemOutcome, (FailureStage, S::Error)> {
        self.source
            .on_context_create(ctx)
            .await
            .map_err(|e| (FailureStage::Hook(HookKind::ContextCreate), e))?;

        if ctx.is_done() {
            return Ok(ItemOutcome::Rejected);
        }

        let mut outcome = ItemOutcome::Completed;
        let mut index = 0;

        // The chain is re-read at every step; see `MiddlewareChain`.
        while let Some(step) = self.chain.get(index) {
            let middleware = &*step;
            let step_started = Instant::now();

            middleware.handle(Arc::clone(ctx)).await.map_err(|e| {
                let stage = FailureStage::Middleware {
                    index,
                    name: middleware.name().to_string(),
                };
                (stage, e)
            })?;

            let duration_ms = step_started.elapsed().as_secs_f64() * 1000.0;
            debug!(
                pipeline = %self.config.name,
                item_id = %ctx.id(),
                middleware = middleware.name(),
                index,
                duration_ms,
                "middleware completed"
            );
            self.emit(
                types::MIDDLEWARE_COMPLETED,
                serde_json::json!({
                    "pipeline": self.config.name,
                    "item_id": ctx.id().to_string(),
                    "middleware": middleware.name(),
                    "index": index,
                    "duration_ms": duration_ms,
                }),
            );

            index += 1;
            if ctx.is_done() {
                if index < self.chain.len() {
                    outcome = ItemOutcome::ShortCircuited { at: index - 1 };
                }
                break;
            }
        }

        self.source
            .on_done(ctx)
            .await
            .map_err(|e| (FailureStage::Hook(HookKind::Done), e))?;

        Ok(outcome)
    }

    fn finish(&self, ctx: &Context<S::Item>, outcome: ItemOutcome, started: Instant) {
        let duration_ms = started.elapsed().as_secs_f64() * 1000.0;

        match outcome {
            ItemOutcome::Rejected => {
                self.stats.record_rejected();
                debug!(pipeline = %self.config.name, item_id = %ctx.id(), "item rejected");
                self.emit(
                    types::ITEM_REJECTED,
                    serde_json::json!({
                        "pipeline": self.config.name,
                        "item_id": ctx.id().to_string(),
                        "duration_ms": duration_ms,
                    }),
                );
                return;
            }
            ItemOutcome::ShortCircuited { at } => {
                self.stats.record_short_circuited();
                self.emit(
                    types::ITEM_SHORT_CIRCUITED,
                    serde_json::json!({
                        "pipeline": self.config.name,
                        "item_id": ctx.id().to_string(),
                        "index": at,
                    }),
                );
            }
            ItemOutcome::Completed => {}
        }

        self.stats.record_completed();
        debug!(pipeline = %self.config.name, item_id = %ctx.id(), duration_ms, "item completed");
        self.emit(
            types::ITEM_COMPLETED,
            serde_json::json!({
                "pipeline": self.config.name,
                "item_id": ctx.id().to_string(),
                "duration_ms": duration_ms,
            }),
        );
    }

    fn fail(
        &self,
        ctx: &Context<S::Item>,
        stage: &FailureStage,
        error: &S::Error,
        started: Instant,
    ) {
        self.stats.record_failed();
        self.emit(
            types::ITEM_FAILED,
            serde_json::json!({
                "pipeline": self.config.name,
                "item_id": ctx.id().to_string(),
                "stage": stage.to_string(),
                "error": error.to_string(),
                "duration_ms": started.elapsed().as_secs_f64() * 1000.0,
            }),
        );

        let notified = self.observers.notify(error, ctx);
        if notified == 0 && self.config.log_unhandled_errors {
            warn!(
                pipeline = %self.config.name,
                item_id = %ctx.id(),
                stage = %stage,
                error = %error,
                "unhandled pipeline error"
            );
        } else {
            debug!(
                pipeline = %self.config.name,
                item_id = %ctx.id(),
                stage = %stage,
                error = %error,
                observers = notified,
                "item failed"
            );
        }
    }

    fn emit(&self, event_type: &str, data: serde_json::Value) {
        if self.config.emit_events {
            self.event_sink.try_emit(event_type, Some(data));
        }
    }
}

//! The contract a data source implements to feed a pipeline.
//!
//! A source produces items from whatever it adapts (a socket, a queue, a
//! file watcher) and hands each one to the single [`ItemHandler`] the
//! pipeline registered through [`Source::subscribe`]. Awaiting the future the
//! handler returns tells the source whether that item was processed; sources
//! may use it for acknowledgement or backpressure.

use crate::context::Context;
use crate::errors::SluiceError;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;

/// Trait for item sources.
///
/// Only [`start`](Source::start) and [`subscribe`](Source::subscribe) are
/// required. The lifecycle and context hooks default to no-ops.
#[async_trait]
pub trait Source: Send + Sync + 'static {
    /// The item type this source produces.
    type Item: Send + Sync + 'static;

    /// The error type shared by this source, its hooks and the middleware
    /// of any pipeline it feeds.
    type Error: std::error::Error + From<SluiceError> + Send + Sync + 'static;

    /// Begins producing items.
    ///
    /// May be a no-op when items already flow.
    async fn start(&self) -> Result<(), Self::Error>;

    /// Stops producing items and releases resources.
    async fn stop(&self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Registers the handler to invoke once per produced item.
    ///
    /// A pipeline calls this exactly once, when it is constructed. Only one
    /// handler per source is supported.
    fn subscribe(&self, handler: ItemHandler<Self::Item, Self::Error>);

    /// Called right after a context is created, before any middleware.
    ///
    /// Marking the context done here rejects the item: neither the
    /// middleware chain nor [`on_done`](Source::on_done) runs.
    async fn on_context_create(&self, _ctx: &Context<Self::Item>) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called after the middleware chain completes without failure.
    async fn on_done(&self, _ctx: &Context<Self::Item>) -> Result<(), Self::Error> {
        Ok(())
    }
}

type HandlerFn<T, E> = dyn Fn(T) -> BoxFuture<'static, Result<(), E>> + Send + Sync;

/// The callback a source invokes for every item it produces.
///
/// Cloning is cheap. Every invocation returns an independent future; the
/// pipeline does not serialize invocations.
pub struct ItemHandler<T, E> {
    func: Arc<HandlerFn<T, E>>,
}

impl<T, E> ItemHandler<T, E> {
    /// Wraps a handler function.
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(T) -> BoxFuture<'static, Result<(), E>> + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
        }
    }

    /// Hands one item to the pipeline.
    ///
    /// The returned future resolves once the item has been fully processed,
    /// with the original error if processing failed.
    pub fn call(&self, item: T) -> BoxFuture<'static, Result<(), E>> {
        (self.func)(item)
    }
}

impl<T, E> Clone for ItemHandler<T, E> {
    fn clone(&self) -> Self {
        Self {
            func: Arc::clone(&self.func),
        }
    }
}

impl<T, E> fmt::Debug for ItemHandler<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemHandler").finish_non_exhaustive()
    }
}

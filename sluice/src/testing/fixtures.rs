//! A hand-driven source for pipeline tests.

use async_trait::async_trait;
use futures::future::{self, BoxFuture};
use futures::FutureExt;
use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::context::Context;
use crate::errors::SluiceError;
use crate::source::{ItemHandler, Source};

type SyncHook<T, E> = Arc<dyn Fn(&Context<T>) -> Result<(), E> + Send + Sync>;

/// A source whose items are pushed in by the test through
/// [`receive`](ManualSource::receive).
///
/// Lifecycle calls and hook invocations are counted. Hooks can be given
/// synchronous bodies to reject items or to fail.
pub struct ManualSource<T, E = SluiceError> {
    handler: RwLock<Option<ItemHandler<T, E>>>,
    context_hook: Option<SyncHook<T, E>>,
    done_hook: Option<SyncHook<T, E>>,
    start_error: Option<String>,
    start_calls: AtomicUsize,
    stop_calls: AtomicUsize,
    context_hook_calls: AtomicUsize,
    done_hook_calls: AtomicUsize,
}

impl<T, E> ManualSource<T, E> {
    /// Creates a source with no-op hooks.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handler: RwLock::new(None),
            context_hook: None,
            done_hook: None,
            start_error: None,
            start_calls: AtomicUsize::new(0),
            stop_calls: AtomicUsize::new(0),
            context_hook_calls: AtomicUsize::new(0),
            done_hook_calls: AtomicUsize::new(0),
        }
    }

    /// Sets the body of the context-create hook.
    #[must_use]
    pub fn with_context_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Context<T>) -> Result<(), E> + Send + Sync + 'static,
    {
        self.context_hook = Some(Arc::new(hook));
        self
    }

    /// Sets the body of the done hook.
    #[must_use]
    pub fn with_done_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Context<T>) -> Result<(), E> + Send + Sync + 'static,
    {
        self.done_hook = Some(Arc::new(hook));
        self
    }

    /// Makes [`Source::start`] fail with a source error.
    #[must_use]
    pub fn with_start_error(mut self, message: impl Into<String>) -> Self {
        self.start_error = Some(message.into());
        self
    }

    /// Returns the subscribed handler, if any.
    #[must_use]
    pub fn handler(&self) -> Option<ItemHandler<T, E>> {
        self.handler.read().clone()
    }

    /// Returns true once a pipeline has subscribed.
    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.handler.read().is_some()
    }

    /// Returns how many times `start` was called.
    #[must_use]
    pub fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    /// Returns how many times `stop` was called.
    #[must_use]
    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    /// Returns how many times the context-create hook ran.
    #[must_use]
    pub fn context_hook_calls(&self) -> usize {
        self.context_hook_calls.load(Ordering::SeqCst)
    }

    /// Returns how many times the done hook ran.
    #[must_use]
    pub fn done_hook_calls(&self) -> usize {
        self.done_hook_calls.load(Ordering::SeqCst)
    }
}

impl<T, E> ManualSource<T, E>
where
    T: Send + 'static,
    E: From<SluiceError> + Send + 'static,
{
    /// Hands an item to the subscribed handler.
    ///
    /// Resolves once the pipeline has finished with the item. Fails with a
    /// source error if nothing has subscribed.
    pub fn receive(&self, item: T) -> BoxFuture<'static, Result<(), E>> {
        match self.handler() {
            Some(handler) => handler.call(item),
            None => future::ready(Err(E::from(SluiceError::source("no handler subscribed")))).boxed(),
        }
    }
}

impl<T, E> Default for ManualSource<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> fmt::Debug for ManualSource<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualSource")
            .field("subscribed", &self.is_subscribed())
            .field("start_calls", &self.start_calls())
            .field("stop_calls", &self.stop_calls())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<T, E> Source for ManualSource<T, E>
where
    T: Send + Sync + 'static,
    E: std::error::Error + From<SluiceError> + Send + Sync + 'static,
{
    type Item = T;
    type Error = E;

    async fn start(&self) -> Result<(), E> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        match &self.start_error {
            Some(message) => Err(E::from(SluiceError::source(message.clone()))),
            None => Ok(()),
        }
    }

    async fn stop(&self) -> Result<(), E> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn subscribe(&self, handler: ItemHandler<T, E>) {
        *self.handler.write() = Some(handler);
    }

    async fn on_context_create(&self, ctx: &Context<T>) -> Result<(), E> {
        self.context_hook_calls.fetch_add(1, Ordering::SeqCst);
        match &self.context_hook {
            Some(hook) => hook(ctx),
            None => Ok(()),
        }
    }

    async fn on_done(&self, ctx: &Context<T>) -> Result<(), E> {
        self.done_hook_calls.fetch_add(1, Ordering::SeqCst);
        match &self.done_hook {
            Some(hook) => hook(ctx),
            None => Ok(()),
        }
    }
}

//! Middleware: the ordered steps every item runs through.

mod chain;
mod func;
mod terminal;

pub use chain::{BoxedMiddleware, MiddlewareChain};
pub use func::{middleware_fn, FnMiddleware};
pub use terminal::Terminal;

use crate::context::Context;
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for pipeline middleware.
///
/// A middleware receives the item's context, may read or annotate it, and
/// may call [`Context::mark_done`] to stop the chain after itself. Returning
/// an error aborts the item.
///
/// Middleware hold no per-item state; anything an item needs travels in its
/// context.
#[async_trait]
pub trait Middleware<T, E>: Send + Sync {
    /// Returns the name used in logs and events.
    fn name(&self) -> &str {
        "middleware"
    }

    /// Processes one item.
    async fn handle(&self, ctx: Arc<Context<T>>) -> Result<(), E>;
}

#[async_trait]
impl<T, E, M> Middleware<T, E> for Arc<M>
where
    T: Send + Sync + 'static,
    E: Send + 'static,
    M: Middleware<T, E> + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn handle(&self, ctx: Arc<Context<T>>) -> Result<(), E> {
        (**self).handle(ctx).await
    }
}

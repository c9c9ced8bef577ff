//! Terminal (sink) middleware.

use super::Middleware;
use crate::context::Context;
use async_trait::async_trait;
use std::sync::Arc;

/// Wraps a middleware so the item is marked done after it succeeds.
///
/// Nothing registered after a terminal ever runs for items that reach it.
#[derive(Debug, Clone)]
pub struct Terminal<M> {
    inner: M,
}

impl<M> Terminal<M> {
    /// Wraps `inner`.
    pub fn new(inner: M) -> Self {
        Self { inner }
    }

    /// Returns the wrapped middleware.
    pub fn into_inner(self) -> M {
        self.inner
    }
}

#[async_trait]
impl<T, E, M> Middleware<T, E> for Terminal<M>
where
    T: Send + Sync + 'static,
    E: Send + 'static,
    M: Middleware<T, E>,
{
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn handle(&self, ctx: Arc<Context<T>>) -> Result<(), E> {
        self.inner.handle(Arc::clone(&ctx)).await?;

        if !ctx.is_done() {
            ctx.mark_done();
        }
        Ok(())
    }
}

//! Closure-backed middleware.

use super::Middleware;
use crate::context::Context;
use async_trait::async_trait;
use std::fmt::{self, Debug};
use std::future::Future;
use std::sync::Arc;

/// A middleware built from an async closure.
pub struct FnMiddleware<F> {
    name: String,
    func: F,
}

impl<F> FnMiddleware<F> {
    /// Creates a new function-based middleware.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

/// Shorthand for [`FnMiddleware::new`].
pub fn middleware_fn<F>(name: impl Into<String>, func: F) -> FnMiddleware<F> {
    FnMiddleware::new(name, func)
}

impl<F> Debug for FnMiddleware<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnMiddleware")
            .field("name", &self.name)
            .finish()
    }
}

#[async_trait]
impl<T, E, F, Fut> Middleware<T, E> for FnMiddleware<F>
where
    T: Send + Sync + 'static,
    E: Send + 'static,
    F: Fn(Arc<Context<T>>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), E>> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, ctx: Arc<Context<T>>) -> Result<(), E> {
        (self.func)(ctx).await
    }
}

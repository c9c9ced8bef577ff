//! Append-only middleware chain.

use super::Middleware;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// A shared middleware handle.
pub type BoxedMiddleware<T, E> = Arc<dyn Middleware<T, E>>;

/// An ordered, append-only list of middleware.
///
/// Items read the chain one index at a time, so a middleware appended while
/// an item is in flight is seen by that item if it has not yet passed the
/// new index. The lock is never held across an await.
pub struct MiddlewareChain<T, E> {
    middleware: RwLock<Vec<BoxedMiddleware<T, E>>>,
}

impl<T, E> MiddlewareChain<T, E> {
    /// Creates a new empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self {
            middleware: RwLock::new(Vec::new()),
        }
    }

    /// Appends a middleware to the end of the chain.
    pub fn push(&self, middleware: BoxedMiddleware<T, E>) {
        self.middleware.write().push(middleware);
    }

    /// Returns the middleware at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<BoxedMiddleware<T, E>> {
        self.middleware.read().get(index).cloned()
    }

    /// Returns the names of all middleware in order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.middleware
            .read()
            .iter()
            .map(|m| (**m).name().to_string())
            .collect()
    }

    /// Returns the number of middleware.
    #[must_use]
    pub fn len(&self) -> usize {
        self.middleware.read().len()
    }

    /// Returns true if the chain is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.middleware.read().is_empty()
    }
}

impl<T, E> Default for MiddlewareChain<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> fmt::Debug for MiddlewareChain<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareChain")
            .field("middleware", &self.names())
            .finish()
    }
}

//! Error observers notified when an item fails.

use crate::context::Context;
use parking_lot::RwLock;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::warn;

/// A callback invoked with the failure and the context live at the time.
pub type ErrorObserver<T, E> = Arc<dyn Fn(&E, &Context<T>) + Send + Sync>;

/// Handle returned by [`ErrorObservers::register`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "observer-{}", self.0)
    }
}

/// Ordered list of error observers.
pub struct ErrorObservers<T, E> {
    next_id: AtomicU64,
    observers: RwLock<Vec<(ObserverId, ErrorObserver<T, E>)>>,
}

impl<T, E> ErrorObservers<T, E> {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(0),
            observers: RwLock::new(Vec::new()),
        }
    }

    /// Appends an observer.
    pub fn register(&self, observer: ErrorObserver<T, E>) -> ObserverId {
        let id = ObserverId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.observers.write().push((id, observer));
        id
    }

    /// Removes an observer. Returns false if it was not registered.
    pub fn remove(&self, id: ObserverId) -> bool {
        let mut observers = self.observers.write();
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        observers.len() != before
    }

    /// Returns the number of registered observers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.observers.read().len()
    }

    /// Returns true if nobody is observing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observers.read().is_empty()
    }

    /// Invokes every observer in registration order.
    ///
    /// A panicking observer is logged and skipped; the rest still run.
    /// Returns the number of observers invoked.
    pub fn notify(&self, error: &E, ctx: &Context<T>) -> usize {
        let observers: Vec<_> = self
            .observers
            .read()
            .iter()
            .map(|(id, observer)| (*id, Arc::clone(observer)))
            .collect();

        for (id, observer) in &observers {
            if catch_unwind(AssertUnwindSafe(|| observer(error, ctx))).is_err() {
                warn!(observer = %id, item_id = %ctx.id(), "error observer panicked");
            }
        }

        observers.len()
    }
}

impl<T, E> Default for ErrorObservers<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> fmt::Debug for ErrorObservers<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorObservers")
            .field("count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SluiceError;
    use parking_lot::Mutex;

    #[test]
    fn test_notify_in_order() {
        let observers: ErrorObservers<String, SluiceError> = ErrorObservers::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for label in ["first", "second"] {
            let seen = Arc::clone(&seen);
            observers.register(Arc::new(move |err: &SluiceError, ctx: &Context<String>| {
                seen.lock().push(format!("{label}:{}:{err}", ctx.payload()));
            }));
        }

        let ctx = Context::new("item".to_string());
        let count = observers.notify(&SluiceError::source("down"), &ctx);

        assert_eq!(count, 2);
        assert_eq!(
            *seen.lock(),
            vec![
                "first:item:source error: down".to_string(),
                "second:item:source error: down".to_string(),
            ]
        );
    }

    #[test]
    fn test_remove() {
        let observers: ErrorObservers<(), SluiceError> = ErrorObservers::new();
        let id = observers.register(Arc::new(|_: &SluiceError, _: &Context<()>| {}));
        assert_eq!(observers.len(), 1);

        assert!(observers.remove(id));
        assert!(!observers.remove(id));
        assert!(observers.is_empty());
        assert_eq!(observers.notify(&SluiceError::PipelineDropped, &Context::new(())), 0);
    }

    #[test]
    fn test_panicking_observer_does_not_stop_others() {
        let observers: ErrorObservers<(), SluiceError> = ErrorObservers::new();
        let reached = Arc::new(Mutex::new(false));

        observers.register(Arc::new(|_: &SluiceError, _: &Context<()>| {
            panic!("observer bug");
        }));
        let flag = Arc::clone(&reached);
        observers.register(Arc::new(move |_: &SluiceError, _: &Context<()>| {
            *flag.lock() = true;
        }));

        let count = observers.notify(&SluiceError::PipelineDropped, &Context::new(()));
        assert_eq!(count, 2);
        assert!(*reached.lock());
    }

    #[test]
    fn test_ids_are_unique() {
        let observers: ErrorObservers<(), SluiceError> = ErrorObservers::new();
        let a = observers.register(Arc::new(|_: &SluiceError, _: &Context<()>| {}));
        let b = observers.register(Arc::new(|_: &SluiceError, _: &Context<()>| {}));
        assert_ne!(a, b);
        assert_eq!(a.to_string(), "observer-0");
    }
}

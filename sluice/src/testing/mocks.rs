//! Mock middleware for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use crate::context::Context;
use crate::errors::SluiceError;
use crate::middleware::Middleware;

/// A shared, ordered record of which steps ran.
#[derive(Debug, Clone, Default)]
pub struct ExecutionLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl ExecutionLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry.
    pub fn record(&self, label: impl Into<String>) {
        self.entries.lock().push(label.into());
    }

    /// Returns all entries in order.
    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    /// Returns true if `label` was recorded.
    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.entries.lock().iter().any(|e| e == label)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Clears the log.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

/// A middleware that optionally sleeps, then records its name.
#[derive(Debug)]
pub struct RecordingMiddleware {
    name: String,
    log: ExecutionLog,
    delay: Option<Duration>,
    mark_done: bool,
    call_count: Mutex<usize>,
}

impl RecordingMiddleware {
    /// Creates a middleware that records `name` into `log`.
    #[must_use]
    pub fn new(name: impl Into<String>, log: &ExecutionLog) -> Self {
        Self {
            name: name.into(),
            log: log.clone(),
            delay: None,
            mark_done: false,
            call_count: Mutex::new(0),
        }
    }

    /// Sleeps for `ms` milliseconds before recording.
    #[must_use]
    pub fn with_delay_ms(mut self, ms: u64) -> Self {
        self.delay = Some(Duration::from_millis(ms));
        self
    }

    /// Marks the context done after recording.
    #[must_use]
    pub fn marking_done(mut self) -> Self {
        self.mark_done = true;
        self
    }

    /// Returns the number of times the middleware ran.
    #[must_use]
    pub fn call_count(&self) -> usize {
        *self.call_count.lock()
    }
}

#[async_trait]
impl<T, E> Middleware<T, E> for RecordingMiddleware
where
    T: Send + Sync + 'static,
    E: Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, ctx: Arc<Context<T>>) -> Result<(), E> {
        *self.call_count.lock() += 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.log.record(&self.name);
        if self.mark_done {
            ctx.mark_done();
        }
        Ok(())
    }
}

/// A middleware that optionally sleeps, records its name, then fails.
#[derive(Debug)]
pub struct FailingMiddleware {
    name: String,
    message: String,
    log: ExecutionLog,
    delay: Option<Duration>,
}

impl FailingMiddleware {
    /// Creates a middleware that records `name` and fails with `message`.
    #[must_use]
    pub fn new(name: impl Into<String>, message: impl Into<String>, log: &ExecutionLog) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            log: log.clone(),
            delay: None,
        }
    }

    /// Sleeps for `ms` milliseconds before failing.
    #[must_use]
    pub fn with_delay_ms(mut self, ms: u64) -> Self {
        self.delay = Some(Duration::from_millis(ms));
        self
    }
}

#[async_trait]
impl<T, E> Middleware<T, E> for FailingMiddleware
where
    T: Send + Sync + 'static,
    E: From<SluiceError> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, _ctx: Arc<Context<T>>) -> Result<(), E> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.log.record(&self.name);
        Err(E::from(SluiceError::middleware(&self.name, &self.message)))
    }
}

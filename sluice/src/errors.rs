//! Error types for the sluice pipeline.
//!
//! [`SluiceError`] is the crate's own error. It is also a ready-made choice
//! for [`Source::Error`](crate::source::Source::Error): any source error type
//! must be constructible from it so the pipeline can report its own
//! conditions (such as a dropped pipeline) through the source's channel.

use std::fmt;
use thiserror::Error;

/// The main error type for sluice operations.
#[derive(Debug, Error)]
pub enum SluiceError {
    /// A middleware step failed.
    #[error("middleware '{name}' failed: {message}")]
    Middleware {
        /// Name of the failing middleware.
        name: String,
        /// Failure description.
        message: String,
    },

    /// A source hook failed.
    #[error("{hook} hook failed: {message}")]
    Hook {
        /// Which hook failed.
        hook: HookKind,
        /// Failure description.
        message: String,
    },

    /// The source reported a failure of its own.
    #[error("source error: {0}")]
    Source(String),

    /// An annotation key was written twice through a non-overwriting insert.
    #[error("annotation '{key}' is already set")]
    AnnotationConflict {
        /// The conflicting key.
        key: String,
    },

    /// An item handler was invoked after its pipeline was dropped.
    #[error("pipeline has been dropped")]
    PipelineDropped,

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other error raised by user code.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SluiceError {
    /// Creates a middleware failure.
    pub fn middleware(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Middleware {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates a hook failure.
    pub fn hook(hook: HookKind, message: impl Into<String>) -> Self {
        Self::Hook {
            hook,
            message: message.into(),
        }
    }

    /// Creates a source failure.
    pub fn source(message: impl Into<String>) -> Self {
        Self::Source(message.into())
    }

    /// Creates a configuration failure.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// The optional source hooks run around the middleware chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    /// Runs right after a context is created, before any middleware.
    ContextCreate,
    /// Runs after the chain completes without failure.
    Done,
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContextCreate => write!(f, "context-create"),
            Self::Done => write!(f, "done"),
        }
    }
}

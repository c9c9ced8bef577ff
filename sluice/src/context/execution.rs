//! Per-item execution context.

use super::Annotations;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Whether the chain may keep advancing for an item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextState {
    /// Later middleware still run.
    #[default]
    Running,
    /// No further middleware run for this item.
    Done,
}

impl fmt::Display for ContextState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// The mutable context carried through the pipeline for one item.
///
/// A context is created when the source hands an item to the pipeline and
/// lives exactly as long as that item's processing. It is shared as
/// `Arc<Context<T>>` between the source hooks, the middleware and the error
/// observers of that one item; all mutation goes through `&self`.
///
/// The payload is set once. Middleware that need to change it must give `T`
/// its own interior mutability.
#[derive(Debug)]
pub struct Context<T> {
    id: Uuid,
    created_at: DateTime<Utc>,
    payload: T,
    state: RwLock<ContextState>,
    annotations: Annotations,
}

impl<T> Context<T> {
    /// Creates a running context around `payload`.
    #[must_use]
    pub fn new(payload: T) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            payload,
            state: RwLock::new(ContextState::Running),
            annotations: Annotations::new(),
        }
    }

    /// Marks the context as done. Idempotent.
    pub fn mark_done(&self) {
        *self.state.write() = ContextState::Done;
    }

    /// Returns true once [`mark_done`](Self::mark_done) has been called.
    #[must_use]
    pub fn is_done(&self) -> bool {
        *self.state.read() == ContextState::Done
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> ContextState {
        *self.state.read()
    }

    /// Returns the item being processed.
    #[must_use]
    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// Returns the unique id of this item's processing run.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns when the context was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the annotation bag.
    #[must_use]
    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    /// Consumes the context and returns the payload.
    #[must_use]
    pub fn into_payload(self) -> T {
        self.payload
    }
}

//! Event sinks for pipeline observability.
//!
//! A pipeline reports each item's progress to its [`EventSink`]:
//!
//! | event                  | when                                             |
//! |------------------------|--------------------------------------------------|
//! | `item.received`        | a context was created for a new item             |
//! | `item.rejected`        | the context-create hook marked the item done     |
//! | `middleware.completed` | one middleware step returned successfully        |
//! | `item.short_circuited` | a middleware marked the item done mid-chain      |
//! | `item.completed`       | the item finished without failure                |
//! | `item.failed`          | a hook or middleware failed                      |

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};

/// Event type constants.
pub mod types {
    /// A context was created for a new item.
    pub const ITEM_RECEIVED: &str = "item.received";
    /// The context-create hook marked the item done.
    pub const ITEM_REJECTED: &str = "item.rejected";
    /// One middleware step returned successfully.
    pub const MIDDLEWARE_COMPLETED: &str = "middleware.completed";
    /// A middleware marked the item done before the end of the chain.
    pub const ITEM_SHORT_CIRCUITED: &str = "item.short_circuited";
    /// The item finished without failure.
    pub const ITEM_COMPLETED: &str = "item.completed";
    /// A hook or middleware failed.
    pub const ITEM_FAILED: &str = "item.failed";
}

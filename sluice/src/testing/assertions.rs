//! Test assertions for pipeline runs.

use super::ExecutionLog;
use crate::events::CollectingEventSink;

/// Asserts that the log holds exactly `expected`, in order.
pub fn assert_execution_order(log: &ExecutionLog, expected: &[&str]) {
    let actual = log.entries();
    assert_eq!(
        actual, expected,
        "Expected execution order {expected:?}, got {actual:?}"
    );
}

/// Asserts that `label` never ran.
pub fn assert_not_executed(log: &ExecutionLog, label: &str) {
    assert!(
        !log.contains(label),
        "Expected '{label}' not to run, but the log is {:?}",
        log.entries()
    );
}

/// Asserts that the sink saw exactly `expected` event types, in order.
pub fn assert_event_types(sink: &CollectingEventSink, expected: &[&str]) {
    let actual = sink.event_types();
    assert_eq!(
        actual, expected,
        "Expected events {expected:?}, got {actual:?}"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventSink;

    #[test]
    fn test_execution_order_passes() {
        let log = ExecutionLog::new();
        log.record("a");
        log.record("b");

        assert_execution_order(&log, &["a", "b"]);
        assert_not_executed(&log, "c");
    }

    #[test]
    #[should_panic(expected = "Expected execution order")]
    fn test_execution_order_fails() {
        let log = ExecutionLog::new();
        log.record("b");
        log.record("a");

        assert_execution_order(&log, &["a", "b"]);
    }

    #[test]
    #[should_panic(expected = "not to run")]
    fn test_not_executed_fails() {
        let log = ExecutionLog::new();
        log.record("a");

        assert_not_executed(&log, "a");
    }

    #[test]
    fn test_event_types() {
        let sink = CollectingEventSink::new();
        sink.try_emit("item.received", None);

        assert_event_types(&sink, &["item.received"]);
    }
}

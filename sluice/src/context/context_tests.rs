//! Tests for the per-item context.

#[cfg(test)]
mod tests {
    use crate::context::{Context, ContextState};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_new_context_is_running() {
        let ctx = Context::new("hello");
        assert!(!ctx.is_done());
        assert_eq!(ctx.state(), ContextState::Running);
        assert_eq!(*ctx.payload(), "hello");
        assert!(ctx.annotations().is_empty());
    }

    #[test]
    fn test_mark_done() {
        let ctx = Context::new(1_u32);
        ctx.mark_done();
        assert!(ctx.is_done());
        assert_eq!(ctx.state(), ContextState::Done);
    }

    #[test]
    fn test_mark_done_is_idempotent() {
        let once = Context::new(());
        once.mark_done();

        let twice = Context::new(());
        twice.mark_done();
        twice.mark_done();

        assert_eq!(once.state(), twice.state());
        assert!(twice.is_done());
    }

    #[test]
    fn test_contexts_are_distinct() {
        let a = Context::new(1);
        let b = Context::new(1);
        assert_ne!(a.id(), b.id());

        a.mark_done();
        a.annotations().insert("seen", serde_json::json!(true));
        assert!(!b.is_done());
        assert!(!b.annotations().contains_key("seen"));
    }

    #[test]
    fn test_payload_interior_mutation() {
        let ctx = Arc::new(Context::new(AtomicU32::new(0)));

        let shared = Arc::clone(&ctx);
        shared.payload().fetch_add(5, Ordering::SeqCst);

        assert_eq!(ctx.payload().load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_into_payload() {
        let ctx = Context::new(String::from("item"));
        assert!(ctx.created_at() <= chrono::Utc::now());
        assert_eq!(ctx.into_payload(), "item");
    }

    #[test]
    fn test_state_display_and_serde() {
        assert_eq!(ContextState::Running.to_string(), "running");
        assert_eq!(ContextState::Done.to_string(), "done");
        assert_eq!(
            serde_json::to_value(ContextState::Done).unwrap(),
            serde_json::json!("done")
        );
        assert_eq!(ContextState::default(), ContextState::Running);
    }
}

//! Inbound comment snapshot subscriptions.
//!
//! # Invariants
//! - A `SubscriptionGuard` unsubscribes exactly once, on `unsubscribe` or drop.

use crate::model::comment::Comment;
use log::info;
use std::sync::Arc;

/// Callback receiving a full replacement comment list.
pub type SnapshotCallback = Box<dyn Fn(Vec<Comment>) + Send + Sync + 'static>;

/// External source pushing comment snapshots (e.g. a realtime query).
pub trait CommentSource: Send + Sync {
    fn subscribe(&self, callback: SnapshotCallback);
    fn unsubscribe(&self);
}

/// Keeps a subscription alive; unsubscribes when dropped.
pub struct SubscriptionGuard {
    source: Option<Arc<dyn CommentSource>>,
}

impl SubscriptionGuard {
    pub(crate) fn new(source: Arc<dyn CommentSource>) -> Self {
        Self {
            source: Some(source),
        }
    }

    /// Unsubscribes immediately.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(source) = self.source.take() {
            source.unsubscribe();
            info!("event=subscription_release module=subscription status=ok");
        }
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.release();
    }
}

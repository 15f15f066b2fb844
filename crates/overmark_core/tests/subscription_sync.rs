use overmark_core::{
    Comment, CommentPersistence, CommentSource, CommentStore, CommitFuture, OverlayOptions,
    OverlayState, Position, SnapshotCallback,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

struct NoopPersistence;

impl CommentPersistence for NoopPersistence {
    fn on_confirm(&self, _comments: Vec<Comment>) -> CommitFuture {
        Box::pin(async { Ok(()) })
    }

    fn on_resolve(&self, _comments: Vec<Comment>) -> CommitFuture {
        Box::pin(async { Ok(()) })
    }
}

#[derive(Default)]
struct ManualSource {
    callback: Mutex<Option<SnapshotCallback>>,
    unsubscribed: AtomicUsize,
}

impl ManualSource {
    fn push(&self, comments: Vec<Comment>) -> bool {
        match self.callback.lock().unwrap().as_ref() {
            Some(callback) => {
                callback(comments);
                true
            }
            None => false,
        }
    }
}

impl CommentSource for ManualSource {
    fn subscribe(&self, callback: SnapshotCallback) {
        *self.callback.lock().unwrap() = Some(callback);
    }

    fn unsubscribe(&self) {
        self.callback.lock().unwrap().take();
        self.unsubscribed.fetch_add(1, Ordering::SeqCst);
    }
}

fn store() -> CommentStore {
    CommentStore::new(
        OverlayOptions::new(None)
            .with_initial_state(OverlayState::Idle)
            .with_initial_comments(vec![Comment::published(
                "local-1",
                Position::default(),
                "initial",
                None,
            )]),
        Arc::new(NoopPersistence),
    )
    .unwrap()
}

#[test]
fn pushed_snapshots_replace_comments() {
    let store = store();
    let source = Arc::new(ManualSource::default());
    let _guard = store.attach_subscription(source.clone());

    assert!(source.push(vec![
        Comment::published("remote-1", Position::new(1.0, 1.0), "a", None),
        Comment::published("remote-2", Position::new(2.0, 2.0), "b", None),
    ]));

    let ids: Vec<_> = store.all_comments().into_iter().map(|c| c.id).collect();
    assert_eq!(ids, vec!["remote-1", "remote-2"]);
}

#[test]
fn snapshot_overwrites_in_flight_draft() {
    let store = store();
    let source = Arc::new(ManualSource::default());
    let _guard = store.attach_subscription(source.clone());
    store.register_comment(Position::new(5.0, 5.0), None);
    assert_eq!(store.draft_comments().len(), 1);

    source.push(vec![]);

    assert!(store.all_comments().is_empty());
}

#[test]
fn dropping_guard_unsubscribes_once() {
    let store = store();
    let source = Arc::new(ManualSource::default());
    {
        let _guard = store.attach_subscription(source.clone());
    }
    assert_eq!(source.unsubscribed.load(Ordering::SeqCst), 1);
    assert!(!source.push(vec![]));
    assert_eq!(store.all_comments().len(), 1);

    let guard = store.attach_subscription(source.clone());
    guard.unsubscribe();
    assert_eq!(source.unsubscribed.load(Ordering::SeqCst), 2);
}

#[test]
fn subscription_does_not_keep_store_alive() {
    let source = Arc::new(ManualSource::default());
    let guard = {
        let store = store();
        store.attach_subscription(source.clone())
    };

    assert!(source.push(vec![Comment::published(
        "late",
        Position::default(),
        "after teardown",
        None,
    )]));
    drop(guard);
    assert_eq!(source.unsubscribed.load(Ordering::SeqCst), 1);
}

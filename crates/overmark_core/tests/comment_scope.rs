use overmark_core::{
    Comment, CommentPersistence, CommentScope, CommentStatus, CommentStore, CommitFuture,
    Indicator, IndicatorVisibility, OverlayConfig, OverlayOptions, OverlayState, Position,
    SelectionRect,
};
use std::sync::Arc;

struct NoopPersistence;

impl CommentPersistence for NoopPersistence {
    fn on_confirm(&self, _comments: Vec<Comment>) -> CommitFuture {
        Box::pin(async { Ok(()) })
    }

    fn on_resolve(&self, _comments: Vec<Comment>) -> CommitFuture {
        Box::pin(async { Ok(()) })
    }
}

fn store(indicator_visibility: IndicatorVisibility) -> CommentStore {
    let mut resolved = Comment::published("r-1", Position::new(5.0, 5.0), "done", None);
    resolved.status = CommentStatus::Resolved;
    CommentStore::new(
        OverlayOptions::new(None)
            .with_initial_state(OverlayState::Idle)
            .with_initial_comments(vec![
                Comment::published("p-1", Position::new(1.0, 1.0), "persisted", None),
                resolved,
            ])
            .with_config(OverlayConfig {
                indicator_visibility,
                ..OverlayConfig::default()
            }),
        Arc::new(NoopPersistence),
    )
    .unwrap()
}

#[test]
fn draft_starts_from_content_or_explicit_default() {
    let store = store(IndicatorVisibility::Always);
    let comment = store.find_comment("p-1").unwrap();

    let from_content = CommentScope::new(&store, comment.clone(), None);
    assert_eq!(from_content.draft(), "persisted");

    let from_default = CommentScope::new(&store, comment, Some("prefilled"));
    assert_eq!(from_default.draft(), "prefilled");
}

#[test]
fn draft_edits_stay_local_until_confirm() {
    let store = store(IndicatorVisibility::Always);
    store.register_comment(Position::new(20.0, 20.0), None);
    let draft = store.active_comment().unwrap();
    let mut scope = CommentScope::new(&store, draft.clone(), None);
    assert!(scope.is_active());
    assert!(!scope.can_confirm());
    assert!(!scope.confirm());

    scope.set_draft("button is misaligned");
    assert_eq!(store.find_comment(&draft.id).unwrap().content, "");

    assert!(scope.confirm());
    let stored = store.find_comment(&draft.id).unwrap();
    assert_eq!(stored.content, "button is misaligned");
    assert_eq!(stored.status, CommentStatus::Draft);
    assert_eq!(stored.position, draft.position);
    assert!(!scope.is_active());
    assert_eq!(store.overlay_state(), OverlayState::Idle);
}

#[test]
fn resolve_toggle_is_guarded_by_status() {
    let store = store(IndicatorVisibility::Always);

    let mut published = CommentScope::new(&store, store.find_comment("p-1").unwrap(), None);
    assert!(published.can_toggle_resolving());
    assert!(published.toggle_resolving());
    assert_eq!(published.comment().status, CommentStatus::Resolving);
    assert_eq!(
        store.find_comment("p-1").unwrap().status,
        CommentStatus::Resolving
    );

    let mut resolved = CommentScope::new(&store, store.find_comment("r-1").unwrap(), None);
    assert!(!resolved.can_toggle_resolving());
    assert!(!resolved.toggle_resolving());

    store.register_comment(Position::new(3.0, 3.0), None);
    let mut draft = CommentScope::new(&store, store.active_comment().unwrap(), None);
    assert!(!draft.toggle_resolving());
    assert_eq!(
        store.find_comment(draft.id()).unwrap().status,
        CommentStatus::Draft
    );
}

#[test]
fn indicator_visibility_policy_controls_rendering() {
    let store = store(IndicatorVisibility::Active);
    store.register_comment(Position::new(50.0, 40.0), Some(Indicator::new(40.0, 30.0)));
    let scope = CommentScope::new(&store, store.active_comment().unwrap(), None);

    assert!(scope.show_indicator());
    assert_eq!(
        scope.indicator_frame(),
        Some(SelectionRect {
            x: -40.0,
            y: -30.0,
            width: 40.0,
            height: 30.0,
        })
    );

    store.focus_on_comment(None);
    assert!(!scope.show_indicator());

    let plain = CommentScope::new(&store, store.find_comment("p-1").unwrap(), None);
    assert!(!plain.show_indicator());
    assert!(plain.indicator_frame().is_none());
}

#[test]
fn focus_and_delete_go_through_store() {
    let store = store(IndicatorVisibility::Always);
    let scope = CommentScope::new(&store, store.find_comment("p-1").unwrap(), None);

    scope.focus();
    assert!(scope.is_active());
    assert_eq!(store.overlay_state(), OverlayState::Editing);

    scope.delete();
    assert!(store.find_comment("p-1").is_none());
    assert_eq!(store.overlay_state(), OverlayState::Idle);
}

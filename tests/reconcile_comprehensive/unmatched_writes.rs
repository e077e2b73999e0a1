//! Unmatched Write Tests
//!
//! Updates and deletes that match nothing either fail the call or flag the
//! affected documents as orphaned, depending on policy.

use crate::test_utils::*;

fn policy(update: UnmatchedPolicy, delete: UnmatchedPolicy) -> ReconcilePolicy {
    ReconcilePolicy {
        mode: UpdateMode::Diff,
        on_unmatched_update: update,
        on_unmatched_delete: delete,
    }
}

#[test]
fn test_strict_delete_of_missing_document_fails() {
    let a = adapter(UpdateMode::Diff, vec![order(1, 1)]);
    let actions = vec![
        WriteAction::update(order(1, 1), order(1, 2)),
        WriteAction::delete(order(99, 0)),
    ];

    let err = a.bulk(actions, &WriteOptions::default()).unwrap_err();

    let unmatched = err.unmatched().expect("unmatched details");
    assert!(matches!(err, Error::UnmatchedDelete(_)));
    assert_eq!(unmatched.expected, 1);
    assert_eq!(unmatched.observed, 0);
    assert_eq!(unmatched.namespace, namespace());
    // the update in the same batch is not rolled back
    assert_eq!(a.collection().get(&Document::Int(1)), Some(order(1, 2)));
}

#[test]
fn test_strict_update_of_missing_document_fails() {
    let a = adapter(UpdateMode::Replace, Vec::new());
    let err = a
        .bulk(
            vec![WriteAction::update(order(1, 1), order(1, 2))],
            &WriteOptions::default(),
        )
        .unwrap_err();
    assert!(matches!(err, Error::UnmatchedUpdate(_)));
    assert!(!err.is_validation());
}

#[test]
fn test_concurrently_deleted_document_is_orphaned() {
    let a = adapter(UpdateMode::Diff, vec![order(1, 1), order(2, 2)])
        .with_policy(policy(UnmatchedPolicy::Orphan, UnmatchedPolicy::Fail));
    a.collection().remove(&Document::Int(2));

    let actions = vec![
        WriteAction::update(order(1, 1), order(1, 5)),
        WriteAction::update(order(2, 2), order(2, 5)),
    ];
    let outcomes = a.bulk(actions, &WriteOptions::default()).unwrap();

    // batch counts cannot tell which update missed
    assert!(outcomes.iter().all(WriteOutcome::is_orphaned));
    assert_eq!(a.collection().get(&Document::Int(1)), Some(order(1, 5)));
}

#[test]
fn test_orphan_delete_keeps_other_actions_acked() {
    let a = adapter(UpdateMode::Diff, vec![order(1, 1)])
        .with_policy(policy(UnmatchedPolicy::Fail, UnmatchedPolicy::Orphan));
    let actions = vec![
        WriteAction::create(order(7, 7)),
        WriteAction::update(order(1, 1), order(1, 2)),
        WriteAction::delete(order(42, 0)),
    ];
    let outcomes = a.bulk(actions, &WriteOptions::default()).unwrap();
    assert_eq!(
        states(&outcomes),
        vec![ActionState::Acked, ActionState::Acked, ActionState::Orphaned]
    );
}

#[test]
fn test_upserts_are_never_orphaned() {
    let a = adapter(UpdateMode::Diff, vec![order(1, 1)])
        .with_policy(policy(UnmatchedPolicy::Orphan, UnmatchedPolicy::Fail));
    a.collection().remove(&Document::Int(1));

    let actions = vec![
        WriteAction::update(order(1, 1), order(1, 2)),
        WriteAction::update(order(5, 1), order(5, 2)),
    ];
    let outcomes = a.bulk(actions, &WriteOptions::upsert()).unwrap();

    // both upsert: the store matched nothing but inserted twice
    assert_eq!(states(&outcomes), vec![ActionState::Acked, ActionState::Acked]);
    assert_eq!(a.collection().len(), 2);
}

#[test]
fn test_stale_version_is_unmatched() {
    let a = adapter(UpdateMode::Diff, vec![order(1, 1).with("rev", 2)])
        .with_filter(docwrite::FilterStrategy::versioned("rev"));
    let stale = order(1, 1).with("rev", 1);
    let err = a
        .bulk(
            vec![WriteAction::update(stale, order(1, 9).with("rev", 2))],
            &WriteOptions::default(),
        )
        .unwrap_err();
    assert!(matches!(err, Error::UnmatchedUpdate(_)));
    assert_eq!(a.collection().get(&Document::Int(1)), Some(order(1, 1).with("rev", 2)));
}

#[test]
fn test_store_failure_propagates_unchanged() {
    let a = adapter(UpdateMode::Diff, vec![order(1, 1)]);
    a.collection().fail_next("primary stepped down");
    let err = a
        .bulk(
            vec![WriteAction::update(order(1, 1), order(1, 2))],
            &WriteOptions::default(),
        )
        .unwrap_err();
    match err {
        Error::Store(store) => assert_eq!(store.message(), "primary stepped down"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_invalid_field_name_fails_before_store_call() {
    let a = adapter(UpdateMode::Diff, Vec::new());
    let old = doc(json!({ "_id": 1, "$bad": 1 }));
    let new = doc(json!({ "_id": 1, "$bad": 2 }));
    let err = a
        .bulk(
            vec![WriteAction::create(order(2, 2)), WriteAction::update(old, new)],
            &WriteOptions::default(),
        )
        .unwrap_err();
    assert!(matches!(err, Error::InvalidFieldName { .. }));
    assert!(a.collection().calls().is_empty());
    assert!(a.collection().is_empty());
}

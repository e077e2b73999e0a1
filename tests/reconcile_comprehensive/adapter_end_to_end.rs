//! Adapter End-to-End Tests
//!
//! Single-document calls, adapters built from configuration files and
//! session forwarding.

use crate::test_utils::*;
use docwrite::core::ID_FIELD;
use docwrite::engine::{CONFIG_FILE_NAME, ReadOptions};
use tempfile::TempDir;

#[test]
fn test_create_update_delete_lifecycle() {
    let a = adapter(UpdateMode::Diff, Vec::new());
    let options = WriteOptions::default();

    let created = a.create(doc(json!({ "qty": 1, "tags": [] })), &options).unwrap();
    let id = created.id().unwrap().clone();

    let mut edited = created.clone();
    edited.insert("tags", vec!["rush"]);
    let outcome = a.update(&created, &edited, &options).unwrap();
    assert_eq!(outcome.state, ActionState::Acked);

    let filter = Document::object().with(ID_FIELD, id.clone());
    assert_eq!(a.find(&filter, &ReadOptions::default()).unwrap(), Some(edited.clone()));

    a.delete(edited, &options).unwrap();
    assert!(a.find(&filter, &ReadOptions::default()).unwrap().is_none());
    assert_eq!(
        a.collection().calls(),
        vec!["insertOne", "updateOne", "findOne", "deleteOne", "findOne"]
    );
}

#[test]
fn test_adapter_from_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(
        &path,
        "mode = \"diff\"\non_unmatched_delete = \"orphan\"\nversion_field = \"rev\"\n",
    )
    .unwrap();

    let config = AdapterConfig::from_file(&path).unwrap();
    let collection = seeded(vec![order(1, 1).with("rev", 1)]);
    let a = CollectionAdapter::from_config(collection, &config).unwrap();

    let outcome = a
        .update(
            &order(1, 1).with("rev", 1),
            &order(1, 2).with("rev", 2),
            &WriteOptions::default(),
        )
        .unwrap();
    assert_eq!(outcome.state, ActionState::Acked);
    assert_eq!(a.collection().calls(), vec!["updateOne"]);

    let outcome = a.delete(order(1, 2).with("rev", 1), &WriteOptions::default()).unwrap();
    assert!(outcome.is_orphaned());
}

#[test]
fn test_default_config_file_gives_default_adapter() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    AdapterConfig::write_default_if_missing(&path).unwrap();

    let config = AdapterConfig::from_file(&path).unwrap();
    let a = CollectionAdapter::from_config(seeded(vec![order(1, 1)]), &config).unwrap();
    assert_eq!(a.settings().policy, ReconcilePolicy::default());

    a.update(&order(1, 1), &order(1, 2), &WriteOptions::default()).unwrap();
    assert_eq!(a.collection().calls(), vec!["replaceOne"]);
}

#[test]
fn test_session_switches_auto_mode_to_diff() {
    let a = adapter(UpdateMode::Auto, vec![order(1, 1), order(2, 2)]);
    let options = WriteOptions::default().with_session(Session::new("txn-1".to_string()));
    let actions = vec![
        WriteAction::update(order(1, 1), order(1, 1)),
        WriteAction::update(order(2, 2), order(2, 3)),
    ];
    let outcomes = a.bulk(actions, &options).unwrap();
    assert_eq!(states(&outcomes), vec![ActionState::Skipped, ActionState::Acked]);
}

#[test]
fn test_auto_mode_without_session_replaces_every_update() {
    let a = adapter(UpdateMode::Auto, vec![order(1, 1)]);
    let outcomes = a
        .bulk(
            vec![WriteAction::update(order(1, 1), order(1, 1))],
            &WriteOptions::default(),
        )
        .unwrap();
    assert_eq!(states(&outcomes), vec![ActionState::Acked]);
    assert_eq!(a.collection().calls(), vec!["bulkWrite"]);
}

#[test]
fn test_filter_streams_matches() {
    let a = adapter(UpdateMode::Auto, vec![order(1, 5), order(2, 1), order(3, 5)]);
    let ids: Vec<Document> = a
        .filter(&Document::object().with("qty", 5), &ReadOptions::default())
        .unwrap()
        .map(|d| d.unwrap().field(ID_FIELD).clone())
        .collect();
    assert_eq!(ids, vec![Document::Int(1), Document::Int(3)]);
}

#[test]
fn test_adapter_name() {
    let a = adapter(UpdateMode::Auto, Vec::new());
    assert_eq!(a.name(), "Store@shop:orders");
}

#[test]
fn test_settings_shared_with_reconciler() {
    let settings =
        WriteSettings::default().with_policy(ReconcilePolicy::with_mode(UpdateMode::Diff));
    let collection = seeded(vec![order(1, 1)]);
    let reconciler = docwrite::WriteReconciler::new(&collection, &settings);
    let outcomes = reconciler
        .reconcile(
            vec![WriteAction::update(order(1, 1), order(1, 4))],
            &WriteOptions::default(),
        )
        .unwrap();
    assert_eq!(states(&outcomes), vec![ActionState::Acked]);
    assert_eq!(collection.get(&Document::Int(1)), Some(order(1, 4)));
}

//! Compiled Update Tests
//!
//! Wire form of the compiled `$set` / `$unset` instruction for known
//! document transitions.

use crate::test_utils::*;

#[test]
fn test_no_op_needs_no_write() {
    let d = doc(json!({ "a": 1, "b": [{ "c": null }] }));
    assert_eq!(wire(&d, &d.clone()), serde_json::Value::Null);
}

#[test]
fn test_added_scalar() {
    let old = doc(json!({ "a": 1 }));
    let new = doc(json!({ "a": 1, "k": true }));
    assert_eq!(wire(&old, &new), json!({ "$set": { "k": true } }));
}

#[test]
fn test_removed_field() {
    let old = doc(json!({ "a": 1, "k": true }));
    let new = doc(json!({ "a": 1 }));
    assert_eq!(wire(&old, &new), json!({ "$unset": { "k": "" } }));
}

#[test]
fn test_mixed_update() {
    let old = doc(json!({
        "name": "widget",
        "price": 10,
        "tags": ["a", "b"],
        "meta": { "color": "red", "size": "m" }
    }));
    let new = doc(json!({
        "name": "widget",
        "price": 12,
        "tags": ["a", "b", "c"],
        "meta": { "color": "blue" }
    }));
    assert_eq!(
        wire(&old, &new),
        json!({
            "$set": { "price": 12, "tags.2": "c", "meta.color": "blue" },
            "$unset": { "meta.size": "" }
        })
    );
}

#[test]
fn test_pull_from_array() {
    let old = doc(json!({ "items": [{ "a": "value" }] }));
    let new = doc(json!({ "items": [] }));
    assert_eq!(wire(&old, &new), json!({ "$set": { "items": [] } }));
}

#[test]
fn test_set_values_never_carry_absent() {
    let old = doc(json!({}));
    let new = Document::object().with(
        "a",
        Document::object()
            .with("b", Document::Absent)
            .with("c", vec![Document::object().with("d", Document::Absent)]),
    );
    assert_eq!(wire(&old, &new), json!({ "$set": { "a": { "c": [{}] } } }));
}

#[test]
fn test_invalid_field_name_raised_by_compile() {
    let old = doc(json!({ "$bad": 1 }));
    let new = doc(json!({ "$bad": 2 }));
    assert!(matches!(diff_and_compile(&old, &new), Err(Error::InvalidFieldName { .. })));
}

#[test]
fn test_compile_rejects_root_record() {
    let value = doc(json!({}));
    let records = vec![Ok(ChangeRecord::set(DocPath::root(), &value))];
    assert!(matches!(compile(records), Err(Error::EmptyPath)));
}

#[test]
fn test_compile_of_empty_sequence_is_none() {
    let records: Vec<docwrite::Result<ChangeRecord<'_>>> = Vec::new();
    assert!(compile(records).unwrap().is_none());
}

#[test]
fn test_instruction_keeps_emission_order() {
    let old = doc(json!({ "z": 1, "a": 1, "m": 1 }));
    let new = doc(json!({ "z": 2, "a": 2, "m": 2 }));
    let update = diff_and_compile(&old, &new).unwrap().unwrap();
    let keys: Vec<&String> = update.set_fields().keys().collect();
    assert_eq!(keys, vec!["z", "a", "m"]);
}

#[test]
fn test_applying_update_reaches_new_document() {
    let old = doc(json!({
        "profile": { "emails": ["a@x", "b@x"], "age": 30 },
        "roles": ["admin"],
        "flags": { "beta": true }
    }));
    let new = doc(json!({
        "profile": { "emails": ["a@x"], "age": 31, "nick": "z" },
        "roles": ["admin", "ops"],
        "flags": {}
    }));
    let update = diff_and_compile(&old, &new).unwrap().unwrap();
    let mut persisted = old.clone();
    update.apply_to(&mut persisted).unwrap();
    assert_eq!(persisted, new);
}

//! Diff Invariant Tests
//!
//! Record shape produced by the path diff:
//! - Object fields in old order, then new fields
//! - Array shrink and absent elements replace the whole array
//! - Array growth sets trailing indices
//! - Root transitions between kinds produce nothing

use crate::test_utils::*;

// =============================================================================
// Identity
// =============================================================================

#[test]
fn test_same_reference_yields_no_records() {
    let d = doc(json!({ "a": { "b": [1, 2, { "c": "d" }] } }));
    assert!(dotted_paths(&d, &d).is_empty());
}

#[test]
fn test_deep_equal_objects_with_different_order_yield_no_records() {
    let old = doc(json!({ "a": 1, "b": { "x": 1, "y": 2 } }));
    let new = doc(json!({ "b": { "y": 2, "x": 1 }, "a": 1 }));
    assert!(dotted_paths(&old, &new).is_empty());
}

#[test]
fn test_int_and_float_are_different_values() {
    let old = doc(json!({ "n": 1 }));
    let new = doc(json!({ "n": 1.0 }));
    assert_eq!(dotted_paths(&old, &new), vec!["n"]);
}

// =============================================================================
// Objects
// =============================================================================

#[test]
fn test_nested_field_change_is_addressed_by_full_path() {
    let old = doc(json!({ "a": { "b": { "c": 1, "d": 2 } } }));
    let new = doc(json!({ "a": { "b": { "c": 1, "d": 3 } } }));
    assert_eq!(dotted_paths(&old, &new), vec!["a.b.d"]);
}

#[test]
fn test_union_of_fields_old_order_first() {
    let old = doc(json!({ "c": 1, "a": 1, "b": 1 }));
    let new = doc(json!({ "d": 1, "b": 2, "a": 2 }));
    assert_eq!(dotted_paths(&old, &new), vec!["c", "a", "b", "d"]);
}

#[test]
fn test_removal_and_absent_marker_are_the_same_change() {
    let old = doc(json!({ "a": 1, "b": 2 }));
    let removed = doc(json!({ "a": 1 }));
    let marked = Document::object().with("a", 1).with("b", Document::Absent);

    let r1 = PathDiff::new(&old, &removed).records().unwrap();
    let r2 = PathDiff::new(&old, &marked).records().unwrap();
    assert_eq!(r1, r2);
    assert_eq!(r1[0].change, Change::Unset);
}

#[test]
fn test_both_absent_yields_nothing() {
    let old = Document::object().with("a", Document::Absent);
    let new = Document::object();
    assert!(dotted_paths(&old, &new).is_empty());
}

#[test]
fn test_object_replaced_by_scalar() {
    let old = doc(json!({ "a": { "b": 1 } }));
    let new = doc(json!({ "a": 5 }));
    let records = PathDiff::new(&old, &new).records().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].value(), Some(&Document::Int(5)));
}

#[test]
fn test_field_name_with_leading_dot_fails() {
    let old = doc(json!({ "ok": { ".x": 1 } }));
    let new = doc(json!({ "ok": { ".x": 1 } }));
    let err = PathDiff::new(&old, &new).records().unwrap_err();
    match err {
        Error::InvalidFieldName { field, path } => {
            assert_eq!(field, ".x");
            assert_eq!(path, "ok");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_field_name_only_in_new_fails() {
    let old = doc(json!({}));
    let new = doc(json!({ "$inc": { "a": 1 } }));
    assert!(matches!(
        PathDiff::new(&old, &new).records(),
        Err(Error::InvalidFieldName { .. })
    ));
}

#[test]
fn test_dots_inside_field_names_are_allowed() {
    let old = doc(json!({ "a.b": 1 }));
    let new = doc(json!({ "a.b": 2 }));
    assert_eq!(dotted_paths(&old, &new), vec!["a.b"]);
}

// =============================================================================
// Arrays
// =============================================================================

#[test]
fn test_array_shrink_is_single_whole_array_record() {
    let old = doc(json!({ "items": ["a", "b", "c"] }));
    let new = doc(json!({ "items": ["a", "b"] }));
    let records = PathDiff::new(&old, &new).records().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].path.to_dotted(), "items");
    assert_eq!(records[0].value(), Some(&doc(json!(["a", "b"]))));
}

#[test]
fn test_nested_array_shrink_replaces_only_inner_array() {
    let old = doc(json!({ "m": [[1, 2], [3, 4]] }));
    let new = doc(json!({ "m": [[1], [3, 4]] }));
    assert_eq!(dotted_paths(&old, &new), vec!["m.0"]);
}

#[test]
fn test_reorder_is_positional() {
    let old = doc(json!({ "items": ["a", "b", "c", "d", "e", "f"] }));
    let new = doc(json!({ "items": ["a", "c", "b", "d", "x", "f"] }));
    assert_eq!(dotted_paths(&old, &new), vec!["items.1", "items.2", "items.4"]);
}

#[test]
fn test_growth_records_follow_prefix_records() {
    let old = doc(json!({ "items": [{ "n": 1 }, { "n": 2 }] }));
    let new = doc(json!({ "items": [{ "n": 1 }, { "n": 3 }, { "n": 4 }, 5] }));
    assert_eq!(dotted_paths(&old, &new), vec!["items.1.n", "items.2", "items.3"]);
}

#[test]
fn test_growth_never_unsets() {
    let old = doc(json!({ "items": [] }));
    let new = doc(json!({ "items": [null, 1] }));
    let records = PathDiff::new(&old, &new).records().unwrap();
    assert!(records.iter().all(|r| !r.is_unset()));
    assert_eq!(records[0].value(), Some(&Document::Null));
}

#[test]
fn test_absent_element_in_old_array_forces_replace() {
    let old = Document::object().with("items", vec![Document::Absent, Document::Int(2)]);
    let new = doc(json!({ "items": [1, 2] }));
    assert_eq!(dotted_paths(&old, &new), vec!["items"]);
}

// =============================================================================
// Root
// =============================================================================

#[test]
fn test_root_becoming_absent_yields_nothing() {
    let old = doc(json!({ "a": 1 }));
    assert!(dotted_paths(&old, &Document::Absent).is_empty());
}

#[test]
fn test_root_scalars_yield_nothing() {
    assert!(dotted_paths(&Document::Int(1), &Document::Int(2)).is_empty());
}

#[test]
fn test_root_arrays_same_length_diff_by_index() {
    let old = doc(json!([1, 2, 3]));
    let new = doc(json!([1, 5, 3]));
    assert_eq!(dotted_paths(&old, &new), vec!["1"]);
}

// =============================================================================
// Laziness
// =============================================================================

#[test]
fn test_records_can_be_consumed_one_at_a_time() {
    let old = doc(json!({ "a": 1, "b": 1, "c": 1 }));
    let new = doc(json!({ "a": 2, "b": 2, "c": 2 }));
    let first = diff(&old, &new).next().unwrap().unwrap();
    assert_eq!(first.path.to_dotted(), "a");
    assert_eq!(diff(&old, &new).count(), 3);
}

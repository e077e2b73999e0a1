//! Property-Based Tests
//!
//! Random document pairs checked against the algebraic guarantees of the
//! diff and compiler.

use crate::test_utils::*;
use docwrite::core::{is_sanitized, sanitize};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_no_op_compiles_to_none(d in arb_object()) {
        prop_assert!(diff_and_compile(&d, &d).unwrap().is_none());
        prop_assert!(diff_and_compile(&d, &d.clone()).unwrap().is_none());
    }

    #[test]
    fn prop_added_field_is_single_set(d in arb_object(), v in arb_scalar()) {
        let key = "zz_added";
        let extended = d.clone().with(key, v.clone());
        let update = diff_and_compile(&d, &extended).unwrap().unwrap();
        prop_assert_eq!(update.set_fields().len(), 1);
        prop_assert_eq!(update.set_fields().get(key), Some(&v));
        prop_assert!(update.unset_fields().is_empty());
    }

    #[test]
    fn prop_removed_field_is_single_unset(d in arb_object(), v in arb_value()) {
        let key = "zz_removed";
        let extended = d.clone().with(key, v);
        let update = diff_and_compile(&extended, &d).unwrap().unwrap();
        prop_assert!(update.set_fields().is_empty());
        prop_assert_eq!(update.unset_fields().len(), 1);
        prop_assert!(update.unset_fields().contains(key));
    }

    #[test]
    fn prop_apply_round_trip((old, new) in arb_edit_pair()) {
        let mut persisted = old.clone();
        if let Some(update) = diff_and_compile(&old, &new).unwrap() {
            update.apply_to(&mut persisted).unwrap();
        }
        prop_assert_eq!(persisted, new);
    }

    #[test]
    fn prop_paths_never_overlap((old, new) in arb_edit_pair()) {
        let records = PathDiff::new(&old, &new).records().unwrap();
        for (i, a) in records.iter().enumerate() {
            for b in records.iter().skip(i + 1) {
                prop_assert!(!a.path.is_ancestor_of(&b.path));
                prop_assert!(!b.path.is_ancestor_of(&a.path));
            }
        }
    }

    #[test]
    fn prop_lazy_and_materialized_agree((old, new) in arb_edit_pair()) {
        let lazy: Vec<_> = diff(&old, &new).collect::<docwrite::Result<_>>().unwrap();
        let materialized = PathDiff::new(&old, &new).records().unwrap();
        prop_assert_eq!(lazy, materialized);
    }

    #[test]
    fn prop_sanitize_idempotent(v in arb_value()) {
        let once = sanitize(v);
        prop_assert!(is_sanitized(&once));
        prop_assert_eq!(sanitize(once.clone()), once);
    }
}

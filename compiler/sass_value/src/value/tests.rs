//! Tests for value equality, hashing, and the list/map interchange.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use pretty_assertions::assert_eq;
use sass_ir::ListSeparator;

use crate::{ArgList, Number, SassList, SassMap, Value};

fn hash_of(value: &Value) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

#[test]
fn test_empty_list_equals_empty_map() {
    let list = Value::list(vec![], ListSeparator::Undecided);
    let map = Value::Map(SassMap::empty());
    assert_eq!(list, map);
    assert_eq!(hash_of(&list), hash_of(&map));
}

#[test]
fn test_empty_list_asserts_as_map() {
    let list = Value::list(vec![], ListSeparator::Undecided);
    assert!(list.assert_map(None).unwrap().is_empty());
    assert!(Value::number(1.0).assert_map(Some("map")).is_err());
}

#[test]
fn test_empty_arglist_is_empty_map() {
    let empty = Value::ArgList(ArgList::new(vec![], ListSeparator::Comma, vec![]));
    let map = Value::Map(SassMap::empty());
    let list = Value::list(vec![], ListSeparator::Undecided);

    // Equality is transitive across all three empty shapes.
    assert_eq!(empty, map);
    assert_eq!(empty, list);
    assert_eq!(hash_of(&empty), hash_of(&map));

    assert!(empty.assert_map(None).unwrap().is_empty());
}

#[test]
fn test_arglist_with_keywords_is_not_a_map() {
    let keywords = vec![("x".to_string(), Value::number(1.0))];
    let with_keywords = Value::ArgList(ArgList::new(vec![], ListSeparator::Comma, keywords));
    assert!(with_keywords.assert_map(Some("args")).is_err());

    let with_elements = Value::ArgList(ArgList::new(
        vec![Value::number(1.0)],
        ListSeparator::Comma,
        vec![],
    ));
    assert_ne!(with_elements, Value::Map(SassMap::empty()));
}

#[test]
fn test_empty_list_and_map_report_length_zero() {
    assert_eq!(Value::list(vec![], ListSeparator::Undecided).list_length(), 0);
    assert_eq!(Value::Map(SassMap::empty()).list_length(), 0);
    // Any scalar is a single-element list.
    assert_eq!(Value::number(3.0).list_length(), 1);
}

#[test]
fn test_string_equality_ignores_quoting() {
    assert_eq!(Value::quoted_string("a"), Value::unquoted_string("a"));
    assert_eq!(
        hash_of(&Value::quoted_string("a")),
        hash_of(&Value::unquoted_string("a"))
    );
}

#[test]
fn test_converted_numbers_are_equal_map_keys() {
    // (1px * 1) and 1px are the same key.
    let computed = Number::with_unit(1.0, "px").mul(&Number::unitless(1.0));
    let map = SassMap::new(vec![(
        Value::Number(Number::with_unit(1.0, "px")),
        Value::number(10.0),
    )]);
    assert_eq!(
        map.get(&Value::Number(computed)),
        Some(&Value::number(10.0))
    );
    // And a converted unit still matches: 1in == 96px.
    assert_eq!(
        map.get(&Value::Number(Number::with_unit(96.0, "px"))),
        Some(&Value::number(10.0))
    );
}

#[test]
fn test_map_iterates_as_pair_lists() {
    let map = SassMap::new(vec![
        (Value::number(1.0), Value::quoted_string("a")),
        (Value::number(2.0), Value::quoted_string("b")),
    ]);
    let pairs = Value::Map(map).as_list();
    assert_eq!(pairs.len(), 2);
    match &pairs[0] {
        Value::List(pair) => {
            assert_eq!(pair.len(), 2);
            assert_eq!(pair.elements()[0], Value::number(1.0));
        }
        other => panic!("expected pair list, got {other:?}"),
    }
}

#[test]
fn test_sass_index_bounds() {
    let err = Value::sass_index_to_list_index(&Value::number(0.0), 3, Some("n")).unwrap_err();
    assert!(err.message.contains("may not be 0"));
    assert!(err.message.starts_with("$n:"));

    assert!(Value::sass_index_to_list_index(&Value::number(4.0), 3, None).is_err());
    assert!(Value::sass_index_to_list_index(&Value::number(-4.0), 3, None).is_err());
}

#[test]
fn test_sass_index_negative_wraps() {
    // -length maps to the first element, +length to the last.
    assert_eq!(
        Value::sass_index_to_list_index(&Value::number(-3.0), 3, None).unwrap(),
        0
    );
    assert_eq!(
        Value::sass_index_to_list_index(&Value::number(3.0), 3, None).unwrap(),
        2
    );
}

#[test]
fn test_sass_index_symmetry() {
    // nth(L, i) == nth(L, i - len - 1) for every valid i.
    let len = 5usize;
    for i in 1..=len {
        let forward =
            Value::sass_index_to_list_index(&Value::number(i as f64), len, None).unwrap();
        let backward = Value::sass_index_to_list_index(
            &Value::number(i as f64 - len as f64 - 1.0),
            len,
            None,
        )
        .unwrap();
        assert_eq!(forward, backward);
    }
}

#[test]
fn test_separator_unobservable_at_length_one() {
    let comma = Value::List(SassList::new(
        vec![Value::number(1.0)],
        ListSeparator::Comma,
        false,
    ));
    let space = Value::List(SassList::new(
        vec![Value::number(1.0)],
        ListSeparator::Space,
        false,
    ));
    assert_eq!(comma, space);
    assert_eq!(hash_of(&comma), hash_of(&space));
}

#[test]
fn test_selector_coercion() {
    let selector = Value::list(
        vec![
            Value::unquoted_string("a"),
            Value::list(
                vec![Value::unquoted_string("b"), Value::unquoted_string("c")],
                ListSeparator::Space,
            ),
        ],
        ListSeparator::Comma,
    );
    assert_eq!(selector.assert_selector(None).unwrap(), "a, b c");

    assert!(Value::number(1.0).assert_selector(Some("selector")).is_err());
    let nested_comma = Value::list(
        vec![Value::list(vec![Value::unquoted_string("a")], ListSeparator::Comma)],
        ListSeparator::Comma,
    );
    // A comma list inside a comma list is not a selector shape.
    assert!(nested_comma.assert_selector(None).is_err());
}

#[test]
fn test_truthiness() {
    assert!(!Value::Null.is_truthy());
    assert!(!Value::bool(false).is_truthy());
    assert!(Value::number(0.0).is_truthy());
    assert!(Value::unquoted_string("").is_truthy());
}

#[test]
fn test_special_number_detection() {
    assert!(Value::unquoted_string("calc(1px + 2px)")
        .assert_string(None)
        .unwrap()
        .is_special_number());
    assert!(Value::unquoted_string("VAR(--x)")
        .assert_string(None)
        .unwrap()
        .is_special_number());
    assert!(!Value::quoted_string("calc(1px)")
        .assert_string(None)
        .unwrap()
        .is_special_number());
    assert!(!Value::unquoted_string("mint(1)")
        .assert_string(None)
        .unwrap()
        .is_special_number());
}

mod properties {
    use proptest::prelude::*;

    use crate::{Number, Value};

    proptest! {
        #[test]
        fn prop_addition_commutes_for_compatible_units(
            a in -1.0e3..1.0e3f64,
            b in -1.0e3..1.0e3f64,
        ) {
            let left = Number::with_unit(a, "cm");
            let right = Number::with_unit(b, "mm");
            let forward = left.add(&right).unwrap();
            let backward = right.add(&left).unwrap();
            prop_assert!(forward.equals(&backward));

            let round_trip = forward.sub(&right).unwrap();
            prop_assert!(round_trip.equals(&left));
        }

        #[test]
        fn prop_sass_index_symmetry(len in 1usize..64, idx in 1usize..64) {
            prop_assume!(idx <= len);
            let forward =
                Value::sass_index_to_list_index(&Value::number(idx as f64), len, None).unwrap();
            let backward = Value::sass_index_to_list_index(
                &Value::number(idx as f64 - len as f64 - 1.0),
                len,
                None,
            )
            .unwrap();
            prop_assert_eq!(forward, backward);
        }

        #[test]
        fn prop_format_double_round_trips(value in -1.0e9..1.0e9f64) {
            let text = crate::format_double(value, false);
            let parsed: f64 = text.parse().unwrap();
            // Serialization keeps ten decimal digits.
            prop_assert!((parsed - value).abs() < 1e-4);
        }
    }
}

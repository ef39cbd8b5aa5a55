//! Integration tests for building canonical input.

use indexmap::IndexMap;
use proptest::prelude::*;
use serde_json::{json, Value};
use stillwater::Validation;
use validated_command::{CanonicalInput, Fragment, InputError, MapStrategy};

fn keys(input: &CanonicalInput) -> Vec<&str> {
    input.keys().collect()
}

#[test]
fn test_later_fragments_override_earlier() {
    let input = CanonicalInput::build_with(
        MapStrategy::Insertion,
        [json!({"a": 1, "b": 2}), json!({"b": 3})],
    )
    .unwrap();

    assert_eq!(input.get("a"), Some(&json!(1)));
    assert_eq!(input.get("b"), Some(&json!(3)));
    assert_eq!(input.len(), 2);
}

#[test]
fn test_wrapped_fragments_are_unwrapped() {
    let ok: Result<Value, String> = Ok(json!({"a": 1}));
    let success: Validation<Value, String> = Validation::Success(json!({"b": 2}));

    let input = CanonicalInput::build_with(
        MapStrategy::Insertion,
        [Fragment::from(ok), Fragment::from(success)],
    )
    .unwrap();

    assert_eq!(input.get("a"), Some(&json!(1)));
    assert_eq!(input.get("b"), Some(&json!(2)));
}

#[test]
fn test_non_mapping_fragment_is_rejected() {
    let err = CanonicalInput::build_with(
        MapStrategy::Insertion,
        [json!({"a": 1}), json!([1, 2])],
    )
    .unwrap_err();

    match err {
        InputError::InvalidFragmentKind { position, .. } => assert_eq!(position, 1),
    }
}

#[test]
fn test_failed_wrapped_fragment_is_rejected() {
    let failed: Result<Value, &str> = Err("upstream parse failed");
    let err = CanonicalInput::build_with(MapStrategy::Insertion, [Fragment::from(failed)]);
    assert!(err.is_err());
}

#[test]
fn test_pairs_fragment_normalizes_keys() {
    let input = CanonicalInput::build_with(
        MapStrategy::Insertion,
        [Fragment::pairs([(1, "one"), (2, "two")])],
    )
    .unwrap();

    assert_eq!(input.get("1"), Some(&json!("one")));
    assert_eq!(input.get("2"), Some(&json!("two")));
}

#[test]
fn test_strategies_differ_only_in_order() {
    let fragments = || {
        vec![
            json!({"b": 1}),
            json!({"a": 2}),
            json!({"c": 3}),
            json!({"b": 4}),
        ]
    };

    let recency = CanonicalInput::build_with(MapStrategy::Recency, fragments()).unwrap();
    let insertion = CanonicalInput::build_with(MapStrategy::Insertion, fragments()).unwrap();
    let plain = CanonicalInput::build_with(MapStrategy::Plain, fragments()).unwrap();

    assert_eq!(keys(&recency), vec!["a", "c", "b"]);
    assert_eq!(keys(&insertion), vec!["b", "a", "c"]);
    assert_eq!(keys(&plain), vec!["a", "b", "c"]);

    assert_eq!(recency, insertion);
    assert_eq!(insertion, plain);
}

#[test]
fn test_previous_canonical_input_is_a_fragment() {
    let first = CanonicalInput::build_with(MapStrategy::Insertion, [json!({"a": 1})]).unwrap();
    let second =
        CanonicalInput::build_with(MapStrategy::Insertion, [Fragment::from(first), json!({"b": 2}).into()])
            .unwrap();

    assert_eq!(second.to_value(), json!({"a": 1, "b": 2}));
}

fn fragment_strategy() -> impl Strategy<Value = IndexMap<String, i64>> {
    prop::collection::vec(("[a-e]", any::<i64>()), 0..6)
        .prop_map(|pairs| pairs.into_iter().collect())
}

fn to_fragment(fragment: &IndexMap<String, i64>) -> Value {
    Value::Object(
        fragment
            .iter()
            .map(|(key, value)| (key.clone(), json!(value)))
            .collect(),
    )
}

proptest! {
    #[test]
    fn prop_last_write_wins(fragments in prop::collection::vec(fragment_strategy(), 0..5)) {
        let values: Vec<Value> = fragments.iter().map(to_fragment).collect();
        let input = CanonicalInput::build_with(MapStrategy::Recency, values).unwrap();

        let mut expected: IndexMap<&str, i64> = IndexMap::new();
        for fragment in &fragments {
            for (key, value) in fragment {
                expected.insert(key.as_str(), *value);
            }
        }

        prop_assert_eq!(input.len(), expected.len());
        for (key, value) in expected {
            prop_assert_eq!(input.get(key), Some(&json!(value)));
        }
    }

    #[test]
    fn prop_strategies_agree_on_lookups(fragments in prop::collection::vec(fragment_strategy(), 0..5)) {
        let values: Vec<Value> = fragments.iter().map(to_fragment).collect();

        let recency = CanonicalInput::build_with(MapStrategy::Recency, values.clone()).unwrap();
        let plain = CanonicalInput::build_with(MapStrategy::Plain, values).unwrap();

        prop_assert_eq!(recency, plain);
    }
}

//! Canonical input construction.
//!
//! This module merges caller-supplied [`Fragment`]s into one
//! [`CanonicalInput`]: a string-keyed record that the schema engine validates
//! and the command executes against. Fragments are folded left to right and a
//! later fragment's key overwrites an earlier one (shallow, no deep merge).

use std::fmt::{Debug, Display};

use indexmap::IndexMap;
use serde_json::{Map, Value};
use stillwater::Validation;

use crate::config::MapStrategy;
use crate::path::{KeyPath, PathSegment};

/// One input mapping supplied by a caller.
///
/// A fragment is either a plain value or the result of an earlier computation.
/// Wrapped successes are unwrapped before merging; wrapped failures, like any
/// value that is not a mapping, are rejected by [`CanonicalInput::build`].
///
/// # Example
///
/// ```rust
/// use validated_command::{CanonicalInput, Fragment};
/// use serde_json::json;
///
/// let input = CanonicalInput::build([
///     Fragment::from(json!({"amount": 1})),
///     Fragment::from(Ok::<_, String>(json!({"currency": "USD"}))),
///     Fragment::pairs([("amount", 3)]),
/// ])
/// .unwrap();
///
/// assert_eq!(input.get("amount"), Some(&json!(3)));
/// assert_eq!(input.get("currency"), Some(&json!("USD")));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// A value supplied directly.
    Plain(Value),
    /// The result of a previous computation. `Err` holds a printable form of
    /// the failure.
    Wrapped(Result<Value, String>),
}

impl Fragment {
    /// Builds a mapping fragment from key/value pairs.
    ///
    /// Keys only need to be printable; they are stored in their `Display` form.
    pub fn pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Display,
        V: Into<Value>,
    {
        let map: Map<String, Value> = pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.into()))
            .collect();
        Fragment::Plain(Value::Object(map))
    }

    /// Unwraps the fragment into its mapping entries.
    fn into_entries(self, position: usize) -> Result<Map<String, Value>, InputError> {
        let value = match self {
            Fragment::Plain(value) | Fragment::Wrapped(Ok(value)) => value,
            Fragment::Wrapped(Err(representation)) => {
                return Err(InputError::InvalidFragmentKind {
                    position,
                    representation: format!("failure({})", representation),
                });
            }
        };

        match value {
            Value::Object(map) => Ok(map),
            other => Err(InputError::InvalidFragmentKind {
                position,
                representation: other.to_string(),
            }),
        }
    }
}

impl From<Value> for Fragment {
    fn from(value: Value) -> Self {
        Fragment::Plain(value)
    }
}

impl From<Map<String, Value>> for Fragment {
    fn from(map: Map<String, Value>) -> Self {
        Fragment::Plain(Value::Object(map))
    }
}

impl From<IndexMap<String, Value>> for Fragment {
    fn from(map: IndexMap<String, Value>) -> Self {
        Fragment::Plain(Value::Object(map.into_iter().collect()))
    }
}

impl From<CanonicalInput> for Fragment {
    fn from(input: CanonicalInput) -> Self {
        Fragment::Plain(input.into_value())
    }
}

impl<E: Debug> From<Result<Value, E>> for Fragment {
    fn from(result: Result<Value, E>) -> Self {
        Fragment::Wrapped(result.map_err(|e| format!("{:?}", e)))
    }
}

impl<E: Debug> From<Validation<Value, E>> for Fragment {
    fn from(validation: Validation<Value, E>) -> Self {
        Fragment::from(validation.into_result())
    }
}

/// The merged, key-normalized record validation runs against.
///
/// Lookups by string behave the same under every [`MapStrategy`]; the
/// strategy only decides iteration order.
#[derive(Debug, Clone)]
pub struct CanonicalInput {
    entries: IndexMap<String, Value>,
    strategy: MapStrategy,
}

impl CanonicalInput {
    /// Creates an empty record using the given strategy.
    pub fn new(strategy: MapStrategy) -> Self {
        Self {
            entries: IndexMap::new(),
            strategy,
        }
    }

    /// Merges fragments using the process-wide strategy.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::InvalidFragmentKind`] for the first fragment that
    /// is not a mapping once unwrapped.
    pub fn build<I>(fragments: I) -> Result<Self, InputError>
    where
        I: IntoIterator,
        I::Item: Into<Fragment>,
    {
        Self::build_with(MapStrategy::active(), fragments)
    }

    /// Merges fragments using an explicit strategy.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::InvalidFragmentKind`] for the first fragment that
    /// is not a mapping once unwrapped.
    pub fn build_with<I>(strategy: MapStrategy, fragments: I) -> Result<Self, InputError>
    where
        I: IntoIterator,
        I::Item: Into<Fragment>,
    {
        let mut input = Self::new(strategy);
        let mut count = 0;

        for (position, fragment) in fragments.into_iter().enumerate() {
            let entries = fragment.into().into_entries(position)?;
            input.extend(entries);
            count += 1;
        }

        tracing::debug!(
            fragments = count,
            keys = input.len(),
            %strategy,
            "canonical input built"
        );
        Ok(input)
    }

    /// Inserts one entry, overwriting any previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        let key = key.into();
        match self.strategy {
            MapStrategy::Recency => {
                let previous = self.entries.shift_remove(&key);
                self.entries.insert(key, value);
                previous
            }
            MapStrategy::Insertion => self.entries.insert(key, value),
            MapStrategy::Plain => self.entries.insert_sorted(key, value).1,
        }
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Follows a path through nested mappings and arrays.
    pub fn get_path(&self, path: &KeyPath) -> Option<&Value> {
        let mut segments = path.segments();
        let first = match segments.next()? {
            PathSegment::Field(name) => self.entries.get(name)?,
            PathSegment::Index(_) => return None,
        };

        segments.try_fold(first, |value, segment| match segment {
            PathSegment::Field(name) => value.get(name.as_str()),
            PathSegment::Index(idx) => value.get(*idx),
        })
    }

    /// Returns true if the record holds `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the keys in strategy order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Returns the entries in strategy order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the record has no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the strategy this record was built with.
    pub fn strategy(&self) -> MapStrategy {
        self.strategy
    }

    /// Converts the record into a JSON object.
    pub fn into_value(self) -> Value {
        Value::Object(self.entries.into_iter().collect())
    }

    /// Returns a JSON object copy of the record.
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}

impl Extend<(String, Value)> for CanonicalInput {
    fn extend<T: IntoIterator<Item = (String, Value)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl PartialEq for CanonicalInput {
    /// Records are equal when they hold the same entries, whatever the order.
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl From<CanonicalInput> for Value {
    fn from(input: CanonicalInput) -> Self {
        input.into_value()
    }
}

impl MapStrategy {
    /// Builds a record from already string-keyed entries under this strategy.
    pub fn normalize<I>(self, entries: I) -> CanonicalInput
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let mut input = CanonicalInput::new(self);
        input.extend(entries);
        input
    }
}

/// Errors raised before validation starts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    /// A fragment was not a mapping after unwrapping.
    #[error("all fragments must be mappings; fragment {position} was {representation}")]
    InvalidFragmentKind {
        /// Zero-based position of the offending fragment.
        position: usize,
        /// Printable form of the offending fragment.
        representation: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keys(input: &CanonicalInput) -> Vec<&str> {
        input.keys().collect()
    }

    #[test]
    fn test_later_fragment_wins() {
        let input = CanonicalInput::build_with(
            MapStrategy::Insertion,
            [json!({"a": 1}), json!({"b": 2}), json!({"a": 3})],
        )
        .unwrap();

        assert_eq!(input.len(), 2);
        assert_eq!(input.get("a"), Some(&json!(3)));
        assert_eq!(input.get("b"), Some(&json!(2)));
    }

    #[test]
    fn test_merge_is_shallow() {
        let input = CanonicalInput::build_with(
            MapStrategy::Insertion,
            [
                json!({"set": {"x": 1, "y": 2}}),
                json!({"set": {"x": 9}}),
            ],
        )
        .unwrap();

        assert_eq!(input.get("set"), Some(&json!({"x": 9})));
    }

    #[test]
    fn test_non_mapping_fragment_is_rejected() {
        let err = CanonicalInput::build_with(
            MapStrategy::Plain,
            [json!({"a": 1}), json!("just a string")],
        )
        .unwrap_err();

        assert_eq!(
            err,
            InputError::InvalidFragmentKind {
                position: 1,
                representation: "\"just a string\"".to_string(),
            }
        );
    }

    #[test]
    fn test_wrapped_success_is_unwrapped() {
        let input = CanonicalInput::build_with(
            MapStrategy::Insertion,
            [
                Fragment::from(Validation::<Value, String>::Success(json!({"a": 1}))),
                Fragment::from(Ok::<Value, String>(json!({"b": 2}))),
            ],
        )
        .unwrap();

        assert_eq!(input.get("a"), Some(&json!(1)));
        assert_eq!(input.get("b"), Some(&json!(2)));
    }

    #[test]
    fn test_wrapped_failure_is_rejected() {
        let err = CanonicalInput::build_with(
            MapStrategy::Insertion,
            [Fragment::from(Err::<Value, _>("boom"))],
        )
        .unwrap_err();

        match err {
            InputError::InvalidFragmentKind {
                position,
                representation,
            } => {
                assert_eq!(position, 0);
                assert!(representation.contains("boom"));
            }
        }
    }

    #[test]
    fn test_pair_keys_are_stringified() {
        let input =
            CanonicalInput::build_with(MapStrategy::Plain, [Fragment::pairs([(1, "one"), (2, "two")])])
                .unwrap();

        assert_eq!(input.get("1"), Some(&json!("one")));
        assert_eq!(input.get("2"), Some(&json!("two")));
    }

    #[test]
    fn test_strategies_order_keys_differently() {
        let fragments = || {
            [
                json!({"b": 1}),
                json!({"a": 1}),
                json!({"c": 1}),
                json!({"b": 2}),
            ]
        };

        let recency = CanonicalInput::build_with(MapStrategy::Recency, fragments()).unwrap();
        let insertion = CanonicalInput::build_with(MapStrategy::Insertion, fragments()).unwrap();
        let plain = CanonicalInput::build_with(MapStrategy::Plain, fragments()).unwrap();

        assert_eq!(keys(&recency), vec!["a", "c", "b"]);
        assert_eq!(keys(&insertion), vec!["b", "a", "c"]);
        assert_eq!(keys(&plain), vec!["a", "b", "c"]);

        // Same entries and same lookups regardless of strategy
        assert_eq!(recency, insertion);
        assert_eq!(insertion, plain);
        for key in ["a", "b", "c"] {
            assert_eq!(recency.get(key), plain.get(key));
        }
    }

    #[test]
    fn test_get_path() {
        let input = CanonicalInput::build_with(
            MapStrategy::Insertion,
            [json!({"bank_set": {"invoice_files": ["a.pdf", "b.pdf"]}})],
        )
        .unwrap();

        let path = KeyPath::from_field("bank_set")
            .push_field("invoice_files")
            .push_index(1);
        assert_eq!(input.get_path(&path), Some(&json!("b.pdf")));
        assert_eq!(input.get_path(&KeyPath::root()), None);
        assert_eq!(input.get_path(&KeyPath::from_field("missing")), None);
    }

    #[test]
    fn test_normalize_and_round_trip_to_value() {
        let input = MapStrategy::Plain.normalize([
            ("z".to_string(), json!(1)),
            ("y".to_string(), json!(2)),
        ]);

        assert_eq!(input.strategy(), MapStrategy::Plain);
        assert_eq!(input.to_value(), json!({"y": 2, "z": 1}));

        let again = CanonicalInput::build_with(MapStrategy::Plain, [Fragment::from(input.clone())])
            .unwrap();
        assert_eq!(again, input);
    }

    #[test]
    fn test_no_fragments_gives_empty_input() {
        let input = CanonicalInput::build_with(MapStrategy::Recency, Vec::<Value>::new()).unwrap();
        assert!(input.is_empty());
    }
}

//! Translation between predicate vocabularies.
//!
//! Schema engines name their predicates one way (`min_size?`, `format?`,
//! `included_in?`) while callers expect error kinds and guard options named
//! another way (`min_length`, `matches`, `in`). This module holds the fixed
//! table between the two, translates guard parameters in either direction,
//! resolves engine predicates to [`ErrorKind`]s, and maps declared type names
//! to type-check predicates or coercions.

use indexmap::IndexMap;
use serde_json::Value;

use crate::config::truthy_value;
use crate::error::ErrorKind;

/// Engine predicate ↔ guard name pairs.
///
/// `inclusion?` is the older spelling of `included_in?`; both map to `in`,
/// and `in` maps back to `included_in?`.
pub const GUARD_TABLE: &[(&str, &str)] = &[
    ("min_size?", "min_length"),
    ("max_size?", "max_length"),
    ("format?", "matches"),
    ("inclusion?", "in"),
    ("included_in?", "in"),
    ("gteq?", "min"),
    ("lteq?", "max"),
];

/// Type-check predicates and the kinds they report.
const TYPE_TABLE: &[(&str, ErrorKind)] = &[
    ("str?", ErrorKind::String),
    ("int?", ErrorKind::Integer),
    ("bool?", ErrorKind::Boolean),
    ("hash?", ErrorKind::Hash),
    ("array?", ErrorKind::Array),
    ("key?", ErrorKind::Required),
    ("filled?", ErrorKind::Required),
    ("none?", ErrorKind::Nils),
    ("empty?", ErrorKind::Empty),
];

/// Which side of [`GUARD_TABLE`] a set of names belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vocabulary {
    /// Schema-engine predicate names (`min_size?`).
    Predicate,
    /// Guard and error-kind names (`min_length`).
    Guard,
}

impl Vocabulary {
    /// Detects the vocabulary the names intersect with, preferring
    /// predicate names when both match.
    pub fn detect<K: AsRef<str>>(names: &[K]) -> Option<Self> {
        let intersects = |side: Self| {
            names
                .iter()
                .any(|name| side.counterpart(name.as_ref()).is_some())
        };

        if intersects(Vocabulary::Predicate) {
            Some(Vocabulary::Predicate)
        } else if intersects(Vocabulary::Guard) {
            Some(Vocabulary::Guard)
        } else {
            None
        }
    }

    /// Looks `name` up on this side and returns its counterpart.
    pub fn counterpart(self, name: &str) -> Option<&'static str> {
        match self {
            Vocabulary::Predicate => GUARD_TABLE
                .iter()
                .find(|(predicate, _)| *predicate == name)
                .map(|(_, guard)| *guard),
            Vocabulary::Guard => GUARD_TABLE
                .iter()
                .rev()
                .find(|(_, guard)| *guard == name)
                .map(|(predicate, _)| *predicate),
        }
    }
}

/// Translates guard parameters into the other vocabulary.
///
/// With no `keys`, every key of `params` is translated. Keys that have no
/// counterpart are left out. An empty `params`, or a truthy `empty` option,
/// yields an empty map no matter what else is present.
///
/// # Example
///
/// ```rust
/// use indexmap::IndexMap;
/// use serde_json::{json, Value};
/// use validated_command::vocabulary::translate;
///
/// let params: IndexMap<String, Value> =
///     [("min_length".to_string(), json!(3))].into_iter().collect();
///
/// let translated = translate::<&str>(&[], &params);
/// assert_eq!(translated.get("min_size?"), Some(&json!(3)));
/// ```
pub fn translate<K: AsRef<str>>(
    keys: &[K],
    params: &IndexMap<String, Value>,
) -> IndexMap<String, Value> {
    if params.is_empty() || truthy_value(params.get("empty")) {
        return IndexMap::new();
    }

    let keys: Vec<&str> = if keys.is_empty() {
        params.keys().map(String::as_str).collect()
    } else {
        keys.iter().map(|key| key.as_ref()).collect()
    };

    let Some(vocabulary) = Vocabulary::detect(&keys) else {
        return IndexMap::new();
    };

    keys.into_iter()
        .filter_map(|key| {
            let target = vocabulary.counterpart(key)?;
            let value = params.get(key).cloned().unwrap_or(Value::Null);
            Some((target.to_string(), value))
        })
        .collect()
}

/// Resolves an engine predicate to an error kind.
///
/// Guard predicates resolve through [`GUARD_TABLE`], type checks through the
/// type table. Unknown predicates resolve to `None`.
pub fn kind_for_predicate(predicate: &str) -> Option<ErrorKind> {
    if let Some(guard) = Vocabulary::Predicate.counterpart(predicate) {
        return Some(ErrorKind::from_name(guard));
    }
    TYPE_TABLE
        .iter()
        .find(|(name, _)| *name == predicate)
        .map(|(_, kind)| kind.clone())
}

/// What a declared type turns into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeHint {
    /// A type-check predicate such as `str?`.
    Predicate(String),
    /// A coercion applied to the value before it is checked.
    Coerce(Coercion),
}

/// Coercions a type hint can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// Render the value as a string and trim surrounding whitespace.
    StrippedString,
}

impl Coercion {
    /// Applies the coercion.
    pub fn apply(&self, value: &Value) -> Value {
        match self {
            Coercion::StrippedString => {
                let text = match value {
                    Value::String(s) => s.trim().to_string(),
                    Value::Null => String::new(),
                    other => other.to_string().trim().to_string(),
                };
                Value::String(text)
            }
        }
    }

    /// The predicate the coerced value satisfies.
    pub fn predicate(&self) -> &'static str {
        match self {
            Coercion::StrippedString => "str?",
        }
    }
}

/// Maps a declared type name to a type-check predicate or a coercion.
///
/// `"string"` becomes `str?`, or a [`Coercion::StrippedString`] when the
/// `strip` option is truthy; `"integer"` becomes `int?`; `"boolean"` becomes
/// `bool?`; any other name `n` becomes `n?`.
pub fn type_hint(declared: &str, params: &IndexMap<String, Value>) -> TypeHint {
    match declared {
        "string" if truthy_value(params.get("strip")) => {
            TypeHint::Coerce(Coercion::StrippedString)
        }
        "string" => TypeHint::Predicate("str?".to_string()),
        "integer" => TypeHint::Predicate("int?".to_string()),
        "boolean" => TypeHint::Predicate("bool?".to_string()),
        other => TypeHint::Predicate(format!("{}?", other)),
    }
}

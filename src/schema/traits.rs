//! Traits for schema polymorphism.
//!
//! This module provides the [`SchemaLike`] trait that lets the field and item
//! schemas of an object or array be of any schema type.

use serde_json::Value;
use stillwater::Validation;

use crate::failure::{Failures, PredicateFailure};
use crate::path::KeyPath;

/// A trait for schema types that can validate JSON values.
///
/// Failures are reported in the engine vocabulary (`str?`, `min_size?`, ...)
/// with the path of the value that failed. The `Send + Sync` bounds allow
/// schemas to be shared across threads and stored as `Box<dyn SchemaLike>`.
///
/// # Example
///
/// ```rust
/// use validated_command::{KeyPath, Schema, SchemaLike};
/// use serde_json::json;
///
/// let schema = Schema::string().min_size(3);
/// let failures = schema
///     .validate(&json!("ab"), &KeyPath::from_field("code"))
///     .into_result()
///     .unwrap_err();
///
/// let failure = failures.iter().next().unwrap();
/// assert_eq!(failure.predicate, "min_size?");
/// assert_eq!(failure.path.to_string(), "code");
/// ```
pub trait SchemaLike: Send + Sync {
    /// Validates `value`, which sits at `path` in the input.
    ///
    /// Returns the typed value on success, or every failed predicate.
    fn validate(&self, value: &Value, path: &KeyPath) -> Validation<Value, Failures>;
}

impl<S: SchemaLike + ?Sized> SchemaLike for Box<S> {
    fn validate(&self, value: &Value, path: &KeyPath) -> Validation<Value, Failures> {
        (**self).validate(value, path)
    }
}

/// Succeeds with `value` unless any failure was collected.
pub(super) fn finish<T>(value: T, failures: Vec<PredicateFailure>) -> Validation<T, Failures> {
    match Failures::from_vec(failures) {
        Some(failures) => Validation::Failure(failures),
        None => Validation::Success(value),
    }
}

/// Renders predicate arguments the way inclusion messages list them.
pub(super) fn list(values: &[Value]) -> String {
    values
        .iter()
        .map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

//! Array schema validation.
//!
//! This module provides [`ArraySchema`] for validating arrays whose items all
//! follow one item schema.

use serde_json::Value;
use stillwater::Validation;

use crate::failure::{Failures, PredicateFailure};
use crate::path::KeyPath;

use super::traits::{finish, SchemaLike};

/// A constraint applied to the array as a whole.
#[derive(Clone)]
enum ArrayConstraint {
    MinSize { min: usize, message: Option<String> },
    MaxSize { max: usize, message: Option<String> },
}

/// A schema for validating arrays.
///
/// Size constraints are reported at the array's own path. Every item is
/// validated; a failure of an item's own value is flagged as a per-element
/// (`each`) failure so the error carries the element's index, while failures
/// deeper inside an item keep their nested paths.
///
/// # Example
///
/// ```rust
/// use validated_command::{KeyPath, Schema, SchemaLike};
/// use serde_json::json;
///
/// let schema = Schema::array(Schema::string()).min_size(1);
///
/// let failures = schema
///     .validate(&json!(["a", 2, "c", 4]), &KeyPath::from_field("tags"))
///     .into_result()
///     .unwrap_err();
///
/// let indices: Vec<_> = failures.iter().filter_map(|f| f.element_index()).collect();
/// assert_eq!(indices, vec![1, 3]);
/// ```
pub struct ArraySchema {
    item_schema: Box<dyn SchemaLike>,
    constraints: Vec<ArrayConstraint>,
    type_error_message: Option<String>,
}

impl ArraySchema {
    /// Creates an array schema whose items must satisfy `item_schema`.
    pub fn new<S: SchemaLike + 'static>(item_schema: S) -> Self {
        Self {
            item_schema: Box::new(item_schema),
            constraints: Vec::new(),
            type_error_message: None,
        }
    }

    /// Requires at least `min` items (`min_size?`).
    pub fn min_size(mut self, min: usize) -> Self {
        self.constraints
            .push(ArrayConstraint::MinSize { min, message: None });
        self
    }

    /// Allows at most `max` items (`max_size?`).
    pub fn max_size(mut self, max: usize) -> Self {
        self.constraints
            .push(ArrayConstraint::MaxSize { max, message: None });
        self
    }

    /// Sets a custom message for the most recent constraint, or for the type
    /// check when there is none.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        if let Some(last) = self.constraints.last_mut() {
            match last {
                ArrayConstraint::MinSize { message: m, .. }
                | ArrayConstraint::MaxSize { message: m, .. } => *m = Some(message.into()),
            }
        } else {
            self.type_error_message = Some(message.into());
        }
        self
    }

    /// Validates a value, returning the validated items.
    pub fn validate_items(&self, value: &Value, path: &KeyPath) -> Validation<Vec<Value>, Failures> {
        let Some(arr) = value.as_array() else {
            let message = self
                .type_error_message
                .clone()
                .unwrap_or_else(|| "must be an array".to_string());
            return Validation::Failure(Failures::single(PredicateFailure::new(
                path.clone(),
                "array?",
                message,
            )));
        };

        let mut failures: Vec<PredicateFailure> = self
            .constraints
            .iter()
            .filter_map(|c| check_constraint(c, arr.len(), path))
            .collect();

        let mut validated_items = Vec::with_capacity(arr.len());
        for (index, item) in arr.iter().enumerate() {
            let item_path = path.push_index(index);
            match self.item_schema.validate(item, &item_path) {
                Validation::Success(v) => validated_items.push(v),
                Validation::Failure(e) => failures.extend(e.into_iter().map(|failure| {
                    if failure.path == item_path {
                        failure.each()
                    } else {
                        failure
                    }
                })),
            }
        }

        finish(validated_items, failures)
    }
}

impl SchemaLike for ArraySchema {
    fn validate(&self, value: &Value, path: &KeyPath) -> Validation<Value, Failures> {
        self.validate_items(value, path).map(Value::Array)
    }
}

/// Checks a size constraint and returns a failure if it is violated.
fn check_constraint(
    constraint: &ArrayConstraint,
    len: usize,
    path: &KeyPath,
) -> Option<PredicateFailure> {
    match constraint {
        ArrayConstraint::MinSize { min, message } if len < *min => Some(
            PredicateFailure::new(
                path.clone(),
                "min_size?",
                message
                    .clone()
                    .unwrap_or_else(|| format!("size cannot be less than {}", min)),
            )
            .with_args(vec![Value::from(*min)]),
        ),
        ArrayConstraint::MaxSize { max, message } if len > *max => Some(
            PredicateFailure::new(
                path.clone(),
                "max_size?",
                message
                    .clone()
                    .unwrap_or_else(|| format!("size cannot be greater than {}", max)),
            )
            .with_args(vec![Value::from(*max)]),
        ),
        _ => None,
    }
}

//! Numeric schema validation.
//!
//! This module provides [`IntegerSchema`] for validating integer values with
//! bound and inclusion constraints.

use serde_json::Value;
use std::ops::RangeInclusive;
use stillwater::Validation;

use crate::failure::{Failures, PredicateFailure};
use crate::path::KeyPath;

use super::traits::{finish, list, SchemaLike};

/// A constraint applied to integer values.
#[derive(Clone)]
enum IntegerConstraint {
    Gteq { value: i64, message: Option<String> },
    Lteq { value: i64, message: Option<String> },
    IncludedIn { options: Vec<i64>, message: Option<String> },
}

/// A schema for validating integer values.
///
/// Floats are rejected even when they have no fractional part. All bound
/// violations are reported.
///
/// # Example
///
/// ```rust
/// use validated_command::{KeyPath, Schema, SchemaLike};
/// use serde_json::json;
///
/// let schema = Schema::integer().gteq(0).lteq(100);
///
/// assert!(schema.validate(&json!(50), &KeyPath::root()).is_success());
/// assert!(schema.validate(&json!(-50), &KeyPath::root()).is_failure());
/// assert!(schema.validate(&json!(1.0), &KeyPath::root()).is_failure());
/// ```
#[derive(Clone)]
pub struct IntegerSchema {
    constraints: Vec<IntegerConstraint>,
    type_error_message: Option<String>,
}

impl IntegerSchema {
    /// Creates a new integer schema with no constraints.
    pub fn new() -> Self {
        Self {
            constraints: Vec::new(),
            type_error_message: None,
        }
    }

    /// Requires the value to be at least `value` (`gteq?`).
    pub fn gteq(mut self, value: i64) -> Self {
        self.constraints
            .push(IntegerConstraint::Gteq { value, message: None });
        self
    }

    /// Requires the value to be at most `value` (`lteq?`).
    pub fn lteq(mut self, value: i64) -> Self {
        self.constraints
            .push(IntegerConstraint::Lteq { value, message: None });
        self
    }

    /// Shorthand for `gteq(start).lteq(end)`.
    pub fn range(self, range: RangeInclusive<i64>) -> Self {
        let (start, end) = range.into_inner();
        self.gteq(start).lteq(end)
    }

    /// Requires the value to be one of `options` (`included_in?`).
    pub fn included_in(mut self, options: impl IntoIterator<Item = i64>) -> Self {
        self.constraints.push(IntegerConstraint::IncludedIn {
            options: options.into_iter().collect(),
            message: None,
        });
        self
    }

    /// Sets a custom message for the most recent constraint, or for the type
    /// check when there is none.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        if let Some(last) = self.constraints.last_mut() {
            match last {
                IntegerConstraint::Gteq { message: m, .. }
                | IntegerConstraint::Lteq { message: m, .. }
                | IntegerConstraint::IncludedIn { message: m, .. } => *m = Some(message.into()),
            }
        } else {
            self.type_error_message = Some(message.into());
        }
        self
    }

    /// Validates a value, returning the integer.
    pub fn validate_i64(&self, value: &Value, path: &KeyPath) -> Validation<i64, Failures> {
        let Some(n) = value.as_i64() else {
            let message = self
                .type_error_message
                .clone()
                .unwrap_or_else(|| "must be an integer".to_string());
            return Validation::Failure(Failures::single(PredicateFailure::new(
                path.clone(),
                "int?",
                message,
            )));
        };

        let failures = self
            .constraints
            .iter()
            .filter_map(|c| check_constraint(c, n, path))
            .collect();

        finish(n, failures)
    }
}

impl Default for IntegerSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaLike for IntegerSchema {
    fn validate(&self, value: &Value, path: &KeyPath) -> Validation<Value, Failures> {
        self.validate_i64(value, path).map(Value::from)
    }
}

/// Checks a single constraint and returns a failure if it is violated.
fn check_constraint(
    constraint: &IntegerConstraint,
    value: i64,
    path: &KeyPath,
) -> Option<PredicateFailure> {
    let failure = |predicate: &str, message: &Option<String>, default: String, args: Value| {
        PredicateFailure::new(path.clone(), predicate, message.clone().unwrap_or(default))
            .with_args(vec![args])
    };

    match constraint {
        IntegerConstraint::Gteq { value: min, message } if value < *min => Some(failure(
            "gteq?",
            message,
            format!("must be greater than or equal to {}", min),
            Value::from(*min),
        )),
        IntegerConstraint::Lteq { value: max, message } if value > *max => Some(failure(
            "lteq?",
            message,
            format!("must be less than or equal to {}", max),
            Value::from(*max),
        )),
        IntegerConstraint::IncludedIn { options, message } if !options.contains(&value) => {
            let options: Vec<Value> = options.iter().copied().map(Value::from).collect();
            Some(failure(
                "included_in?",
                message,
                format!("must be one of: {}", list(&options)),
                Value::Array(options),
            ))
        }
        _ => None,
    }
}

//! String schema validation.
//!
//! This module provides [`StringSchema`] for validating string values with
//! size, format and inclusion constraints.

use regex::Regex;
use serde_json::Value;
use stillwater::Validation;

use crate::failure::{Failures, PredicateFailure};
use crate::path::KeyPath;
use crate::vocabulary::Coercion;

use super::traits::{finish, list, SchemaLike};

/// A constraint applied to string values.
#[derive(Clone)]
enum StringConstraint {
    Filled {
        message: Option<String>,
    },
    MinSize {
        min: usize,
        message: Option<String>,
    },
    MaxSize {
        max: usize,
        message: Option<String>,
    },
    Format {
        regex: Regex,
        message: Option<String>,
    },
    IncludedIn {
        options: Vec<Value>,
        message: Option<String>,
    },
}

/// A schema for validating string values.
///
/// `StringSchema` checks `str?` first; if the value is a string every
/// constraint is checked and all violations are reported, in the order the
/// constraints were declared.
///
/// # Example
///
/// ```rust
/// use validated_command::{KeyPath, Schema, SchemaLike};
/// use serde_json::json;
///
/// let schema = Schema::string()
///     .min_size(3)
///     .format(r"^[a-z]+$")
///     .unwrap();
///
/// let failures = schema
///     .validate(&json!("AB"), &KeyPath::from_field("code"))
///     .into_result()
///     .unwrap_err();
///
/// // Both too short and in the wrong format
/// assert_eq!(failures.len(), 2);
/// ```
#[derive(Clone)]
pub struct StringSchema {
    constraints: Vec<StringConstraint>,
    coercion: Option<Coercion>,
    type_error_message: Option<String>,
}

impl StringSchema {
    /// Creates a new string schema with no constraints.
    pub fn new() -> Self {
        Self {
            constraints: Vec::new(),
            coercion: None,
            type_error_message: None,
        }
    }

    /// Renders the value as a string and trims it before checking.
    ///
    /// A stripped schema accepts any value, so `str?` never fails.
    pub fn strip(mut self) -> Self {
        self.coercion = Some(Coercion::StrippedString);
        self
    }

    /// Rejects the empty string (`filled?`).
    pub fn filled(mut self) -> Self {
        self.constraints
            .push(StringConstraint::Filled { message: None });
        self
    }

    /// Requires at least `min` characters (`min_size?`).
    pub fn min_size(mut self, min: usize) -> Self {
        self.constraints
            .push(StringConstraint::MinSize { min, message: None });
        self
    }

    /// Allows at most `max` characters (`max_size?`).
    pub fn max_size(mut self, max: usize) -> Self {
        self.constraints
            .push(StringConstraint::MaxSize { max, message: None });
        self
    }

    /// Requires a regex match (`format?`).
    ///
    /// Returns an error if the pattern is not a valid regex.
    pub fn format(mut self, pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(pattern)?;
        self.constraints.push(StringConstraint::Format {
            regex,
            message: None,
        });
        Ok(self)
    }

    /// Requires the value to be one of `options` (`included_in?`).
    pub fn included_in<I, V>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let options = options
            .into_iter()
            .map(|option| Value::String(option.into()))
            .collect();
        self.constraints.push(StringConstraint::IncludedIn {
            options,
            message: None,
        });
        self
    }

    /// Sets a custom message for the most recent constraint.
    ///
    /// If no constraints have been added yet, this sets the message used when
    /// the value is not a string.
    ///
    /// # Example
    ///
    /// ```rust
    /// use validated_command::{KeyPath, Schema, SchemaLike};
    /// use serde_json::json;
    ///
    /// let schema = Schema::string()
    ///     .min_size(5)
    ///     .error("username must be at least 5 characters");
    ///
    /// let failures = schema
    ///     .validate(&json!("hi"), &KeyPath::root())
    ///     .into_result()
    ///     .unwrap_err();
    /// assert_eq!(
    ///     failures.iter().next().unwrap().message,
    ///     "username must be at least 5 characters"
    /// );
    /// ```
    pub fn error(mut self, message: impl Into<String>) -> Self {
        if let Some(last) = self.constraints.last_mut() {
            match last {
                StringConstraint::Filled { message: m }
                | StringConstraint::MinSize { message: m, .. }
                | StringConstraint::MaxSize { message: m, .. }
                | StringConstraint::Format { message: m, .. }
                | StringConstraint::IncludedIn { message: m, .. } => *m = Some(message.into()),
            }
        } else {
            self.type_error_message = Some(message.into());
        }
        self
    }

    /// Validates a value, returning the (possibly coerced) string.
    pub fn validate_str(&self, value: &Value, path: &KeyPath) -> Validation<String, Failures> {
        let coerced;
        let value = match self.coercion {
            Some(coercion) => {
                coerced = coercion.apply(value);
                &coerced
            }
            None => value,
        };

        let Some(s) = value.as_str() else {
            let message = self
                .type_error_message
                .clone()
                .unwrap_or_else(|| "must be a string".to_string());
            return Validation::Failure(Failures::single(PredicateFailure::new(
                path.clone(),
                "str?",
                message,
            )));
        };

        let failures = self
            .constraints
            .iter()
            .filter_map(|c| check_constraint(c, s, path))
            .collect();

        finish(s.to_string(), failures)
    }
}

impl Default for StringSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaLike for StringSchema {
    fn validate(&self, value: &Value, path: &KeyPath) -> Validation<Value, Failures> {
        self.validate_str(value, path).map(Value::String)
    }
}

/// Checks a single constraint and returns a failure if it is violated.
fn check_constraint(
    constraint: &StringConstraint,
    value: &str,
    path: &KeyPath,
) -> Option<PredicateFailure> {
    let failure = |predicate: &str, message: &Option<String>, default: String| {
        PredicateFailure::new(path.clone(), predicate, message.clone().unwrap_or(default))
    };

    match constraint {
        StringConstraint::Filled { message } if value.is_empty() => {
            Some(failure("filled?", message, "must be filled".to_string()))
        }
        StringConstraint::MinSize { min, message } if value.chars().count() < *min => Some(
            failure(
                "min_size?",
                message,
                format!("size cannot be less than {}", min),
            )
            .with_args(vec![Value::from(*min)]),
        ),
        StringConstraint::MaxSize { max, message } if value.chars().count() > *max => Some(
            failure(
                "max_size?",
                message,
                format!("size cannot be greater than {}", max),
            )
            .with_args(vec![Value::from(*max)]),
        ),
        StringConstraint::Format { regex, message } if !regex.is_match(value) => Some(
            failure("format?", message, "is in invalid format".to_string())
                .with_args(vec![Value::String(regex.as_str().to_string())]),
        ),
        StringConstraint::IncludedIn { options, message }
            if !options.iter().any(|option| option.as_str() == Some(value)) =>
        {
            Some(
                failure(
                    "included_in?",
                    message,
                    format!("must be one of: {}", list(options)),
                )
                .with_args(vec![Value::Array(options.clone())]),
            )
        }
        _ => None,
    }
}

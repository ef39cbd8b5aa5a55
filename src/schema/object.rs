//! Object schema validation.
//!
//! This module provides [`ObjectSchema`] for validating JSON objects with
//! typed required and optional fields plus cross-field rules. An object
//! schema is also a complete [`SchemaEngine`]: it validates a
//! [`CanonicalInput`] as the object at the root of the input.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use stillwater::Validation;

use crate::canonical::CanonicalInput;
use crate::engine::{SchemaEngine, SchemaResult};
use crate::failure::{Failures, PredicateFailure};
use crate::path::KeyPath;

use super::traits::{finish, SchemaLike};

/// Definition of a field within an object schema.
struct FieldDef {
    schema: Box<dyn SchemaLike>,
    required: bool,
}

/// A check over several fields at once.
type Rule =
    Box<dyn Fn(&IndexMap<String, Value>, &KeyPath) -> Validation<(), Failures> + Send + Sync>;

/// A schema for validating JSON objects.
///
/// Required fields report `key?` when absent and `filled?` when null.
/// Optional fields may be absent or null. Keys the schema does not declare
/// are dropped from the output. Rules run only once every field is valid.
///
/// # Example
///
/// ```rust
/// use validated_command::{KeyPath, Schema, SchemaLike};
/// use serde_json::json;
///
/// let schema = Schema::object()
///     .field("name", Schema::string().min_size(1))
///     .field("age", Schema::integer().gteq(0))
///     .optional("email", Schema::string());
///
/// let result = schema.validate(&json!({"name": "Alice", "age": 30}), &KeyPath::root());
/// assert!(result.is_success());
///
/// let result = schema.validate(&json!({"name": "Bob"}), &KeyPath::root());
/// assert!(result.is_failure());
/// ```
pub struct ObjectSchema {
    fields: IndexMap<String, FieldDef>,
    rules: Vec<Rule>,
    type_error_message: Option<String>,
}

impl ObjectSchema {
    /// Creates a new object schema with no fields.
    pub fn new() -> Self {
        Self {
            fields: IndexMap::new(),
            rules: Vec::new(),
            type_error_message: None,
        }
    }

    /// Adds a required field.
    pub fn field<S>(mut self, name: impl Into<String>, schema: S) -> Self
    where
        S: SchemaLike + 'static,
    {
        self.fields.insert(
            name.into(),
            FieldDef {
                schema: Box::new(schema),
                required: true,
            },
        );
        self
    }

    /// Adds an optional field. Absent and null values are accepted.
    pub fn optional<S>(mut self, name: impl Into<String>, schema: S) -> Self
    where
        S: SchemaLike + 'static,
    {
        self.fields.insert(
            name.into(),
            FieldDef {
                schema: Box::new(schema),
                required: false,
            },
        );
        self
    }

    /// Adds a rule over the validated fields.
    ///
    /// # Example
    ///
    /// ```rust
    /// use validated_command::{Failures, KeyPath, PredicateFailure, Schema, SchemaLike};
    /// use serde_json::json;
    /// use stillwater::Validation;
    ///
    /// let schema = Schema::object()
    ///     .field("start", Schema::integer())
    ///     .field("end", Schema::integer())
    ///     .rule(|fields, path| {
    ///         if fields["start"].as_i64() <= fields["end"].as_i64() {
    ///             Validation::Success(())
    ///         } else {
    ///             Validation::Failure(Failures::single(PredicateFailure::new(
    ///                 path.push_field("end"),
    ///                 "gteq?",
    ///                 "must not be before start",
    ///             )))
    ///         }
    ///     });
    ///
    /// let result = schema.validate(&json!({"start": 5, "end": 1}), &KeyPath::root());
    /// assert!(result.is_failure());
    /// ```
    pub fn rule<F>(mut self, rule: F) -> Self
    where
        F: Fn(&IndexMap<String, Value>, &KeyPath) -> Validation<(), Failures> + Send + Sync + 'static,
    {
        self.rules.push(Box::new(rule));
        self
    }

    /// Sets the message used when the value is not an object.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.type_error_message = Some(message.into());
        self
    }

    /// Validates a value, returning the declared fields that were present.
    pub fn validate_map(
        &self,
        value: &Value,
        path: &KeyPath,
    ) -> Validation<Map<String, Value>, Failures> {
        let Some(obj) = value.as_object() else {
            let message = self
                .type_error_message
                .clone()
                .unwrap_or_else(|| "must be a hash".to_string());
            return Validation::Failure(Failures::single(PredicateFailure::new(
                path.clone(),
                "hash?",
                message,
            )));
        };

        self.validate_fields(|name| obj.get(name), path)
            .map(|fields| fields.into_iter().collect())
    }

    fn validate_fields<'a, L>(
        &self,
        lookup: L,
        path: &KeyPath,
    ) -> Validation<IndexMap<String, Value>, Failures>
    where
        L: Fn(&str) -> Option<&'a Value>,
    {
        let mut failures = Vec::new();
        let mut validated = IndexMap::new();

        for (name, field_def) in &self.fields {
            let field_path = path.push_field(name);

            match lookup(name.as_str()) {
                None if field_def.required => {
                    failures.push(PredicateFailure::new(field_path, "key?", "is missing"));
                }
                None => {}
                Some(Value::Null) if field_def.required => {
                    failures.push(PredicateFailure::new(field_path, "filled?", "must be filled"));
                }
                Some(Value::Null) => {
                    validated.insert(name.clone(), Value::Null);
                }
                Some(field_value) => match field_def.schema.validate(field_value, &field_path) {
                    Validation::Success(v) => {
                        validated.insert(name.clone(), v);
                    }
                    Validation::Failure(e) => failures.extend(e),
                },
            }
        }

        if failures.is_empty() {
            for rule in &self.rules {
                if let Validation::Failure(e) = rule(&validated, path) {
                    failures.extend(e);
                }
            }
        }

        finish(validated, failures)
    }
}

impl Default for ObjectSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaLike for ObjectSchema {
    fn validate(&self, value: &Value, path: &KeyPath) -> Validation<Value, Failures> {
        self.validate_map(value, path).map(Value::Object)
    }
}

impl SchemaEngine for ObjectSchema {
    fn apply(&self, input: &CanonicalInput) -> SchemaResult {
        match self.validate_fields(|name| input.get(name), &KeyPath::root()) {
            Validation::Success(fields) => {
                SchemaResult::valid(input.strategy().normalize(fields))
            }
            Validation::Failure(failures) => SchemaResult {
                output: input.clone(),
                failures: failures.into_node(),
            },
        }
    }
}

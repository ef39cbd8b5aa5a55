//! Boolean schema validation.

use serde_json::Value;
use stillwater::Validation;

use crate::failure::{Failures, PredicateFailure};
use crate::path::KeyPath;

use super::traits::SchemaLike;

/// A schema accepting `true` and `false` (`bool?`).
#[derive(Clone, Default)]
pub struct BooleanSchema {
    type_error_message: Option<String>,
}

impl BooleanSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the message used when the value is not a boolean.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.type_error_message = Some(message.into());
        self
    }
}

impl SchemaLike for BooleanSchema {
    fn validate(&self, value: &Value, path: &KeyPath) -> Validation<Value, Failures> {
        match value {
            Value::Bool(b) => Validation::Success(Value::Bool(*b)),
            _ => {
                let message = self
                    .type_error_message
                    .clone()
                    .unwrap_or_else(|| "must be boolean".to_string());
                Validation::Failure(Failures::single(PredicateFailure::new(
                    path.clone(),
                    "bool?",
                    message,
                )))
            }
        }
    }
}

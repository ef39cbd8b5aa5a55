//! Canonical error kinds.

use std::fmt::{self, Display};

/// The kind of an [`ErrorAtom`](super::ErrorAtom), named in the caller-facing
/// vocabulary (`min_length`, `in`, `required`, ...).
///
/// Kinds that have no fixed name, such as predicates a schema engine invented
/// on its own, are carried verbatim in [`ErrorKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required key is missing or unfilled.
    Required,
    /// The value is nil where one is needed.
    Nils,
    /// The value is blank.
    Empty,
    /// The value is not a string.
    String,
    /// The value is not an integer.
    Integer,
    /// The value is not a boolean.
    Boolean,
    /// The value is not a mapping.
    Hash,
    /// The value is not an array.
    Array,
    /// The value is shorter than allowed.
    MinLength,
    /// The value is longer than allowed.
    MaxLength,
    /// The value does not match the required format.
    Matches,
    /// The value is not one of the allowed options.
    In,
    /// The value is below the lower bound.
    Min,
    /// The value is above the upper bound.
    Max,
    /// The command's execute step failed.
    RuntimeException,
    /// Any kind outside the fixed vocabulary, kept by name.
    Other(String),
}

impl ErrorKind {
    /// Looks a kind up by name; unknown names become [`ErrorKind::Other`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "required" => ErrorKind::Required,
            "nils" => ErrorKind::Nils,
            "empty" => ErrorKind::Empty,
            "string" => ErrorKind::String,
            "integer" => ErrorKind::Integer,
            "boolean" => ErrorKind::Boolean,
            "hash" => ErrorKind::Hash,
            "array" => ErrorKind::Array,
            "min_length" => ErrorKind::MinLength,
            "max_length" => ErrorKind::MaxLength,
            "matches" => ErrorKind::Matches,
            "in" => ErrorKind::In,
            "min" => ErrorKind::Min,
            "max" => ErrorKind::Max,
            "runtime_exception" => ErrorKind::RuntimeException,
            other => ErrorKind::Other(other.to_string()),
        }
    }

    /// Returns the kind's name.
    pub fn as_str(&self) -> &str {
        match self {
            ErrorKind::Required => "required",
            ErrorKind::Nils => "nils",
            ErrorKind::Empty => "empty",
            ErrorKind::String => "string",
            ErrorKind::Integer => "integer",
            ErrorKind::Boolean => "boolean",
            ErrorKind::Hash => "hash",
            ErrorKind::Array => "array",
            ErrorKind::MinLength => "min_length",
            ErrorKind::MaxLength => "max_length",
            ErrorKind::Matches => "matches",
            ErrorKind::In => "in",
            ErrorKind::Min => "min",
            ErrorKind::Max => "max",
            ErrorKind::RuntimeException => "runtime_exception",
            ErrorKind::Other(name) => name,
        }
    }

    /// Default human text for this kind, used when the engine rendered none.
    pub(crate) fn default_text(&self) -> &'static str {
        match self {
            ErrorKind::Required => "is required",
            ErrorKind::Nils => "can't be nil",
            ErrorKind::Empty => "can't be blank",
            ErrorKind::String => "isn't a string",
            ErrorKind::Integer => "isn't an integer",
            ErrorKind::Boolean => "isn't a boolean",
            ErrorKind::Hash => "isn't a hash",
            ErrorKind::Array => "isn't an array",
            ErrorKind::MinLength => "is too short",
            ErrorKind::MaxLength => "is too long",
            ErrorKind::Matches => "isn't in the right format",
            ErrorKind::In => "isn't an option",
            ErrorKind::Min => "is too small",
            ErrorKind::Max => "is too big",
            ErrorKind::RuntimeException => "failed while executing",
            ErrorKind::Other(_) => "is invalid",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ErrorKind {
    fn from(name: &str) -> Self {
        ErrorKind::from_name(name)
    }
}

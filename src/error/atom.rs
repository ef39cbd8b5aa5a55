//! Leaf error records.

use std::fmt::{self, Display};

use crate::failure::PredicateFailure;

use super::kind::ErrorKind;

/// One leaf error in an [`ErrorTree`](super::ErrorTree).
///
/// An atom names the field it belongs to, its canonical [`ErrorKind`], the
/// element index when the failure concerns one element of an array, and the
/// [`PredicateFailure`] it was compiled from. Atoms are immutable; attaching a
/// message produces a new atom.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorAtom {
    key: String,
    kind: ErrorKind,
    message: Option<String>,
    index: Option<usize>,
    source: PredicateFailure,
}

impl ErrorAtom {
    /// Creates an atom without message text.
    pub fn new(
        key: impl Into<String>,
        kind: ErrorKind,
        index: Option<usize>,
        source: PredicateFailure,
    ) -> Self {
        Self {
            key: key.into(),
            kind,
            message: None,
            index,
            source,
        }
    }

    /// Returns a copy of this atom carrying `message`.
    pub fn with_message(self, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..self
        }
    }

    /// The field this atom belongs to.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The canonical kind.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// The attached message, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// The element index for per-element failures.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// The failure this atom was built from.
    pub fn source(&self) -> &PredicateFailure {
        &self.source
    }

    /// Text synthesized from the key and kind, e.g. `"name is too long"` or
    /// `"tags[2] isn't a string"`.
    pub fn default_message(&self) -> String {
        let subject = match self.index {
            Some(index) => format!("{}[{}]", self.key, index),
            None => self.key.clone(),
        };
        if subject.is_empty() {
            self.kind.default_text().to_string()
        } else {
            format!("{} {}", subject, self.kind.default_text())
        }
    }

    /// The attached message, or the synthesized one.
    pub fn text(&self) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| self.default_message())
    }
}

impl Display for ErrorAtom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.text(), self.kind)
    }
}

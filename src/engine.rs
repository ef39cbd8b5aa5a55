//! The contract between commands and schema engines.

use crate::canonical::CanonicalInput;
use crate::error::ErrorKind;
use crate::failure::FailureRoot;
use crate::vocabulary;

/// What a schema engine returns for one input record.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaResult {
    /// Typed values keyed like the input.
    pub output: CanonicalInput,
    /// Everything that failed; empty when the input is valid.
    pub failures: FailureRoot,
}

impl SchemaResult {
    /// A result with no failures.
    pub fn valid(output: CanonicalInput) -> Self {
        Self {
            output,
            failures: FailureRoot::new(),
        }
    }
}

/// A schema engine validates a canonical input record.
///
/// Engines report failures in their own predicate vocabulary; `kind_for`
/// tells the error compiler which [`ErrorKind`] a predicate stands for. The
/// default resolves through [`vocabulary::kind_for_predicate`].
///
/// Any `Fn(&CanonicalInput) -> SchemaResult` is an engine.
///
/// # Example
///
/// ```rust
/// use validated_command::{CanonicalInput, SchemaEngine, SchemaResult};
///
/// let accept_all = |input: &CanonicalInput| SchemaResult::valid(input.clone());
/// let input = CanonicalInput::build(Vec::<serde_json::Value>::new()).unwrap();
///
/// assert!(accept_all.apply(&input).failures.is_empty());
/// ```
pub trait SchemaEngine: Send + Sync {
    /// Validates `input`, returning typed output and the failure description.
    fn apply(&self, input: &CanonicalInput) -> SchemaResult;

    /// Resolves an engine predicate to an error kind.
    fn kind_for(&self, predicate: &str) -> Option<ErrorKind> {
        vocabulary::kind_for_predicate(predicate)
    }
}

impl<F> SchemaEngine for F
where
    F: Fn(&CanonicalInput) -> SchemaResult + Send + Sync,
{
    fn apply(&self, input: &CanonicalInput) -> SchemaResult {
        self(input)
    }
}

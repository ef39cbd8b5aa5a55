//! The terminal result of one command run.

use stillwater::Validation;

use crate::error::{ErrorAtom, ErrorTree};
use crate::failure::PredicateFailure;
use crate::path::KeyPath;

/// Either the command's value or the complete tree of errors.
///
/// Exactly one arm is populated. Outcomes produced by a command run never
/// carry an empty `Failure` tree; [`Outcome::from_errors`] keeps that when an
/// outcome is built by hand.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The value returned by the execute step.
    Success(T),
    /// Every error collected during the run.
    Failure(ErrorTree),
}

impl<T> Outcome<T> {
    /// Decides the outcome from the accumulated errors: any error means
    /// failure, otherwise `value` is produced.
    pub fn from_errors(errors: ErrorTree, value: impl FnOnce() -> T) -> Self {
        if errors.is_empty() {
            Outcome::Success(value())
        } else {
            Outcome::Failure(errors)
        }
    }

    /// Returns true for `Success`.
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// Returns true for `Failure`.
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure(_))
    }

    /// The value, for a successful run.
    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Failure(_) => None,
        }
    }

    /// The error tree, for a failed run.
    pub fn errors(&self) -> Option<&ErrorTree> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(errors) => Some(errors),
        }
    }

    /// Every error atom with its path; empty for a successful run.
    pub fn atoms(&self) -> Vec<(KeyPath, &ErrorAtom)> {
        self.errors().map(ErrorTree::atoms).unwrap_or_default()
    }

    /// The failures behind the error atoms, for downstream formatting.
    pub fn messages(&self) -> Vec<&PredicateFailure> {
        self.errors().map(ErrorTree::messages).unwrap_or_default()
    }

    /// Maps the success value.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Outcome::Success(value) => Outcome::Success(f(value)),
            Outcome::Failure(errors) => Outcome::Failure(errors),
        }
    }

    /// Converts into a `Result`.
    pub fn into_result(self) -> Result<T, ErrorTree> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(errors) => Err(errors),
        }
    }

    /// Collapses into the two-armed `Validation`.
    pub fn into_validation(self) -> Validation<T, ErrorTree> {
        match self {
            Outcome::Success(value) => Validation::Success(value),
            Outcome::Failure(errors) => Validation::Failure(errors),
        }
    }
}

impl<T> From<Outcome<T>> for Validation<T, ErrorTree> {
    fn from(outcome: Outcome<T>) -> Self {
        outcome.into_validation()
    }
}

impl<T> From<Outcome<T>> for Result<T, ErrorTree> {
    fn from(outcome: Outcome<T>) -> Self {
        outcome.into_result()
    }
}

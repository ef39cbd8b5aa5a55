//! Commands and the pipeline that runs them.
//!
//! A [`Command`] is plain business logic. [`ValidatedCommand`] wraps one
//! together with a [`SchemaEngine`] and drives every run through the same
//! steps:
//!
//! 1. merge the input fragments into a [`CanonicalInput`];
//! 2. validate it and compile the failures into an [`ErrorTree`]; any error
//!    ends the run as a failure and the command is never executed;
//! 3. let the command's own `validate` hook add errors, with the same effect;
//! 4. execute the command against the schema output. Errors it adds go into
//!    the same tree, and a returned error or a panic is recorded as one
//!    `runtime_exception` atom instead of propagating;
//! 5. succeed with the command's value only if the tree is still empty.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::canonical::{CanonicalInput, Fragment, InputError};
use crate::compiler::{ErrorCompiler, KindPolicy};
use crate::engine::{SchemaEngine, SchemaResult};
use crate::error::ErrorTree;
use crate::outcome::Outcome;
use crate::CommandResult;

/// Error type a command's execute step may return.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Business logic run after its input has been validated.
///
/// Any `Fn(&CanonicalInput, &mut ErrorTree) -> Result<T, BoxError>` is a
/// command.
pub trait Command: Send + Sync {
    /// The value a successful run produces.
    type Output;

    /// Extra checks that run after schema validation passed and before
    /// `execute`. Errors added here prevent execution.
    fn validate(&self, inputs: &CanonicalInput, errors: &mut ErrorTree) {
        let _ = (inputs, errors);
    }

    /// Performs the command on the validated input.
    ///
    /// Errors added to `errors` turn the run into a failure even when this
    /// returns `Ok`.
    fn execute(
        &self,
        inputs: &CanonicalInput,
        errors: &mut ErrorTree,
    ) -> Result<Self::Output, BoxError>;
}

impl<F, T> Command for F
where
    F: Fn(&CanonicalInput, &mut ErrorTree) -> Result<T, BoxError> + Send + Sync,
{
    type Output = T;

    fn execute(&self, inputs: &CanonicalInput, errors: &mut ErrorTree) -> Result<T, BoxError> {
        self(inputs, errors)
    }
}

/// A command composed with the schema that guards it.
///
/// # Example
///
/// ```rust
/// use validated_command::{
///     BoxError, CanonicalInput, ErrorTree, Schema, ValidatedCommand,
/// };
/// use serde_json::json;
///
/// let greet = ValidatedCommand::new(
///     Schema::object().field("name", Schema::string().min_size(1)),
///     |inputs: &CanonicalInput, _: &mut ErrorTree| -> Result<String, BoxError> {
///         Ok(format!("hello {}", inputs.get("name").unwrap()))
///     },
/// );
///
/// let outcome = greet.run([json!({"name": "ada"})]).unwrap();
/// assert_eq!(outcome.value().map(String::as_str), Some("hello \"ada\""));
///
/// let outcome = greet.run([json!({"name": ""})]).unwrap();
/// assert!(outcome.is_failure());
/// ```
pub struct ValidatedCommand<S, C> {
    schema: S,
    command: C,
    policy: KindPolicy,
}

impl<S: SchemaEngine, C: Command> ValidatedCommand<S, C> {
    /// Wraps `command` so it only runs on input `schema` accepts.
    pub fn new(schema: S, command: C) -> Self {
        Self {
            schema,
            command,
            policy: KindPolicy::default(),
        }
    }

    /// Sets how the kind of a multi-failure atom is chosen.
    pub fn with_policy(mut self, policy: KindPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The guarding schema.
    pub fn schema(&self) -> &S {
        &self.schema
    }

    /// The wrapped command.
    pub fn command(&self) -> &C {
        &self.command
    }

    /// Merges `fragments` and runs the pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::InvalidFragmentKind`] if a fragment is not a
    /// mapping; nothing is validated or executed in that case. Every other
    /// problem is reported through [`Outcome::Failure`].
    pub fn run<I>(&self, fragments: I) -> Result<Outcome<C::Output>, InputError>
    where
        I: IntoIterator,
        I::Item: Into<Fragment>,
    {
        let input = CanonicalInput::build(fragments)?;
        Ok(self.run_input(&input))
    }

    /// Runs the pipeline on an already merged input.
    pub fn run_input(&self, input: &CanonicalInput) -> Outcome<C::Output> {
        assemble(
            &self.schema,
            self.policy,
            input,
            |inputs, errors| self.command.validate(inputs, errors),
            |inputs, errors| self.command.execute(inputs, errors),
        )
    }

    /// Like [`run`](Self::run), collapsed into a `Validation`.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::InvalidFragmentKind`] if a fragment is not a
    /// mapping.
    pub fn call<I>(&self, fragments: I) -> Result<CommandResult<C::Output>, InputError>
    where
        I: IntoIterator,
        I::Item: Into<Fragment>,
    {
        self.run(fragments).map(Outcome::into_validation)
    }
}

/// Runs one input through `schema` and, if it is valid, through `execute`.
///
/// `execute` receives the schema output and the error tree so it can add
/// errors of its own.
pub fn run<S, F, T>(input: &CanonicalInput, schema: &S, execute: F) -> Outcome<T>
where
    S: SchemaEngine + ?Sized,
    F: FnOnce(&CanonicalInput, &mut ErrorTree) -> Result<T, BoxError>,
{
    assemble(schema, KindPolicy::default(), input, |_, _| {}, execute)
}

fn assemble<S, V, E, T>(
    schema: &S,
    policy: KindPolicy,
    input: &CanonicalInput,
    validate: V,
    execute: E,
) -> Outcome<T>
where
    S: SchemaEngine + ?Sized,
    V: FnOnce(&CanonicalInput, &mut ErrorTree),
    E: FnOnce(&CanonicalInput, &mut ErrorTree) -> Result<T, BoxError>,
{
    let SchemaResult { output, failures } = schema.apply(input);
    let mut errors = ErrorCompiler::new(schema)
        .with_policy(policy)
        .compile(&failures);
    if !errors.is_empty() {
        tracing::debug!(
            errors = errors.atom_count(),
            "schema validation failed, skipping execute"
        );
        return Outcome::Failure(errors);
    }

    validate(&output, &mut errors);
    if !errors.is_empty() {
        tracing::debug!(
            errors = errors.atom_count(),
            "command validation failed, skipping execute"
        );
        return Outcome::Failure(errors);
    }

    let executed = panic::catch_unwind(AssertUnwindSafe(|| execute(&output, &mut errors)));
    let value = match executed {
        Ok(Ok(value)) => Some(value),
        Ok(Err(err)) => {
            tracing::warn!(error = %err, "execute returned an error");
            errors.add_runtime_exception(&err.to_string());
            None
        }
        Err(payload) => {
            let description = panic_description(payload.as_ref());
            tracing::warn!(panic = %description, "execute panicked");
            errors.add_runtime_exception(&description);
            None
        }
    };

    match value {
        Some(value) if errors.is_empty() => Outcome::Success(value),
        _ => {
            tracing::debug!(errors = errors.atom_count(), "execute reported errors");
            Outcome::Failure(errors)
        }
    }
}

fn panic_description(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "execute panicked".to_string()
    }
}

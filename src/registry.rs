//! Command registry for running commands by name.
//!
//! This module provides the [`CommandRegistry`] type that stores validated
//! commands under string names, so a dispatcher can route a request to its
//! command without knowing the command's concrete types.

use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::canonical::{CanonicalInput, Fragment, InputError};
use crate::command::{Command, ValidatedCommand};
use crate::engine::SchemaEngine;
use crate::outcome::Outcome;
use crate::CommandResult;

/// A validated command with its output erased to a JSON value.
trait DynCommand: Send + Sync {
    fn run_input(&self, input: &CanonicalInput) -> Outcome<Value>;
}

impl<S, C> DynCommand for ValidatedCommand<S, C>
where
    S: SchemaEngine,
    C: Command,
    C::Output: Into<Value>,
{
    fn run_input(&self, input: &CanonicalInput) -> Outcome<Value> {
        ValidatedCommand::run_input(self, input).map(Into::into)
    }
}

/// Type alias for the command storage map.
type CommandMap = Arc<RwLock<HashMap<String, Arc<dyn DynCommand>>>>;

/// A thread-safe registry of named commands.
///
/// # Thread Safety
///
/// The registry uses `Arc<RwLock<...>>` for thread-safe access:
/// - Multiple threads can run commands concurrently (read-only access)
/// - Registration operations are serialized (write access)
///
/// Clones share the same storage. The lock is released before a command
/// runs, so commands may themselves use the registry.
///
/// # Example
///
/// ```rust
/// use validated_command::{
///     BoxError, CanonicalInput, CommandRegistry, ErrorTree, Schema, ValidatedCommand,
/// };
/// use serde_json::{json, Value};
///
/// let registry = CommandRegistry::new();
/// registry
///     .register(
///         "double",
///         ValidatedCommand::new(
///             Schema::object().field("n", Schema::integer()),
///             |inputs: &CanonicalInput, _: &mut ErrorTree| -> Result<Value, BoxError> {
///                 let n = inputs.get("n").and_then(Value::as_i64).unwrap_or_default();
///                 Ok(json!(n * 2))
///             },
///         ),
///     )
///     .unwrap();
///
/// let result = registry.call("double", [json!({"n": 21})]).unwrap();
/// assert!(result.is_success());
/// ```
pub struct CommandRegistry {
    commands: CommandMap,
}

impl CommandRegistry {
    /// Creates a new empty command registry.
    pub fn new() -> Self {
        Self {
            commands: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Registers a command under the given name.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::DuplicateName` if the name is already registered.
    pub fn register<S, C>(
        &self,
        name: impl Into<String>,
        command: ValidatedCommand<S, C>,
    ) -> Result<(), RegistryError>
    where
        S: SchemaEngine + 'static,
        C: Command + 'static,
        C::Output: Into<Value>,
    {
        let name = name.into();
        let mut commands = self.commands.write();

        if commands.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }

        tracing::debug!(command = %name, "registered command");
        commands.insert(name, Arc::new(command));
        Ok(())
    }

    /// Returns true if a command is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.commands.read().contains_key(name)
    }

    /// The registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.commands.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.read().len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.commands.read().is_empty()
    }

    /// Merges `fragments` and runs the named command on them.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::CommandNotFound` if no command has that name,
    /// and `RegistryError::Input` if a fragment is not a mapping.
    pub fn run<I>(&self, name: &str, fragments: I) -> Result<Outcome<Value>, RegistryError>
    where
        I: IntoIterator,
        I::Item: Into<Fragment>,
    {
        let command = self
            .commands
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::CommandNotFound(name.to_string()))?;

        let input = CanonicalInput::build(fragments)?;
        Ok(command.run_input(&input))
    }

    /// Like [`run`](Self::run), collapsed into a `Validation`.
    ///
    /// # Errors
    ///
    /// Same as [`run`](Self::run).
    pub fn call<I>(
        &self,
        name: &str,
        fragments: I,
    ) -> Result<CommandResult<Value>, RegistryError>
    where
        I: IntoIterator,
        I::Item: Into<Fragment>,
    {
        self.run(name, fragments).map(Outcome::into_validation)
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for CommandRegistry {
    fn clone(&self) -> Self {
        Self {
            commands: Arc::clone(&self.commands),
        }
    }
}

/// Errors that can occur during registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Attempted to register a command with a name that already exists.
    #[error("command '{0}' already registered")]
    DuplicateName(String),

    /// Attempted to run a command name that doesn't exist.
    #[error("command '{0}' not found")]
    CommandNotFound(String),

    /// The input fragments could not be merged.
    #[error(transparent)]
    Input(#[from] InputError),
}

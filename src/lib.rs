//! # Validated Command
//!
//! Runs business logic only on input that passed validation, and reports
//! every problem in one structured error tree.
//!
//! ## Overview
//!
//! A run goes through four stages:
//!
//! - the input fragments are merged into one [`CanonicalInput`];
//! - a [`SchemaEngine`] validates it and describes what failed, in its own
//!   predicate vocabulary (`min_size?`, `included_in?`, ...);
//! - the [`ErrorCompiler`] turns that description into an [`ErrorTree`] of
//!   [`ErrorAtom`]s keyed like the input, with caller-facing [`ErrorKind`]s
//!   (`min_length`, `in`, ...);
//! - the [`Command`] executes only if the tree is empty. It may add errors of
//!   its own, and a failure while executing becomes a `runtime_exception`
//!   error instead of escaping.
//!
//! The result is an [`Outcome`]: the command's value or the full tree.
//!
//! ## Example
//!
//! ```rust
//! use validated_command::{
//!     BoxError, CanonicalInput, ErrorKind, ErrorTree, KeyPath, Schema, ValidatedCommand,
//! };
//! use serde_json::{json, Value};
//!
//! let transfer = ValidatedCommand::new(
//!     Schema::object()
//!         .field("account", Schema::string().format(r"^\d{8}$").unwrap())
//!         .field("amount", Schema::integer().gteq(1)),
//!     |inputs: &CanonicalInput, _: &mut ErrorTree| -> Result<Value, BoxError> {
//!         Ok(json!({"queued": inputs.get("amount")}))
//!     },
//! );
//!
//! let outcome = transfer
//!     .run([json!({"account": "12345678"}), json!({"amount": 0})])
//!     .unwrap();
//!
//! let errors = outcome.errors().unwrap();
//! let atom = errors.atom_at(&KeyPath::from_field("amount")).unwrap();
//! assert_eq!(atom.kind(), &ErrorKind::Min);
//! assert_eq!(atom.message(), Some("must be greater than or equal to 1"));
//! ```

pub mod canonical;
pub mod command;
pub mod compiler;
pub mod config;
pub mod engine;
pub mod error;
pub mod failure;
pub mod outcome;
pub mod path;
pub mod registry;
pub mod schema;
pub mod vocabulary;

pub use canonical::{CanonicalInput, Fragment, InputError};
pub use command::{BoxError, Command, ValidatedCommand};
pub use compiler::{ErrorCompiler, KindPolicy};
pub use config::{ConfigError, MapStrategy};
pub use engine::{SchemaEngine, SchemaResult};
pub use error::{ErrorAtom, ErrorKind, ErrorNode, ErrorTree};
pub use failure::{FailureNode, FailureOptions, FailureRoot, Failures, PredicateFailure};
pub use outcome::Outcome;
pub use path::{KeyPath, PathSegment};
pub use registry::{CommandRegistry, RegistryError};
pub use schema::{
    ArraySchema, BooleanSchema, IntegerSchema, ObjectSchema, Schema, SchemaLike, StringSchema,
};

/// Type alias for a command run collapsed into a `Validation`.
pub type CommandResult<T> = stillwater::Validation<T, ErrorTree>;

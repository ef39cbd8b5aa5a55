//! Caller-facing error types.
//!
//! Validation failures end up as an [`ErrorTree`] of [`ErrorAtom`]s, each
//! tagged with an [`ErrorKind`] from the caller-facing vocabulary.

mod atom;
mod kind;
mod tree;

pub use atom::ErrorAtom;
pub use kind::ErrorKind;
pub use tree::{ErrorNode, ErrorTree};

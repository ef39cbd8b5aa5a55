//! Compilation of failure descriptions into error trees.
//!
//! Compilation runs in two passes over the same tree:
//!
//! 1. [`ErrorCompiler::place_atoms`] mirrors the failure description's shape
//!    and gives every leaf an [`ErrorAtom`] with its key, kind and element
//!    index, but no message.
//! 2. [`patch_messages`] attaches message text, taken from the engine's
//!    rendered text or synthesized from the kind when the engine gave none.
//!
//! Kind comes from the predicate's identity, text from the engine's wording,
//! and each pass can be tested on its own.

use crate::engine::SchemaEngine;
use crate::error::{ErrorAtom, ErrorKind, ErrorNode, ErrorTree};
use crate::failure::{FailureNode, PredicateFailure};
use crate::vocabulary;

/// Which failing predicate decides an atom's kind when several predicates
/// fail for the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KindPolicy {
    /// The first failure in declared rule order, i.e. the order the engine
    /// reported them.
    #[default]
    FirstDeclared,
    /// The first type-check failure (`str?`, `key?`, ...) if any, otherwise
    /// the first failure in declared order.
    TypeChecksFirst,
}

impl KindPolicy {
    /// Picks the failure that decides the kind, or `None` if there are no failures.
    pub fn select<'a>(&self, failures: &'a [PredicateFailure]) -> Option<&'a PredicateFailure> {
        match self {
            KindPolicy::FirstDeclared => failures.first(),
            KindPolicy::TypeChecksFirst => failures
                .iter()
                .find(|f| is_type_check(&f.predicate))
                .or_else(|| failures.first()),
        }
    }
}

fn is_type_check(predicate: &str) -> bool {
    vocabulary::Vocabulary::Predicate.counterpart(predicate).is_none()
        && vocabulary::kind_for_predicate(predicate).is_some()
}

/// Turns a schema engine's failure description into an [`ErrorTree`].
///
/// # Example
///
/// ```rust
/// use validated_command::{
///     CanonicalInput, ErrorCompiler, ErrorKind, FailureNode, KeyPath, PredicateFailure,
///     SchemaResult,
/// };
///
/// let engine = |input: &CanonicalInput| SchemaResult::valid(input.clone());
/// let failures = FailureNode::from_failures(vec![PredicateFailure::new(
///     KeyPath::from_field("name"),
///     "max_size?",
///     "size cannot be greater than 10",
/// )]);
///
/// let tree = ErrorCompiler::new(&engine).compile(&failures);
/// let atom = tree.atom_at(&KeyPath::from_field("name")).unwrap();
/// assert_eq!(atom.kind(), &ErrorKind::MaxLength);
/// assert_eq!(atom.message(), Some("size cannot be greater than 10"));
/// ```
pub struct ErrorCompiler<'s, S: ?Sized> {
    schema: &'s S,
    policy: KindPolicy,
}

impl<'s, S: SchemaEngine + ?Sized> ErrorCompiler<'s, S> {
    /// Creates a compiler resolving kinds through `schema`.
    pub fn new(schema: &'s S) -> Self {
        Self {
            schema,
            policy: KindPolicy::default(),
        }
    }

    /// Sets the kind selection policy.
    pub fn with_policy(mut self, policy: KindPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Runs both passes.
    pub fn compile(&self, root: &FailureNode) -> ErrorTree {
        patch_messages(self.place_atoms(root))
    }

    /// Pass 1: builds the tree's structure and each atom's kind.
    ///
    /// Failures recorded on the root itself, and on any node that also has
    /// children, are placed under [`ErrorTree::SELF_KEY`] of that node's tree.
    pub fn place_atoms(&self, root: &FailureNode) -> ErrorTree {
        let mut tree = self.place_children(root);
        if let Some(atom) = self.atom_for(root.failures()) {
            tree.insert(ErrorTree::SELF_KEY, ErrorNode::Atom(atom));
        }
        tree
    }

    fn place_children(&self, node: &FailureNode) -> ErrorTree {
        let mut tree = ErrorTree::new();
        for (segment, child) in node.children() {
            if let Some(compiled) = self.place_node(child) {
                tree.insert(segment.clone(), compiled);
            }
        }
        tree
    }

    fn place_node(&self, node: &FailureNode) -> Option<ErrorNode> {
        if node.is_leaf() {
            return self.atom_for(node.failures()).map(ErrorNode::Atom);
        }

        let tree = self.place_atoms(node);
        (!tree.is_empty()).then_some(ErrorNode::Tree(tree))
    }

    fn atom_for(&self, failures: &[PredicateFailure]) -> Option<ErrorAtom> {
        let chosen = self.policy.select(failures)?;
        let kind = self.schema.kind_for(&chosen.predicate).unwrap_or_else(|| {
            tracing::warn!(
                predicate = %chosen.predicate,
                path = %chosen.path,
                "unknown predicate, using its name as the error kind"
            );
            ErrorKind::Other(chosen.predicate.clone())
        });

        let key = chosen
            .path
            .last_field()
            .unwrap_or(ErrorTree::SELF_KEY)
            .to_string();

        Some(ErrorAtom::new(key, kind, chosen.element_index(), chosen.clone()))
    }
}

/// Pass 2: attaches message text to every atom that has none.
///
/// The text is the engine's rendered message for the failure the atom was
/// built from; when that is empty the atom's synthesized text is used.
pub fn patch_messages(tree: ErrorTree) -> ErrorTree {
    tree.map_atoms(&mut |atom: ErrorAtom| {
        if atom.message().is_some() {
            return atom;
        }
        let text = if atom.source().message.is_empty() {
            atom.default_message()
        } else {
            atom.source().message.clone()
        };
        atom.with_message(text)
    })
}

/// Compiles `root` with the default policy.
pub fn compile<S: SchemaEngine + ?Sized>(schema: &S, root: &FailureNode) -> ErrorTree {
    ErrorCompiler::new(schema).compile(root)
}

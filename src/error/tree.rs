//! Hierarchical error trees.

use std::fmt::{self, Display};

use indexmap::map::Entry;
use indexmap::IndexMap;
use stillwater::prelude::*;

use crate::failure::PredicateFailure;
use crate::path::{KeyPath, PathSegment};

use super::atom::ErrorAtom;
use super::kind::ErrorKind;

/// A value in an [`ErrorTree`]: a nested tree or a leaf atom.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorNode {
    /// Errors beneath this segment.
    Tree(ErrorTree),
    /// The error for this segment's own value.
    Atom(ErrorAtom),
}

impl ErrorNode {
    /// Returns the atom if this node is a leaf.
    pub fn as_atom(&self) -> Option<&ErrorAtom> {
        match self {
            ErrorNode::Atom(atom) => Some(atom),
            ErrorNode::Tree(_) => None,
        }
    }

    /// Returns the subtree if this node is nested.
    pub fn as_tree(&self) -> Option<&ErrorTree> {
        match self {
            ErrorNode::Tree(tree) => Some(tree),
            ErrorNode::Atom(_) => None,
        }
    }

    /// Converts the node into a tree. An atom moves under
    /// [`ErrorTree::SELF_KEY`] of a new tree.
    pub fn into_tree(self) -> ErrorTree {
        match self {
            ErrorNode::Tree(tree) => tree,
            ErrorNode::Atom(atom) => {
                let mut tree = ErrorTree::new();
                tree.insert(ErrorTree::SELF_KEY, ErrorNode::Atom(atom));
                tree
            }
        }
    }
}

/// Errors keyed by path segment, mirroring the shape of the input.
///
/// Fields map to nested trees or atoms; per-element failures of an array
/// field sit under that field keyed by [`PathSegment::Index`]. An empty tree
/// means there are no errors.
///
/// # Example
///
/// ```rust
/// use validated_command::{ErrorKind, ErrorTree, KeyPath};
///
/// let mut errors = ErrorTree::new();
/// errors.add_error("bank_set.reference", ErrorKind::Required, None);
///
/// let atom = errors
///     .atom_at(&KeyPath::parse_dotted("bank_set.reference"))
///     .unwrap();
/// assert_eq!(atom.key(), "reference");
/// assert_eq!(atom.text(), "reference is required");
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ErrorTree {
    entries: IndexMap<PathSegment, ErrorNode>,
}

impl ErrorTree {
    /// Key under which a node's own failures sit when it also has children,
    /// and under which failures of the whole record are placed.
    pub const SELF_KEY: &'static str = "$self";

    /// Key under which a failure of the execute step is recorded.
    pub const RUNTIME_KEY: &'static str = "$runtime";

    /// Rule name given to errors added while the command runs.
    pub const IMPERATIVE_RULE: &'static str = "execute";

    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// True if the tree holds no atoms.
    pub fn is_empty(&self) -> bool {
        self.entries.values().all(|node| match node {
            ErrorNode::Tree(tree) => tree.is_empty(),
            ErrorNode::Atom(_) => false,
        })
    }

    /// Number of direct entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Inserts a node under `segment`, returning the node it replaced.
    pub fn insert(&mut self, segment: impl Into<PathSegment>, node: ErrorNode) -> Option<ErrorNode> {
        self.entries.insert(segment.into(), node)
    }

    /// Returns the direct entry under `segment`.
    pub fn get(&self, segment: &PathSegment) -> Option<&ErrorNode> {
        self.entries.get(segment)
    }

    /// Follows `path` through nested trees.
    pub fn get_path(&self, path: &KeyPath) -> Option<&ErrorNode> {
        let (first, rest) = path.as_slice().split_first()?;
        rest.iter()
            .try_fold(self.entries.get(first)?, |node, segment| {
                node.as_tree()?.entries.get(segment)
            })
    }

    /// Returns the atom at `path`, if the path ends at a leaf.
    pub fn atom_at(&self, path: &KeyPath) -> Option<&ErrorAtom> {
        self.get_path(path).and_then(ErrorNode::as_atom)
    }

    /// Iterates the direct entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&PathSegment, &ErrorNode)> {
        self.entries.iter()
    }

    /// Places `atom` at `path`, creating intermediate trees as needed.
    ///
    /// Atom and subtree never displace each other: an atom sitting where an
    /// intermediate tree is needed moves under that tree's [`Self::SELF_KEY`],
    /// and an atom placed on an existing subtree goes under its
    /// [`Self::SELF_KEY`]. The root path also places the atom under
    /// [`Self::SELF_KEY`]. Returns the atom this one replaced, if any.
    pub fn place(&mut self, path: &KeyPath, atom: ErrorAtom) -> Option<ErrorNode> {
        self.place_at(path.as_slice(), atom)
    }

    fn place_at(&mut self, segments: &[PathSegment], atom: ErrorAtom) -> Option<ErrorNode> {
        match segments {
            [] => self.insert(Self::SELF_KEY, ErrorNode::Atom(atom)),
            [last] => match self.entries.get_mut(last) {
                Some(ErrorNode::Tree(tree)) => tree.place_at(&[], atom),
                _ => self.insert(last.clone(), ErrorNode::Atom(atom)),
            },
            [first, rest @ ..] => {
                let slot = self
                    .entries
                    .entry(first.clone())
                    .or_insert_with(|| ErrorNode::Tree(ErrorTree::new()));
                if slot.as_atom().is_some() {
                    tracing::debug!(segment = %first, "error atom moved under nested errors");
                }
                let mut subtree = std::mem::replace(slot, ErrorNode::Tree(ErrorTree::new())).into_tree();
                let replaced = subtree.place_at(rest, atom);
                *slot = ErrorNode::Tree(subtree);
                replaced
            }
        }
    }

    /// Adds an error at a dot-delimited path while a command runs.
    ///
    /// Missing intermediate trees are created. Without a message the atom
    /// gets text synthesized from its key and kind.
    pub fn add_error(&mut self, path: &str, kind: ErrorKind, message: Option<&str>) {
        let key_path = KeyPath::parse_dotted(path);
        let key = key_path.last_field().unwrap_or(Self::SELF_KEY).to_string();
        let source = PredicateFailure::new(
            key_path.clone(),
            kind.as_str(),
            message.unwrap_or_default(),
        )
        .with_rule(Self::IMPERATIVE_RULE);

        let atom = ErrorAtom::new(key, kind, None, source);
        let atom = match message {
            Some(text) => atom.with_message(text),
            None => {
                let text = atom.default_message();
                atom.with_message(text)
            }
        };

        tracing::debug!(path = %key_path, kind = %atom.kind(), "error added");
        self.place(&key_path, atom);
    }

    /// Records a failure of the execute step under [`Self::RUNTIME_KEY`].
    pub fn add_runtime_exception(&mut self, description: &str) {
        self.add_error(
            Self::RUNTIME_KEY,
            ErrorKind::RuntimeException,
            Some(description),
        );
    }

    /// Every atom with its full path, depth first in insertion order.
    pub fn atoms(&self) -> Vec<(KeyPath, &ErrorAtom)> {
        let mut atoms = Vec::new();
        self.collect_atoms(&KeyPath::root(), &mut atoms);
        atoms
    }

    fn collect_atoms<'a>(&'a self, prefix: &KeyPath, atoms: &mut Vec<(KeyPath, &'a ErrorAtom)>) {
        for (segment, node) in &self.entries {
            let path = match segment {
                PathSegment::Field(name) => prefix.push_field(name.clone()),
                PathSegment::Index(idx) => prefix.push_index(*idx),
            };
            match node {
                ErrorNode::Atom(atom) => atoms.push((path, atom)),
                ErrorNode::Tree(tree) => tree.collect_atoms(&path, atoms),
            }
        }
    }

    /// Number of atoms in the whole tree.
    pub fn atom_count(&self) -> usize {
        self.entries
            .values()
            .map(|node| match node {
                ErrorNode::Atom(_) => 1,
                ErrorNode::Tree(tree) => tree.atom_count(),
            })
            .sum()
    }

    /// The failures the atoms were compiled from, for downstream formatting.
    pub fn messages(&self) -> Vec<&PredicateFailure> {
        self.atoms().into_iter().map(|(_, atom)| atom.source()).collect()
    }

    /// Rebuilds the tree with every atom passed through `f`.
    pub fn map_atoms<F>(self, f: &mut F) -> Self
    where
        F: FnMut(ErrorAtom) -> ErrorAtom,
    {
        let entries = self
            .entries
            .into_iter()
            .map(|(segment, node)| {
                let node = match node {
                    ErrorNode::Atom(atom) => ErrorNode::Atom(f(atom)),
                    ErrorNode::Tree(tree) => ErrorNode::Tree(tree.map_atoms(f)),
                };
                (segment, node)
            })
            .collect();
        Self { entries }
    }
}

impl Semigroup for ErrorTree {
    /// Merges two trees. Nested trees merge recursively and a later atom
    /// replaces an earlier one at the same key. An atom meeting a subtree
    /// joins it under [`ErrorTree::SELF_KEY`].
    fn combine(mut self, other: Self) -> Self {
        for (segment, node) in other.entries {
            match self.entries.entry(segment) {
                Entry::Occupied(mut slot) => {
                    let mine = std::mem::replace(slot.get_mut(), ErrorNode::Tree(ErrorTree::new()));
                    let merged = match (mine, node) {
                        (ErrorNode::Atom(_), ErrorNode::Atom(theirs)) => ErrorNode::Atom(theirs),
                        (mine, theirs) => ErrorNode::Tree(mine.into_tree().combine(theirs.into_tree())),
                    };
                    slot.insert(merged);
                }
                Entry::Vacant(slot) => {
                    slot.insert(node);
                }
            }
        }
        self
    }
}

impl Display for ErrorTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let atoms = self.atoms();
        writeln!(f, "Command failed with {} error(s):", atoms.len())?;
        for (i, (path, atom)) in atoms.iter().enumerate() {
            writeln!(f, "  {}. {}: {}", i + 1, path, atom)?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorTree {}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom(key: &str, kind: ErrorKind) -> ErrorAtom {
        let source = PredicateFailure::new(KeyPath::from_field(key), kind.as_str(), "");
        ErrorAtom::new(key, kind, None, source)
    }

    #[test]
    fn test_empty_tree() {
        let tree = ErrorTree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.atom_count(), 0);
        assert!(tree.atoms().is_empty());
    }

    #[test]
    fn test_tree_of_empty_trees_is_empty() {
        let mut tree = ErrorTree::new();
        tree.insert("nested", ErrorNode::Tree(ErrorTree::new()));
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_add_error_creates_intermediate_trees() {
        let mut tree = ErrorTree::new();
        tree.add_error("a.b.c", ErrorKind::Min, Some("too small"));

        let a = tree.get(&PathSegment::field("a")).unwrap().as_tree().unwrap();
        let b = a.get(&PathSegment::field("b")).unwrap().as_tree().unwrap();
        let c = b.get(&PathSegment::field("c")).unwrap().as_atom().unwrap();

        assert_eq!(c.key(), "c");
        assert_eq!(c.kind(), &ErrorKind::Min);
        assert_eq!(c.message(), Some("too small"));
        assert_eq!(c.source().options.rule.as_deref(), Some(ErrorTree::IMPERATIVE_RULE));
    }

    #[test]
    fn test_add_error_joins_existing_subtree() {
        let mut tree = ErrorTree::new();
        tree.add_error("set.first", ErrorKind::Required, None);
        tree.add_error("set.second", ErrorKind::Integer, None);

        let set = tree.get(&PathSegment::field("set")).unwrap().as_tree().unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(tree.atom_count(), 2);
    }

    #[test]
    fn test_add_error_beneath_atom_keeps_both() {
        let mut tree = ErrorTree::new();
        tree.add_error("set", ErrorKind::Hash, Some("outer"));
        tree.add_error("set.inner", ErrorKind::Required, Some("inner"));

        assert_eq!(tree.atom_count(), 2);
        let own = tree
            .atom_at(&KeyPath::from_segments(["set", ErrorTree::SELF_KEY]))
            .unwrap();
        assert_eq!(own.message(), Some("outer"));
        let inner = tree.atom_at(&KeyPath::parse_dotted("set.inner")).unwrap();
        assert_eq!(inner.message(), Some("inner"));
    }

    #[test]
    fn test_add_error_on_subtree_keeps_both() {
        let mut tree = ErrorTree::new();
        tree.add_error("set.inner", ErrorKind::Required, Some("inner"));
        tree.add_error("set", ErrorKind::Hash, Some("outer"));

        assert_eq!(tree.atom_count(), 2);
        let paths: Vec<String> = tree.atoms().iter().map(|(p, _)| p.to_string()).collect();
        assert_eq!(paths, vec!["set.inner", "set.$self"]);
        let own = tree
            .atom_at(&KeyPath::from_segments(["set", ErrorTree::SELF_KEY]))
            .unwrap();
        assert_eq!(own.key(), "set");
        assert_eq!(own.kind(), &ErrorKind::Hash);
    }

    #[test]
    fn test_add_error_same_path_later_wins() {
        let mut tree = ErrorTree::new();
        tree.add_error("name", ErrorKind::Required, None);
        tree.add_error("name", ErrorKind::MaxLength, None);

        assert_eq!(tree.atom_count(), 1);
        let atom = tree.atom_at(&KeyPath::from_field("name")).unwrap();
        assert_eq!(atom.kind(), &ErrorKind::MaxLength);
    }

    #[test]
    fn test_add_error_at_root_uses_self_key() {
        let mut tree = ErrorTree::new();
        tree.add_error("", ErrorKind::Hash, None);

        let node = tree.get(&PathSegment::field(ErrorTree::SELF_KEY)).unwrap();
        assert_eq!(node.as_atom().unwrap().kind(), &ErrorKind::Hash);
    }

    #[test]
    fn test_runtime_exception() {
        let mut tree = ErrorTree::new();
        tree.add_runtime_exception("connection refused");

        let atoms = tree.atoms();
        assert_eq!(atoms.len(), 1);
        assert_eq!(atoms[0].0.to_string(), ErrorTree::RUNTIME_KEY);
        assert_eq!(atoms[0].1.kind(), &ErrorKind::RuntimeException);
        assert_eq!(atoms[0].1.message(), Some("connection refused"));
    }

    #[test]
    fn test_atoms_report_full_paths() {
        let mut tree = ErrorTree::new();
        tree.place(&KeyPath::from_field("name"), atom("name", ErrorKind::MaxLength));
        tree.place(
            &KeyPath::from_field("tags").push_index(2),
            atom("tags", ErrorKind::String),
        );

        let paths: Vec<String> = tree.atoms().iter().map(|(p, _)| p.to_string()).collect();
        assert_eq!(paths, vec!["name", "tags[2]"]);
    }

    #[test]
    fn test_combine_merges_nested_trees() {
        let mut left = ErrorTree::new();
        left.add_error("set.a", ErrorKind::Required, None);
        let mut right = ErrorTree::new();
        right.add_error("set.b", ErrorKind::Required, None);
        right.add_error("other", ErrorKind::In, None);

        let merged = left.combine(right);
        assert_eq!(merged.atom_count(), 3);
        assert!(merged.atom_at(&KeyPath::parse_dotted("set.a")).is_some());
        assert!(merged.atom_at(&KeyPath::parse_dotted("set.b")).is_some());
    }

    #[test]
    fn test_combine_later_atom_wins() {
        let mut left = ErrorTree::new();
        left.add_error("name", ErrorKind::Required, None);
        let mut right = ErrorTree::new();
        right.add_error("name", ErrorKind::MaxLength, None);

        let merged = left.combine(right);
        let atom = merged.atom_at(&KeyPath::from_field("name")).unwrap();
        assert_eq!(atom.kind(), &ErrorKind::MaxLength);
    }

    #[test]
    fn test_combine_atom_with_subtree_keeps_both() {
        let mut left = ErrorTree::new();
        left.add_error("set", ErrorKind::Hash, None);
        let mut right = ErrorTree::new();
        right.add_error("set.inner", ErrorKind::Required, None);

        let merged = left.combine(right);
        assert_eq!(merged.atom_count(), 2);
        assert!(merged
            .atom_at(&KeyPath::from_segments(["set", ErrorTree::SELF_KEY]))
            .is_some());
    }

    #[test]
    fn test_map_atoms() {
        let mut tree = ErrorTree::new();
        tree.place(&KeyPath::parse_dotted("a.b"), atom("b", ErrorKind::Min));

        let tree = tree.map_atoms(&mut |a: ErrorAtom| a.with_message("patched"));
        let atom = tree.atom_at(&KeyPath::parse_dotted("a.b")).unwrap();
        assert_eq!(atom.message(), Some("patched"));
    }

    #[test]
    fn test_display_lists_atoms() {
        let mut tree = ErrorTree::new();
        tree.add_error("name", ErrorKind::Required, None);
        let display = tree.to_string();

        assert!(display.contains("1 error(s)"));
        assert!(display.contains("name: name is required (required)"));
    }
}

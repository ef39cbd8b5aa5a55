//! Failure descriptions produced by a schema engine.
//!
//! A schema engine reports each failed predicate as a [`PredicateFailure`].
//! During validation, failures accumulate in a non-empty [`Failures`]
//! collection; once validation is over they are grouped by path into a
//! [`FailureNode`] tree, the input of the error compiler.

use std::fmt::{self, Display};

use indexmap::IndexMap;
use serde_json::Value;
use stillwater::prelude::*;

use crate::path::{KeyPath, PathSegment};

/// Auxiliary data attached to a predicate failure.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FailureOptions {
    /// Name of the rule that declared the predicate, usually the field name.
    pub rule: Option<String>,
    /// Whether the predicate was applied to each element of an array. When
    /// set, the last path segment is the element index.
    pub each: bool,
    /// Arguments the predicate was declared with (e.g. `[3]` for `min_size?`).
    pub args: Vec<Value>,
}

/// One failed predicate, in the schema engine's vocabulary.
///
/// # Example
///
/// ```rust
/// use validated_command::{KeyPath, PredicateFailure};
/// use serde_json::json;
///
/// let failure = PredicateFailure::new(
///     KeyPath::from_field("name"),
///     "max_size?",
///     "size cannot be greater than 10",
/// )
/// .with_args(vec![json!(10)]);
///
/// assert_eq!(failure.options.rule.as_deref(), Some("name"));
/// assert!(!failure.options.each);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PredicateFailure {
    /// Where the failing value sits in the input.
    pub path: KeyPath,
    /// Predicate identifier, e.g. `min_size?` or `str?`.
    pub predicate: String,
    /// Text rendered by the engine. May be empty.
    pub message: String,
    /// Rule name, per-element flag and predicate arguments.
    pub options: FailureOptions,
}

impl PredicateFailure {
    /// Creates a failure whose rule defaults to the innermost field name.
    pub fn new(path: KeyPath, predicate: impl Into<String>, message: impl Into<String>) -> Self {
        let rule = path.last_field().map(str::to_string);
        Self {
            path,
            predicate: predicate.into(),
            message: message.into(),
            options: FailureOptions {
                rule,
                ..FailureOptions::default()
            },
        }
    }

    /// Marks the failure as applying to one element of an array.
    pub fn each(mut self) -> Self {
        self.options.each = true;
        self
    }

    /// Sets the rule name and returns self for chaining.
    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.options.rule = Some(rule.into());
        self
    }

    /// Sets the predicate arguments and returns self for chaining.
    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.options.args = args;
        self
    }

    /// Returns the element index for a per-element failure.
    pub fn element_index(&self) -> Option<usize> {
        if self.options.each {
            self.path.last().and_then(PathSegment::as_index)
        } else {
            None
        }
    }
}

impl Display for PredicateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_root() {
            "(root)".to_string()
        } else {
            self.path.to_string()
        };
        write!(f, "{}: {} [{}]", path, self.message, self.predicate)
    }
}

/// A non-empty collection of predicate failures.
///
/// Validations combine their failures through [`Semigroup`], so every
/// predicate that failed is reported, not just the first one.
#[derive(Debug, Clone, PartialEq)]
pub struct Failures(NonEmptyVec<PredicateFailure>);

impl Failures {
    /// Creates a collection holding one failure.
    pub fn single(failure: PredicateFailure) -> Self {
        Self(NonEmptyVec::singleton(failure))
    }

    /// Creates a collection from a vec, or `None` if the vec is empty.
    pub fn from_vec(failures: Vec<PredicateFailure>) -> Option<Self> {
        let mut failures = failures.into_iter();
        let head = Self::single(failures.next()?);
        Some(failures.fold(head, |acc, failure| acc.combine(Self::single(failure))))
    }

    /// Returns the number of failures.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns an iterator over the failures.
    pub fn iter(&self) -> impl Iterator<Item = &PredicateFailure> {
        self.0.iter()
    }

    /// Converts the collection into a vec.
    pub fn into_vec(self) -> Vec<PredicateFailure> {
        self.0.into_vec()
    }

    /// Groups the failures by path into a failure tree.
    pub fn into_node(self) -> FailureNode {
        FailureNode::from_failures(self.0.into_vec())
    }
}

impl Semigroup for Failures {
    fn combine(self, other: Self) -> Self {
        Failures(self.0.combine(other.0))
    }
}

impl IntoIterator for Failures {
    type Item = PredicateFailure;
    type IntoIter = std::vec::IntoIter<PredicateFailure>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}

/// A nested failure description: the failures recorded at one path, plus the
/// failures beneath it keyed by path segment.
///
/// A node with failures and no children is a leaf. The root node of a run
/// that passed validation is empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FailureNode {
    failures: Vec<PredicateFailure>,
    children: IndexMap<PathSegment, FailureNode>,
}

/// The top-level failure description of one validation run.
pub type FailureRoot = FailureNode;

impl FailureNode {
    /// Creates an empty node.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a tree by placing each failure at its path, in order.
    pub fn from_failures<I>(failures: I) -> Self
    where
        I: IntoIterator<Item = PredicateFailure>,
    {
        let mut root = Self::new();
        for failure in failures {
            root.push(failure);
        }
        root
    }

    /// Places a failure at the node addressed by its path.
    pub fn push(&mut self, failure: PredicateFailure) {
        let mut node = self;
        for segment in failure.path.segments() {
            node = node.children.entry(segment.clone()).or_default();
        }
        node.failures.push(failure);
    }

    /// Adds a child node under `segment`, replacing any previous one.
    pub fn with_child(mut self, segment: impl Into<PathSegment>, child: FailureNode) -> Self {
        self.children.insert(segment.into(), child);
        self
    }

    /// The failures recorded at this node, in the order they were declared.
    pub fn failures(&self) -> &[PredicateFailure] {
        &self.failures
    }

    /// The nodes beneath this one.
    pub fn children(&self) -> impl Iterator<Item = (&PathSegment, &FailureNode)> {
        self.children.iter()
    }

    /// Returns the child under `segment`.
    pub fn child(&self, segment: &PathSegment) -> Option<&FailureNode> {
        self.children.get(segment)
    }

    /// True if nothing failed at or beneath this node.
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty() && self.children.values().all(FailureNode::is_empty)
    }

    /// True if this node has failures and no children.
    pub fn is_leaf(&self) -> bool {
        !self.failures.is_empty() && self.children.is_empty()
    }

    /// Counts the nodes at or beneath this one that carry failures.
    ///
    /// Several predicates failing for the same value count once.
    pub fn leaf_count(&self) -> usize {
        let own = usize::from(!self.failures.is_empty());
        own + self.children.values().map(FailureNode::leaf_count).sum::<usize>()
    }
}

impl From<Failures> for FailureNode {
    fn from(failures: Failures) -> Self {
        failures.into_node()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn failure(path: KeyPath, predicate: &str) -> PredicateFailure {
        PredicateFailure::new(path, predicate, format!("{} failed", predicate))
    }

    #[test]
    fn test_failure_defaults() {
        let f = failure(KeyPath::from_field("name"), "str?");
        assert_eq!(f.options.rule.as_deref(), Some("name"));
        assert!(!f.options.each);
        assert!(f.options.args.is_empty());
        assert_eq!(f.element_index(), None);
    }

    #[test]
    fn test_element_index_requires_each() {
        let path = KeyPath::from_field("tags").push_index(2);
        assert_eq!(failure(path.clone(), "str?").element_index(), None);
        assert_eq!(failure(path, "str?").each().element_index(), Some(2));
    }

    #[test]
    fn test_failure_display() {
        let f = failure(KeyPath::from_field("amount"), "gteq?");
        assert_eq!(f.to_string(), "amount: gteq? failed [gteq?]");

        let root = failure(KeyPath::root(), "hash?");
        assert!(root.to_string().starts_with("(root): "));
    }

    #[test]
    fn test_failures_combine() {
        let a = Failures::single(failure(KeyPath::from_field("a"), "str?"));
        let b = Failures::single(failure(KeyPath::from_field("b"), "int?"));
        let combined = a.combine(b);

        assert_eq!(combined.len(), 2);
        let predicates: Vec<_> = combined.iter().map(|f| f.predicate.as_str()).collect();
        assert_eq!(predicates, vec!["str?", "int?"]);
    }

    #[test]
    fn test_failures_from_empty_vec() {
        assert!(Failures::from_vec(Vec::new()).is_none());
    }

    #[test]
    fn test_node_groups_by_path() {
        let node = FailureNode::from_failures(vec![
            failure(KeyPath::from_field("name"), "str?"),
            failure(KeyPath::from_field("name"), "min_size?").with_args(vec![json!(3)]),
            failure(KeyPath::from_field("set").push_field("days"), "int?"),
        ]);

        let name = node.child(&PathSegment::field("name")).unwrap();
        assert!(name.is_leaf());
        assert_eq!(name.failures().len(), 2);

        let set = node.child(&PathSegment::field("set")).unwrap();
        assert!(!set.is_leaf());
        assert!(set.child(&PathSegment::field("days")).unwrap().is_leaf());

        assert_eq!(node.leaf_count(), 2);
    }

    #[test]
    fn test_empty_node() {
        let node = FailureNode::new().with_child("nested", FailureNode::new());
        assert!(node.is_empty());
        assert_eq!(node.leaf_count(), 0);
    }
}

use std::fmt;

use crate::value::Value;

/// Zero-based attribute column index.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
    serde::Serialize, serde::Deserialize,
)]
pub struct AttributeIndex(usize);

impl AttributeIndex {
    /// Create a new attribute index from a zero-based column position.
    #[must_use]
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based attribute column index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for AttributeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index into a `Vec<Node>` arena, identifying a specific node in a decision tree.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
    serde::Serialize, serde::Deserialize,
)]
pub struct NodeIndex(usize);

impl NodeIndex {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based arena index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Criterion-agnostic impurity value (entropy, majority error, or Gini).
#[derive(
    Debug, Clone, Copy, PartialEq, PartialOrd,
    serde::Serialize, serde::Deserialize,
)]
pub struct Impurity(f64);

impl Impurity {
    pub(crate) fn new(value: f64) -> Self {
        Self(value)
    }

    /// Return the raw impurity value.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Impurity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

/// Key of an outgoing branch of an internal node.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash,
    serde::Serialize, serde::Deserialize,
)]
pub enum BranchKey {
    /// Categorical branch taken on exact value equality.
    Value(Value),
    /// Numeric branch for values strictly greater than the node median.
    AboveMedian,
    /// Numeric branch for values less than or equal to the node median.
    AtOrBelowMedian,
}

impl BranchKey {
    /// Return the numeric branch a value falls into for `median`.
    #[must_use]
    pub fn for_number(value: f64, median: f64) -> Self {
        if value > median {
            BranchKey::AboveMedian
        } else {
            BranchKey::AtOrBelowMedian
        }
    }
}

impl fmt::Display for BranchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchKey::Value(v) => write!(f, "{v}"),
            BranchKey::AboveMedian => f.write_str("> median"),
            BranchKey::AtOrBelowMedian => f.write_str("<= median"),
        }
    }
}

/// How an internal node routes examples to its children.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum SplitKind {
    /// One branch per observed value.
    Categorical,
    /// Two branches around the weighted median computed at this node.
    Numeric {
        /// Threshold: values `<= median` go to [`BranchKey::AtOrBelowMedian`].
        median: f64,
    },
}

/// A node in a decision tree arena.
///
/// Children are referenced by [`NodeIndex`]; each node has exactly one
/// parent and the arena is never mutated once training returns.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum Node {
    /// An interior split node.
    Internal {
        /// Attribute tested at this node.
        attribute: AttributeIndex,
        /// Categorical or median split.
        split: SplitKind,
        /// Majority label of the training examples that reached this node,
        /// returned for branch keys never seen in training.
        majority_label: Value,
        /// Most frequent value of `attribute` at this node, substituted for
        /// the missing-value sentinel at classification time.
        majority_value: Value,
        /// Observed branches in training order.
        branches: Vec<(BranchKey, NodeIndex)>,
        /// Impurity at this node before splitting.
        impurity: Impurity,
        /// Total training weight that reached this node.
        weight: f64,
        /// Information gain of the chosen split.
        gain: f64,
    },
    /// A terminal leaf node.
    Leaf {
        /// Predicted label.
        label: Value,
        /// Total training weight that reached this leaf.
        weight: f64,
    },
}

impl Node {
    /// Return the total training weight that reached this node.
    #[must_use]
    pub fn weight(&self) -> f64 {
        match self {
            Node::Internal { weight, .. } | Node::Leaf { weight, .. } => *weight,
        }
    }

    /// Return `true` if this node is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Return the child stored under `key`, if that branch was observed.
    #[must_use]
    pub fn child(&self, key: &BranchKey) -> Option<NodeIndex> {
        match self {
            Node::Internal { branches, .. } => branches
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, idx)| *idx),
            Node::Leaf { .. } => None,
        }
    }
}

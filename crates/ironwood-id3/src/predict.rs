//! Tree descent for classifying examples.

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::config::TreeConfig;
use crate::error::TreeError;
use crate::example::Example;
use crate::node::{BranchKey, Node, NodeIndex, SplitKind};
use crate::tree::DecisionTree;
use crate::value::Value;

/// Find the child of `node` for `value`, or `None` when no example took
/// that branch in training (or a numeric split sees a non-number).
fn route(node: &Node, split: SplitKind, value: &Value) -> Option<NodeIndex> {
    let key = match split {
        SplitKind::Numeric { median } => BranchKey::for_number(value.as_number()?, median),
        SplitKind::Categorical => BranchKey::Value(value.clone()),
    };
    node.child(&key)
}

impl DecisionTree {
    /// Predict the label of a single example.
    ///
    /// Walks from the root. At each internal node a value equal to the
    /// configured missing-value sentinel is replaced by the node's majority
    /// attribute value; numeric nodes send values `> median` above and the
    /// rest at-or-below. A branch never observed in training resolves to the
    /// node's majority label. `example` itself is never modified.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::PredictionArityMismatch`] when the example's
    /// attribute count differs from the training data.
    pub fn classify<'t>(
        &'t self,
        example: &Example,
        config: &TreeConfig,
    ) -> Result<&'t Value, TreeError> {
        let expected = self.layout.n_attributes();
        if example.n_attributes() != expected {
            return Err(TreeError::PredictionArityMismatch {
                expected,
                got: example.n_attributes(),
            });
        }

        let sentinel = config.missing_value();
        let mut idx = 0usize;
        loop {
            let node = &self.nodes[idx];
            match node {
                Node::Leaf { label, .. } => return Ok(label),
                Node::Internal {
                    attribute,
                    split,
                    majority_label,
                    majority_value,
                    ..
                } => {
                    let mut value = &example.values()[attribute.index()];
                    if sentinel.is_some_and(|s| s == value) {
                        value = majority_value;
                    }
                    match route(node, *split, value) {
                        Some(child) => idx = child.index(),
                        None => return Ok(majority_label),
                    }
                }
            }
        }
    }

    /// Predict labels for a batch of examples in parallel, preserving order.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::PredictionArityMismatch`] if any example has the
    /// wrong attribute count.
    pub fn classify_batch<'t>(
        &'t self,
        examples: &[Example],
        config: &TreeConfig,
    ) -> Result<Vec<&'t Value>, TreeError> {
        examples
            .par_iter()
            .map(|example| self.classify(example, config))
            .collect()
    }
}

//! ID3 decision tree induction: train, classify, evaluate.
//!
//! Grows a multiway decision tree from weighted, labeled examples using
//! entropy, majority error, or Gini gain. Numeric attributes are split on
//! their weighted median, missing values are repaired before training and
//! substituted during classification, and random trees score a seeded
//! sample of attributes at each split.

mod config;
mod criterion;
mod distribution;
mod error;
mod eval;
mod example;
mod node;
mod predict;
mod repair;
mod split;
mod stats;
mod tree;
mod value;

pub use config::TreeConfig;
pub use criterion::SplitCriterion;
pub use distribution::Distribution;
pub use error::TreeError;
pub use eval::Evaluation;
pub use example::{ColumnLayout, Dataset, Example, WeightColumn};
pub use node::{AttributeIndex, BranchKey, Impurity, Node, NodeIndex, SplitKind};
pub use repair::fill_missing_values;
pub use split::{information_gain, select_attribute};
pub use stats::{
    branch_examples, branch_label_distribution, in_branch, label_distribution, numeric_distribution,
    value_distribution, weighted_median,
};
pub use tree::{DecisionTree, build_random_tree, build_random_tree_with_rng, build_tree};
pub use value::Value;

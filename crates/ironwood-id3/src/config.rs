//! Configuration builder for decision tree induction and classification.

use std::collections::BTreeSet;

use crate::criterion::SplitCriterion;
use crate::node::AttributeIndex;
use crate::value::Value;

/// Configuration shared by training, classification, and evaluation.
///
/// Construct via [`TreeConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter             | Default              |
/// |-----------------------|----------------------|
/// | `criterion`           | `Entropy`            |
/// | `max_depth`           | `None` (unbounded)   |
/// | `numeric_attributes`  | empty                |
/// | `missing_value`       | `None` (no repair)   |
/// | `feature_sample_size` | 0 (all attributes)   |
/// | `seed`                | 42                   |
#[derive(Debug, Clone)]
pub struct TreeConfig {
    pub(crate) criterion: SplitCriterion,
    pub(crate) max_depth: Option<usize>,
    pub(crate) numeric_attributes: BTreeSet<AttributeIndex>,
    pub(crate) missing_value: Option<Value>,
    pub(crate) feature_sample_size: usize,
    pub(crate) seed: u64,
}

impl TreeConfig {
    /// Create a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            criterion: SplitCriterion::Entropy,
            max_depth: None,
            numeric_attributes: BTreeSet::new(),
            missing_value: None,
            feature_sample_size: 0,
            seed: 42,
        }
    }

    /// Set the impurity measure.
    #[must_use]
    pub fn with_criterion(mut self, criterion: SplitCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Set the maximum tree depth.
    ///
    /// `None` grows until leaves are pure or attributes run out.
    /// `Some(0)` yields a single majority-label leaf.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the attribute positions split on their weighted median.
    #[must_use]
    pub fn with_numeric_attributes(mut self, positions: impl IntoIterator<Item = usize>) -> Self {
        self.numeric_attributes = positions.into_iter().map(AttributeIndex::new).collect();
        self
    }

    /// Set the missing-value sentinel.
    ///
    /// When set, training repairs the sentinel in place first and
    /// classification substitutes each node's majority attribute value.
    #[must_use]
    pub fn with_missing_value(mut self, sentinel: Option<Value>) -> Self {
        self.missing_value = sentinel;
        self
    }

    /// Set how many candidate attributes a random tree scores per split.
    ///
    /// 0 scores every candidate.
    #[must_use]
    pub fn with_feature_sample_size(mut self, feature_sample_size: usize) -> Self {
        self.feature_sample_size = feature_sample_size;
        self
    }

    /// Set the random seed used by random trees.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    // --- Getters ---

    /// Return the impurity measure.
    #[must_use]
    pub fn criterion(&self) -> SplitCriterion {
        self.criterion
    }

    /// Return the maximum depth limit, if any.
    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Return the numeric attribute positions.
    #[must_use]
    pub fn numeric_attributes(&self) -> &BTreeSet<AttributeIndex> {
        &self.numeric_attributes
    }

    /// Return `true` if `attribute` is split on its median.
    #[must_use]
    pub fn is_numeric(&self, attribute: AttributeIndex) -> bool {
        self.numeric_attributes.contains(&attribute)
    }

    /// Return the missing-value sentinel, if any.
    #[must_use]
    pub fn missing_value(&self) -> Option<&Value> {
        self.missing_value.as_ref()
    }

    /// Return the per-split feature sample size.
    #[must_use]
    pub fn feature_sample_size(&self) -> usize {
        self.feature_sample_size
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = TreeConfig::default();
        assert_eq!(config.criterion(), SplitCriterion::Entropy);
        assert_eq!(config.max_depth(), None);
        assert!(config.numeric_attributes().is_empty());
        assert!(config.missing_value().is_none());
        assert_eq!(config.feature_sample_size(), 0);
        assert_eq!(config.seed(), 42);
    }

    #[test]
    fn setters_chain() {
        let config = TreeConfig::new()
            .with_criterion(SplitCriterion::Gini)
            .with_max_depth(Some(3))
            .with_numeric_attributes([0, 5])
            .with_missing_value(Some(Value::from("?")))
            .with_feature_sample_size(2)
            .with_seed(7);
        assert_eq!(config.criterion(), SplitCriterion::Gini);
        assert_eq!(config.max_depth(), Some(3));
        assert!(config.is_numeric(AttributeIndex::new(5)));
        assert!(!config.is_numeric(AttributeIndex::new(1)));
        assert_eq!(config.missing_value(), Some(&Value::from("?")));
        assert_eq!(config.feature_sample_size(), 2);
        assert_eq!(config.seed(), 7);
    }
}

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, instrument};

use crate::{
    TreeError,
    config::TreeConfig,
    distribution::Distribution,
    example::{ColumnLayout, Dataset, Example},
    node::{AttributeIndex, BranchKey, Node, NodeIndex, SplitKind},
    repair::fill_missing_values,
    split::{best_split, branch_distribution, split_kind},
    stats::{branch_examples, label_distribution, value_distribution},
    value::Value,
};

/// Build a decision tree that scores every candidate attribute at each split.
///
/// When a missing-value sentinel is configured, `dataset` is repaired in
/// place first. The configured `feature_sample_size` is ignored.
///
/// # Errors
///
/// | Variant | When |
/// |---|---|
/// | [`TreeError::NumericAttributeOutOfRange`] | a numeric position is not an attribute column |
/// | [`TreeError::NonNumericValue`] | a numeric attribute holds a categorical value after repair |
/// | [`TreeError::NonFiniteValue`] | a numeric attribute holds NaN or infinity |
/// | [`TreeError::ZeroTotalWeight`] | every example has zero weight |
pub fn build_tree(dataset: &mut Dataset, config: &TreeConfig) -> Result<DecisionTree, TreeError> {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    train(dataset, config, 0, &mut rng)
}

/// Build a random tree: each split scores a random sample of
/// `feature_sample_size` candidates drawn from a generator seeded with the
/// configured seed.
///
/// # Errors
///
/// Returns [`TreeError::InvalidFeatureSampleSize`] when `feature_sample_size`
/// is zero, plus every error of [`build_tree`].
pub fn build_random_tree(
    dataset: &mut Dataset,
    config: &TreeConfig,
) -> Result<DecisionTree, TreeError> {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    build_random_tree_with_rng(dataset, config, &mut rng)
}

/// [`build_random_tree`] drawing attribute samples from `rng`.
///
/// Ensembles building trees on several threads should hand each tree its
/// own generator.
///
/// # Errors
///
/// Same as [`build_random_tree`].
pub fn build_random_tree_with_rng(
    dataset: &mut Dataset,
    config: &TreeConfig,
    rng: &mut impl Rng,
) -> Result<DecisionTree, TreeError> {
    if config.feature_sample_size == 0 {
        return Err(TreeError::InvalidFeatureSampleSize {
            feature_sample_size: config.feature_sample_size,
        });
    }
    train(dataset, config, config.feature_sample_size, rng)
}

impl TreeConfig {
    /// Train a decision tree on `dataset`. See [`build_tree`].
    ///
    /// # Errors
    ///
    /// Same as [`build_tree`].
    pub fn fit(&self, dataset: &mut Dataset) -> Result<DecisionTree, TreeError> {
        build_tree(dataset, self)
    }

    /// Train a random tree on `dataset`. See [`build_random_tree`].
    ///
    /// # Errors
    ///
    /// Same as [`build_random_tree`].
    pub fn fit_random(&self, dataset: &mut Dataset) -> Result<DecisionTree, TreeError> {
        build_random_tree(dataset, self)
    }
}

#[instrument(skip_all, fields(n_examples = dataset.len(), criterion = %config.criterion))]
fn train(
    dataset: &mut Dataset,
    config: &TreeConfig,
    sample_size: usize,
    rng: &mut impl Rng,
) -> Result<DecisionTree, TreeError> {
    // Reject a bad config before repair touches the caller's data.
    check_numeric_range(dataset, config)?;

    if let Some(sentinel) = &config.missing_value {
        let repaired = fill_missing_values(dataset, sentinel);
        debug!(?repaired, "missing values repaired");
    }

    validate(dataset, config)?;

    let layout = dataset.layout();
    let examples: Vec<&Example> = dataset.examples().iter().collect();
    let labels = label_distribution(&examples);
    let attributes: Vec<AttributeIndex> = layout
        .attribute_positions()
        .map(AttributeIndex::new)
        .collect();

    debug!(
        n_attributes = layout.n_attributes(),
        n_labels = labels.len(),
        max_depth = ?config.max_depth,
        sample_size,
        "fitting decision tree"
    );

    let mut builder = Builder {
        config,
        sample_size,
        rng,
        arena: Vec::new(),
    };
    let root = builder.build(&examples, &attributes, labels, config.max_depth)?;

    let tree = DecisionTree {
        nodes: builder.arena,
        layout,
    };
    info!(
        root_index = root.index(),
        n_nodes = tree.n_nodes(),
        n_leaves = tree.n_leaves(),
        depth = tree.depth(),
        "decision tree built"
    );
    Ok(tree)
}

fn check_numeric_range(dataset: &Dataset, config: &TreeConfig) -> Result<(), TreeError> {
    let n_attributes = dataset.layout().n_attributes();
    match config.numeric_attributes.last() {
        Some(attribute) if attribute.index() >= n_attributes => {
            Err(TreeError::NumericAttributeOutOfRange {
                position: attribute.index(),
                n_attributes,
            })
        }
        _ => Ok(()),
    }
}

fn validate(dataset: &Dataset, config: &TreeConfig) -> Result<(), TreeError> {
    for attribute in &config.numeric_attributes {
        let position = attribute.index();
        for (example_index, example) in dataset.examples().iter().enumerate() {
            match &example.values()[position] {
                Value::Number(n) if !n.is_finite() => {
                    return Err(TreeError::NonFiniteValue {
                        example_index,
                        position,
                    });
                }
                Value::Number(_) => {}
                other @ Value::Category(_) => {
                    return Err(TreeError::NonNumericValue {
                        example_index,
                        position,
                        value: other.to_string(),
                    });
                }
            }
        }
    }

    if dataset.total_weight() <= 0.0 {
        return Err(TreeError::ZeroTotalWeight);
    }
    Ok(())
}

/// Recursive ID3 state: the arena under construction plus the knobs every
/// level needs.
struct Builder<'a, R> {
    config: &'a TreeConfig,
    sample_size: usize,
    rng: &'a mut R,
    arena: Vec<Node>,
}

impl<R: Rng> Builder<'_, R> {
    fn leaf(&mut self, label: Value, weight: f64) -> NodeIndex {
        let idx = self.arena.len();
        self.arena.push(Node::Leaf { label, weight });
        NodeIndex::new(idx)
    }

    /// Grow the subtree for `examples` and return its arena index.
    ///
    /// `depth_remaining` of `None` means unbounded.
    fn build(
        &mut self,
        examples: &[&Example],
        attributes: &[AttributeIndex],
        labels: Distribution<Value>,
        depth_remaining: Option<usize>,
    ) -> Result<NodeIndex, TreeError> {
        let weight = labels.total();
        let majority_label = labels
            .majority()
            .cloned()
            .ok_or(TreeError::EmptyDistribution)?;

        // A single nonzero label is also the majority.
        if labels.nonzero_len() == 1 {
            return Ok(self.leaf(majority_label, weight));
        }
        if attributes.is_empty() || depth_remaining == Some(0) {
            return Ok(self.leaf(majority_label, weight));
        }

        let Some((attribute, gain)) = best_split(
            examples,
            attributes,
            self.config.criterion,
            &self.config.numeric_attributes,
            self.sample_size,
            &mut *self.rng,
        )?
        else {
            return Ok(self.leaf(majority_label, weight));
        };

        let split = split_kind(examples, attribute, &self.config.numeric_attributes)?;
        let majority_value = value_distribution(examples, attribute.index())
            .majority()
            .cloned()
            .ok_or(TreeError::EmptyDistribution)?;
        let impurity = self.config.criterion.impurity(&labels)?;
        let remaining: Vec<AttributeIndex> = attributes
            .iter()
            .copied()
            .filter(|&a| a != attribute)
            .collect();

        // Numeric splits always visit both sides, below first.
        let keys: Vec<BranchKey> = match split {
            SplitKind::Numeric { .. } => vec![BranchKey::AtOrBelowMedian, BranchKey::AboveMedian],
            SplitKind::Categorical => branch_distribution(examples, attribute, split)?
                .iter()
                .filter(|(_, w)| *w > 0.0)
                .map(|(key, _)| key.clone())
                .collect(),
        };

        // Arena pattern: reserve index, recurse, then overwrite with the split.
        let node_idx = self.arena.len();
        self.arena.push(Node::Leaf {
            label: majority_label.clone(),
            weight,
        });

        let mut branches = Vec::with_capacity(keys.len());
        for key in keys {
            let subset = branch_examples(examples, attribute.index(), split, &key);
            let sub_labels = label_distribution(&subset);
            if sub_labels.total() <= 0.0 {
                // An empty branch turns the whole node into a majority leaf,
                // discarding siblings built so far.
                debug!(
                    attribute = attribute.index(),
                    branch = %key,
                    discarded = self.arena.len() - node_idx - 1,
                    "empty branch collapses node"
                );
                self.arena.truncate(node_idx);
                return Ok(self.leaf(majority_label, weight));
            }
            let child = self.build(
                &subset,
                &remaining,
                sub_labels,
                depth_remaining.map(|d| d - 1),
            )?;
            branches.push((key, child));
        }

        self.arena[node_idx] = Node::Internal {
            attribute,
            split,
            majority_label,
            majority_value,
            branches,
            impurity,
            weight,
            gain,
        };
        Ok(NodeIndex::new(node_idx))
    }
}

/// A fitted ID3 decision tree.
///
/// Stored as an arena-based `Vec<Node>` with the root at index 0 and
/// children referenced by [`NodeIndex`].
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DecisionTree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) layout: ColumnLayout,
}

impl DecisionTree {
    /// Return the root node.
    #[must_use]
    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }

    /// Return the node at `index`.
    #[must_use]
    pub fn node(&self, index: NodeIndex) -> &Node {
        &self.nodes[index.index()]
    }

    /// Return all nodes in arena order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Return the column layout of the training data.
    #[must_use]
    pub fn layout(&self) -> ColumnLayout {
        self.layout
    }

    /// Return the total number of nodes in the tree (both internal and leaves).
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Return the number of leaf nodes.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Return the maximum depth of the tree.
    ///
    /// A single-node tree (just a root leaf) has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut max_depth = 0usize;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((node_idx, d)) = stack.pop() {
            match &self.nodes[node_idx] {
                Node::Leaf { .. } => max_depth = max_depth.max(d),
                Node::Internal { branches, .. } => {
                    stack.extend(branches.iter().map(|(_, child)| (child.index(), d + 1)));
                }
            }
        }
        max_depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criterion::SplitCriterion;
    use crate::example::WeightColumn;

    fn categorical(rows: &[&[&str]]) -> Dataset {
        Dataset::from_rows(
            rows.iter()
                .map(|r| r.iter().map(|&t| Value::from(t)).collect())
                .collect(),
            WeightColumn::Absent,
        )
        .unwrap()
    }

    fn weather() -> Dataset {
        categorical(&[
            &["Sunny", "Hot", "Yes"],
            &["Sunny", "Cool", "No"],
            &["Overcast", "Hot", "Yes"],
            &["Rain", "Cool", "No"],
        ])
    }

    fn leaf_label(node: &Node) -> Option<&Value> {
        match node {
            Node::Leaf { label, .. } => Some(label),
            Node::Internal { .. } => None,
        }
    }

    #[test]
    fn weather_splits_on_the_separating_attribute() {
        let mut ds = weather();
        let config = TreeConfig::new();
        let tree = config.fit(&mut ds).unwrap();
        // Temperature separates the labels perfectly (gain ln 2), weather
        // does not (gain ln 2 / 2).
        match tree.root() {
            Node::Internal { attribute, split, .. } => {
                assert_eq!(attribute.index(), 1);
                assert_eq!(*split, SplitKind::Categorical);
            }
            Node::Leaf { .. } => panic!("root should split"),
        }
        let eval = tree.evaluate(&ds, &config).unwrap();
        assert!((eval.matched_weight - 4.0).abs() < f64::EPSILON);
        assert!((eval.total_weight - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn max_depth_zero_is_majority_leaf() {
        let mut ds = categorical(&[&["a", "No"], &["b", "Yes"], &["c", "Yes"]]);
        let tree = TreeConfig::new().with_max_depth(Some(0)).fit(&mut ds).unwrap();
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(leaf_label(tree.root()), Some(&Value::from("Yes")));
        assert_eq!(tree.depth(), 0);
    }

    #[test]
    fn pure_dataset_single_leaf_for_every_criterion() {
        let criteria = [
            SplitCriterion::Entropy,
            SplitCriterion::MajorityError,
            SplitCriterion::Gini,
        ];
        for criterion in criteria {
            let mut ds = categorical(&[&["a", "x", "Yes"], &["b", "y", "Yes"]]);
            let tree = TreeConfig::new().with_criterion(criterion).fit(&mut ds).unwrap();
            assert_eq!(tree.n_nodes(), 1);
            assert_eq!(leaf_label(tree.root()), Some(&Value::from("Yes")));
        }
    }

    #[test]
    fn max_depth_limits_tree() {
        // XOR over two attributes needs depth 2.
        let rows: &[&[&str]] = &[
            &["0", "0", "No"],
            &["0", "1", "Yes"],
            &["1", "0", "Yes"],
            &["1", "1", "No"],
        ];
        let full = TreeConfig::new().fit(&mut categorical(rows)).unwrap();
        assert_eq!(full.depth(), 2);
        let shallow = TreeConfig::new()
            .with_max_depth(Some(1))
            .fit(&mut categorical(rows))
            .unwrap();
        assert_eq!(shallow.depth(), 1);
    }

    #[test]
    fn numeric_root_stores_median() {
        let examples: Vec<Example> = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]
            .iter()
            .zip(["A", "B", "A", "B", "A", "B"])
            .map(|(&v, l)| Example::new(vec![Value::Number(v)], l))
            .collect();
        let mut ds = Dataset::new(examples).unwrap();
        let tree = TreeConfig::new()
            .with_numeric_attributes([0])
            .fit(&mut ds)
            .unwrap();
        match tree.root() {
            Node::Internal { split, branches, .. } => {
                assert_eq!(*split, SplitKind::Numeric { median: 4.0 });
                assert_eq!(branches[0].0, BranchKey::AtOrBelowMedian);
                assert_eq!(branches[1].0, BranchKey::AboveMedian);
                assert!((tree.node(branches[0].1).weight() - 4.0).abs() < f64::EPSILON);
                assert!((tree.node(branches[1].1).weight() - 2.0).abs() < f64::EPSILON);
            }
            Node::Leaf { .. } => panic!("root should split"),
        }
    }

    #[test]
    fn empty_branch_collapses_whole_node() {
        // Attribute 0 is constant, so nothing lies above its median. It ties
        // with attribute 1 at zero gain and wins on index; the subtree grown
        // for the at-or-below side is then thrown away.
        let examples = vec![
            Example::new(vec![Value::Number(5.0), Value::from("p")], "a"),
            Example::new(vec![Value::Number(5.0), Value::from("p")], "b"),
            Example::new(vec![Value::Number(5.0), Value::from("q")], "a"),
            Example::new(vec![Value::Number(5.0), Value::from("q")], "b"),
        ];
        let mut ds = Dataset::new(examples).unwrap();
        let tree = TreeConfig::new()
            .with_numeric_attributes([0])
            .fit(&mut ds)
            .unwrap();
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(leaf_label(tree.root()), Some(&Value::from("a")));
    }

    #[test]
    fn training_examples_round_trip() {
        let mut ds = categorical(&[
            &["red", "s", "apple"],
            &["yellow", "s", "banana"],
            &["green", "m", "lime"],
            &["red", "m", "apple"],
            &["yellow", "l", "banana"],
            &["green", "s", "lime"],
        ]);
        let criteria = [
            SplitCriterion::Entropy,
            SplitCriterion::MajorityError,
            SplitCriterion::Gini,
        ];
        for criterion in criteria {
            let config = TreeConfig::new().with_criterion(criterion);
            let tree = config.fit(&mut ds).unwrap();
            let eval = tree.evaluate(&ds, &config).unwrap();
            assert!((eval.accuracy() - 1.0).abs() < f64::EPSILON, "{criterion}");
        }
    }

    #[test]
    fn pure_subtree_becomes_leaf() {
        let mut ds = categorical(&[
            &["Overcast", "Hot", "Yes"],
            &["Overcast", "Cool", "Yes"],
            &["Rain", "Hot", "No"],
            &["Rain", "Cool", "Yes"],
        ]);
        let tree = TreeConfig::new().fit(&mut ds).unwrap();
        let Node::Internal { attribute, branches, .. } = tree.root() else {
            panic!("root should split");
        };
        assert_eq!(attribute.index(), 0);
        let overcast = branches
            .iter()
            .find(|(k, _)| *k == BranchKey::Value(Value::from("Overcast")))
            .map(|(_, idx)| *idx)
            .unwrap();
        assert_eq!(leaf_label(tree.node(overcast)), Some(&Value::from("Yes")));
    }

    #[test]
    fn missing_values_are_repaired_in_place() {
        let mut ds = categorical(&[
            &["X", "Yes"],
            &["?", "No"],
            &["X", "Yes"],
            &["Y", "No"],
        ]);
        TreeConfig::new()
            .with_missing_value(Some(Value::from("?")))
            .fit(&mut ds)
            .unwrap();
        assert_eq!(ds.examples()[1].values()[0], Value::from("X"));
    }

    #[test]
    fn random_tree_requires_sample_size() {
        let err = TreeConfig::new().fit_random(&mut weather()).unwrap_err();
        assert!(matches!(err, TreeError::InvalidFeatureSampleSize { feature_sample_size: 0 }));
    }

    #[test]
    fn random_tree_is_deterministic_with_same_seed() {
        let rows: &[&[&str]] = &[
            &["a", "x", "p", "1"],
            &["b", "x", "q", "0"],
            &["a", "y", "q", "1"],
            &["b", "y", "p", "0"],
            &["a", "x", "q", "0"],
            &["c", "y", "p", "1"],
        ];
        let config = TreeConfig::new().with_feature_sample_size(1).with_seed(123);
        let first = config.fit_random(&mut categorical(rows)).unwrap();
        let second = config.fit_random(&mut categorical(rows)).unwrap();
        assert_eq!(format!("{:?}", first.nodes()), format!("{:?}", second.nodes()));

        let mut rng = ChaCha8Rng::seed_from_u64(123);
        let injected =
            build_random_tree_with_rng(&mut categorical(rows), &config, &mut rng).unwrap();
        assert_eq!(format!("{:?}", first.nodes()), format!("{:?}", injected.nodes()));
    }

    #[test]
    fn numeric_attribute_out_of_range() {
        let err = TreeConfig::new()
            .with_numeric_attributes([2])
            .fit(&mut weather())
            .unwrap_err();
        assert!(matches!(
            err,
            TreeError::NumericAttributeOutOfRange { position: 2, n_attributes: 2 }
        ));
    }

    #[test]
    fn out_of_range_config_leaves_data_unrepaired() {
        let mut ds = categorical(&[&["?", "Yes"], &["a", "No"], &["a", "Yes"]]);
        let err = TreeConfig::new()
            .with_numeric_attributes([5])
            .with_missing_value(Some(Value::from("?")))
            .fit(&mut ds)
            .unwrap_err();
        assert!(matches!(err, TreeError::NumericAttributeOutOfRange { position: 5, .. }));
        assert_eq!(ds.examples()[0].values()[0], Value::from("?"));
    }

    #[test]
    fn categorical_value_in_numeric_attribute() {
        let err = TreeConfig::new()
            .with_numeric_attributes([0])
            .fit(&mut weather())
            .unwrap_err();
        assert!(matches!(err, TreeError::NonNumericValue { example_index: 0, position: 0, .. }));
    }

    #[test]
    fn non_finite_numeric_value() {
        let mut ds = Dataset::new(vec![
            Example::new(vec![Value::Number(f64::NAN)], "a"),
            Example::new(vec![Value::Number(1.0)], "b"),
        ])
        .unwrap();
        let err = TreeConfig::new()
            .with_numeric_attributes([0])
            .fit(&mut ds)
            .unwrap_err();
        assert!(matches!(err, TreeError::NonFiniteValue { example_index: 0, position: 0 }));
    }

    #[test]
    fn zero_total_weight() {
        let mut ds = Dataset::new(vec![Example::new(vec![Value::from("a")], "x").with_weight(0.0)])
            .unwrap();
        let err = TreeConfig::new().fit(&mut ds).unwrap_err();
        assert!(matches!(err, TreeError::ZeroTotalWeight));
    }

    #[test]
    fn zero_weight_values_get_no_branch() {
        let mut ds = Dataset::new(vec![
            Example::new(vec![Value::from("a")], "Yes"),
            Example::new(vec![Value::from("b")], "No"),
            Example::new(vec![Value::from("c")], "No").with_weight(0.0),
        ])
        .unwrap();
        let tree = TreeConfig::new().fit(&mut ds).unwrap();
        let Node::Internal { branches, .. } = tree.root() else {
            panic!("root should split");
        };
        assert_eq!(branches.len(), 2);
        assert_eq!(tree.n_leaves(), 2);
    }
}

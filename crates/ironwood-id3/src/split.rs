use std::collections::BTreeSet;

use rand::Rng;
use tracing::trace;

use crate::criterion::SplitCriterion;
use crate::distribution::Distribution;
use crate::error::TreeError;
use crate::example::Example;
use crate::node::{AttributeIndex, BranchKey, SplitKind};
use crate::stats::{
    branch_label_distribution, label_distribution, numeric_distribution, value_distribution,
    weighted_median,
};

/// Decide how `attribute` would split `examples`.
///
/// Numeric attributes compute their weighted median here, once per node.
pub(crate) fn split_kind(
    examples: &[&Example],
    attribute: AttributeIndex,
    numeric: &BTreeSet<AttributeIndex>,
) -> Result<SplitKind, TreeError> {
    if numeric.contains(&attribute) {
        let median = weighted_median(examples, attribute.index())?;
        Ok(SplitKind::Numeric { median })
    } else {
        Ok(SplitKind::Categorical)
    }
}

/// Weight per branch of a split on `attribute`.
///
/// Categorical branches follow first-seen value order.
pub(crate) fn branch_distribution(
    examples: &[&Example],
    attribute: AttributeIndex,
    split: SplitKind,
) -> Result<Distribution<BranchKey>, TreeError> {
    match split {
        SplitKind::Numeric { median } => numeric_distribution(examples, attribute.index(), median),
        SplitKind::Categorical => Ok(value_distribution(examples, attribute.index())
            .iter()
            .map(|(value, weight)| (BranchKey::Value(value.clone()), weight))
            .collect()),
    }
}

/// Weighted information gain of splitting `examples` on `attribute`.
///
/// `impurity(labels) - Σ (branch_weight / total_weight) · impurity(labels | branch)`,
/// summed over branches that carry positive weight.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`TreeError::EmptyDistribution`] | `examples` carries zero total weight |
/// | [`TreeError::NonNumericValue`] | a numeric attribute holds a categorical value |
pub fn information_gain(
    examples: &[&Example],
    attribute: AttributeIndex,
    numeric: &BTreeSet<AttributeIndex>,
    criterion: SplitCriterion,
) -> Result<f64, TreeError> {
    let labels = label_distribution(examples);
    let total = labels.total();
    let mut gain = criterion.impurity(&labels)?.value();

    let split = split_kind(examples, attribute, numeric)?;
    let branches = branch_distribution(examples, attribute, split)?;
    for (key, weight) in branches.iter() {
        if weight <= 0.0 {
            continue;
        }
        let branch_labels = branch_label_distribution(examples, attribute.index(), split, key);
        gain -= criterion.impurity(&branch_labels)?.value() * branch_labels.total() / total;
    }
    Ok(gain)
}

/// Choose the candidate attribute with the greatest information gain.
///
/// When `0 < sample_size < candidates.len()`, a uniform sample of
/// `sample_size` candidates is drawn without replacement from `rng` and
/// only those are scored. Candidates are scored in ascending attribute
/// order and ties keep the first one scored.
///
/// Returns `Ok(None)` when there are no candidates.
///
/// # Errors
///
/// Propagates errors from [`information_gain`].
pub fn select_attribute(
    examples: &[&Example],
    candidates: &[AttributeIndex],
    criterion: SplitCriterion,
    numeric: &BTreeSet<AttributeIndex>,
    sample_size: usize,
    rng: &mut impl Rng,
) -> Result<Option<AttributeIndex>, TreeError> {
    Ok(best_split(examples, candidates, criterion, numeric, sample_size, rng)?
        .map(|(attribute, _)| attribute))
}

/// [`select_attribute`], also returning the winning gain.
pub(crate) fn best_split(
    examples: &[&Example],
    candidates: &[AttributeIndex],
    criterion: SplitCriterion,
    numeric: &BTreeSet<AttributeIndex>,
    sample_size: usize,
    rng: &mut impl Rng,
) -> Result<Option<(AttributeIndex, f64)>, TreeError> {
    let mut scored: Vec<AttributeIndex> = if sample_size > 0 && sample_size < candidates.len() {
        rand::seq::index::sample(rng, candidates.len(), sample_size)
            .into_iter()
            .map(|i| candidates[i])
            .collect()
    } else {
        candidates.to_vec()
    };
    scored.sort_unstable();

    let mut best: Option<(AttributeIndex, f64)> = None;
    let mut best_gain = -1.0;
    for attribute in scored {
        let gain = information_gain(examples, attribute, numeric, criterion)?;
        trace!(attribute = attribute.index(), gain, "scored candidate");
        if gain > best_gain {
            best_gain = gain;
            best = Some((attribute, gain));
        }
    }
    Ok(best)
}

//! Per-attribute statistics over an example set.

use crate::distribution::Distribution;
use crate::error::TreeError;
use crate::example::Example;
use crate::node::{BranchKey, SplitKind};
use crate::value::Value;

/// Weight per label across `examples`.
#[must_use]
pub fn label_distribution(examples: &[&Example]) -> Distribution<Value> {
    examples
        .iter()
        .map(|ex| (ex.label().clone(), ex.weight()))
        .collect()
}

/// Weight per distinct raw value of attribute `position`, in first-seen order.
#[must_use]
pub fn value_distribution(examples: &[&Example], position: usize) -> Distribution<Value> {
    examples
        .iter()
        .map(|ex| (ex.values()[position].clone(), ex.weight()))
        .collect()
}

fn number_at(example: &Example, example_index: usize, position: usize) -> Result<f64, TreeError> {
    let value = &example.values()[position];
    value.as_number().ok_or_else(|| TreeError::NonNumericValue {
        example_index,
        position,
        value: value.to_string(),
    })
}

/// Weighted median of numeric attribute `position`.
///
/// Sorts by value and returns the first value at which the cumulative
/// weight strictly exceeds half the total weight. With unit weights this is
/// the middle element for odd counts and the upper-middle one for even
/// counts.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`TreeError::EmptyDistribution`] | `examples` is empty or carries zero weight |
/// | [`TreeError::NonNumericValue`] | a value at `position` is categorical |
pub fn weighted_median(examples: &[&Example], position: usize) -> Result<f64, TreeError> {
    let mut pairs: Vec<(f64, f64)> = examples
        .iter()
        .enumerate()
        .map(|(i, ex)| number_at(ex, i, position).map(|n| (n, ex.weight())))
        .collect::<Result<_, _>>()?;
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

    let half = pairs.iter().map(|(_, w)| w).sum::<f64>() / 2.0;
    let mut cumulative = 0.0;
    for (value, weight) in pairs {
        cumulative += weight;
        if cumulative > half {
            return Ok(value);
        }
    }
    Err(TreeError::EmptyDistribution)
}

/// Weight above versus at-or-below `median` for numeric attribute `position`.
///
/// # Errors
///
/// Returns [`TreeError::NonNumericValue`] when a value at `position` is categorical.
pub fn numeric_distribution(
    examples: &[&Example],
    position: usize,
    median: f64,
) -> Result<Distribution<BranchKey>, TreeError> {
    let mut dist = Distribution::new();
    for (i, ex) in examples.iter().enumerate() {
        let value = number_at(ex, i, position)?;
        dist.add(BranchKey::for_number(value, median), ex.weight());
    }
    Ok(dist)
}

/// Whether `example` is routed to `key` by a split on attribute `position`.
#[must_use]
pub fn in_branch(example: &Example, position: usize, split: SplitKind, key: &BranchKey) -> bool {
    let value = &example.values()[position];
    match (split, key) {
        (SplitKind::Categorical, BranchKey::Value(v)) => value == v,
        (SplitKind::Numeric { median }, BranchKey::AboveMedian) => {
            value.as_number().is_some_and(|n| n > median)
        }
        (SplitKind::Numeric { median }, BranchKey::AtOrBelowMedian) => {
            value.as_number().is_some_and(|n| n <= median)
        }
        _ => false,
    }
}

/// The sub-example set routed to `key`.
#[must_use]
pub fn branch_examples<'a>(
    examples: &[&'a Example],
    position: usize,
    split: SplitKind,
    key: &BranchKey,
) -> Vec<&'a Example> {
    examples
        .iter()
        .copied()
        .filter(|ex| in_branch(ex, position, split, key))
        .collect()
}

/// Label distribution restricted to the examples routed to `key`.
#[must_use]
pub fn branch_label_distribution(
    examples: &[&Example],
    position: usize,
    split: SplitKind,
    key: &BranchKey,
) -> Distribution<Value> {
    examples
        .iter()
        .filter(|ex| in_branch(ex, position, split, key))
        .map(|ex| (ex.label().clone(), ex.weight()))
        .collect()
}

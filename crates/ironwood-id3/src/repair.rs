//! Missing-value repair: replace a sentinel with the most frequent value per column.

use tracing::{debug, instrument, warn};

use crate::distribution::Distribution;
use crate::example::Dataset;
use crate::value::Value;

/// Replace every `sentinel` with the most frequent other value of its column.
///
/// Scans each attribute column and the label column, counting occurrences
/// (ties keep the first-seen value). Returns the positions that contained
/// the sentinel. A column holding nothing but the sentinel has no
/// replacement and is left unchanged.
///
/// Running the repair a second time changes nothing.
#[instrument(skip_all, fields(n_examples = dataset.len(), sentinel = %sentinel))]
pub fn fill_missing_values(dataset: &mut Dataset, sentinel: &Value) -> Vec<usize> {
    let layout = dataset.layout();
    let mut repaired = Vec::new();

    for position in 0..=layout.label_position() {
        let mut counts: Distribution<&Value> = Distribution::new();
        let mut n_missing = 0usize;
        for example in dataset.examples() {
            let Some(value) = example.column(position) else {
                continue;
            };
            if value == sentinel {
                n_missing += 1;
            } else {
                counts.add(value, 1.0);
            }
        }
        if n_missing == 0 {
            continue;
        }
        repaired.push(position);

        let Some(replacement) = counts.majority().map(|v| (*v).clone()) else {
            warn!(position, n_missing, "column holds only missing values, left unrepaired");
            continue;
        };
        debug!(position, n_missing, replacement = %replacement, "filling missing values");

        for example in dataset.examples_mut() {
            if let Some(slot) = example.column_mut(position)
                && *slot == *sentinel
            {
                *slot = replacement.clone();
            }
        }
    }

    repaired
}

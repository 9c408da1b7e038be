//! Weighted accuracy of a tree over an example set.

use tracing::{debug, instrument};

use crate::config::TreeConfig;
use crate::error::TreeError;
use crate::example::Dataset;
use crate::tree::DecisionTree;

/// Matched versus total example weight.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Evaluation {
    /// Total weight of examples whose predicted label equals their label.
    pub matched_weight: f64,
    /// Total weight of all evaluated examples.
    pub total_weight: f64,
}

impl Evaluation {
    /// Return `matched_weight / total_weight`, or 0.0 when nothing was weighed.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        if self.total_weight > 0.0 {
            self.matched_weight / self.total_weight
        } else {
            0.0
        }
    }

    /// Return `1 - accuracy`.
    #[must_use]
    pub fn error(&self) -> f64 {
        1.0 - self.accuracy()
    }
}

impl DecisionTree {
    /// Classify every example of `dataset` and total the weights.
    ///
    /// Predictions are computed in parallel; weights are summed in example
    /// order. Neither the tree nor the dataset is modified.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::PredictionArityMismatch`] when `dataset` has a
    /// different attribute count than the training data.
    #[instrument(skip_all, fields(n_examples = dataset.len()))]
    pub fn evaluate(
        &self,
        dataset: &Dataset,
        config: &TreeConfig,
    ) -> Result<Evaluation, TreeError> {
        let predictions = self.classify_batch(dataset.examples(), config)?;

        let mut matched_weight = 0.0;
        let mut total_weight = 0.0;
        for (example, predicted) in dataset.examples().iter().zip(predictions) {
            if predicted == example.label() {
                matched_weight += example.weight();
            }
            total_weight += example.weight();
        }

        let evaluation = Evaluation {
            matched_weight,
            total_weight,
        };
        debug!(
            matched_weight,
            total_weight,
            accuracy = evaluation.accuracy(),
            "evaluation complete"
        );
        Ok(evaluation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::example::{Example, WeightColumn};
    use crate::value::Value;

    fn dataset(rows: &[(&str, &str, f64)]) -> Dataset {
        Dataset::new(
            rows.iter()
                .map(|&(a, l, w)| Example::new(vec![Value::from(a)], l).with_weight(w))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn accuracy_of_empty_evaluation_is_zero() {
        let eval = Evaluation {
            matched_weight: 0.0,
            total_weight: 0.0,
        };
        assert!((eval.accuracy() - 0.0).abs() < f64::EPSILON);
        assert!((eval.error() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn weights_are_accumulated() {
        let mut train = dataset(&[("a", "Yes", 1.0), ("b", "No", 1.0)]);
        let tree = TreeConfig::new().fit(&mut train).unwrap();

        // One wrong example weighted 3.0 out of 5.0.
        let test = dataset(&[("a", "Yes", 2.0), ("b", "Yes", 3.0)]);
        let eval = tree.evaluate(&test, &TreeConfig::new()).unwrap();
        assert!((eval.matched_weight - 2.0).abs() < f64::EPSILON);
        assert!((eval.total_weight - 5.0).abs() < f64::EPSILON);
        assert!((eval.accuracy() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn evaluation_leaves_sentinels_in_place() {
        let mut train = dataset(&[("a", "Yes", 1.0), ("b", "No", 1.0), ("a", "Yes", 1.0)]);
        let config = TreeConfig::new().with_missing_value(Some(Value::from("?")));
        let tree = config.fit(&mut train).unwrap();

        let test = Dataset::from_rows(
            vec![vec![Value::from("?"), Value::from("Yes")]],
            WeightColumn::Absent,
        )
        .unwrap();
        let eval = tree.evaluate(&test, &config).unwrap();
        assert!((eval.accuracy() - 1.0).abs() < f64::EPSILON);
        assert_eq!(test.examples()[0].values()[0], Value::from("?"));
    }
}

//! Examples, datasets, and the column layout shared by every component.

use std::ops::Range;

use crate::error::TreeError;
use crate::value::Value;

/// Where the label and weight columns sit in a normalized row.
///
/// A normalized row is `n_attributes` attribute values followed by the
/// label and then the weight, so `label_position = arity - 2` and
/// `weight_position = arity - 1`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq,
    serde::Serialize, serde::Deserialize,
)]
pub struct ColumnLayout {
    n_attributes: usize,
}

impl ColumnLayout {
    /// Create a layout for rows with `n_attributes` attribute columns.
    #[must_use]
    pub fn new(n_attributes: usize) -> Self {
        Self { n_attributes }
    }

    /// Return the number of attribute columns.
    #[must_use]
    pub fn n_attributes(self) -> usize {
        self.n_attributes
    }

    /// Return the total row width including label and weight.
    #[must_use]
    pub fn arity(self) -> usize {
        self.n_attributes + 2
    }

    /// Return the position of the label column.
    #[must_use]
    pub fn label_position(self) -> usize {
        self.n_attributes
    }

    /// Return the position of the weight column.
    #[must_use]
    pub fn weight_position(self) -> usize {
        self.n_attributes + 1
    }

    /// Return the range of attribute positions.
    #[must_use]
    pub fn attribute_positions(self) -> Range<usize> {
        0..self.n_attributes
    }
}

/// A labeled, weighted example.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Example {
    values: Vec<Value>,
    label: Value,
    weight: f64,
}

impl Example {
    /// Create an example with weight 1.
    pub fn new(values: Vec<Value>, label: impl Into<Value>) -> Self {
        Self {
            values,
            label: label.into(),
            weight: 1.0,
        }
    }

    /// Set the example weight.
    #[must_use]
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Return the attribute values.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Return the label.
    #[must_use]
    pub fn label(&self) -> &Value {
        &self.label
    }

    /// Return the weight.
    #[must_use]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Return the number of attribute values.
    #[must_use]
    pub fn n_attributes(&self) -> usize {
        self.values.len()
    }

    /// Return the value in column `position`: an attribute, or the label at
    /// `n_attributes`. The weight column is not a [`Value`].
    #[must_use]
    pub fn column(&self, position: usize) -> Option<&Value> {
        if position == self.values.len() {
            Some(&self.label)
        } else {
            self.values.get(position)
        }
    }

    pub(crate) fn column_mut(&mut self, position: usize) -> Option<&mut Value> {
        if position == self.values.len() {
            Some(&mut self.label)
        } else {
            self.values.get_mut(position)
        }
    }
}

/// How the weight of each raw row is supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightColumn {
    /// Rows end with the label; every example gets weight 1.
    Absent,
    /// Rows end with the label followed by a numeric weight.
    Present,
}

/// A non-empty set of examples sharing one [`ColumnLayout`].
#[derive(Debug, Clone)]
pub struct Dataset {
    examples: Vec<Example>,
    layout: ColumnLayout,
}

impl Dataset {
    /// Validate and wrap a list of examples.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`TreeError::EmptyDataset`] | `examples` is empty |
    /// | [`TreeError::ZeroAttributes`] | examples have no attribute columns |
    /// | [`TreeError::ArityMismatch`] | examples have inconsistent attribute counts |
    /// | [`TreeError::InvalidWeight`] | a weight is negative, NaN, or infinite |
    pub fn new(examples: Vec<Example>) -> Result<Self, TreeError> {
        let first = examples.first().ok_or(TreeError::EmptyDataset)?;
        let n_attributes = first.n_attributes();
        if n_attributes == 0 {
            return Err(TreeError::ZeroAttributes);
        }

        for (example_index, example) in examples.iter().enumerate() {
            if example.n_attributes() != n_attributes {
                return Err(TreeError::ArityMismatch {
                    expected: n_attributes,
                    got: example.n_attributes(),
                    example_index,
                });
            }
            if !example.weight.is_finite() || example.weight < 0.0 {
                return Err(TreeError::InvalidWeight {
                    example_index,
                    weight: example.weight,
                });
            }
        }

        Ok(Self {
            examples,
            layout: ColumnLayout::new(n_attributes),
        })
    }

    /// Normalize raw rows into a dataset.
    ///
    /// With [`WeightColumn::Absent`] the last column is the label and each
    /// example is given weight 1. With [`WeightColumn::Present`] the last
    /// column must be a [`Value::Number`] weight and the label precedes it.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::MissingWeightColumn`] when a declared weight is
    /// not a number or the row is too short to hold it, plus every error of
    /// [`Dataset::new`].
    pub fn from_rows(
        rows: Vec<Vec<Value>>,
        weight_column: WeightColumn,
    ) -> Result<Self, TreeError> {
        let mut examples = Vec::with_capacity(rows.len());
        for (row_index, mut row) in rows.into_iter().enumerate() {
            let weight = match weight_column {
                WeightColumn::Absent => 1.0,
                WeightColumn::Present => row
                    .pop()
                    .and_then(|w| w.as_number())
                    .ok_or(TreeError::MissingWeightColumn { row_index })?,
            };
            let label = row.pop().ok_or(TreeError::ZeroAttributes)?;
            examples.push(Example::new(row, label).with_weight(weight));
        }
        Self::new(examples)
    }

    /// Return the examples.
    #[must_use]
    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    pub(crate) fn examples_mut(&mut self) -> &mut [Example] {
        &mut self.examples
    }

    /// Return the column layout.
    #[must_use]
    pub fn layout(&self) -> ColumnLayout {
        self.layout
    }

    /// Return the number of examples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    /// Always `false`: construction rejects empty example sets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Return the sum of example weights.
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.examples.iter().map(Example::weight).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(tokens: &[&str]) -> Vec<Value> {
        tokens.iter().map(|&t| Value::from(t)).collect()
    }

    #[test]
    fn layout_positions() {
        let layout = ColumnLayout::new(4);
        assert_eq!(layout.arity(), 6);
        assert_eq!(layout.label_position(), 4);
        assert_eq!(layout.weight_position(), 5);
        assert_eq!(layout.attribute_positions(), 0..4);
    }

    #[test]
    fn from_rows_appends_unit_weight() {
        let ds = Dataset::from_rows(
            vec![row(&["Sunny", "Hot", "Yes"]), row(&["Rain", "Cool", "No"])],
            WeightColumn::Absent,
        )
        .unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.layout().n_attributes(), 2);
        assert_eq!(ds.examples()[0].label(), &Value::from("Yes"));
        assert!((ds.total_weight() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn from_rows_reads_weight_column() {
        let mut r = row(&["Sunny", "Yes"]);
        r.push(Value::Number(0.25));
        let ds = Dataset::from_rows(vec![r], WeightColumn::Present).unwrap();
        assert!((ds.examples()[0].weight() - 0.25).abs() < f64::EPSILON);
        assert_eq!(ds.examples()[0].values(), &[Value::from("Sunny")]);
    }

    #[test]
    fn from_rows_rejects_categorical_weight() {
        let err = Dataset::from_rows(vec![row(&["Sunny", "Yes", "heavy"])], WeightColumn::Present)
            .unwrap_err();
        assert!(matches!(err, TreeError::MissingWeightColumn { row_index: 0 }));
    }

    #[test]
    fn empty_dataset_error() {
        let err = Dataset::new(vec![]).unwrap_err();
        assert!(matches!(err, TreeError::EmptyDataset));
    }

    #[test]
    fn zero_attributes_error() {
        let err = Dataset::from_rows(vec![row(&["Yes"])], WeightColumn::Absent).unwrap_err();
        assert!(matches!(err, TreeError::ZeroAttributes));
    }

    #[test]
    fn arity_mismatch_error() {
        let err = Dataset::from_rows(
            vec![row(&["a", "b", "Yes"]), row(&["a", "No"])],
            WeightColumn::Absent,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TreeError::ArityMismatch { expected: 2, got: 1, example_index: 1 }
        ));
    }

    #[test]
    fn negative_weight_error() {
        let err = Dataset::new(vec![Example::new(row(&["a"]), "Yes").with_weight(-1.0)])
            .unwrap_err();
        assert!(matches!(err, TreeError::InvalidWeight { example_index: 0, .. }));
    }

    #[test]
    fn column_addresses_label_after_attributes() {
        let ex = Example::new(row(&["a", "b"]), "Yes");
        assert_eq!(ex.column(1), Some(&Value::from("b")));
        assert_eq!(ex.column(2), Some(&Value::from("Yes")));
        assert_eq!(ex.column(3), None);
    }
}

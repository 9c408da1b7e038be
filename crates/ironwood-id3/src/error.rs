/// Errors from decision tree induction, classification, and evaluation.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// Returned when the example set has zero examples.
    #[error("example set has zero examples")]
    EmptyDataset,

    /// Returned when examples carry zero attribute columns.
    #[error("examples have zero attribute columns")]
    ZeroAttributes,

    /// Returned when an example has a different number of attributes than expected.
    #[error("example {example_index} has {got} attributes, expected {expected}")]
    ArityMismatch {
        /// The expected number of attributes.
        expected: usize,
        /// The actual number of attributes in the example.
        got: usize,
        /// The zero-based index of the offending example.
        example_index: usize,
    },

    /// Returned when an example to classify has a different number of attributes
    /// than the training data.
    #[error("prediction input has {got} attributes, expected {expected}")]
    PredictionArityMismatch {
        /// The number of attributes the tree was trained on.
        expected: usize,
        /// The number of attributes in the prediction input.
        got: usize,
    },

    /// Returned when an example weight is negative, NaN, or infinite.
    #[error("example {example_index} has invalid weight {weight}")]
    InvalidWeight {
        /// The zero-based index of the offending example.
        example_index: usize,
        /// The invalid weight.
        weight: f64,
    },

    /// Returned when a raw row declares a weight column that does not hold a number.
    #[error("row {row_index} has a non-numeric weight column")]
    MissingWeightColumn {
        /// The zero-based index of the offending row.
        row_index: usize,
    },

    /// Returned when every example has zero weight.
    #[error("example set has zero total weight")]
    ZeroTotalWeight,

    /// Returned when a numeric attribute position is not an attribute column.
    #[error("numeric attribute {position} is out of range for {n_attributes} attributes")]
    NumericAttributeOutOfRange {
        /// The configured numeric position.
        position: usize,
        /// The number of attribute columns.
        n_attributes: usize,
    },

    /// Returned when a numeric attribute holds a categorical value.
    #[error("example {example_index} has non-numeric value {value:?} in numeric attribute {position}")]
    NonNumericValue {
        /// The zero-based index of the offending example.
        example_index: usize,
        /// The numeric attribute position.
        position: usize,
        /// Display form of the offending value.
        value: String,
    },

    /// Returned when a numeric attribute holds NaN or infinity.
    #[error("non-finite value at example {example_index}, attribute {position}")]
    NonFiniteValue {
        /// The zero-based index of the offending example.
        example_index: usize,
        /// The numeric attribute position.
        position: usize,
    },

    /// Returned when an impurity criterion name is not recognized.
    #[error("unknown impurity criterion: {name} (expected entropy, majority-error, or gini)")]
    UnknownCriterion {
        /// The unrecognized name.
        name: String,
    },

    /// Returned when a random tree is requested without a positive feature sample size.
    #[error("feature_sample_size must be at least 1 for a random tree, got {feature_sample_size}")]
    InvalidFeatureSampleSize {
        /// The configured sample size.
        feature_sample_size: usize,
    },

    /// Returned when a statistic is computed over a distribution with zero total weight.
    #[error("statistic computed over an empty distribution")]
    EmptyDistribution,
}

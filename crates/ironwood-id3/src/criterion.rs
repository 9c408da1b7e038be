use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use crate::distribution::Distribution;
use crate::error::TreeError;
use crate::node::Impurity;

/// Impurity measure used to score candidate splits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum SplitCriterion {
    /// Information entropy: -Σ(p_i · ln(p_i))
    #[default]
    Entropy,
    /// Majority error: 1 - max(p_i)
    MajorityError,
    /// Gini impurity: 1 - Σ(p_i²)
    Gini,
}

impl SplitCriterion {
    /// Compute the impurity of a label distribution.
    ///
    /// Zero-weight labels contribute nothing to entropy.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::EmptyDistribution`] when the total weight is zero.
    pub fn impurity<K: Clone + Eq + Hash>(
        &self,
        distribution: &Distribution<K>,
    ) -> Result<Impurity, TreeError> {
        let total = distribution.total();
        if total <= 0.0 {
            return Err(TreeError::EmptyDistribution);
        }
        let proportions = distribution.weights().map(|w| w / total);
        let value = match self {
            SplitCriterion::Entropy => -proportions
                .filter(|&p| p > 0.0)
                .map(|p| p * p.ln())
                .sum::<f64>(),
            SplitCriterion::MajorityError => 1.0 - proportions.fold(0.0, f64::max),
            SplitCriterion::Gini => 1.0 - proportions.map(|p| p * p).sum::<f64>(),
        };
        Ok(Impurity::new(value))
    }

    /// Return the canonical name accepted by [`FromStr`].
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            SplitCriterion::Entropy => "entropy",
            SplitCriterion::MajorityError => "majority-error",
            SplitCriterion::Gini => "gini",
        }
    }
}

impl fmt::Display for SplitCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SplitCriterion {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "entropy" => Ok(SplitCriterion::Entropy),
            "majority-error" | "majority_error" | "me" => Ok(SplitCriterion::MajorityError),
            "gini" => Ok(SplitCriterion::Gini),
            _ => Err(TreeError::UnknownCriterion { name: s.to_string() }),
        }
    }
}

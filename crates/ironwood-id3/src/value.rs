use std::fmt;
use std::hash::{Hash, Hasher};

/// A single attribute or label value.
///
/// Whether an attribute position is numeric is decided by configuration,
/// not by the variant: a numeric position may still hold a
/// [`Value::Category`] before missing-value repair replaces the sentinel.
///
/// Equality and hashing compare numbers by bit pattern so values can key
/// distributions and branch tables.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum Value {
    /// An opaque categorical token.
    Category(String),
    /// A real number.
    Number(f64),
}

impl Value {
    /// Create a categorical value.
    pub fn category(token: impl Into<String>) -> Self {
        Self::Category(token.into())
    }

    /// Return the number held by this value, if any.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Category(_) => None,
        }
    }

    /// Return the categorical token held by this value, if any.
    #[must_use]
    pub fn as_category(&self) -> Option<&str> {
        match self {
            Value::Category(s) => Some(s),
            Value::Number(_) => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Category(a), Value::Category(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Category(s) => {
                0u8.hash(state);
                s.hash(state);
            }
            Value::Number(n) => {
                1u8.hash(state);
                n.to_bits().hash(state);
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Category(s) => f.write_str(s),
            Value::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for Value {
    fn from(token: &str) -> Self {
        Value::Category(token.to_string())
    }
}

impl From<String> for Value {
    fn from(token: String) -> Self {
        Value::Category(token)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::Value;

    #[test]
    fn category_equality() {
        assert_eq!(Value::from("Sunny"), Value::category("Sunny"));
        assert_ne!(Value::from("Sunny"), Value::from("Rain"));
    }

    #[test]
    fn number_never_equals_category() {
        assert_ne!(Value::Number(1.0), Value::from("1"));
    }

    #[test]
    fn numbers_hash_by_bits() {
        let set: HashSet<Value> = [Value::Number(2.5), Value::Number(2.5), Value::Number(3.0)]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", Value::from("Hot")), "Hot");
        assert_eq!(format!("{}", Value::Number(4.0)), "4");
        assert_eq!(format!("{}", Value::Number(0.5)), "0.5");
    }

    #[test]
    fn accessors() {
        assert_eq!(Value::Number(7.0).as_number(), Some(7.0));
        assert_eq!(Value::from("x").as_number(), None);
        assert_eq!(Value::from("x").as_category(), Some("x"));
    }
}

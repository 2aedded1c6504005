//! Operator types for version comparators

use std::fmt;
use thiserror::Error;

/// Comparison operators a comparator may carry.
///
/// A bare `=` is normalized to the empty operator, so both spell
/// [`Operator::Exact`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Exact match ("" or "=")
    Exact,
    /// Less than (<)
    LessThan,
    /// Less than or equal (<=)
    LessThanOrEqual,
    /// Greater than (>)
    GreaterThan,
    /// Greater than or equal (>=)
    GreaterThanOrEqual,
}

#[derive(Error, Debug, Clone)]
#[error("Invalid operator \"{0}\"")]
pub struct InvalidOperatorError(pub String);

impl Operator {
    /// Parse an operator token.
    pub fn from_str(s: &str) -> Result<Self, InvalidOperatorError> {
        match s {
            "" | "=" => Ok(Operator::Exact),
            "<" => Ok(Operator::LessThan),
            "<=" => Ok(Operator::LessThanOrEqual),
            ">" => Ok(Operator::GreaterThan),
            ">=" => Ok(Operator::GreaterThanOrEqual),
            _ => Err(InvalidOperatorError(s.to_string())),
        }
    }

    /// Get the string representation of the operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Exact => "",
            Operator::LessThan => "<",
            Operator::LessThanOrEqual => "<=",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEqual => ">=",
        }
    }

    /// Whether the operator bounds from below (`>` or `>=`).
    pub fn is_greater(&self) -> bool {
        matches!(self, Operator::GreaterThan | Operator::GreaterThanOrEqual)
    }

    /// Whether the operator bounds from above (`<` or `<=`).
    pub fn is_less(&self) -> bool {
        matches!(self, Operator::LessThan | Operator::LessThanOrEqual)
    }

    /// Whether the bounded version itself is allowed (`>=` or `<=`).
    pub fn is_inclusive(&self) -> bool {
        matches!(
            self,
            Operator::GreaterThanOrEqual | Operator::LessThanOrEqual
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!(Operator::from_str("").unwrap(), Operator::Exact);
        assert_eq!(Operator::from_str("=").unwrap(), Operator::Exact);
        assert_eq!(Operator::from_str("<").unwrap(), Operator::LessThan);
        assert_eq!(Operator::from_str("<=").unwrap(), Operator::LessThanOrEqual);
        assert_eq!(Operator::from_str(">").unwrap(), Operator::GreaterThan);
        assert_eq!(Operator::from_str(">=").unwrap(), Operator::GreaterThanOrEqual);
        assert!(Operator::from_str("==").is_err());
        assert!(Operator::from_str("~").is_err());
    }

    #[test]
    fn test_as_str_round_trip() {
        for op in [
            Operator::Exact,
            Operator::LessThan,
            Operator::LessThanOrEqual,
            Operator::GreaterThan,
            Operator::GreaterThanOrEqual,
        ] {
            assert_eq!(Operator::from_str(op.as_str()).unwrap(), op);
        }
    }

    #[test]
    fn test_directions() {
        assert!(Operator::GreaterThan.is_greater());
        assert!(Operator::GreaterThanOrEqual.is_greater());
        assert!(!Operator::LessThan.is_greater());
        assert!(Operator::LessThan.is_less());
        assert!(Operator::LessThanOrEqual.is_less());
        assert!(!Operator::Exact.is_greater());
        assert!(!Operator::Exact.is_less());
        assert!(Operator::GreaterThanOrEqual.is_inclusive());
        assert!(Operator::LessThanOrEqual.is_inclusive());
        assert!(!Operator::GreaterThan.is_inclusive());
    }
}

//! Single operator/version comparator

use std::cmp::Ordering;
use std::fmt;

use crate::grammar;
use crate::range::{Operator, RangeError, RangeOptions};
use crate::version::Version;

/// One constraint of a range: an operator applied to a version, or the
/// empty comparator that matches everything.
#[derive(Debug, Clone, PartialEq)]
pub enum Comparator {
    /// Matches every version.
    Any,
    /// A single operator/version constraint such as `>=1.2.3`.
    Bound { operator: Operator, version: Version },
}

impl Comparator {
    /// Parse one comparator token. The empty string yields
    /// [`Comparator::Any`].
    pub fn parse(text: &str) -> Result<Comparator, RangeError> {
        let caps = grammar::COMPARATOR
            .captures(text.trim())
            .ok_or_else(|| RangeError::InvalidComparator(text.to_string()))?;

        let operator = match caps.get(1) {
            Some(m) => Operator::from_str(m.as_str())?,
            None => Operator::Exact,
        };

        match caps.get(2) {
            None => Ok(Comparator::Any),
            Some(m) => Ok(Comparator::Bound {
                operator,
                version: Version::new(m.as_str())?,
            }),
        }
    }

    /// Whether the version satisfies this single constraint.
    pub fn test(&self, version: &Version) -> bool {
        match self {
            Comparator::Any => true,
            Comparator::Bound { operator, version: bound } => {
                let ordering = version.compare(bound);
                match operator {
                    Operator::Exact => ordering == Ordering::Equal,
                    Operator::LessThan => ordering == Ordering::Less,
                    Operator::LessThanOrEqual => ordering != Ordering::Greater,
                    Operator::GreaterThan => ordering == Ordering::Greater,
                    Operator::GreaterThanOrEqual => ordering != Ordering::Less,
                }
            }
        }
    }

    /// Whether some version can satisfy both comparators at once.
    pub fn intersects(&self, other: &Comparator, options: RangeOptions) -> bool {
        let (a_op, a_version, b_op, b_version) = match (self, other) {
            (Comparator::Any, _) | (_, Comparator::Any) => return true,
            (
                Comparator::Bound { operator: a_op, version: a_version },
                Comparator::Bound { operator: b_op, version: b_version },
            ) => (*a_op, a_version, *b_op, b_version),
        };

        // An exact comparator intersects whatever accepts its pinned
        // version, prerelease visibility included.
        if a_op == Operator::Exact {
            return other.allows(a_version, options);
        }
        if b_op == Operator::Exact {
            return self.allows(b_version, options);
        }

        let same_direction_increasing = a_op.is_greater() && b_op.is_greater();
        let same_direction_decreasing = a_op.is_less() && b_op.is_less();
        let same_version = a_version.compare(b_version) == Ordering::Equal;
        let different_directions_inclusive = a_op.is_inclusive() && b_op.is_inclusive();
        let opposite_directions_less = a_version.compare(b_version) == Ordering::Less
            && a_op.is_greater()
            && b_op.is_less();
        let opposite_directions_greater = a_version.compare(b_version) == Ordering::Greater
            && a_op.is_less()
            && b_op.is_greater();

        same_direction_increasing
            || same_direction_decreasing
            || (same_version && different_directions_inclusive)
            || opposite_directions_less
            || opposite_directions_greater
    }

    /// Comparator test plus the prerelease-visibility rule a whole range
    /// applies: a prerelease version only passes when the bound itself
    /// names a prerelease at the same major.minor.patch.
    fn allows(&self, version: &Version, options: RangeOptions) -> bool {
        if !self.test(version) {
            return false;
        }
        if version.prerelease().is_empty() || options.include_prerelease {
            return true;
        }
        match self {
            Comparator::Any => false,
            Comparator::Bound { version: bound, .. } => {
                !bound.prerelease().is_empty()
                    && bound.major() == version.major()
                    && bound.minor() == version.minor()
                    && bound.patch() == version.patch()
            }
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparator::Any => Ok(()),
            Comparator::Bound { operator, version } => write!(f, "{}{}", operator, version),
        }
    }
}

//! Facade providing the top-level version and range query operations

use std::cmp::Ordering;

use thiserror::Error;

use crate::range::{Comparator, Operator, Range, RangeError, RangeOptions};
use crate::version::{ReleaseType, Version, VersionError};

/// Error type for the query functions that operate on assumed-valid input
#[derive(Error, Debug, Clone)]
pub enum SemverError {
    #[error("{0}")]
    Version(String),
    #[error("{0}")]
    Range(String),
    #[error("Invalid operator \"{0}\"")]
    InvalidOperator(String),
    #[error("Must provide a hilo val of \"<\" or \">\"")]
    InvalidHilo,
}

impl From<VersionError> for SemverError {
    fn from(err: VersionError) -> Self {
        SemverError::Version(err.to_string())
    }
}

impl From<RangeError> for SemverError {
    fn from(err: RangeError) -> Self {
        SemverError::Range(err.to_string())
    }
}

/// Main facade for semantic versioning operations
pub struct Semver;

impl Semver {
    /// Parse a version string, `None` for anything invalid.
    pub fn parse(version: &str) -> Option<Version> {
        Version::parse(version)
    }

    /// The canonical form of a version string, `None` for anything invalid.
    pub fn valid(version: &str) -> Option<String> {
        Version::parse(version).map(|v| v.version().to_string())
    }

    /// Increment a version string, `None` for anything invalid.
    pub fn inc(version: &str, release: ReleaseType, identifier: Option<&str>) -> Option<String> {
        let mut version = Version::parse(version)?;
        version.inc(release, identifier);
        Some(version.version().to_string())
    }

    /// The most significant release step separating two versions, `None`
    /// when they have equal precedence.
    pub fn diff(a: &str, b: &str) -> Result<Option<ReleaseType>, SemverError> {
        let v1 = Version::new(a)?;
        let v2 = Version::new(b)?;

        if v1.compare(&v2) == Ordering::Equal {
            return Ok(None);
        }

        let prefixed = !v1.prerelease().is_empty() || !v2.prerelease().is_empty();
        if v1.major() != v2.major() {
            return Ok(Some(if prefixed {
                ReleaseType::Premajor
            } else {
                ReleaseType::Major
            }));
        }
        if v1.minor() != v2.minor() {
            return Ok(Some(if prefixed {
                ReleaseType::Preminor
            } else {
                ReleaseType::Minor
            }));
        }
        if v1.patch() != v2.patch() {
            return Ok(Some(if prefixed {
                ReleaseType::Prepatch
            } else {
                ReleaseType::Patch
            }));
        }

        // Same main version, so only the prerelease tags differ.
        Ok(if prefixed {
            Some(ReleaseType::Prerelease)
        } else {
            None
        })
    }

    /// Total precedence order of two version strings.
    pub fn compare(a: &str, b: &str) -> Result<Ordering, SemverError> {
        Ok(Version::new(a)?.compare(&Version::new(b)?))
    }

    /// [`Semver::compare`] with the operands swapped, for descending sorts.
    pub fn rcompare(a: &str, b: &str) -> Result<Ordering, SemverError> {
        Self::compare(b, a)
    }

    /// Precedence order with build metadata as the final tie-break.
    pub fn compare_build(a: &str, b: &str) -> Result<Ordering, SemverError> {
        Ok(Version::new(a)?.compare_build(&Version::new(b)?))
    }

    pub fn gt(a: &str, b: &str) -> Result<bool, SemverError> {
        Ok(Self::compare(a, b)? == Ordering::Greater)
    }

    pub fn gte(a: &str, b: &str) -> Result<bool, SemverError> {
        Ok(Self::compare(a, b)? != Ordering::Less)
    }

    pub fn lt(a: &str, b: &str) -> Result<bool, SemverError> {
        Ok(Self::compare(a, b)? == Ordering::Less)
    }

    pub fn lte(a: &str, b: &str) -> Result<bool, SemverError> {
        Ok(Self::compare(a, b)? != Ordering::Greater)
    }

    pub fn eq(a: &str, b: &str) -> Result<bool, SemverError> {
        Ok(Self::compare(a, b)? == Ordering::Equal)
    }

    pub fn neq(a: &str, b: &str) -> Result<bool, SemverError> {
        Ok(Self::compare(a, b)? != Ordering::Equal)
    }

    /// Compare two version strings with an operator given as text.
    /// `===` and `!==` compare the raw strings, everything else the parsed
    /// versions; an unrecognized operator is an error.
    pub fn cmp(a: &str, operator: &str, b: &str) -> Result<bool, SemverError> {
        match operator {
            "===" => Ok(a == b),
            "!==" => Ok(a != b),
            "" | "=" | "==" => Self::eq(a, b),
            "!=" => Self::neq(a, b),
            ">" => Self::gt(a, b),
            ">=" => Self::gte(a, b),
            "<" => Self::lt(a, b),
            "<=" => Self::lte(a, b),
            _ => Err(SemverError::InvalidOperator(operator.to_string())),
        }
    }

    /// Sort version strings ascending by the build-aware total order.
    pub fn sort(versions: &[&str]) -> Result<Vec<String>, SemverError> {
        Self::usort(versions, true)
    }

    /// Sort version strings descending by the build-aware total order.
    pub fn rsort(versions: &[&str]) -> Result<Vec<String>, SemverError> {
        Self::usort(versions, false)
    }

    fn usort(versions: &[&str], ascending: bool) -> Result<Vec<String>, SemverError> {
        let mut parsed: Vec<(Version, usize)> = versions
            .iter()
            .enumerate()
            .map(|(i, raw)| Ok((Version::new(raw)?, i)))
            .collect::<Result<_, SemverError>>()?;

        parsed.sort_by(|(a, _), (b, _)| {
            let ordering = a.compare_build(b);
            if ascending {
                ordering
            } else {
                ordering.reverse()
            }
        });

        Ok(parsed
            .into_iter()
            .map(|(_, i)| versions[i].to_string())
            .collect())
    }

    /// Whether a version satisfies a range. Invalid input never fails,
    /// it simply does not satisfy.
    pub fn satisfies(version: &str, range: &str, options: RangeOptions) -> bool {
        let range = match Range::new(range, options) {
            Ok(range) => range,
            Err(_) => return false,
        };
        let version = match Version::new(version) {
            Ok(version) => version,
            Err(_) => return false,
        };
        range.test(&version)
    }

    /// The highest of the given versions satisfying the range, returned as
    /// the original input string. `None` when nothing satisfies or the
    /// range itself is invalid.
    pub fn max_satisfying(versions: &[&str], range: &str, options: RangeOptions) -> Option<String> {
        let range = Range::new(range, options).ok()?;
        let mut best: Option<(usize, Version)> = None;
        for (i, raw) in versions.iter().enumerate() {
            let version = match Version::new(raw) {
                Ok(version) => version,
                Err(_) => continue,
            };
            if !range.test(&version) {
                continue;
            }
            let better = match &best {
                None => true,
                Some((_, current)) => current.compare(&version) == Ordering::Less,
            };
            if better {
                best = Some((i, version));
            }
        }
        best.map(|(i, _)| versions[i].to_string())
    }

    /// The lowest of the given versions satisfying the range.
    pub fn min_satisfying(versions: &[&str], range: &str, options: RangeOptions) -> Option<String> {
        let range = Range::new(range, options).ok()?;
        let mut best: Option<(usize, Version)> = None;
        for (i, raw) in versions.iter().enumerate() {
            let version = match Version::new(raw) {
                Ok(version) => version,
                Err(_) => continue,
            };
            if !range.test(&version) {
                continue;
            }
            let better = match &best {
                None => true,
                Some((_, current)) => current.compare(&version) == Ordering::Greater,
            };
            if better {
                best = Some((i, version));
            }
        }
        best.map(|(i, _)| versions[i].to_string())
    }

    /// The lowest version that can satisfy the range, or `None` when no
    /// version can (or the range is invalid).
    pub fn min_version(range: &str, options: RangeOptions) -> Option<Version> {
        let range = Range::new(range, options).ok()?;

        let zero = Version::new("0.0.0").ok()?;
        if range.test(&zero) {
            return Some(zero);
        }
        let zero_pre = Version::new("0.0.0-0").ok()?;
        if range.test(&zero_pre) {
            return Some(zero_pre);
        }

        let mut lowest: Option<Version> = None;
        for group in range.set() {
            for comparator in group {
                let (operator, bound) = match comparator {
                    Comparator::Any => continue,
                    Comparator::Bound { operator, version } => (*operator, version),
                };
                let candidate = match operator {
                    // An exclusive lower bound admits its immediate successor.
                    Operator::GreaterThan => {
                        let successor = if bound.prerelease().is_empty() {
                            format!("{}.{}.{}", bound.major(), bound.minor(), bound.patch() + 1)
                        } else {
                            format!("{}.0", bound.version())
                        };
                        Version::new(&successor).ok()?
                    }
                    Operator::Exact | Operator::GreaterThanOrEqual => bound.clone(),
                    Operator::LessThan | Operator::LessThanOrEqual => continue,
                };
                let lower = match &lowest {
                    None => true,
                    Some(current) => current.compare(&candidate) == Ordering::Greater,
                };
                if lower {
                    lowest = Some(candidate);
                }
            }
        }

        lowest.filter(|version| range.test(version))
    }

    /// The canonical form of a range, `None` when it does not parse.
    /// An empty-but-valid range renders as `*`.
    pub fn valid_range(range: &str, options: RangeOptions) -> Option<String> {
        let range = Range::new(range, options).ok()?;
        let rendered = range.to_string();
        Some(if rendered.is_empty() {
            "*".to_string()
        } else {
            rendered
        })
    }

    /// Whether the version sits entirely outside the range on the side
    /// given by `hilo` (`">"` above it, `"<"` below it). Anything else for
    /// `hilo` is an error.
    pub fn outside(
        version: &str,
        range: &str,
        hilo: &str,
        options: RangeOptions,
    ) -> Result<bool, SemverError> {
        let version = Version::new(version)?;
        let range = Range::new(range, options)?;

        let (edge, inclusive_edge) = match hilo {
            ">" => (Operator::GreaterThan, Operator::GreaterThanOrEqual),
            "<" => (Operator::LessThan, Operator::LessThanOrEqual),
            _ => return Err(SemverError::InvalidHilo),
        };

        if range.test(&version) {
            return Ok(false);
        }

        // For gtr the extremal comparator is the highest one; for ltr the
        // comparisons flip and "high" means lowest.
        let beyond = |a: &Version, b: &Version| {
            if hilo == ">" {
                a.compare(b) == Ordering::Greater
            } else {
                a.compare(b) == Ordering::Less
            }
        };
        let within = |a: &Version, b: &Version| {
            if hilo == ">" {
                a.compare(b) == Ordering::Less
            } else {
                a.compare(b) == Ordering::Greater
            }
        };
        let within_or_at = |a: &Version, b: &Version| {
            if hilo == ">" {
                a.compare(b) != Ordering::Greater
            } else {
                a.compare(b) != Ordering::Less
            }
        };

        let floor = Version::new("0.0.0")?;
        for group in range.set() {
            let mut entries = group.iter().map(|comparator| match comparator {
                Comparator::Any => (Operator::GreaterThanOrEqual, &floor),
                Comparator::Bound { operator, version } => (*operator, version),
            });
            let first = match entries.next() {
                Some(entry) => entry,
                None => continue,
            };
            let mut high = first;
            let mut low = first;
            for (operator, bound) in entries {
                if beyond(bound, high.1) {
                    high = (operator, bound);
                } else if within(bound, low.1) {
                    low = (operator, bound);
                }
            }

            // The group is open towards the queried side.
            if high.0 == edge || high.0 == inclusive_edge {
                return Ok(false);
            }

            // The version is inside or before the group's near boundary.
            if (low.0 == Operator::Exact || low.0 == edge) && within_or_at(&version, low.1) {
                return Ok(false);
            } else if low.0 == inclusive_edge && within(&version, low.1) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Whether the version is greater than every version the range allows.
    pub fn gtr(version: &str, range: &str, options: RangeOptions) -> Result<bool, SemverError> {
        Self::outside(version, range, ">", options)
    }

    /// Whether the version is less than every version the range allows.
    pub fn ltr(version: &str, range: &str, options: RangeOptions) -> Result<bool, SemverError> {
        Self::outside(version, range, "<", options)
    }

    /// Whether two ranges share at least one version.
    pub fn intersects(a: &str, b: &str, options: RangeOptions) -> Result<bool, SemverError> {
        let a = Range::new(a, options)?;
        let b = Range::new(b, options)?;
        Ok(a.intersects(&b))
    }
}

//! Range: OR-set of AND-groups of comparators
//!
//! A range string is split on `||` into groups; within each group the
//! hyphen/tilde/caret/x-range/star shorthand is rewritten into plain
//! comparator chains before the individual comparators are parsed.

mod comparator;
mod operator;

pub use comparator::Comparator;
pub use operator::{InvalidOperatorError, Operator};

use std::fmt;

use regex::Captures;
use thiserror::Error;

use crate::grammar;
use crate::version::{Version, VersionError};

/// Error type for range parsing
#[derive(Error, Debug, Clone)]
pub enum RangeError {
    #[error("Invalid SemVer Range \"{0}\"")]
    InvalidRange(String),
    #[error("Invalid comparator \"{0}\"")]
    InvalidComparator(String),
    #[error("{0}")]
    InvalidVersion(String),
    #[error("{0}")]
    InvalidOperator(String),
}

impl From<VersionError> for RangeError {
    fn from(err: VersionError) -> Self {
        RangeError::InvalidVersion(err.to_string())
    }
}

impl From<InvalidOperatorError> for RangeError {
    fn from(err: InvalidOperatorError) -> Self {
        RangeError::InvalidOperator(err.to_string())
    }
}

/// Options recognized wherever a range is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RangeOptions {
    /// Make prerelease versions visible to ranges that do not themselves
    /// reference a prerelease at the same main version.
    pub include_prerelease: bool,
}

/// A set of AND-groups of comparators joined by `||`. A version matches
/// when every comparator of at least one group accepts it.
#[derive(Debug, Clone)]
pub struct Range {
    raw: String,
    set: Vec<Vec<Comparator>>,
    options: RangeOptions,
}

impl Range {
    /// Parse a range expression.
    pub fn new(range: &str, options: RangeOptions) -> Result<Range, RangeError> {
        let raw = range.to_string();

        let mut set = Vec::new();
        for group in grammar::OR_SEPARATOR.split(range.trim()) {
            let comparators = parse_group(group)?;
            if !comparators.is_empty() {
                set.push(comparators);
            }
        }

        if set.is_empty() {
            return Err(RangeError::InvalidRange(raw));
        }

        Ok(Range { raw, set, options })
    }

    /// The original range expression.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The normalized comparator groups.
    pub fn set(&self) -> &[Vec<Comparator>] {
        &self.set
    }

    pub fn options(&self) -> RangeOptions {
        self.options
    }

    /// Whether the version matches at least one group.
    pub fn test(&self, version: &Version) -> bool {
        self.set
            .iter()
            .any(|group| test_group(group, version, self.options))
    }

    /// Whether the two ranges share at least one version: some satisfiable
    /// group of each range must pairwise intersect.
    pub fn intersects(&self, other: &Range) -> bool {
        self.set.iter().any(|this_group| {
            is_satisfiable(this_group, self.options)
                && other.set.iter().any(|other_group| {
                    is_satisfiable(other_group, other.options)
                        && this_group.iter().all(|this_comparator| {
                            other_group.iter().all(|other_comparator| {
                                this_comparator.intersects(other_comparator, self.options)
                            })
                        })
                })
        })
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let groups: Vec<String> = self
            .set
            .iter()
            .map(|group| {
                group
                    .iter()
                    .map(|comparator| comparator.to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();
        write!(f, "{}", groups.join("||"))
    }
}

/// Every comparator must accept the version. A version carrying a
/// prerelease tag additionally requires some comparator of the group to
/// name a prerelease at the same major.minor.patch, unless
/// `include_prerelease` is set.
fn test_group(group: &[Comparator], version: &Version, options: RangeOptions) -> bool {
    for comparator in group {
        if !comparator.test(version) {
            return false;
        }
    }

    if !version.prerelease().is_empty() && !options.include_prerelease {
        for comparator in group {
            if let Comparator::Bound { version: bound, .. } = comparator {
                if !bound.prerelease().is_empty()
                    && bound.major() == version.major()
                    && bound.minor() == version.minor()
                    && bound.patch() == version.patch()
                {
                    return true;
                }
            }
        }
        return false;
    }

    true
}

/// A group is satisfiable when no two of its comparators contradict each
/// other. Folds right to left, re-checking the running comparator against
/// everything still unvisited.
fn is_satisfiable(group: &[Comparator], options: RangeOptions) -> bool {
    let mut remaining: Vec<&Comparator> = group.iter().collect();
    let mut test = match remaining.pop() {
        Some(comparator) => comparator,
        None => return true,
    };

    let mut result = true;
    while result && !remaining.is_empty() {
        result = remaining
            .iter()
            .all(|other| test.intersects(other, options));
        if let Some(next) = remaining.pop() {
            test = next;
        }
    }
    result
}

/// Rewrite one OR-group into plain comparators.
fn parse_group(group: &str) -> Result<Vec<Comparator>, RangeError> {
    let text = group.trim();

    // `A - B` becomes a pair of bounds.
    let text = replace_hyphens(text);
    // Collapse whitespace between operators and versions.
    let text = grammar::COMPARATOR_TRIM.replace_all(&text, "${1}${2}${3}");
    let text = grammar::TILDE_TRIM.replace_all(&text, "${1}~");
    let text = grammar::CARET_TRIM.replace_all(&text, "${1}^");

    // Expand shorthand token by token.
    let expanded = text
        .split_whitespace()
        .map(replace_shorthand)
        .collect::<Vec<_>>()
        .join(" ");

    let mut comparators = Vec::new();
    for token in expanded.split_whitespace() {
        comparators.push(Comparator::parse(token)?);
    }
    if comparators.is_empty() {
        // Everything was rewritten away, which is the unconstrained match.
        comparators.push(Comparator::Any);
    }
    Ok(comparators)
}

fn replace_shorthand(token: &str) -> String {
    let token = replace_carets(token);
    let token = replace_tildes(&token);
    let token = replace_xranges(&token);
    replace_stars(&token)
}

fn is_x(id: &str) -> bool {
    id.is_empty() || id.eq_ignore_ascii_case("x") || id == "*"
}

fn next(id: &str) -> u64 {
    id.parse::<u64>().unwrap_or(0) + 1
}

fn group_str<'t>(caps: &Captures<'t>, index: usize) -> &'t str {
    caps.get(index).map_or("", |m| m.as_str())
}

fn replace_carets(token: &str) -> String {
    token
        .split_whitespace()
        .map(replace_caret)
        .collect::<Vec<_>>()
        .join(" ")
}

/// `^` allows changes that do not modify the left-most non-zero field.
fn replace_caret(token: &str) -> String {
    let caps = match grammar::CARET.captures(token.trim()) {
        Some(caps) => caps,
        None => return token.to_string(),
    };

    let major = group_str(&caps, 1);
    let minor = group_str(&caps, 2);
    let patch = group_str(&caps, 3);
    let prerelease = caps.get(4).map(|m| m.as_str());

    if is_x(major) {
        String::new()
    } else if is_x(minor) {
        format!(">={}.0.0 <{}.0.0", major, next(major))
    } else if is_x(patch) {
        if major == "0" {
            format!(">={0}.{1}.0 <{0}.{2}.0", major, minor, next(minor))
        } else {
            format!(">={}.{}.0 <{}.0.0", major, minor, next(major))
        }
    } else if let Some(prerelease) = prerelease {
        if major == "0" {
            if minor == "0" {
                format!(
                    ">={0}.{1}.{2}-{3} <{0}.{1}.{4}",
                    major,
                    minor,
                    patch,
                    prerelease,
                    next(patch)
                )
            } else {
                format!(
                    ">={0}.{1}.{2}-{3} <{0}.{4}.0",
                    major,
                    minor,
                    patch,
                    prerelease,
                    next(minor)
                )
            }
        } else {
            format!(
                ">={}.{}.{}-{} <{}.0.0",
                major,
                minor,
                patch,
                prerelease,
                next(major)
            )
        }
    } else if major == "0" {
        if minor == "0" {
            format!(">={0}.{1}.{2} <{0}.{1}.{3}", major, minor, patch, next(patch))
        } else {
            format!(">={0}.{1}.{2} <{0}.{3}.0", major, minor, patch, next(minor))
        }
    } else {
        format!(">={}.{}.{} <{}.0.0", major, minor, patch, next(major))
    }
}

fn replace_tildes(token: &str) -> String {
    token
        .split_whitespace()
        .map(replace_tilde)
        .collect::<Vec<_>>()
        .join(" ")
}

/// `~` allows patch-level changes, or minor-level when no minor is given.
fn replace_tilde(token: &str) -> String {
    let caps = match grammar::TILDE.captures(token.trim()) {
        Some(caps) => caps,
        None => return token.to_string(),
    };

    let major = group_str(&caps, 1);
    let minor = group_str(&caps, 2);
    let patch = group_str(&caps, 3);
    let prerelease = caps.get(4).map(|m| m.as_str());

    if is_x(major) {
        String::new()
    } else if is_x(minor) {
        format!(">={}.0.0 <{}.0.0", major, next(major))
    } else if is_x(patch) {
        format!(">={0}.{1}.0 <{0}.{2}.0", major, minor, next(minor))
    } else if let Some(prerelease) = prerelease {
        format!(
            ">={0}.{1}.{2}-{3} <{0}.{4}.0",
            major,
            minor,
            patch,
            prerelease,
            next(minor)
        )
    } else {
        format!(">={0}.{1}.{2} <{0}.{3}.0", major, minor, patch, next(minor))
    }
}

fn replace_xranges(token: &str) -> String {
    token
        .split_whitespace()
        .map(replace_xrange)
        .collect::<Vec<_>>()
        .join(" ")
}

/// An `x`, `X` or `*` field widens the bound according to the operator
/// prefix; a wildcard major collapses to match-all or match-none.
fn replace_xrange(token: &str) -> String {
    let caps = match grammar::XRANGE.captures(token.trim()) {
        Some(caps) => caps,
        None => return token.to_string(),
    };

    let gtlt = group_str(&caps, 1);
    let major = group_str(&caps, 2);
    let minor = group_str(&caps, 3);
    let patch = group_str(&caps, 4);

    let x_major = is_x(major);
    let x_minor = x_major || is_x(minor);
    let x_patch = x_minor || is_x(patch);
    let any_x = x_patch;

    let gtlt = if gtlt == "=" && any_x { "" } else { gtlt };

    if x_major {
        if gtlt == ">" || gtlt == "<" {
            // Nothing is ever greater or less than every version.
            "<0.0.0".to_string()
        } else {
            "*".to_string()
        }
    } else if !gtlt.is_empty() && any_x {
        let mut major_n: u64 = major.parse().unwrap_or(0);
        let mut minor_n: u64 = if x_minor { 0 } else { minor.parse().unwrap_or(0) };
        let patch_n: u64 = 0;

        let operator = if gtlt == ">" {
            // `>1.2` means `>=1.3.0`
            if x_minor {
                major_n += 1;
                minor_n = 0;
            } else {
                minor_n += 1;
            }
            ">="
        } else if gtlt == "<=" {
            // `<=1.2` means `<1.3.0`
            if x_minor {
                major_n += 1;
            } else {
                minor_n += 1;
            }
            "<"
        } else {
            gtlt
        };

        format!("{}{}.{}.{}", operator, major_n, minor_n, patch_n)
    } else if x_minor {
        format!(">={}.0.0 <{}.0.0", major, next(major))
    } else if x_patch {
        format!(">={0}.{1}.0 <{0}.{2}.0", major, minor, next(minor))
    } else {
        token.to_string()
    }
}

fn replace_stars(token: &str) -> String {
    grammar::STAR.replace(token.trim(), "").into_owned()
}

/// `A - B` expands to inclusive bounds, widening any partial side: a
/// partial lower bound fills with zeros, a partial upper bound becomes
/// the next higher exclusive bound.
fn replace_hyphens(text: &str) -> String {
    grammar::HYPHEN_RANGE
        .replace(text, |caps: &Captures| {
            let from_full = group_str(caps, 1);
            let from_major = group_str(caps, 2);
            let from_minor = group_str(caps, 3);
            let from_patch = group_str(caps, 4);
            let to_full = group_str(caps, 7);
            let to_major = group_str(caps, 8);
            let to_minor = group_str(caps, 9);
            let to_patch = group_str(caps, 10);
            let to_prerelease = caps.get(11).map(|m| m.as_str());

            let from = if is_x(from_major) {
                String::new()
            } else if is_x(from_minor) {
                format!(">={}.0.0", from_major)
            } else if is_x(from_patch) {
                format!(">={}.{}.0", from_major, from_minor)
            } else {
                format!(">={}", from_full)
            };

            let to = if is_x(to_major) {
                String::new()
            } else if is_x(to_minor) {
                format!("<{}.0.0", next(to_major))
            } else if is_x(to_patch) {
                format!("<{}.{}.0", to_major, next(to_minor))
            } else if let Some(to_prerelease) = to_prerelease {
                format!("<={}.{}.{}-{}", to_major, to_minor, to_patch, to_prerelease)
            } else {
                format!("<={}", to_full)
            };

            format!("{} {}", from, to).trim().to_string()
        })
        .into_owned()
}

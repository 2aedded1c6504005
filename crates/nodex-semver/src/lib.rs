//! Semantic versioning library compatible with node-semver
//!
//! This crate provides semantic version parsing, comparison and range
//! matching for `MAJOR.MINOR.PATCH[-PRERELEASE][+BUILD]` version strings,
//! including the tilde/caret/x-range/hyphen shorthand range syntax.

pub mod range;
mod grammar;
mod semver;
mod version;

pub use range::{Comparator, InvalidOperatorError, Operator, Range, RangeError, RangeOptions};
pub use semver::{Semver, SemverError};
pub use version::{Identifier, ReleaseType, Version, VersionError};

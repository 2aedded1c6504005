//! Version value object: parsing, precedence comparison and increments

use std::cmp::Ordering;
use std::fmt;

use thiserror::Error;

use crate::grammar::{FULL, MAX_LENGTH, MAX_SAFE_INTEGER};

/// Error type for version parsing and increments
#[derive(Error, Debug, Clone)]
pub enum VersionError {
    #[error("Invalid version string \"{0}\"")]
    InvalidVersion(String),
    #[error("Version string is longer than {0} characters")]
    TooLong(usize),
    #[error("Invalid {0} version")]
    FieldOverflow(&'static str),
    #[error("Invalid release type \"{0}\"")]
    InvalidReleaseType(String),
}

/// One dot-separated prerelease identifier.
///
/// Identifiers consisting only of digits compare numerically and always
/// sort before alphanumeric ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    Numeric(u64),
    AlphaNumeric(String),
}

impl Identifier {
    /// Classify one identifier. Digit runs too large for a safe integer
    /// stay alphanumeric rather than failing.
    fn parse(part: &str) -> Identifier {
        if part.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(value) = part.parse::<u64>() {
                if value < MAX_SAFE_INTEGER {
                    return Identifier::Numeric(value);
                }
            }
        }
        Identifier::AlphaNumeric(part.to_string())
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Numeric(value) => write!(f, "{}", value),
            Identifier::AlphaNumeric(text) => write!(f, "{}", text),
        }
    }
}

/// Compare two prerelease identifiers: numerics numerically, strings by
/// ASCII order, and a numeric identifier before any alphanumeric one.
pub(crate) fn compare_identifiers(a: &Identifier, b: &Identifier) -> Ordering {
    match (a, b) {
        (Identifier::Numeric(a), Identifier::Numeric(b)) => a.cmp(b),
        (Identifier::Numeric(_), Identifier::AlphaNumeric(_)) => Ordering::Less,
        (Identifier::AlphaNumeric(_), Identifier::Numeric(_)) => Ordering::Greater,
        (Identifier::AlphaNumeric(a), Identifier::AlphaNumeric(b)) => a.cmp(b),
    }
}

/// Same rules applied to raw identifier text, used for build metadata.
pub(crate) fn compare_identifier_strs(a: &str, b: &str) -> Ordering {
    let a_num = if a.bytes().all(|b| b.is_ascii_digit()) {
        a.parse::<u64>().ok()
    } else {
        None
    };
    let b_num = if b.bytes().all(|b| b.is_ascii_digit()) {
        b.parse::<u64>().ok()
    } else {
        None
    };

    match (a_num, b_num) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// The kind of increment applied by [`Version::inc`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseType {
    Major,
    Premajor,
    Minor,
    Preminor,
    Patch,
    Prepatch,
    Prerelease,
    Pre,
}

impl ReleaseType {
    /// Parse a release type name.
    pub fn from_str(s: &str) -> Result<Self, VersionError> {
        match s {
            "major" => Ok(ReleaseType::Major),
            "premajor" => Ok(ReleaseType::Premajor),
            "minor" => Ok(ReleaseType::Minor),
            "preminor" => Ok(ReleaseType::Preminor),
            "patch" => Ok(ReleaseType::Patch),
            "prepatch" => Ok(ReleaseType::Prepatch),
            "prerelease" => Ok(ReleaseType::Prerelease),
            "pre" => Ok(ReleaseType::Pre),
            _ => Err(VersionError::InvalidReleaseType(s.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseType::Major => "major",
            ReleaseType::Premajor => "premajor",
            ReleaseType::Minor => "minor",
            ReleaseType::Preminor => "preminor",
            ReleaseType::Patch => "patch",
            ReleaseType::Prepatch => "prepatch",
            ReleaseType::Prerelease => "prerelease",
            ReleaseType::Pre => "pre",
        }
    }
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One concrete semantic version.
///
/// Build metadata is carried for display but never participates in
/// comparison or equality.
#[derive(Debug, Clone)]
pub struct Version {
    major: u64,
    minor: u64,
    patch: u64,
    prerelease: Vec<Identifier>,
    build: Vec<String>,
    raw: String,
    version: String,
}

impl Version {
    /// Parse a version string, failing with a descriptive error.
    pub fn new(input: &str) -> Result<Self, VersionError> {
        if input.len() > MAX_LENGTH {
            return Err(VersionError::TooLong(MAX_LENGTH));
        }

        let caps = FULL
            .captures(input.trim())
            .ok_or_else(|| VersionError::InvalidVersion(input.to_string()))?;

        let major = parse_main_field(caps.get(1).unwrap().as_str(), "major")?;
        let minor = parse_main_field(caps.get(2).unwrap().as_str(), "minor")?;
        let patch = parse_main_field(caps.get(3).unwrap().as_str(), "patch")?;

        let prerelease = match caps.get(4) {
            Some(m) => m.as_str().split('.').map(Identifier::parse).collect(),
            None => Vec::new(),
        };
        let build = match caps.get(5) {
            Some(m) => m.as_str().split('.').map(str::to_string).collect(),
            None => Vec::new(),
        };

        let mut version = Version {
            major,
            minor,
            patch,
            prerelease,
            build,
            raw: input.to_string(),
            version: String::new(),
        };
        version.version = version.format();
        Ok(version)
    }

    /// Non-failing parse: `None` for anything that is not a valid version.
    pub fn parse(input: &str) -> Option<Version> {
        if input.len() > MAX_LENGTH || !FULL.is_match(input.trim()) {
            return None;
        }
        Version::new(input).ok()
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    pub fn patch(&self) -> u64 {
        self.patch
    }

    pub fn prerelease(&self) -> &[Identifier] {
        &self.prerelease
    }

    pub fn build(&self) -> &[String] {
        &self.build
    }

    /// The original input string.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The canonical form, excluding build metadata.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Recompute the canonical `major.minor.patch[-prerelease]` form.
    pub fn format(&self) -> String {
        let mut out = format!("{}.{}.{}", self.major, self.minor, self.patch);
        if !self.prerelease.is_empty() {
            out.push('-');
            for (i, id) in self.prerelease.iter().enumerate() {
                if i > 0 {
                    out.push('.');
                }
                out.push_str(&id.to_string());
            }
        }
        out
    }

    /// Total precedence order: main fields first, then prerelease.
    /// Build metadata is never consulted.
    pub fn compare(&self, other: &Version) -> Ordering {
        self.compare_main(other)
            .then_with(|| self.compare_pre(other))
    }

    fn compare_main(&self, other: &Version) -> Ordering {
        self.major
            .cmp(&other.major)
            .then_with(|| self.minor.cmp(&other.minor))
            .then_with(|| self.patch.cmp(&other.patch))
    }

    fn compare_pre(&self, other: &Version) -> Ordering {
        // A version with a prerelease sorts before the same version without.
        match (self.prerelease.is_empty(), other.prerelease.is_empty()) {
            (true, true) => return Ordering::Equal,
            (false, true) => return Ordering::Less,
            (true, false) => return Ordering::Greater,
            (false, false) => {}
        }

        let mut i = 0;
        loop {
            match (self.prerelease.get(i), other.prerelease.get(i)) {
                (None, None) => return Ordering::Equal,
                (Some(_), None) => return Ordering::Greater,
                (None, Some(_)) => return Ordering::Less,
                (Some(a), Some(b)) => {
                    let ordering = compare_identifiers(a, b);
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
            }
            i += 1;
        }
    }

    /// Like [`Version::compare`] but with build metadata as the final
    /// tie-break, the only place it affects ordering.
    pub fn compare_build(&self, other: &Version) -> Ordering {
        let ordering = self.compare(other);
        if ordering != Ordering::Equal {
            return ordering;
        }

        let mut i = 0;
        loop {
            match (self.build.get(i), other.build.get(i)) {
                (None, None) => return Ordering::Equal,
                (Some(_), None) => return Ordering::Greater,
                (None, Some(_)) => return Ordering::Less,
                (Some(a), Some(b)) => {
                    let ordering = compare_identifier_strs(a, b);
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
            }
            i += 1;
        }
    }

    /// Increment in place and return `self` for chaining. The canonical
    /// string and `raw` are recomputed afterwards.
    pub fn inc(&mut self, release: ReleaseType, identifier: Option<&str>) -> &mut Self {
        self.apply(release, identifier);
        self.version = self.format();
        self.raw = self.version.clone();
        self
    }

    fn apply(&mut self, release: ReleaseType, identifier: Option<&str>) {
        match release {
            ReleaseType::Premajor => {
                self.prerelease.clear();
                self.patch = 0;
                self.minor = 0;
                self.major += 1;
                self.apply(ReleaseType::Pre, identifier);
            }
            ReleaseType::Preminor => {
                self.prerelease.clear();
                self.patch = 0;
                self.minor += 1;
                self.apply(ReleaseType::Pre, identifier);
            }
            ReleaseType::Prepatch => {
                // Unlike a plain patch bump, an existing prerelease tag is
                // discarded first so the patch field always moves.
                self.prerelease.clear();
                self.apply(ReleaseType::Patch, identifier);
                self.apply(ReleaseType::Pre, identifier);
            }
            ReleaseType::Prerelease => {
                if self.prerelease.is_empty() {
                    self.apply(ReleaseType::Patch, identifier);
                }
                self.apply(ReleaseType::Pre, identifier);
            }
            ReleaseType::Major => {
                // A pre-major version promotes to its own release instead
                // of skipping ahead.
                if self.minor != 0 || self.patch != 0 || self.prerelease.is_empty() {
                    self.major += 1;
                }
                self.minor = 0;
                self.patch = 0;
                self.prerelease.clear();
            }
            ReleaseType::Minor => {
                if self.patch != 0 || self.prerelease.is_empty() {
                    self.minor += 1;
                }
                self.patch = 0;
                self.prerelease.clear();
            }
            ReleaseType::Patch => {
                if self.prerelease.is_empty() {
                    self.patch += 1;
                }
                self.prerelease.clear();
            }
            ReleaseType::Pre => {
                if self.prerelease.is_empty() {
                    self.prerelease.push(Identifier::Numeric(0));
                } else {
                    // Bump the right-most numeric identifier, or append one.
                    let mut bumped = false;
                    for id in self.prerelease.iter_mut().rev() {
                        if let Identifier::Numeric(value) = id {
                            *value += 1;
                            bumped = true;
                            break;
                        }
                    }
                    if !bumped {
                        self.prerelease.push(Identifier::Numeric(0));
                    }
                }

                if let Some(name) = identifier {
                    let first_matches = self
                        .prerelease
                        .first()
                        .map_or(false, |id| id.to_string() == name);
                    let second_numeric =
                        matches!(self.prerelease.get(1), Some(Identifier::Numeric(_)));
                    if !first_matches || !second_numeric {
                        self.prerelease =
                            vec![Identifier::parse(name), Identifier::Numeric(0)];
                    }
                }
            }
        }
    }
}

fn parse_main_field(text: &str, field: &'static str) -> Result<u64, VersionError> {
    text.parse::<u64>()
        .ok()
        .filter(|value| *value <= MAX_SAFE_INTEGER)
        .ok_or(VersionError::FieldOverflow(field))
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.compare(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::new(s).unwrap()
    }

    #[test]
    fn test_parse_valid_versions() {
        let version = v("1.2.3");
        assert_eq!(version.major(), 1);
        assert_eq!(version.minor(), 2);
        assert_eq!(version.patch(), 3);
        assert!(version.prerelease().is_empty());
        assert!(version.build().is_empty());
        assert_eq!(version.version(), "1.2.3");
        assert_eq!(version.raw(), "1.2.3");

        assert_eq!(v("v1.2.3").version(), "1.2.3");
        assert_eq!(v(" 1.2.3 ").version(), "1.2.3");
        assert_eq!(v("1.2.3-alpha.1").version(), "1.2.3-alpha.1");
        assert_eq!(v("1.2.3+build.5").version(), "1.2.3");
        assert_eq!(v("1.2.3-rc.1+build.5").version(), "1.2.3-rc.1");
    }

    #[test]
    fn test_parse_prerelease_identifiers() {
        let version = v("1.2.3-alpha.7.x-y");
        assert_eq!(
            version.prerelease(),
            &[
                Identifier::AlphaNumeric("alpha".to_string()),
                Identifier::Numeric(7),
                Identifier::AlphaNumeric("x-y".to_string()),
            ]
        );

        let version = v("1.2.3+build.05");
        assert_eq!(version.build(), &["build".to_string(), "05".to_string()]);
    }

    #[test]
    fn test_parse_rejects_malformed_versions() {
        for bad in [
            "",
            "1",
            "1.2",
            "1.2.3.4",
            "01.2.3",
            "1.02.3",
            "1.2.03",
            "1.2.3-",
            "1.2.3-00",
            "a.b.c",
            "not-a-version",
            "=1.2.3",
        ] {
            assert!(Version::parse(bad).is_none(), "accepted {:?}", bad);
            assert!(Version::new(bad).is_err(), "constructed {:?}", bad);
        }
    }

    #[test]
    fn test_parse_never_panics_on_garbage() {
        assert!(Version::parse("v\u{0}1.2.3").is_none());
        assert!(Version::parse("1.2.3 4.5.6").is_none());
    }

    #[test]
    fn test_length_guard() {
        let long = format!("v{}", "1".repeat(300));
        assert!(Version::parse(&long).is_none());
        assert!(matches!(Version::new(&long), Err(VersionError::TooLong(_))));
    }

    #[test]
    fn test_field_overflow() {
        // Larger than 2^53 - 1
        assert!(matches!(
            Version::new("9007199254740992.0.0"),
            Err(VersionError::FieldOverflow("major"))
        ));
        assert!(Version::parse("1.9007199254740992.0").is_none());
    }

    #[test]
    fn test_round_trip() {
        for s in ["1.2.3", "v1.2.3", "1.2.3-alpha.1", "1.2.3-rc.1+build.5"] {
            let canonical = v(s).version().to_string();
            assert_eq!(v(&canonical).version(), canonical);
        }
    }

    // Ordered pairs: the left side is strictly greater than the right.
    const COMPARISONS: &[(&str, &str)] = &[
        ("0.0.0", "0.0.0-foo"),
        ("0.0.1", "0.0.0"),
        ("1.0.0", "0.9.9"),
        ("0.10.0", "0.9.0"),
        ("0.99.0", "0.10.0"),
        ("2.0.0", "1.2.3"),
        ("1.2.3", "1.2.3-asdf"),
        ("1.2.3", "1.2.3-4"),
        ("1.2.3", "1.2.3-4-foo"),
        ("1.2.3-5-foo", "1.2.3-5"),
        ("1.2.3-5", "1.2.3-4"),
        ("1.2.3-5-foo", "1.2.3-5-Foo"),
        ("3.0.0", "2.7.2+asdf"),
        ("1.2.3-a.10", "1.2.3-a.5"),
        ("1.2.3-a.b", "1.2.3-a.5"),
        ("1.2.3-a.b", "1.2.3-a"),
        ("1.2.3-a.b.c.10.d.5", "1.2.3-a.b.c.5.d.100"),
        ("1.2.3-r2", "1.2.3-r100"),
        ("1.2.3-r100", "1.2.3-R2"),
    ];

    #[test]
    fn test_compare_ordered_pairs() {
        for (bigger, smaller) in COMPARISONS {
            let a = v(bigger);
            let b = v(smaller);
            assert_eq!(a.compare(&b), Ordering::Greater, "{} > {}", bigger, smaller);
            assert_eq!(b.compare(&a), Ordering::Less, "{} < {}", smaller, bigger);
            assert_eq!(a.compare(&a), Ordering::Equal, "{} == {}", bigger, bigger);
        }
    }

    #[test]
    fn test_compare_antisymmetry_and_transitivity() {
        let a = v("1.0.0-alpha");
        let b = v("1.0.0-alpha.1");
        let c = v("1.0.0-beta");
        assert_eq!(a.compare(&b), b.compare(&a).reverse());
        assert_eq!(a.compare(&b), Ordering::Less);
        assert_eq!(b.compare(&c), Ordering::Less);
        assert_eq!(a.compare(&c), Ordering::Less);
    }

    #[test]
    fn test_prerelease_identifier_ordering() {
        assert!(v("1.0.0-alpha") < v("1.0.0-alpha.1"));
        assert!(v("1.0.0-alpha.1") < v("1.0.0-alpha.beta"));
        assert!(v("1.0.0-alpha.beta") < v("1.0.0-beta"));
        assert!(v("1.0.0-beta") < v("1.0.0-beta.2"));
        assert!(v("1.0.0-beta.2") < v("1.0.0-beta.11"));
        assert!(v("1.0.0-beta.11") < v("1.0.0-rc.1"));
        assert!(v("1.0.0-rc.1") < v("1.0.0"));
        assert!(v("1.0.0-1") < v("1.0.0-2"));
    }

    #[test]
    fn test_build_metadata_ignored_by_compare() {
        assert_eq!(v("1.0.0+a").compare(&v("1.0.0+b")), Ordering::Equal);
        assert_eq!(v("1.0.0+build"), v("1.0.0"));
    }

    #[test]
    fn test_compare_build() {
        assert_eq!(v("1.0.0+a").compare_build(&v("1.0.0+b")), Ordering::Less);
        assert_eq!(v("1.0.0").compare_build(&v("1.0.0+a")), Ordering::Less);
        assert_eq!(v("1.0.0+a.2").compare_build(&v("1.0.0+a.10")), Ordering::Less);
        assert_eq!(v("1.0.0+a").compare_build(&v("1.0.0+a")), Ordering::Equal);
        // Main fields still dominate.
        assert_eq!(v("1.0.1+a").compare_build(&v("1.0.0+b")), Ordering::Greater);
    }

    // (input, release, identifier, expected)
    const INCREMENTS: &[(&str, ReleaseType, Option<&str>, &str)] = &[
        ("1.2.3", ReleaseType::Major, None, "2.0.0"),
        ("1.2.3", ReleaseType::Minor, None, "1.3.0"),
        ("1.2.3", ReleaseType::Patch, None, "1.2.4"),
        ("1.2.3-tag", ReleaseType::Major, None, "2.0.0"),
        ("1.2.3-4", ReleaseType::Major, None, "2.0.0"),
        ("1.2.3-4", ReleaseType::Minor, None, "1.3.0"),
        ("1.2.3-4", ReleaseType::Patch, None, "1.2.3"),
        ("1.2.0-0", ReleaseType::Patch, None, "1.2.0"),
        ("1.0.0-5", ReleaseType::Major, None, "1.0.0"),
        ("1.0.0-1", ReleaseType::Minor, None, "1.0.0"),
        ("1.2.4", ReleaseType::Prerelease, None, "1.2.5-0"),
        ("1.2.3-0", ReleaseType::Prerelease, None, "1.2.3-1"),
        ("1.2.3-alpha.0", ReleaseType::Prerelease, None, "1.2.3-alpha.1"),
        ("1.2.3-alpha.0.beta", ReleaseType::Prerelease, None, "1.2.3-alpha.1.beta"),
        ("1.2.3-alpha", ReleaseType::Prerelease, None, "1.2.3-alpha.0"),
        ("1.2.3", ReleaseType::Premajor, None, "2.0.0-0"),
        ("1.2.3", ReleaseType::Preminor, None, "1.3.0-0"),
        ("1.2.3", ReleaseType::Prepatch, None, "1.2.4-0"),
        ("1.2.3-4", ReleaseType::Prepatch, None, "1.2.4-0"),
        ("1.2.3", ReleaseType::Pre, None, "1.2.3-0"),
        ("1.2.3-0", ReleaseType::Pre, None, "1.2.3-1"),
        ("1.2.3", ReleaseType::Prerelease, Some("dev"), "1.2.4-dev.0"),
        ("1.2.3-alpha.0", ReleaseType::Prerelease, Some("alpha"), "1.2.3-alpha.1"),
        ("1.2.3-alpha.0", ReleaseType::Prerelease, Some("beta"), "1.2.3-beta.0"),
        ("1.2.3-alpha", ReleaseType::Prerelease, Some("alpha"), "1.2.3-alpha.0"),
        ("1.2.3", ReleaseType::Premajor, Some("dev"), "2.0.0-dev.0"),
    ];

    #[test]
    fn test_inc() {
        for (input, release, identifier, expected) in INCREMENTS {
            let mut version = v(input);
            version.inc(*release, *identifier);
            assert_eq!(
                version.version(),
                *expected,
                "inc({}, {}, {:?})",
                input,
                release,
                identifier
            );
            assert_eq!(version.raw(), *expected);
        }
    }

    #[test]
    fn test_inc_recomputes_canonical_form() {
        let mut version = v("v1.2.3+build.9");
        version.inc(ReleaseType::Patch, None);
        assert_eq!(version.version(), "1.2.4");
        assert_eq!(version.to_string(), "1.2.4");
    }

    #[test]
    fn test_release_type_from_str() {
        assert_eq!(ReleaseType::from_str("major").unwrap(), ReleaseType::Major);
        assert_eq!(ReleaseType::from_str("pre").unwrap(), ReleaseType::Pre);
        assert!(matches!(
            ReleaseType::from_str("bogus"),
            Err(VersionError::InvalidReleaseType(_))
        ));
    }
}

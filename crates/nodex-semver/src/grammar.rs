//! Regular-expression grammar for version strings and range tokens
//!
//! The larger patterns are composed from small fragments by string
//! concatenation and compiled exactly once. (Note: Rust regex has no
//! possessive quantifiers, the plain greedy forms are equivalent here.)

use lazy_static::lazy_static;
use regex::Regex;

/// Longest accepted input. Anything longer is rejected before matching.
pub const MAX_LENGTH: usize = 256;

/// Largest value a numeric version field may carry (2^53 - 1).
pub const MAX_SAFE_INTEGER: u64 = 9_007_199_254_740_991;

lazy_static! {
    /// A numeric identifier: zero, or digits without a leading zero.
    static ref NUMERIC_IDENTIFIER: &'static str = r"0|[1-9]\d*";

    /// An identifier carrying at least one letter or hyphen.
    static ref NON_NUMERIC_IDENTIFIER: &'static str = r"\d*[a-zA-Z-][a-zA-Z0-9-]*";

    /// MAJOR.MINOR.PATCH, each field captured.
    static ref MAIN_VERSION: String = format!(r"({0})\.({0})\.({0})", *NUMERIC_IDENTIFIER);

    static ref PRERELEASE_IDENTIFIER: String = format!(
        r"(?:{}|{})",
        *NUMERIC_IDENTIFIER, *NON_NUMERIC_IDENTIFIER
    );

    /// A hyphen followed by dot-separated identifiers, captured as one group.
    static ref PRERELEASE: String = format!(r"(?:-({0}(?:\.{0})*))", *PRERELEASE_IDENTIFIER);

    static ref BUILD_IDENTIFIER: &'static str = r"[0-9A-Za-z-]+";

    /// A plus sign followed by dot-separated identifiers, captured as one group.
    static ref BUILD: String = format!(r"(?:\+({0}(?:\.{0})*))", *BUILD_IDENTIFIER);

    static ref FULL_PLAIN: String = format!(r"v?{}{}?{}?", *MAIN_VERSION, *PRERELEASE, *BUILD);

    /// A complete version string, anchored. Groups: 1-3 main fields,
    /// 4 prerelease, 5 build.
    pub static ref FULL: Regex = Regex::new(&format!(r"^{}$", *FULL_PLAIN)).unwrap();

    /// Comparator operator token: `<`, `>`, `<=`, `>=`, `=` or nothing.
    static ref GTLT: &'static str = r"((?:<|>)?=?)";

    /// A main-version field that may also be a wildcard.
    static ref XRANGE_IDENTIFIER: String = format!(r"{}|x|X|\*", *NUMERIC_IDENTIFIER);

    static ref XRANGE_PLAIN: String = format!(
        r"[v=\s]*({0})(?:\.({0})(?:\.({0})(?:{1})?{2}?)?)?",
        *XRANGE_IDENTIFIER, *PRERELEASE, *BUILD
    );

    /// Operator plus x-range version. Groups: 1 operator, 2-4 fields,
    /// 5 prerelease, 6 build.
    pub static ref XRANGE: Regex =
        Regex::new(&format!(r"^{}\s*{}$", *GTLT, *XRANGE_PLAIN)).unwrap();

    /// Tilde range, tolerating the `~>` spelling. Groups as x-range plain.
    pub static ref TILDE: Regex = Regex::new(&format!(r"^(?:~>?){}$", *XRANGE_PLAIN)).unwrap();

    /// Caret range. Groups as x-range plain.
    pub static ref CARET: Regex = Regex::new(&format!(r"^\^{}$", *XRANGE_PLAIN)).unwrap();

    /// Collapses whitespace between a tilde and its version.
    pub static ref TILDE_TRIM: Regex = Regex::new(r"(\s*)(?:~>?)\s+").unwrap();

    /// Collapses whitespace between a caret and its version.
    pub static ref CARET_TRIM: Regex = Regex::new(r"(\s*)\^\s+").unwrap();

    /// A single comparator: group 1 operator, group 2 version. Also
    /// matches the empty string, which stands for "any version".
    pub static ref COMPARATOR: Regex =
        Regex::new(&format!(r"^{}\s*({})$|^$", *GTLT, *FULL_PLAIN)).unwrap();

    /// Collapses whitespace between an operator and its version.
    pub static ref COMPARATOR_TRIM: Regex = Regex::new(&format!(
        r"(\s*){}\s*({}|{})",
        *GTLT, *FULL_PLAIN, *XRANGE_PLAIN
    ))
    .unwrap();

    /// `A - B`. Group 1 is the whole lower half (fields in 2-6), group 7
    /// the whole upper half (fields in 8-12).
    pub static ref HYPHEN_RANGE: Regex =
        Regex::new(&format!(r"^\s*({0})\s+-\s+({0})\s*$", *XRANGE_PLAIN)).unwrap();

    /// A star token with an optional operator prefix.
    pub static ref STAR: Regex = Regex::new(r"(<|>)?=?\s*\*").unwrap();

    /// Separator between the OR-groups of a range.
    pub static ref OR_SEPARATOR: Regex = Regex::new(r"\s*\|\|\s*").unwrap();
}

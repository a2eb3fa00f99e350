//! Timestamp extraction from record file paths.
//!
//! A [`TimestampPattern`] is a regular expression with exactly six capture groups,
//! in the order year, month, day, hour, minute, second. Any group may be optional;
//! absent groups become [`ABSENT_TOKEN`] before the tokens are assembled into the
//! fixed `YYYY-MM-DD_hh-mm-ss` form and parsed into a naive timestamp.
//!
//! # Example
//!
//! ```
//! use daystamp_rust::parsing::filepath::default_pattern;
//!
//! let dt = default_pattern().parse("img_2023-06-21_12-30-45_extra.jpg").unwrap();
//! assert_eq!(dt.to_string(), "2023-06-21 12:30:45");
//! ```

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{AnnotationError, AnnotationResult};

/// Default filepath pattern.
///
/// Matches a year-month-day token (optionally hyphen separated), an underscore, and an
/// optional hour-minute-second token (optionally hyphen separated), anywhere in the path.
pub const DEFAULT_PATTERN: &str =
    r".*([0-9]{4})-?([0-9]{2})-?([0-9]{2})_([0-9]{2})?-?([0-9]{2})?-?([0-9]{2})?.*?";

/// Token substituted for every capture group absent from a match.
pub const ABSENT_TOKEN: &str = "00";

/// Fixed format the six tokens are assembled into before parsing.
pub const ASSEMBLED_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

const TOKEN_GROUPS: usize = 6;

static DEFAULT: Lazy<TimestampPattern> = Lazy::new(|| TimestampPattern {
    regex: Regex::new(DEFAULT_PATTERN).unwrap_or_else(|e| panic!("default pattern: {e}")),
});

/// The compiled default pattern.
pub fn default_pattern() -> &'static TimestampPattern {
    &DEFAULT
}

/// Raw capture groups of a pattern match, one optional token per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTimestampTokens {
    pub year: Option<String>,
    pub month: Option<String>,
    pub day: Option<String>,
    pub hour: Option<String>,
    pub minute: Option<String>,
    pub second: Option<String>,
}

impl RawTimestampTokens {
    /// Tokens in field order with absent groups replaced by [`ABSENT_TOKEN`].
    pub fn normalized(&self) -> [&str; TOKEN_GROUPS] {
        [
            &self.year,
            &self.month,
            &self.day,
            &self.hour,
            &self.minute,
            &self.second,
        ]
        .map(|token| token.as_deref().unwrap_or(ABSENT_TOKEN))
    }

    /// Assemble the normalized tokens into `YYYY-MM-DD_hh-mm-ss`.
    pub fn assemble(&self) -> String {
        let [year, month, day, hour, minute, second] = self.normalized();
        format!("{year}-{month}-{day}_{hour}-{minute}-{second}")
    }

    /// Parse the assembled string into a naive timestamp.
    pub fn to_naive(&self) -> AnnotationResult<NaiveDateTime> {
        let value = self.assemble();
        NaiveDateTime::parse_from_str(&value, ASSEMBLED_FORMAT)
            .map_err(|source| AnnotationError::InvalidTimestamp { value, source })
    }

    /// Number of capture groups that were absent from the match.
    pub fn absent_count(&self) -> usize {
        [
            &self.year,
            &self.month,
            &self.day,
            &self.hour,
            &self.minute,
            &self.second,
        ]
        .iter()
        .filter(|token| token.is_none())
        .count()
    }
}

/// A validated filepath timestamp pattern.
#[derive(Debug, Clone)]
pub struct TimestampPattern {
    regex: Regex,
}

impl TimestampPattern {
    /// Compile a pattern, requiring exactly six capture groups.
    ///
    /// # Errors
    /// Returns [`AnnotationError::InvalidConfiguration`] if the regex does not compile or
    /// declares a different number of groups.
    pub fn new(pattern: &str) -> AnnotationResult<Self> {
        let regex = Regex::new(pattern).map_err(|e| {
            AnnotationError::invalid_configuration(format!("invalid pattern '{pattern}': {e}"))
        })?;

        // captures_len counts the implicit whole-match group
        let groups = regex.captures_len() - 1;
        if groups != TOKEN_GROUPS {
            return Err(AnnotationError::invalid_configuration(format!(
                "pattern '{pattern}' has {groups} capture groups, expected {TOKEN_GROUPS} \
                 (year, month, day, hour, minute, second)"
            )));
        }

        Ok(Self { regex })
    }

    /// The pattern source text.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Extract the raw tokens from `path`.
    ///
    /// # Errors
    /// [`AnnotationError::PatternMismatch`] if the pattern does not match anywhere in `path`.
    pub fn tokens(&self, path: &str) -> AnnotationResult<RawTimestampTokens> {
        let captures =
            self.regex
                .captures(path)
                .ok_or_else(|| AnnotationError::PatternMismatch {
                    path: path.to_string(),
                    pattern: self.as_str().to_string(),
                })?;

        let group = |i: usize| captures.get(i).map(|m| m.as_str().to_string());

        Ok(RawTimestampTokens {
            year: group(1),
            month: group(2),
            day: group(3),
            hour: group(4),
            minute: group(5),
            second: group(6),
        })
    }

    /// Extract and parse a naive timestamp from `path`.
    pub fn parse(&self, path: &str) -> AnnotationResult<NaiveDateTime> {
        self.tokens(path)?.to_naive()
    }
}

impl Default for TimestampPattern {
    fn default() -> Self {
        default_pattern().clone()
    }
}

//! Parsers for timestamps embedded in record file paths.
//!
//! # Parsers
//!
//! - [`filepath`]: Extract year/month/day/hour/minute/second tokens with a six-group pattern
//!
//! # Example
//!
//! ```
//! use daystamp_rust::parsing::TimestampPattern;
//!
//! let pattern = TimestampPattern::new(r"(\d{4})(\d{2})(\d{2})-(\d{2})?(\d{2})?(\d{2})?")
//!     .expect("valid pattern");
//! let dt = pattern.parse("DSC_20240102-0830.jpg").expect("parsable path");
//! assert_eq!(dt.to_string(), "2024-01-02 08:30:00");
//! ```

pub mod filepath;


pub use filepath::{
    default_pattern, RawTimestampTokens, TimestampPattern, ABSENT_TOKEN, DEFAULT_PATTERN,
};

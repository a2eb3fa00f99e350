//! Error types for timestamp extraction and batch annotation.
//!
//! Configuration errors are raised before any record is touched, so callers can
//! rely on "no writes happened" whenever [`AnnotationError::is_configuration`]
//! returns `true`. Data errors carry the offending record's effective path.

use chrono::NaiveDate;

use crate::collection::CollectionError;

/// Result type for annotation operations
pub type AnnotationResult<T> = Result<T, AnnotationError>;

/// Error type for annotation operations
#[derive(Debug, thiserror::Error)]
pub enum AnnotationError {
    /// Unsupported parameter combination, malformed pattern, unknown timezone, etc.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The filepath pattern did not match the path at all.
    #[error("Pattern mismatch: '{pattern}' does not match path '{path}'")]
    PatternMismatch { path: String, pattern: String },

    /// The assembled `YYYY-MM-DD_hh-mm-ss` string is not a calendar instant.
    #[error("Invalid timestamp '{value}': {source}")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// The solar ephemeris could not produce sunrise/sunset for the date.
    #[error("Ephemeris error on {date} at ({latitude}, {longitude}): {reason}")]
    Ephemeris {
        date: NaiveDate,
        latitude: f64,
        longitude: f64,
        reason: String,
    },

    /// Failure reported by the record collection collaborator.
    #[error(transparent)]
    Collection(#[from] CollectionError),

    /// A data error raised while processing a single record.
    #[error("Record {index} ({path}): {source}")]
    Record {
        index: usize,
        path: String,
        #[source]
        source: Box<AnnotationError>,
    },

    /// The host progress hook stopped the batch.
    #[error("Annotation cancelled after {processed} records")]
    Cancelled { processed: usize },

    /// Configuration file could not be read or parsed.
    #[error("Configuration file error: {0}")]
    Config(String),
}

impl AnnotationError {
    /// Create an invalid configuration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }

    /// Wrap a per-record error with the record position and effective path.
    pub fn for_record(self, index: usize, path: impl Into<String>) -> Self {
        Self::Record {
            index,
            path: path.into(),
            source: Box::new(self),
        }
    }

    /// Whether this error was raised while validating parameters or configuration.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidConfiguration(_) | Self::Config(_))
    }

    /// Whether this error comes from a record's own data (its path or timestamp text)
    /// rather than from configuration or a collaborator.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            Self::PatternMismatch { .. } | Self::InvalidTimestamp { .. }
        )
    }

    /// The innermost error, looking through record wrappers.
    pub fn root(&self) -> &AnnotationError {
        match self {
            Self::Record { source, .. } => source.root(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_classification() {
        assert!(
            AnnotationError::invalid_configuration("parameters not allowed").is_configuration()
        );
        assert!(AnnotationError::Config("missing file".into()).is_configuration());
        assert!(!AnnotationError::Cancelled { processed: 3 }.is_configuration());
    }

    #[test]
    fn test_record_wrapper_display_includes_path() {
        let err = AnnotationError::PatternMismatch {
            path: "a/b.jpg".into(),
            pattern: "x".into(),
        }
        .for_record(4, "a/b.jpg");

        let message = err.to_string();
        assert!(message.contains("Record 4"));
        assert!(message.contains("a/b.jpg"));
        assert!(matches!(
            err.root(),
            AnnotationError::PatternMismatch { .. }
        ));
    }
}

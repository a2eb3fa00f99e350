//! Batch annotation of record collections.
//!
//! This module ties parameter validation, timestamp extraction and derivation together:
//!
//! - [`params`]: raw invocation parameters and their validation
//! - [`pipeline`]: the [`BatchAnnotator`] that processes a collection's active scope
//!
//! # Example
//!
//! ```
//! use daystamp_rust::annotation::{AnnotateParams, BatchAnnotator};
//! use daystamp_rust::collection::MemoryCollection;
//! use daystamp_rust::parsing::DEFAULT_PATTERN;
//!
//! let mut collection = MemoryCollection::from_paths(["img_2023-06-21_12-30-45_extra.jpg"]);
//! let params = AnnotateParams::new("filepath").with_pattern(DEFAULT_PATTERN);
//!
//! let report = BatchAnnotator::default().run(&mut collection, &params).unwrap();
//! assert_eq!(report.annotated, 1);
//! assert_eq!(report.fields, vec!["datetime", "weekday", "time"]);
//! ```

pub mod params;
pub mod pipeline;

pub use params::{AnnotateParams, ResolvedParams, SourcePlan, TimestampSource};
pub use pipeline::{
    AnnotateReport, BatchAnnotator, SkippedRecord, FIELD_DATETIME, FIELD_TIME, FIELD_TIMEOFDAY,
    FIELD_WEEKDAY,
};

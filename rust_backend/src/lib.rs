//! Daystamp - timestamp extraction and temporal annotation for media datasets.
//!
//! For every record in a collection's active scope, a timestamp is read either from the
//! record's file path (via a six-group pattern) or from its creation time, localized to a
//! timezone, and annotated with:
//!
//! - `datetime`: the localized instant
//! - `weekday`: Monday = 0 through Sunday = 6
//! - `time`: the legacy `hour + minute/60 + second/6000` score
//! - `timeofday`: one of eight day phases, when coordinates are supplied
//!
//! # Modules
//!
//! - [`annotation`]: parameter validation and the batch annotator
//! - [`collection`]: the record collection interface and an in-memory implementation
//! - [`config`]: TOML-backed settings
//! - [`parsing`]: filepath timestamp extraction
//! - [`solar`]: sunrise/sunset ephemeris and day phase classification
//! - [`time`]: timestamps, timezones and derived fields

pub mod annotation;
pub mod collection;
pub mod config;
pub mod error;
pub mod parsing;
pub mod solar;
pub mod time;

#[cfg(feature = "python")]
pub mod python;

pub use annotation::{AnnotateParams, AnnotateReport, BatchAnnotator, TimestampSource};
pub use collection::{MemoryCollection, Record, RecordCollection};
pub use config::{AnnotateConfig, FailurePolicy, WriteStrategy};
pub use error::{AnnotationError, AnnotationResult};
pub use solar::{DayPhase, DayPhaseWindow, GeoCoordinate};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Daystamp Python module
#[cfg(feature = "python")]
#[pymodule]
fn daystamp_rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("DEFAULT_PATTERN", parsing::DEFAULT_PATTERN)?;

    // Batch annotation
    m.add_function(wrap_pyfunction!(python::annotate_columns, m)?)?;

    // Single-value helpers
    m.add_function(wrap_pyfunction!(python::parse_filepath_timestamp, m)?)?;
    m.add_function(wrap_pyfunction!(python::day_phase, m)?)?;

    Ok(())
}

use pyo3::prelude::*;

use super::conversions::{naive_to_py, timestamp_from_py};
use crate::parsing::filepath::{default_pattern, TimestampPattern};
use crate::solar::{DayPhaseClassifier, GeoCoordinate, NoaaEphemeris};
use crate::time::{localize, resolve_timezone};

fn to_value_error(e: crate::error::AnnotationError) -> PyErr {
    pyo3::exceptions::PyValueError::new_err(e.to_string())
}

/// Extract the naive timestamp embedded in a file path (PyO3 binding)
///
/// Returns a naive `datetime.datetime`.
#[pyfunction]
#[pyo3(signature = (path, pattern=None))]
pub fn parse_filepath_timestamp(
    py: Python<'_>,
    path: &str,
    pattern: Option<&str>,
) -> PyResult<Py<PyAny>> {
    let naive = match pattern {
        Some(pattern) => TimestampPattern::new(pattern)
            .and_then(|p| p.parse(path))
            .map_err(to_value_error)?,
        None => default_pattern().parse(path).map_err(to_value_error)?,
    };
    Ok(naive_to_py(py, &naive)?.unbind())
}

/// Classify a datetime (or ISO-8601 string) into a day phase at the given coordinates
/// (PyO3 binding)
///
/// Naive values are localized to `timezone` first.
#[pyfunction]
#[pyo3(signature = (timestamp, latitude, longitude, timezone="Europe/Berlin"))]
pub fn day_phase(
    timestamp: &Bound<'_, PyAny>,
    latitude: f64,
    longitude: f64,
    timezone: &str,
) -> PyResult<String> {
    let timestamp = timestamp_from_py(timestamp)?;
    let zone = resolve_timezone(timezone).map_err(to_value_error)?;
    let geo = GeoCoordinate::new(latitude, longitude).map_err(to_value_error)?;

    let phase = DayPhaseClassifier::default()
        .classify_at(localize(timestamp, &zone), geo, &NoaaEphemeris)
        .map_err(to_value_error)?;
    Ok(phase.to_string())
}

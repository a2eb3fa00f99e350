use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList, PyString};

use super::conversions::{aware_to_py, timestamp_from_py};
use crate::annotation::{AnnotateParams, BatchAnnotator};
use crate::collection::{FieldValue, MemoryCollection, Record, RecordCollection};
use crate::config::AnnotateConfig;

/// Annotate a batch of records given as columns.
///
/// Args:
///     paths: Effective file path of every record
///     source: Timestamp source, "filepath" or "createdAt"
///     pattern: Six-group regular expression, required for "filepath"
///     geo: [latitude, longitude]; enables the "timeofday" column
///     timezone: IANA zone attached to naive timestamps
///     created_at: Creation times as datetime objects (naive or aware) or ISO-8601
///         strings, one per path, required for "createdAt"
///
/// Returns:
///     dict: Output columns keyed by field name, or a diagnostic string when the
///     parameters are not allowed. "datetime" holds timezone-aware datetime objects,
///     "weekday" ints, "time" floats and, with geo, "timeofday" strings
///
/// Example:
///     >>> import daystamp_rust
///     >>> cols = daystamp_rust.annotate_columns(
///     ...     ["img_2023-06-21_12-30-45.jpg"], "filepath", pattern=daystamp_rust.DEFAULT_PATTERN)
///     >>> cols["weekday"]
///     [2]
///     >>> cols["datetime"][0].isoformat()
///     '2023-06-21T12:30:45+02:00'
#[pyfunction]
#[pyo3(signature = (paths, source, pattern=None, geo=None, timezone="Europe/Berlin", created_at=None))]
pub fn annotate_columns(
    py: Python<'_>,
    paths: Vec<String>,
    source: &str,
    pattern: Option<String>,
    geo: Option<Vec<f64>>,
    timezone: &str,
    created_at: Option<Vec<Bound<'_, PyAny>>>,
) -> PyResult<Py<PyAny>> {
    let mut collection = build_collection(paths, created_at)?;

    let mut params = AnnotateParams::new(source).with_timezone(timezone);
    params.pattern = pattern;
    params.geo = geo;

    let report = match BatchAnnotator::new(AnnotateConfig::default()).run(&mut collection, &params)
    {
        Ok(report) => report,
        Err(e) if e.is_configuration() => {
            return Ok(PyString::new(py, &e.to_string()).into_any().unbind())
        }
        Err(e) if e.root().is_data_error() => {
            return Err(pyo3::exceptions::PyValueError::new_err(e.to_string()))
        }
        Err(e) => return Err(pyo3::exceptions::PyRuntimeError::new_err(e.to_string())),
    };

    let columns = PyDict::new(py);
    for name in report.fields {
        let values = collection
            .read_field(name)
            .map_err(|e| pyo3::exceptions::PyRuntimeError::new_err(e.to_string()))?;

        let list = PyList::empty(py);
        for value in values {
            list.append(field_to_py(py, value)?)?;
        }
        columns.set_item(name, list)?;
    }

    Ok(columns.into_any().unbind())
}

fn build_collection(
    paths: Vec<String>,
    created_at: Option<Vec<Bound<'_, PyAny>>>,
) -> PyResult<MemoryCollection> {
    let Some(created_at) = created_at else {
        return Ok(MemoryCollection::from_paths(paths));
    };

    if created_at.len() != paths.len() {
        return Err(pyo3::exceptions::PyValueError::new_err(format!(
            "created_at has {} values but paths has {}",
            created_at.len(),
            paths.len()
        )));
    }

    let records = paths
        .into_iter()
        .zip(created_at)
        .map(|(path, created)| Ok(Record::new(path).with_created_at(timestamp_from_py(&created)?)))
        .collect::<PyResult<Vec<_>>>()?;

    Ok(MemoryCollection::from_records(records))
}

fn field_to_py<'py>(py: Python<'py>, value: Option<FieldValue>) -> PyResult<Bound<'py, PyAny>> {
    let object = match value {
        None => py.None().into_bound(py),
        Some(FieldValue::DateTime(dt)) => aware_to_py(py, &dt)?,
        Some(FieldValue::Int(v)) => v.into_pyobject(py)?.into_any(),
        Some(FieldValue::Float(v)) => v.into_pyobject(py)?.into_any(),
        Some(FieldValue::String(v)) => PyString::new(py, &v).into_any(),
    };
    Ok(object)
}

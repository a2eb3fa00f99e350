//! Conversions between chrono values and Python `datetime` objects.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Timelike};
use pyo3::prelude::*;

use crate::time::Timestamp;

fn invalid(message: impl Into<String>) -> PyErr {
    pyo3::exceptions::PyValueError::new_err(message.into())
}

fn datetime_args(dt: &NaiveDateTime) -> (i32, u32, u32, u32, u32, u32, u32) {
    (
        dt.year(),
        dt.month(),
        dt.day(),
        dt.hour(),
        dt.minute(),
        dt.second(),
        dt.nanosecond() / 1_000 % 1_000_000,
    )
}

/// Build a timezone-aware `datetime.datetime` carrying `dt`'s fixed offset.
pub fn aware_to_py<'py>(
    py: Python<'py>,
    dt: &DateTime<FixedOffset>,
) -> PyResult<Bound<'py, PyAny>> {
    let datetime_module = py.import("datetime")?;
    let timedelta = datetime_module
        .getattr("timedelta")?
        .call1((0, dt.offset().local_minus_utc()))?;
    let tzinfo = datetime_module.getattr("timezone")?.call1((timedelta,))?;

    let (year, month, day, hour, minute, second, microsecond) = datetime_args(&dt.naive_local());
    datetime_module.getattr("datetime")?.call1((
        year,
        month,
        day,
        hour,
        minute,
        second,
        microsecond,
        tzinfo,
    ))
}

/// Build a naive `datetime.datetime`.
pub fn naive_to_py<'py>(py: Python<'py>, dt: &NaiveDateTime) -> PyResult<Bound<'py, PyAny>> {
    let datetime_cls = py.import("datetime")?.getattr("datetime")?;
    datetime_cls.call1(datetime_args(dt))
}

/// Read a `datetime.datetime` (naive or aware) or an ISO-8601 string.
///
/// Aware values keep the offset reported by `utcoffset()`.
pub fn timestamp_from_py(value: &Bound<'_, PyAny>) -> PyResult<Timestamp> {
    if let Ok(text) = value.extract::<String>() {
        return text
            .parse()
            .map_err(|e: crate::error::AnnotationError| invalid(e.to_string()));
    }

    let year = value.getattr("year")?.extract::<i32>()?;
    let month = value.getattr("month")?.extract::<u32>()?;
    let day = value.getattr("day")?.extract::<u32>()?;
    let hour = value.getattr("hour")?.extract::<u32>()?;
    let minute = value.getattr("minute")?.extract::<u32>()?;
    let second = value.getattr("second")?.extract::<u32>()?;
    let microsecond = value.getattr("microsecond")?.extract::<u32>()?;

    let naive = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_micro_opt(hour, minute, second, microsecond))
        .ok_or_else(|| invalid("Invalid datetime"))?;

    let utcoffset = value.call_method0("utcoffset")?;
    if utcoffset.is_none() {
        return Ok(Timestamp::Naive(naive));
    }

    let seconds = utcoffset
        .call_method0("total_seconds")?
        .extract::<f64>()?
        .round() as i32;
    let offset = FixedOffset::east_opt(seconds).ok_or_else(|| invalid("Invalid UTC offset"))?;
    let aware = offset
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| invalid("Invalid datetime"))?;
    Ok(Timestamp::Aware(aware))
}

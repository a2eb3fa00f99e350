//! Per-record temporal metadata.
//!
//! [`TimestampDeriver`] turns a timestamp into an [`AnnotationRecord`]: the localized
//! datetime, the weekday index (Monday = 0), the legacy time score and, when a location is
//! given, the [`DayPhase`].

use chrono::{DateTime, Datelike, FixedOffset, Timelike};
use chrono_tz::Tz;
use serde::Serialize;

use super::timestamp::Timestamp;
use super::zone::localize;
use crate::error::AnnotationResult;
use crate::solar::{
    DayPhase, DayPhaseClassifier, DayPhaseWindow, GeoCoordinate, NoaaEphemeris, SolarEphemeris,
};

/// Divisor applied to seconds in the legacy time score.
///
/// True fractional hours would use 3600. Stored annotations depend on this value.
pub const LEGACY_SECOND_DIVISOR: f64 = 6000.0;

/// Legacy time score: `hour + minute / 60 + second / 6000`.
///
/// This is not the fractional hour of day; see [`LEGACY_SECOND_DIVISOR`].
pub fn legacy_time_score(hour: u32, minute: u32, second: u32) -> f64 {
    f64::from(hour) + f64::from(minute) / 60.0 + f64::from(second) / LEGACY_SECOND_DIVISOR
}

/// ISO weekday index with Monday = 0 and Sunday = 6.
pub fn weekday_index<D: Datelike>(date: &D) -> u8 {
    date.weekday().num_days_from_monday() as u8
}

/// Derived metadata for one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationRecord {
    pub datetime: DateTime<FixedOffset>,
    pub weekday: u8,
    pub time: f64,
    pub timeofday: Option<DayPhase>,
}

/// Derives weekday, legacy time score and day phase from timestamps.
#[derive(Debug, Clone)]
pub struct TimestampDeriver<E = NoaaEphemeris> {
    classifier: DayPhaseClassifier,
    ephemeris: E,
}

impl TimestampDeriver<NoaaEphemeris> {
    /// Deriver backed by the built-in NOAA ephemeris.
    pub fn new(window: DayPhaseWindow) -> Self {
        Self::with_ephemeris(window, NoaaEphemeris)
    }
}

impl Default for TimestampDeriver<NoaaEphemeris> {
    fn default() -> Self {
        Self::new(DayPhaseWindow::default())
    }
}

impl<E: SolarEphemeris> TimestampDeriver<E> {
    pub fn with_ephemeris(window: DayPhaseWindow, ephemeris: E) -> Self {
        Self {
            classifier: DayPhaseClassifier::new(window),
            ephemeris,
        }
    }

    /// Derive the annotation for `timestamp`.
    ///
    /// # Arguments
    /// * `timestamp` - Naive values are localized to `zone`; aware values keep their offset
    /// * `zone` - Zone attached to naive values
    /// * `geo` - Location for the day phase; `None` leaves `timeofday` empty
    ///
    /// # Errors
    /// Only the ephemeris can fail (e.g. no sunrise during polar night).
    pub fn derive(
        &self,
        timestamp: Timestamp,
        zone: &Tz,
        geo: Option<GeoCoordinate>,
    ) -> AnnotationResult<AnnotationRecord> {
        let datetime = localize(timestamp, zone);

        let timeofday = match geo {
            Some(geo) => Some(
                self.classifier
                    .classify_at(datetime, geo, &self.ephemeris)?,
            ),
            None => None,
        };

        Ok(AnnotationRecord {
            datetime,
            weekday: weekday_index(&datetime),
            time: legacy_time_score(datetime.hour(), datetime.minute(), datetime.second()),
            timeofday,
        })
    }
}

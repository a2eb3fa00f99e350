//! Sunrise and sunset computation.
//!
//! The [`SolarEphemeris`] trait is the seam for the solar collaborator: given a calendar
//! date, an observer location and a fixed UTC offset, it returns the sunrise and sunset
//! instants of that date expressed in the same offset.
//!
//! [`NoaaEphemeris`] implements the NOAA solar calculator equations (geometric mean
//! longitude and anomaly, equation of center, apparent longitude, obliquity, declination
//! and equation of time), with the standard 90.833 degree zenith that accounts for
//! atmospheric refraction and the solar disc radius. Accuracy is within a minute or two
//! for latitudes below the polar circles.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{AnnotationError, AnnotationResult};

/// Zenith angle of the sun's center at sunrise/sunset, in degrees.
pub const SUNRISE_ZENITH_DEG: f64 = 90.833;

/// Julian day of 0001-01-01T00:00 UTC minus one day (proleptic Gregorian).
const JD_CE_OFFSET: f64 = 1_721_424.5;

/// Julian day of the J2000.0 epoch.
const JD_J2000: f64 = 2_451_545.0;

/// Geographic location of the observer, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoCoordinate {
    /// Create a coordinate, validating ranges.
    ///
    /// # Errors
    /// [`AnnotationError::InvalidConfiguration`] if either value is not finite, the latitude is
    /// outside `[-90, 90]`, or the longitude is outside `[-180, 180]`.
    pub fn new(latitude: f64, longitude: f64) -> AnnotationResult<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(AnnotationError::invalid_configuration(format!(
                "latitude {latitude} outside [-90, 90]"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(AnnotationError::invalid_configuration(format!(
                "longitude {longitude} outside [-180, 180]"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Build a coordinate from a `[latitude, longitude]` sequence.
    ///
    /// Anything that is not a two-element sequence disables day-phase computation and
    /// yields `Ok(None)`; a two-element sequence with out-of-range values is an error.
    pub fn from_slice(values: &[f64]) -> AnnotationResult<Option<Self>> {
        match values {
            [latitude, longitude] => Self::new(*latitude, *longitude).map(Some),
            _ => {
                log::warn!(
                    "Ignoring geo with {} values, expected [latitude, longitude]; day phases disabled",
                    values.len()
                );
                Ok(None)
            }
        }
    }
}

/// Sunrise and sunset instants for one calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SunTimes {
    pub sunrise: DateTime<FixedOffset>,
    pub sunset: DateTime<FixedOffset>,
}

/// Source of sunrise/sunset instants.
pub trait SolarEphemeris {
    /// Sunrise and sunset on `date` at `geo`, expressed in `offset`.
    fn sun_times(
        &self,
        date: NaiveDate,
        geo: GeoCoordinate,
        offset: FixedOffset,
    ) -> AnnotationResult<SunTimes>;
}

/// NOAA solar calculator.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoaaEphemeris;

/// Declination (degrees) and equation of time (minutes) at a Julian day.
fn solar_geometry(jd: f64) -> (f64, f64) {
    let t = (jd - JD_J2000) / 36_525.0;

    let mean_long = (280.46646 + t * (36000.76983 + t * 0.0003032)).rem_euclid(360.0);
    let mean_anom = 357.52911 + t * (35999.05029 - 0.0001537 * t);
    let eccent = 0.016708634 - t * (0.000042037 + 0.0000001267 * t);

    let m = mean_anom.to_radians();
    let center = m.sin() * (1.914602 - t * (0.004817 + 0.000014 * t))
        + (2.0 * m).sin() * (0.019993 - 0.000101 * t)
        + (3.0 * m).sin() * 0.000289;

    let omega = (125.04 - 1934.136 * t).to_radians();
    let apparent_long = mean_long + center - 0.00569 - 0.00478 * omega.sin();

    let mean_obliq =
        23.0 + (26.0 + (21.448 - t * (46.815 + t * (0.00059 - t * 0.001813))) / 60.0) / 60.0;
    let obliq = (mean_obliq + 0.00256 * omega.cos()).to_radians();

    let declination = (obliq.sin() * apparent_long.to_radians().sin())
        .asin()
        .to_degrees();

    let y = (obliq / 2.0).tan().powi(2);
    let l0 = mean_long.to_radians();
    let equation_of_time = 4.0
        * (y * (2.0 * l0).sin() - 2.0 * eccent * m.sin()
            + 4.0 * eccent * y * m.sin() * (2.0 * l0).cos()
            - 0.5 * y * y * (4.0 * l0).sin()
            - 1.25 * eccent * eccent * (2.0 * m).sin())
        .to_degrees();

    (declination, equation_of_time)
}

impl SolarEphemeris for NoaaEphemeris {
    fn sun_times(
        &self,
        date: NaiveDate,
        geo: GeoCoordinate,
        offset: FixedOffset,
    ) -> AnnotationResult<SunTimes> {
        let offset_minutes = f64::from(offset.local_minus_utc()) / 60.0;

        // Evaluate the geometry at local noon
        let jd = f64::from(date.num_days_from_ce()) + JD_CE_OFFSET + 0.5 - offset_minutes / 1440.0;
        let (declination, equation_of_time) = solar_geometry(jd);

        let lat = geo.latitude.to_radians();
        let decl = declination.to_radians();
        let cos_hour_angle = SUNRISE_ZENITH_DEG.to_radians().cos() / (lat.cos() * decl.cos())
            - lat.tan() * decl.tan();

        let ephemeris_error = |reason: &str| AnnotationError::Ephemeris {
            date,
            latitude: geo.latitude,
            longitude: geo.longitude,
            reason: reason.to_string(),
        };

        if cos_hour_angle.is_nan() {
            return Err(ephemeris_error("hour angle undefined"));
        }
        if cos_hour_angle > 1.0 {
            return Err(ephemeris_error("sun never rises (polar night)"));
        }
        if cos_hour_angle < -1.0 {
            return Err(ephemeris_error("sun never sets (midnight sun)"));
        }

        let hour_angle = cos_hour_angle.acos().to_degrees();
        let solar_noon = 720.0 - 4.0 * geo.longitude - equation_of_time + offset_minutes;

        let midnight = date
            .and_time(NaiveTime::MIN)
            .and_local_timezone(offset)
            .single()
            .ok_or_else(|| ephemeris_error("local midnight not representable"))?;
        let at =
            |minutes: f64| midnight + Duration::milliseconds((minutes * 60_000.0).round() as i64);

        Ok(SunTimes {
            sunrise: at(solar_noon - 4.0 * hour_angle),
            sunset: at(solar_noon + 4.0 * hour_angle),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn minutes_of_day(dt: DateTime<FixedOffset>) -> i64 {
        i64::from(dt.hour()) * 60 + i64::from(dt.minute())
    }

    fn cest() -> FixedOffset {
        FixedOffset::east_opt(2 * 3600).unwrap()
    }

    #[test]
    fn test_berlin_summer_solstice() {
        let berlin = GeoCoordinate::new(52.52, 13.405).unwrap();
        let date = NaiveDate::from_ymd_opt(2023, 6, 21).unwrap();

        let sun = NoaaEphemeris.sun_times(date, berlin, cest()).unwrap();

        // Published times: 04:43 and 21:33 CEST
        assert!((minutes_of_day(sun.sunrise) - (4 * 60 + 43)).abs() <= 3);
        assert!((minutes_of_day(sun.sunset) - (21 * 60 + 33)).abs() <= 3);
        assert_eq!(sun.sunrise.offset(), &cest());
    }

    #[test]
    fn test_equator_day_is_about_twelve_hours() {
        let quito = GeoCoordinate::new(-0.18, -78.47).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();

        let sun = NoaaEphemeris.sun_times(date, quito, offset).unwrap();
        let length = (sun.sunset - sun.sunrise).num_minutes();

        assert!((length - 12 * 60).abs() < 15, "day length {length} min");
        assert!(sun.sunrise < sun.sunset);
    }

    #[test]
    fn test_polar_day_and_night_are_errors() {
        let tromso = GeoCoordinate::new(69.65, 18.96).unwrap();
        let offset = FixedOffset::east_opt(3600).unwrap();

        let june = NaiveDate::from_ymd_opt(2023, 6, 21).unwrap();
        let err = NoaaEphemeris.sun_times(june, tromso, offset).unwrap_err();
        assert!(err.to_string().contains("never sets"));

        let december = NaiveDate::from_ymd_opt(2023, 12, 21).unwrap();
        let err = NoaaEphemeris
            .sun_times(december, tromso, offset)
            .unwrap_err();
        assert!(err.to_string().contains("never rises"));
    }

    #[test]
    fn test_geo_from_slice() {
        assert_eq!(
            GeoCoordinate::from_slice(&[52.52, 13.405]).unwrap(),
            Some(GeoCoordinate {
                latitude: 52.52,
                longitude: 13.405
            })
        );
        assert_eq!(GeoCoordinate::from_slice(&[52.52]).unwrap(), None);
        assert_eq!(GeoCoordinate::from_slice(&[]).unwrap(), None);
        assert!(GeoCoordinate::from_slice(&[95.0, 0.0]).is_err());
        assert!(GeoCoordinate::from_slice(&[0.0, f64::NAN]).is_err());
    }
}

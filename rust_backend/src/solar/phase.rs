//! Day-phase classification from sunrise and sunset.
//!
//! A day is split into eight ordered phases around the two solar events. Boundaries
//! are tested in a fixed order and the first match wins:
//!
//! | Phase     | Condition                                           |
//! |-----------|-----------------------------------------------------|
//! | `night`   | `dt <= sunrise - sunrise_len - dawn_len`            |
//! | `dawn`    | `dt <= sunrise - sunrise_len`                       |
//! | `sunrise` | `dt <= sunrise + sunrise_len`                       |
//! | `morning` | `dt <= sunrise + sunrise_len + morning_len`         |
//! | `day`     | `dt <  sunset - evening_len - sunset_len`           |
//! | `evening` | `dt <  sunset - sunset_len`                         |
//! | `sunset`  | `dt <= sunset + sunset_len`                         |
//! | `dusk`    | `dt <= sunset + sunset_len + dusk_len`              |
//! | `night`   | otherwise                                           |
//!
//! With zero dawn and dusk spans ([`DayPhaseWindow::without_twilight`]) the `dawn` and
//! `dusk` labels are never produced and the same boundary order yields six phases.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};

use super::ephemeris::{GeoCoordinate, SolarEphemeris, SunTimes};
use crate::error::AnnotationResult;

/// Qualitative phase of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayPhase {
    Night,
    Dawn,
    Sunrise,
    Morning,
    Day,
    Evening,
    Sunset,
    Dusk,
}

impl DayPhase {
    /// All phases in chronological order, starting after midnight.
    pub const ALL: [DayPhase; 8] = [
        DayPhase::Night,
        DayPhase::Dawn,
        DayPhase::Sunrise,
        DayPhase::Morning,
        DayPhase::Day,
        DayPhase::Evening,
        DayPhase::Sunset,
        DayPhase::Dusk,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DayPhase::Night => "night",
            DayPhase::Dawn => "dawn",
            DayPhase::Sunrise => "sunrise",
            DayPhase::Morning => "morning",
            DayPhase::Day => "day",
            DayPhase::Evening => "evening",
            DayPhase::Sunset => "sunset",
            DayPhase::Dusk => "dusk",
        }
    }
}

impl fmt::Display for DayPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayPhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DayPhase::ALL
            .into_iter()
            .find(|phase| phase.as_str() == s)
            .ok_or_else(|| format!("Unknown day phase: {}", s))
    }
}

/// Widths of the transition windows, in whole minutes.
///
/// `sunrise_minutes` and `sunset_minutes` are half-widths centred on the solar event;
/// the other spans extend outwards from those windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DayPhaseWindow {
    pub sunrise_minutes: u32,
    pub sunset_minutes: u32,
    pub morning_minutes: u32,
    pub evening_minutes: u32,
    pub dawn_minutes: u32,
    pub dusk_minutes: u32,
}

impl Default for DayPhaseWindow {
    fn default() -> Self {
        Self {
            sunrise_minutes: 15,
            sunset_minutes: 15,
            morning_minutes: 60,
            evening_minutes: 60,
            dawn_minutes: 15,
            dusk_minutes: 15,
        }
    }
}

impl DayPhaseWindow {
    /// Default widths with dawn and dusk disabled.
    pub fn without_twilight() -> Self {
        Self {
            dawn_minutes: 0,
            dusk_minutes: 0,
            ..Self::default()
        }
    }

    /// Whether the `dawn`/`dusk` phases can be produced.
    pub fn has_twilight(&self) -> bool {
        self.dawn_minutes > 0 || self.dusk_minutes > 0
    }

    fn span(minutes: u32) -> Duration {
        Duration::minutes(i64::from(minutes))
    }
}

/// Classifies instants into [`DayPhase`]s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayPhaseClassifier {
    window: DayPhaseWindow,
}

impl DayPhaseClassifier {
    pub fn new(window: DayPhaseWindow) -> Self {
        Self { window }
    }

    /// Classify `dt` against known sunrise and sunset instants.
    ///
    /// A sunset that precedes sunrise (date-boundary artifact of some ephemerides) is
    /// moved forward by one day before the boundaries are evaluated.
    pub fn classify(&self, dt: DateTime<FixedOffset>, sun: SunTimes) -> DayPhase {
        let sunrise = sun.sunrise;
        let sunset = if sun.sunset < sun.sunrise {
            sun.sunset + Duration::days(1)
        } else {
            sun.sunset
        };

        let rise = DayPhaseWindow::span(self.window.sunrise_minutes);
        let set = DayPhaseWindow::span(self.window.sunset_minutes);
        let morning = DayPhaseWindow::span(self.window.morning_minutes);
        let evening = DayPhaseWindow::span(self.window.evening_minutes);
        let dawn = DayPhaseWindow::span(self.window.dawn_minutes);
        let dusk = DayPhaseWindow::span(self.window.dusk_minutes);

        if dt <= sunrise - rise - dawn {
            DayPhase::Night
        } else if dt <= sunrise - rise {
            DayPhase::Dawn
        } else if dt <= sunrise + rise {
            DayPhase::Sunrise
        } else if dt <= sunrise + rise + morning {
            DayPhase::Morning
        } else if dt < sunset - evening - set {
            DayPhase::Day
        } else if dt < sunset - set {
            DayPhase::Evening
        } else if dt <= sunset + set {
            DayPhase::Sunset
        } else if dt <= sunset + set + dusk {
            DayPhase::Dusk
        } else {
            DayPhase::Night
        }
    }

    /// Classify `dt` at `geo`, asking `ephemeris` for the sun times of `dt`'s local date.
    pub fn classify_at<E: SolarEphemeris + ?Sized>(
        &self,
        dt: DateTime<FixedOffset>,
        geo: GeoCoordinate,
        ephemeris: &E,
    ) -> AnnotationResult<DayPhase> {
        let sun = ephemeris.sun_times(dt.date_naive(), geo, *dt.offset())?;
        Ok(self.classify(dt, sun))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn at(hour: u32, minute: u32) -> DateTime<FixedOffset> {
        utc()
            .with_ymd_and_hms(2023, 6, 21, hour, minute, 0)
            .unwrap()
    }

    fn sun(rise: (u32, u32), set: (u32, u32)) -> SunTimes {
        SunTimes {
            sunrise: at(rise.0, rise.1),
            sunset: at(set.0, set.1),
        }
    }

    #[test]
    fn test_phase_boundaries_default_window() {
        let classifier = DayPhaseClassifier::default();
        let sun = sun((6, 0), (20, 0));

        assert_eq!(classifier.classify(at(3, 0), sun), DayPhase::Night);
        assert_eq!(classifier.classify(at(5, 30), sun), DayPhase::Night);
        assert_eq!(classifier.classify(at(5, 31), sun), DayPhase::Dawn);
        assert_eq!(classifier.classify(at(5, 45), sun), DayPhase::Dawn);
        assert_eq!(classifier.classify(at(5, 46), sun), DayPhase::Sunrise);
        assert_eq!(classifier.classify(at(6, 15), sun), DayPhase::Sunrise);
        assert_eq!(classifier.classify(at(7, 15), sun), DayPhase::Morning);
        assert_eq!(classifier.classify(at(7, 16), sun), DayPhase::Day);
        assert_eq!(classifier.classify(at(18, 44), sun), DayPhase::Day);
        // day/evening boundaries are exclusive
        assert_eq!(classifier.classify(at(18, 45), sun), DayPhase::Evening);
        assert_eq!(classifier.classify(at(19, 45), sun), DayPhase::Sunset);
        assert_eq!(classifier.classify(at(20, 15), sun), DayPhase::Sunset);
        assert_eq!(classifier.classify(at(20, 30), sun), DayPhase::Dusk);
        assert_eq!(classifier.classify(at(20, 31), sun), DayPhase::Night);
        assert_eq!(classifier.classify(at(23, 59), sun), DayPhase::Night);
    }

    #[test]
    fn test_without_twilight_never_yields_dawn_or_dusk() {
        let classifier = DayPhaseClassifier::new(DayPhaseWindow::without_twilight());
        let sun = sun((6, 0), (20, 0));

        for minute in 0..(24 * 60) {
            let phase = classifier.classify(at(minute / 60, minute % 60), sun);
            assert_ne!(phase, DayPhase::Dawn);
            assert_ne!(phase, DayPhase::Dusk);
        }
        assert_eq!(classifier.classify(at(5, 45), sun), DayPhase::Night);
        assert_eq!(classifier.classify(at(5, 46), sun), DayPhase::Sunrise);
    }

    /// A sunset reported before sunrise is treated as the next day's sunset
    #[test]
    fn test_sunset_before_sunrise_is_advanced() {
        let classifier = DayPhaseClassifier::default();
        // Sunrise 22:00, sunset reported as 02:00 on the same date
        let sun = sun((22, 0), (2, 0));

        assert_eq!(classifier.classify(at(23, 0), sun), DayPhase::Morning);
        assert_eq!(classifier.classify(at(23, 30), sun), DayPhase::Day);
        assert_eq!(classifier.classify(at(21, 0), sun), DayPhase::Night);
    }

    #[test]
    fn test_classify_at_uses_local_date() {
        struct Fixed;
        impl SolarEphemeris for Fixed {
            fn sun_times(
                &self,
                date: NaiveDate,
                _geo: GeoCoordinate,
                offset: FixedOffset,
            ) -> AnnotationResult<SunTimes> {
                assert_eq!(date, NaiveDate::from_ymd_opt(2023, 6, 21).unwrap());
                Ok(SunTimes {
                    sunrise: offset.with_ymd_and_hms(2023, 6, 21, 6, 0, 0).unwrap(),
                    sunset: offset.with_ymd_and_hms(2023, 6, 21, 20, 0, 0).unwrap(),
                })
            }
        }

        let geo = GeoCoordinate::new(10.0, 10.0).unwrap();
        let phase = DayPhaseClassifier::default()
            .classify_at(at(12, 0), geo, &Fixed)
            .unwrap();
        assert_eq!(phase, DayPhase::Day);
    }

    #[test]
    fn test_phase_labels_roundtrip_through_str() {
        for phase in DayPhase::ALL {
            assert_eq!(phase.as_str().parse::<DayPhase>().unwrap(), phase);
        }
        assert!("noon".parse::<DayPhase>().is_err());
    }
}

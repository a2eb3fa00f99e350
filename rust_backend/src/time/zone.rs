//! Timezone resolution and localization.
//!
//! Zone names are IANA identifiers resolved through `chrono-tz`. Localizing attaches the
//! zone's offset to a naive wall-clock reading without shifting it; timestamps that are
//! already aware are returned unchanged.

use chrono::{DateTime, Duration, FixedOffset, LocalResult, NaiveDateTime, Offset, TimeZone};
use chrono_tz::Tz;

use super::timestamp::Timestamp;
use crate::error::{AnnotationError, AnnotationResult};

/// Default zone used when the caller does not supply one.
pub const DEFAULT_TIMEZONE: &str = "Europe/Berlin";

/// Resolve an IANA zone name such as `"Europe/Berlin"`.
pub fn resolve_timezone(name: &str) -> AnnotationResult<Tz> {
    name.trim().parse::<Tz>().map_err(|e| {
        AnnotationError::invalid_configuration(format!("unknown timezone '{}': {}", name, e))
    })
}

/// Attach `zone` to a naive wall-clock time.
///
/// Ambiguous readings (the repeated hour when clocks go back) take the earlier offset.
/// Readings inside a spring-forward gap keep their wall-clock value and carry the
/// pre-transition offset, so derived clock fields still match the recorded time.
pub fn localize_naive(naive: NaiveDateTime, zone: &Tz) -> DateTime<FixedOffset> {
    match zone.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.fixed_offset(),
        LocalResult::Ambiguous(earliest, _) => earliest.fixed_offset(),
        LocalResult::None => {
            let offset = zone
                .offset_from_local_datetime(&(naive - Duration::hours(1)))
                .earliest()
                .unwrap_or_else(|| zone.offset_from_utc_datetime(&naive))
                .fix();
            log::debug!(
                "{} does not exist in {}, keeping offset {}",
                naive,
                zone,
                offset
            );
            let utc = naive - Duration::seconds(i64::from(offset.local_minus_utc()));
            DateTime::from_naive_utc_and_offset(utc, offset)
        }
    }
}

/// Localize a timestamp: naive values get `zone` attached, aware values pass through.
pub fn localize(timestamp: Timestamp, zone: &Tz) -> DateTime<FixedOffset> {
    match timestamp {
        Timestamp::Naive(naive) => localize_naive(naive, zone),
        Timestamp::Aware(dt) => dt,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    fn naive(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_resolve_known_and_unknown_zones() {
        assert_eq!(
            resolve_timezone("Europe/Berlin").unwrap(),
            Tz::Europe__Berlin
        );
        assert_eq!(resolve_timezone(" UTC ").unwrap(), Tz::UTC);

        let err = resolve_timezone("Mars/Olympus").unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("Mars/Olympus"));
    }

    /// Localizing keeps the wall-clock reading and attaches the seasonal offset
    #[test]
    fn test_localize_keeps_wall_clock() {
        let summer = localize_naive(naive(2023, 6, 21, 12, 30), &Tz::Europe__Berlin);
        assert_eq!(summer.hour(), 12);
        assert_eq!(summer.offset().local_minus_utc(), 2 * 3600);

        let winter = localize_naive(naive(2023, 1, 10, 12, 30), &Tz::Europe__Berlin);
        assert_eq!(winter.hour(), 12);
        assert_eq!(winter.offset().local_minus_utc(), 3600);
    }

    #[test]
    fn test_localize_ambiguous_takes_earlier_offset() {
        // 2023-10-29 02:30 occurs twice in Berlin
        let dt = localize_naive(naive(2023, 10, 29, 2, 30), &Tz::Europe__Berlin);
        assert_eq!(dt.offset().local_minus_utc(), 2 * 3600);
    }

    #[test]
    fn test_localize_gap_keeps_wall_clock() {
        // 2023-03-26 02:30 does not exist in Berlin
        let dt = localize_naive(naive(2023, 3, 26, 2, 30), &Tz::Europe__Berlin);
        assert_eq!(dt.hour(), 2);
        assert_eq!(dt.minute(), 30);
        assert_eq!(dt.offset().local_minus_utc(), 3600);
        assert_eq!(dt.to_rfc3339(), "2023-03-26T02:30:00+01:00");
    }

    #[test]
    fn test_aware_timestamps_are_not_converted() {
        let utc: Timestamp = "2023-06-21T10:00:00Z".parse().unwrap();
        let dt = localize(utc, &Tz::Europe__Berlin);
        assert_eq!(dt.hour(), 10);
        assert_eq!(dt.offset().local_minus_utc(), 0);
    }
}

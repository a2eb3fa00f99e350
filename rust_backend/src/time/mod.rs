//! Timestamps, timezone handling and derived temporal metadata.
//!
//! - [`timestamp`]: naive/aware [`Timestamp`] values
//! - [`zone`]: IANA zone resolution and localization
//! - [`derive`]: weekday, legacy time score and day phase per record

pub mod derive;
pub mod timestamp;
pub mod zone;

pub use derive::{legacy_time_score, weekday_index, AnnotationRecord, TimestampDeriver};
pub use timestamp::Timestamp;
pub use zone::{localize, localize_naive, resolve_timezone, DEFAULT_TIMEZONE};

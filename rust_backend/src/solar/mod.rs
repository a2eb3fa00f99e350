//! Solar position and day-phase classification.
//!
//! - [`ephemeris`]: sunrise/sunset collaborator trait and the built-in NOAA calculator
//! - [`phase`]: the eight-phase classifier and its configurable transition windows

pub mod ephemeris;
pub mod phase;

pub use ephemeris::{GeoCoordinate, NoaaEphemeris, SolarEphemeris, SunTimes};
pub use phase::{DayPhase, DayPhaseClassifier, DayPhaseWindow};

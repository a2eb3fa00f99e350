#![allow(dead_code)]

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};

use daystamp_rust::collection::{
    CollectionResult, FieldKind, FieldValue, MemoryCollection, RecordCollection, RecordId,
};
use daystamp_rust::error::{AnnotationError, AnnotationResult};
use daystamp_rust::solar::{GeoCoordinate, SolarEphemeris, SunTimes};
use daystamp_rust::time::Timestamp;

static CWD_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with the working directory temporarily set to `dir`.
///
/// Serializes access to the process-global working directory so tests that depend on
/// relative config lookups do not race when Rust runs tests in parallel.
pub fn with_current_dir<F, R>(dir: &Path, f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = CWD_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedCwd::new(dir);
    f()
}

struct ScopedCwd {
    previous: std::path::PathBuf,
}

impl ScopedCwd {
    fn new(dir: &Path) -> Self {
        let previous = std::env::current_dir().expect("current dir");
        std::env::set_current_dir(dir).expect("set current dir");
        Self { previous }
    }
}

impl Drop for ScopedCwd {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.previous);
    }
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

/// Column of `name` over the active scope, failing the test when it is missing.
pub fn column(collection: &impl RecordCollection, name: &str) -> Vec<Option<FieldValue>> {
    collection
        .read_field(name)
        .unwrap_or_else(|e| panic!("column {name}: {e}"))
}

/// Ephemeris stub with the same wall-clock sunrise/sunset every day.
#[derive(Debug, Clone, Copy)]
pub struct FixedSun {
    pub sunrise: (u32, u32),
    pub sunset: (u32, u32),
}

impl FixedSun {
    pub fn new(sunrise: (u32, u32), sunset: (u32, u32)) -> Self {
        Self { sunrise, sunset }
    }

    fn at(date: NaiveDate, offset: FixedOffset, (h, m): (u32, u32)) -> DateTime<FixedOffset> {
        offset
            .from_local_datetime(&date.and_hms_opt(h, m, 0).expect("valid time"))
            .single()
            .expect("fixed offsets are unambiguous")
    }
}

impl SolarEphemeris for FixedSun {
    fn sun_times(
        &self,
        date: NaiveDate,
        _geo: GeoCoordinate,
        offset: FixedOffset,
    ) -> AnnotationResult<SunTimes> {
        Ok(SunTimes {
            sunrise: Self::at(date, offset, self.sunrise),
            sunset: Self::at(date, offset, self.sunset),
        })
    }
}

/// Ephemeris stub that always fails.
pub struct BrokenSun;

impl SolarEphemeris for BrokenSun {
    fn sun_times(
        &self,
        date: NaiveDate,
        geo: GeoCoordinate,
        _offset: FixedOffset,
    ) -> AnnotationResult<SunTimes> {
        Err(AnnotationError::Ephemeris {
            date,
            latitude: geo.latitude,
            longitude: geo.longitude,
            reason: "service unavailable".to_string(),
        })
    }
}

/// Collection wrapper counting schema and write calls.
#[derive(Debug, Default)]
pub struct CountingCollection {
    pub inner: MemoryCollection,
    pub declares: usize,
    pub column_writes: usize,
    pub value_writes: usize,
}

impl CountingCollection {
    pub fn new(inner: MemoryCollection) -> Self {
        Self {
            inner,
            ..Default::default()
        }
    }

    pub fn writes(&self) -> usize {
        self.declares + self.column_writes + self.value_writes
    }
}

impl RecordCollection for CountingCollection {
    fn scope(&self) -> Vec<RecordId> {
        self.inner.scope()
    }

    fn effective_path(&self, id: RecordId) -> CollectionResult<String> {
        self.inner.effective_path(id)
    }

    fn created_at(&self, id: RecordId) -> CollectionResult<Timestamp> {
        self.inner.created_at(id)
    }

    fn field_kind(&self, name: &str) -> Option<FieldKind> {
        self.inner.field_kind(name)
    }

    fn declare_field(&mut self, name: &str, kind: FieldKind) -> CollectionResult<()> {
        self.declares += 1;
        self.inner.declare_field(name, kind)
    }

    fn read_field(&self, name: &str) -> CollectionResult<Vec<Option<FieldValue>>> {
        self.inner.read_field(name)
    }

    fn write_field(&mut self, name: &str, values: Vec<Option<FieldValue>>) -> CollectionResult<()> {
        self.column_writes += 1;
        self.inner.write_field(name, values)
    }

    fn set_field(
        &mut self,
        id: RecordId,
        name: &str,
        value: Option<FieldValue>,
    ) -> CollectionResult<()> {
        self.value_writes += 1;
        self.inner.set_field(id, name, value)
    }
}

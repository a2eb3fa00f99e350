//! The batch annotator.
//!
//! [`BatchAnnotator`] walks a collection's active scope in enumeration order, derives one
//! [`AnnotationRecord`] per record and writes the output fields back as whole columns
//! (or value by value under [`WriteStrategy::PerRecord`]).

use std::ops::ControlFlow;

use log::{debug, info, warn};
use serde::Serialize;

use super::params::{AnnotateParams, ResolvedParams, SourcePlan};
use crate::collection::{CollectionError, FieldKind, FieldValue, RecordCollection, RecordId};
use crate::config::{AnnotateConfig, FailurePolicy, WriteStrategy};
use crate::error::{AnnotationError, AnnotationResult};
use crate::solar::{NoaaEphemeris, SolarEphemeris};
use crate::time::{AnnotationRecord, Timestamp, TimestampDeriver};

pub const FIELD_DATETIME: &str = "datetime";
pub const FIELD_WEEKDAY: &str = "weekday";
pub const FIELD_TIME: &str = "time";
pub const FIELD_TIMEOFDAY: &str = "timeofday";

/// A record left unannotated under [`FailurePolicy::Skip`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRecord {
    /// Position in the active scope
    pub index: usize,
    pub id: RecordId,
    pub path: String,
    pub reason: String,
}

/// Result of an annotation run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotateReport {
    pub total: usize,
    pub annotated: usize,
    pub skipped: Vec<SkippedRecord>,
    /// Output fields declared and written, in write order
    pub fields: Vec<&'static str>,
}

/// One output column, computed in full before it is written.
struct Column {
    name: &'static str,
    kind: FieldKind,
    values: Vec<Option<FieldValue>>,
}

/// Annotates every record of a collection's active scope.
///
/// A run moves through four steps: the timestamp source is selected and validated,
/// timestamps are extracted per record, weekday/time/day phase are derived, and the
/// output columns are written back. Configuration errors stop the run before the first
/// record is read; no field is declared or written unless every step succeeded.
pub struct BatchAnnotator<E = NoaaEphemeris> {
    config: AnnotateConfig,
    deriver: TimestampDeriver<E>,
}

impl BatchAnnotator<NoaaEphemeris> {
    /// Create an annotator backed by the built-in NOAA ephemeris.
    pub fn new(config: AnnotateConfig) -> Self {
        let deriver = TimestampDeriver::new(config.window);
        Self { config, deriver }
    }
}

impl Default for BatchAnnotator<NoaaEphemeris> {
    fn default() -> Self {
        Self::new(AnnotateConfig::default())
    }
}

impl<E: SolarEphemeris> BatchAnnotator<E> {
    /// Create an annotator with a custom sunrise/sunset source.
    pub fn with_ephemeris(config: AnnotateConfig, ephemeris: E) -> Self {
        let deriver = TimestampDeriver::with_ephemeris(config.window, ephemeris);
        Self { config, deriver }
    }

    /// Annotate the active scope of `collection`.
    ///
    /// # Arguments
    /// * `collection` - Host collection; only its active scope is read and written
    /// * `params` - Invocation parameters (`source`, `pattern`, `geo`, `timezone`)
    ///
    /// # Returns
    /// An [`AnnotateReport`] with record counts and the fields written. Rerunning with the
    /// same parameters on an unchanged collection overwrites the fields with identical values.
    pub fn run<C>(
        &self,
        collection: &mut C,
        params: &AnnotateParams,
    ) -> AnnotationResult<AnnotateReport>
    where
        C: RecordCollection + ?Sized,
    {
        self.run_with_progress(collection, params, |_, _| ControlFlow::Continue(()))
    }

    /// Like [`run`](Self::run), calling `progress(done, total)` before each record.
    ///
    /// Returning [`ControlFlow::Break`] stops the run with
    /// [`AnnotationError::Cancelled`]; nothing is written.
    pub fn run_with_progress<C, F>(
        &self,
        collection: &mut C,
        params: &AnnotateParams,
        mut progress: F,
    ) -> AnnotationResult<AnnotateReport>
    where
        C: RecordCollection + ?Sized,
        F: FnMut(usize, usize) -> ControlFlow<()>,
    {
        let resolved = params.resolve(&self.config)?;
        let ids = collection.scope();
        let total = ids.len();

        info!(
            "Annotating {} records from {} (timezone {}, day phases {})",
            total,
            resolved.source.source(),
            resolved.zone,
            if resolved.geo.is_some() { "on" } else { "off" }
        );

        let mut records = Vec::with_capacity(total);
        let mut skipped = Vec::new();

        for (index, id) in ids.iter().copied().enumerate() {
            if progress(index, total).is_break() {
                info!("Annotation cancelled after {} of {} records", index, total);
                return Err(AnnotationError::Cancelled { processed: index });
            }

            match self.annotate_record(collection, id, &resolved) {
                Ok(record) => records.push(Some(record)),
                Err(err) if err.is_data_error() => {
                    let path = collection.effective_path(id)?;
                    match self.config.failure_policy {
                        FailurePolicy::Abort => return Err(err.for_record(index, path)),
                        FailurePolicy::Skip => {
                            warn!("Skipping record {} ({}): {}", index, path, err);
                            skipped.push(SkippedRecord {
                                index,
                                id,
                                path,
                                reason: err.to_string(),
                            });
                            records.push(None);
                        }
                    }
                }
                Err(err) => return Err(err),
            }
        }

        debug!(
            "Derived {} records, {} skipped",
            total - skipped.len(),
            skipped.len()
        );

        let columns = build_columns(&records, resolved.geo.is_some());
        let fields = self.write_back(collection, &ids, columns)?;

        Ok(AnnotateReport {
            total,
            annotated: total - skipped.len(),
            skipped,
            fields,
        })
    }

    /// Extract and derive a single record.
    fn annotate_record<C>(
        &self,
        collection: &C,
        id: RecordId,
        resolved: &ResolvedParams,
    ) -> AnnotationResult<AnnotationRecord>
    where
        C: RecordCollection + ?Sized,
    {
        let timestamp = match &resolved.source {
            SourcePlan::Filepath(pattern) => {
                let path = collection.effective_path(id)?;
                Timestamp::Naive(pattern.parse(&path)?)
            }
            SourcePlan::CreatedAt => collection.created_at(id)?,
        };

        self.deriver.derive(timestamp, &resolved.zone, resolved.geo)
    }

    /// Declare the output fields, then write every column.
    fn write_back<C>(
        &self,
        collection: &mut C,
        ids: &[RecordId],
        columns: Vec<Column>,
    ) -> AnnotationResult<Vec<&'static str>>
    where
        C: RecordCollection + ?Sized,
    {
        // The schema is left untouched unless every field can be declared
        for column in &columns {
            match collection.field_kind(column.name) {
                Some(declared) if declared != column.kind => {
                    return Err(CollectionError::FieldConflict {
                        field: column.name.to_string(),
                        declared,
                        requested: column.kind,
                    }
                    .into())
                }
                _ => {}
            }
        }
        for column in &columns {
            collection.declare_field(column.name, column.kind)?;
        }

        match self.config.write_strategy {
            WriteStrategy::Bulk => {
                let names = columns.iter().map(|c| c.name).collect();
                for column in columns {
                    debug!(
                        "Writing column '{}' ({} values)",
                        column.name,
                        column.values.len()
                    );
                    collection.write_field(column.name, column.values)?;
                }
                Ok(names)
            }
            WriteStrategy::PerRecord => {
                for (position, id) in ids.iter().enumerate() {
                    for column in &columns {
                        collection.set_field(*id, column.name, column.values[position].clone())?;
                    }
                }
                Ok(columns.iter().map(|c| c.name).collect())
            }
        }
    }
}

fn column<F>(
    records: &[Option<AnnotationRecord>],
    name: &'static str,
    kind: FieldKind,
    value: F,
) -> Column
where
    F: Fn(&AnnotationRecord) -> Option<FieldValue>,
{
    Column {
        name,
        kind,
        values: records
            .iter()
            .map(|record| record.as_ref().and_then(&value))
            .collect(),
    }
}

/// Turn per-record annotations into output columns, preserving record order.
fn build_columns(records: &[Option<AnnotationRecord>], with_phase: bool) -> Vec<Column> {
    let mut columns = vec![
        column(records, FIELD_DATETIME, FieldKind::DateTime, |r| {
            Some(FieldValue::DateTime(r.datetime))
        }),
        column(records, FIELD_WEEKDAY, FieldKind::Int, |r| {
            Some(FieldValue::Int(i64::from(r.weekday)))
        }),
        column(records, FIELD_TIME, FieldKind::Float, |r| {
            Some(FieldValue::Float(r.time))
        }),
    ];

    if with_phase {
        columns.push(column(records, FIELD_TIMEOFDAY, FieldKind::String, |r| {
            r.timeofday
                .map(|phase| FieldValue::String(phase.as_str().to_string()))
        }));
    }

    columns
}

//! Record collection interface.
//!
//! The annotator never owns records. It talks to the host store through
//! [`RecordCollection`], which exposes the active scope (a filtered view or the whole
//! collection), per-record path and creation-time reads, schema declaration and bulk
//! column reads/writes.
//!
//! Column operations are positional: the `n`-th value of a column belongs to the `n`-th
//! id returned by [`RecordCollection::scope`].

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize, Serializer};

use crate::time::Timestamp;

pub mod memory;

pub use memory::{MemoryCollection, Record};

/// Result type for collection operations
pub type CollectionResult<T> = Result<T, CollectionError>;

/// Error type reported by record collections
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CollectionError {
    #[error("Record not found: {0}")]
    RecordNotFound(RecordId),

    #[error("Record {id} has no value for '{field}'")]
    MissingValue { id: RecordId, field: String },

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Field '{field}' is declared as {declared}, cannot redeclare as {requested}")]
    FieldConflict {
        field: String,
        declared: FieldKind,
        requested: FieldKind,
    },

    #[error("Field '{field}' expects {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: FieldKind,
        actual: FieldKind,
    },

    #[error("Column '{field}' has {actual} values for a scope of {expected} records")]
    LengthMismatch {
        field: String,
        expected: usize,
        actual: usize,
    },
}

/// Stable identifier of a record inside its collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(pub usize);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Semantic type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    DateTime,
    Int,
    Float,
    String,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::DateTime => "datetime",
            FieldKind::Int => "int",
            FieldKind::Float => "float",
            FieldKind::String => "string",
        };
        f.write_str(name)
    }
}

/// A field value stored on a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Serialized in RFC 3339 form with a numeric offset, as [`Timestamp`] is.
    #[serde(serialize_with = "serialize_rfc3339")]
    DateTime(DateTime<FixedOffset>),
    Int(i64),
    Float(f64),
    String(String),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::DateTime(_) => FieldKind::DateTime,
            FieldValue::Int(_) => FieldKind::Int,
            FieldValue::Float(_) => FieldKind::Float,
            FieldValue::String(_) => FieldKind::String,
        }
    }

    pub fn as_datetime(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            FieldValue::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(v) => Some(v),
            _ => None,
        }
    }
}

fn serialize_rfc3339<S: Serializer>(
    dt: &DateTime<FixedOffset>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&dt.to_rfc3339())
}

/// Host record store, as seen by the annotator.
pub trait RecordCollection {
    /// Ids of the records in the active scope, in enumeration order.
    fn scope(&self) -> Vec<RecordId>;

    /// Path the record's media is read from (local copy if any, else the stored path).
    fn effective_path(&self, id: RecordId) -> CollectionResult<String>;

    /// Intrinsic creation instant of the record.
    fn created_at(&self, id: RecordId) -> CollectionResult<Timestamp>;

    /// Kind `name` is declared with, if any.
    fn field_kind(&self, name: &str) -> Option<FieldKind>;

    /// Declare `name` on the schema. Redeclaring with the same kind is a no-op.
    fn declare_field(&mut self, name: &str, kind: FieldKind) -> CollectionResult<()>;

    /// Read a column across the active scope.
    fn read_field(&self, name: &str) -> CollectionResult<Vec<Option<FieldValue>>>;

    /// Write a column across the active scope, one value per scoped record.
    fn write_field(&mut self, name: &str, values: Vec<Option<FieldValue>>) -> CollectionResult<()>;

    /// Write a single record's field.
    fn set_field(
        &mut self,
        id: RecordId,
        name: &str,
        value: Option<FieldValue>,
    ) -> CollectionResult<()>;
}

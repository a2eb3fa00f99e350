//! In-memory record collection.
//!
//! Stores records and the field schema in plain `Vec`/`BTreeMap` structures, making it
//! suitable for tests, the command line front end and the Python bindings, where the host
//! hands over plain columns rather than a live store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{CollectionError, CollectionResult, FieldKind, FieldValue, RecordCollection, RecordId};
use crate::time::Timestamp;

/// A dataset record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub filepath: String,
    /// Local copy of remote media, preferred over `filepath` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(default, flatten)]
    pub fields: BTreeMap<String, Option<FieldValue>>,
}

impl Record {
    pub fn new(filepath: impl Into<String>) -> Self {
        Self {
            filepath: filepath.into(),
            ..Default::default()
        }
    }

    pub fn with_local_path(mut self, local_path: impl Into<String>) -> Self {
        self.local_path = Some(local_path.into());
        self
    }

    pub fn with_created_at(mut self, created_at: impl Into<Timestamp>) -> Self {
        self.created_at = Some(created_at.into());
        self
    }

    /// Value of a field, `None` when unset or null.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name).and_then(Option::as_ref)
    }
}

/// In-memory collection with an optional active view.
#[derive(Debug, Clone, Default)]
pub struct MemoryCollection {
    records: Vec<Record>,
    schema: BTreeMap<String, FieldKind>,
    view: Option<Vec<RecordId>>,
}

impl MemoryCollection {
    /// Create a new empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<Record>) -> Self {
        Self {
            records,
            ..Default::default()
        }
    }

    /// Collection with one record per path and no creation times.
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_records(paths.into_iter().map(Record::new).collect())
    }

    /// Load records from a JSON array.
    ///
    /// Keys other than `filepath`, `local_path` and `created_at` become field values; their
    /// kinds are added to the schema.
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        let records: Vec<Record> = serde_json::from_str(json)?;
        let mut schema = BTreeMap::new();
        for value in records.iter().flat_map(|r| r.fields.iter()) {
            if let (name, Some(value)) = value {
                schema.entry(name.clone()).or_insert_with(|| value.kind());
            }
        }
        Ok(Self {
            records,
            schema,
            view: None,
        })
    }

    /// Serialize every record, including annotated fields, as a JSON array.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.records)
    }

    /// Append a record, returning its id.
    pub fn push(&mut self, record: Record) -> RecordId {
        self.records.push(record);
        RecordId(self.records.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn record(&self, id: RecordId) -> Option<&Record> {
        self.records.get(id.0)
    }

    pub fn schema(&self) -> &BTreeMap<String, FieldKind> {
        &self.schema
    }

    /// Restrict the active scope to `ids`, in the given order.
    pub fn with_view(&mut self, ids: Vec<RecordId>) -> CollectionResult<()> {
        if let Some(missing) = ids.iter().find(|id| id.0 >= self.records.len()) {
            return Err(CollectionError::RecordNotFound(*missing));
        }
        self.view = Some(ids);
        Ok(())
    }

    /// Restrict the active scope to the records matching `predicate`.
    pub fn filter_view<F>(&mut self, predicate: F)
    where
        F: Fn(&Record) -> bool,
    {
        let ids = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, record)| predicate(record))
            .map(|(i, _)| RecordId(i))
            .collect();
        self.view = Some(ids);
    }

    /// Make the whole collection the active scope again.
    pub fn clear_view(&mut self) {
        self.view = None;
    }

    fn get(&self, id: RecordId) -> CollectionResult<&Record> {
        self.records
            .get(id.0)
            .ok_or(CollectionError::RecordNotFound(id))
    }

    fn check_value(&self, name: &str, value: &Option<FieldValue>) -> CollectionResult<()> {
        let expected = *self
            .schema
            .get(name)
            .ok_or_else(|| CollectionError::UnknownField(name.to_string()))?;

        match value {
            Some(v) if v.kind() != expected => Err(CollectionError::TypeMismatch {
                field: name.to_string(),
                expected,
                actual: v.kind(),
            }),
            _ => Ok(()),
        }
    }
}

impl RecordCollection for MemoryCollection {
    fn scope(&self) -> Vec<RecordId> {
        match &self.view {
            Some(ids) => ids.clone(),
            None => (0..self.records.len()).map(RecordId).collect(),
        }
    }

    fn effective_path(&self, id: RecordId) -> CollectionResult<String> {
        let record = self.get(id)?;
        Ok(record
            .local_path
            .clone()
            .unwrap_or_else(|| record.filepath.clone()))
    }

    fn created_at(&self, id: RecordId) -> CollectionResult<Timestamp> {
        self.get(id)?
            .created_at
            .ok_or_else(|| CollectionError::MissingValue {
                id,
                field: "created_at".to_string(),
            })
    }

    fn field_kind(&self, name: &str) -> Option<FieldKind> {
        self.schema.get(name).copied()
    }

    fn declare_field(&mut self, name: &str, kind: FieldKind) -> CollectionResult<()> {
        match self.schema.get(name) {
            Some(declared) if *declared != kind => Err(CollectionError::FieldConflict {
                field: name.to_string(),
                declared: *declared,
                requested: kind,
            }),
            Some(_) => Ok(()),
            None => {
                self.schema.insert(name.to_string(), kind);
                Ok(())
            }
        }
    }

    fn read_field(&self, name: &str) -> CollectionResult<Vec<Option<FieldValue>>> {
        if !self.schema.contains_key(name) {
            return Err(CollectionError::UnknownField(name.to_string()));
        }
        self.scope()
            .into_iter()
            .map(|id| Ok(self.get(id)?.field(name).cloned()))
            .collect()
    }

    fn write_field(&mut self, name: &str, values: Vec<Option<FieldValue>>) -> CollectionResult<()> {
        let scope = self.scope();
        if values.len() != scope.len() {
            return Err(CollectionError::LengthMismatch {
                field: name.to_string(),
                expected: scope.len(),
                actual: values.len(),
            });
        }

        // Validate the whole column before touching any record
        for value in &values {
            self.check_value(name, value)?;
        }

        for (id, value) in scope.into_iter().zip(values) {
            let record = self
                .records
                .get_mut(id.0)
                .ok_or(CollectionError::RecordNotFound(id))?;
            record.fields.insert(name.to_string(), value);
        }
        Ok(())
    }

    fn set_field(
        &mut self,
        id: RecordId,
        name: &str,
        value: Option<FieldValue>,
    ) -> CollectionResult<()> {
        self.check_value(name, &value)?;
        let record = self
            .records
            .get_mut(id.0)
            .ok_or(CollectionError::RecordNotFound(id))?;
        record.fields.insert(name.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MemoryCollection {
        MemoryCollection::from_records(vec![
            Record::new("s3://bucket/a_2023-01-01_.jpg").with_local_path("/tmp/a_2023-01-01_.jpg"),
            Record::new("/data/b_2023-01-02_.jpg"),
            Record::new("/data/c_2023-01-03_.jpg"),
        ])
    }

    #[test]
    fn test_effective_path_prefers_local_copy() {
        let collection = sample();
        assert_eq!(
            collection.effective_path(RecordId(0)).unwrap(),
            "/tmp/a_2023-01-01_.jpg"
        );
        assert_eq!(
            collection.effective_path(RecordId(1)).unwrap(),
            "/data/b_2023-01-02_.jpg"
        );
        assert_eq!(
            collection.effective_path(RecordId(9)),
            Err(CollectionError::RecordNotFound(RecordId(9)))
        );
    }

    #[test]
    fn test_view_controls_scope_and_column_order() {
        let mut collection = sample();
        collection.declare_field("weekday", FieldKind::Int).unwrap();
        collection
            .with_view(vec![RecordId(2), RecordId(0)])
            .unwrap();

        collection
            .write_field(
                "weekday",
                vec![Some(FieldValue::Int(2)), Some(FieldValue::Int(0))],
            )
            .unwrap();

        assert_eq!(
            collection.record(RecordId(2)).unwrap().field("weekday"),
            Some(&FieldValue::Int(2))
        );
        assert_eq!(
            collection.record(RecordId(0)).unwrap().field("weekday"),
            Some(&FieldValue::Int(0))
        );
        assert_eq!(
            collection.record(RecordId(1)).unwrap().field("weekday"),
            None
        );

        collection.clear_view();
        let column = collection.read_field("weekday").unwrap();
        assert_eq!(
            column,
            vec![Some(FieldValue::Int(0)), None, Some(FieldValue::Int(2))]
        );
    }

    #[test]
    fn test_write_field_is_validated_before_writing() {
        let mut collection = sample();
        collection.declare_field("time", FieldKind::Float).unwrap();

        let err = collection
            .write_field(
                "time",
                vec![Some(FieldValue::Float(1.0)), Some(FieldValue::Int(2)), None],
            )
            .unwrap_err();
        assert!(matches!(err, CollectionError::TypeMismatch { .. }));
        assert_eq!(collection.record(RecordId(0)).unwrap().field("time"), None);

        let err = collection
            .write_field("time", vec![Some(FieldValue::Float(1.0))])
            .unwrap_err();
        assert!(matches!(
            err,
            CollectionError::LengthMismatch {
                expected: 3,
                actual: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_declare_field_conflicts() {
        let mut collection = sample();
        collection.declare_field("time", FieldKind::Float).unwrap();
        collection.declare_field("time", FieldKind::Float).unwrap();
        assert!(matches!(
            collection.declare_field("time", FieldKind::String),
            Err(CollectionError::FieldConflict { .. })
        ));
        assert!(matches!(
            collection.read_field("missing"),
            Err(CollectionError::UnknownField(_))
        ));
    }

    #[test]
    fn test_filter_view() {
        let mut collection = sample();
        collection.filter_view(|r| r.filepath.starts_with("/data"));
        assert_eq!(collection.scope(), vec![RecordId(1), RecordId(2)]);
    }

    #[test]
    fn test_json_roundtrip_keeps_fields() {
        let json = r#"[
            {"filepath": "/a.jpg", "created_at": "2023-06-21T10:00:00Z", "label": "cat"},
            {"filepath": "/b.jpg", "local_path": "/cache/b.jpg"}
        ]"#;

        let collection = MemoryCollection::from_json_str(json).unwrap();
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.schema().get("label"), Some(&FieldKind::String));
        assert!(collection.created_at(RecordId(0)).unwrap().is_aware());
        assert!(matches!(
            collection.created_at(RecordId(1)),
            Err(CollectionError::MissingValue { .. })
        ));

        let out = collection.to_json_pretty().unwrap();
        assert!(out.contains("\"label\": \"cat\""));
        assert!(out.contains("/cache/b.jpg"));
    }
}

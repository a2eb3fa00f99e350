//! Configuration file loading with real files on disk.

mod support;

use std::fs;

use tempfile::TempDir;

use daystamp_rust::annotation::{AnnotateParams, BatchAnnotator, FIELD_WEEKDAY};
use daystamp_rust::collection::{FieldValue, MemoryCollection};
use daystamp_rust::config::{AnnotateConfig, FailurePolicy, WriteStrategy, CONFIG_FILE_NAME};
use daystamp_rust::error::AnnotationError;

use support::{column, with_current_dir};

const CONFIG: &str = r#"
pattern = '(\d{4})(\d{2})(\d{2})T(\d{2})?(\d{2})?(\d{2})?'
timezone = "America/New_York"
failure_policy = "skip"
write_strategy = "per_record"

[window]
dawn_minutes = 0
dusk_minutes = 0
"#;

#[test]
fn test_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("custom.toml");
    fs::write(&path, CONFIG).unwrap();

    let config = AnnotateConfig::from_file(&path).unwrap();
    assert_eq!(config.timezone, "America/New_York");
    assert_eq!(config.failure_policy, FailurePolicy::Skip);
    assert_eq!(config.write_strategy, WriteStrategy::PerRecord);
    assert!(!config.window.has_twilight());
    assert_eq!(config.window.morning_minutes, 60);
}

#[test]
fn test_missing_file_is_a_config_error() {
    let dir = TempDir::new().unwrap();
    let err = AnnotateConfig::from_file(dir.path().join("absent.toml")).unwrap_err();

    assert!(matches!(err, AnnotationError::Config(_)));
    assert!(err.is_configuration());
}

#[test]
fn test_default_location_lookup() {
    let dir = TempDir::new().unwrap();

    let config = with_current_dir(dir.path(), AnnotateConfig::from_default_location).unwrap();
    assert_eq!(config, AnnotateConfig::default());

    fs::write(dir.path().join(CONFIG_FILE_NAME), CONFIG).unwrap();
    let config = with_current_dir(dir.path(), AnnotateConfig::from_default_location).unwrap();
    assert_eq!(config.timezone, "America/New_York");
}

#[test]
fn test_configured_pattern_and_policy_drive_a_run() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    fs::write(&path, CONFIG).unwrap();
    let config = AnnotateConfig::from_file(&path).unwrap();

    let mut collection =
        MemoryCollection::from_paths(["scan_20230704T0915.tif", "scan_undated.tif"]);
    let params = AnnotateParams::new("filepath").with_pattern(config.pattern.clone());

    let report = BatchAnnotator::new(config)
        .run(&mut collection, &params)
        .unwrap();

    assert_eq!(report.skipped.len(), 1);
    assert_eq!(
        column(&collection, FIELD_WEEKDAY),
        vec![Some(FieldValue::Int(1)), None]
    );
    let datetime = column(&collection, "datetime")[0]
        .as_ref()
        .and_then(FieldValue::as_datetime)
        .unwrap();
    assert_eq!(datetime.to_rfc3339(), "2023-07-04T09:15:00-04:00");
}

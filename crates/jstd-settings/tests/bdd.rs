//! BDD-style scenario tests for jstd-settings.
//!
//! Scenarios cover host key/value properties, TOML files and the
//! activation check.

use std::collections::BTreeMap;
use std::path::Path;

use jstd_settings::*;

fn props(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// =============================================================================
// Scenario: activation
// =============================================================================

#[test]
fn given_no_framework_property_when_loaded_then_sensor_is_not_activated() {
    let settings = SensorSettings::from_properties(&BTreeMap::new()).unwrap();
    assert!(!settings.is_jstestdriver());
}

#[test]
fn given_jstestdriver_framework_when_loaded_then_sensor_is_activated() {
    let settings =
        SensorSettings::from_properties(&props(&[(TEST_FRAMEWORK_KEY, "jstestdriver")])).unwrap();
    assert!(settings.is_jstestdriver());
}

#[test]
fn given_framework_with_different_case_when_loaded_then_sensor_is_not_activated() {
    let settings =
        SensorSettings::from_properties(&props(&[(TEST_FRAMEWORK_KEY, "JsTestDriver")])).unwrap();
    assert!(!settings.is_jstestdriver());
}

// =============================================================================
// Scenario: key/value properties
// =============================================================================

#[test]
fn given_default_folder_property_when_loaded_then_folder_matches_default() {
    let settings =
        SensorSettings::from_properties(&props(&[(REPORT_FOLDER_KEY, DEFAULT_REPORT_FOLDER)]))
            .unwrap();
    assert_eq!(settings.report_folder, "target/jstestdriver");
}

#[test]
fn given_unknown_keys_when_loaded_then_they_are_ignored() {
    let settings =
        SensorSettings::from_properties(&props(&[("sonar.projectKey", "demo")])).unwrap();
    assert_eq!(settings, SensorSettings::default());
}

#[test]
fn given_settings_when_flattened_and_reloaded_then_they_are_equal() {
    let original = SensorSettings {
        test_framework: Some("jstestdriver".into()),
        report_folder: "out/jstd".into(),
        test_dirs: vec!["test".into(), "spec/unit".into()],
        source_encoding: Some("UTF-16LE".into()),
        recursive: true,
    };
    let back = SensorSettings::from_properties(&original.to_properties()).unwrap();
    assert_eq!(back, original);
}

#[test]
fn given_invalid_recursive_flag_when_loaded_then_error_names_value() {
    let err = SensorSettings::from_properties(&props(&[(RECURSIVE_KEY, "maybe")])).unwrap_err();
    assert!(err.to_string().contains("maybe"));
}

// =============================================================================
// Scenario: TOML
// =============================================================================

#[test]
fn given_toml_file_when_loaded_then_all_fields_are_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jstd.toml");
    std::fs::write(
        &path,
        r#"
test_framework = "jstestdriver"
report_folder = "reports"
test_dirs = ["test"]
source_encoding = "windows-1252"
recursive = true
"#,
    )
    .unwrap();

    let settings = SensorSettings::from_file(&path).unwrap();
    assert!(settings.is_jstestdriver());
    assert_eq!(settings.report_folder, "reports");
    assert_eq!(settings.test_dirs, vec!["test"]);
    assert_eq!(settings.source_encoding.as_deref(), Some("windows-1252"));
    assert!(settings.recursive);
}

#[test]
fn given_missing_toml_file_when_loaded_then_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = SensorSettings::from_file(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, SettingsError::Io(_)));
}

#[test]
fn given_malformed_toml_when_loaded_then_toml_error() {
    let err = SensorSettings::parse("recursive = \"not a bool\"").unwrap_err();
    assert!(matches!(err, SettingsError::Toml(_)));
}

// =============================================================================
// Scenario: report folder resolution
// =============================================================================

#[test]
fn given_absolute_report_folder_when_resolved_then_base_dir_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let settings = SensorSettings {
        report_folder: dir.path().to_string_lossy().to_string(),
        ..Default::default()
    };
    assert_eq!(settings.report_dir(Path::new("elsewhere")), dir.path());
}

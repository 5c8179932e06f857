//! # jstd-settings
//!
//! **Tier 0 (Pure Settings)**
//!
//! Settings consumed by the JsTestDriver sensor. The host hands them over
//! either as flat key/value properties or as a TOML document.
//!
//! ## What belongs here
//! * Property keys and their defaults
//! * `SensorSettings` with Serde derive
//! * Key/value and TOML conversions
//!
//! ## What does NOT belong here
//! * Report discovery or parsing
//! * Sensor activation logic (use jstd-sensor)

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Property selecting the JavaScript test framework.
pub const TEST_FRAMEWORK_KEY: &str = "sonar.javascript.testframework";

/// Value of [`TEST_FRAMEWORK_KEY`] that activates this sensor.
pub const JSTESTDRIVER_FRAMEWORK: &str = "jstestdriver";

/// Property holding the report folder, relative to the project base directory.
pub const REPORT_FOLDER_KEY: &str = "sonar.javascript.jstestdriver.reportsfolder";

/// Report folder used when none is configured.
pub const DEFAULT_REPORT_FOLDER: &str = "target/jstestdriver";

/// Comma-separated list of test source directories.
pub const TEST_DIRS_KEY: &str = "sonar.tests";

/// Character encoding of the test source files.
pub const SOURCE_ENCODING_KEY: &str = "sonar.sourceEncoding";

/// Whether report discovery descends into subdirectories.
pub const RECURSIVE_KEY: &str = "sonar.javascript.jstestdriver.recursive";

/// Errors from loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse settings TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid value '{value}' for property {key}")]
    InvalidValue { key: String, value: String },
}

/// Settings for the JsTestDriver report sensor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorSettings {
    /// Configured test framework; the sensor runs only for `jstestdriver`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_framework: Option<String>,

    /// Report folder, relative to the project base directory unless absolute.
    pub report_folder: String,

    /// Test source directories. Empty means "use the project's test dirs".
    pub test_dirs: Vec<String>,

    /// Source encoding label; overrides the project charset when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_encoding: Option<String>,

    /// Descend into subdirectories of the report folder.
    pub recursive: bool,
}

impl Default for SensorSettings {
    fn default() -> Self {
        Self {
            test_framework: None,
            report_folder: DEFAULT_REPORT_FOLDER.to_string(),
            test_dirs: Vec::new(),
            source_encoding: None,
            recursive: false,
        }
    }
}

impl SensorSettings {
    /// Default settings with the framework set to `jstestdriver`.
    pub fn jstestdriver() -> Self {
        Self {
            test_framework: Some(JSTESTDRIVER_FRAMEWORK.to_string()),
            ..Default::default()
        }
    }

    /// True when the configured framework is exactly `jstestdriver`.
    pub fn is_jstestdriver(&self) -> bool {
        is_jstestdriver_framework(self.test_framework.as_deref())
    }

    /// Build settings from host key/value properties.
    ///
    /// Unknown keys are ignored and blank values count as unset.
    pub fn from_properties(props: &BTreeMap<String, String>) -> Result<Self, SettingsError> {
        let mut settings = Self::default();
        let get = |key: &str| {
            props
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };

        settings.test_framework = get(TEST_FRAMEWORK_KEY).map(str::to_string);
        if let Some(folder) = get(REPORT_FOLDER_KEY) {
            settings.report_folder = folder.to_string();
        }
        if let Some(dirs) = get(TEST_DIRS_KEY) {
            settings.test_dirs = split_list(dirs);
        }
        settings.source_encoding = get(SOURCE_ENCODING_KEY).map(str::to_string);
        if let Some(value) = get(RECURSIVE_KEY) {
            settings.recursive = parse_bool(RECURSIVE_KEY, value)?;
        }
        Ok(settings)
    }

    /// Flatten into host key/value properties.
    pub fn to_properties(&self) -> BTreeMap<String, String> {
        let mut props = BTreeMap::new();
        if let Some(framework) = &self.test_framework {
            props.insert(TEST_FRAMEWORK_KEY.to_string(), framework.clone());
        }
        props.insert(REPORT_FOLDER_KEY.to_string(), self.report_folder.clone());
        if !self.test_dirs.is_empty() {
            props.insert(TEST_DIRS_KEY.to_string(), self.test_dirs.join(","));
        }
        if let Some(encoding) = &self.source_encoding {
            props.insert(SOURCE_ENCODING_KEY.to_string(), encoding.clone());
        }
        props.insert(RECURSIVE_KEY.to_string(), self.recursive.to_string());
        props
    }

    /// Load settings from a TOML string.
    pub fn parse(s: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(s)?)
    }

    /// Load settings from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Resolve the report folder against the project base directory.
    pub fn report_dir(&self, base_dir: &Path) -> PathBuf {
        let folder = Path::new(&self.report_folder);
        if folder.is_absolute() {
            folder.to_path_buf()
        } else {
            base_dir.join(folder)
        }
    }
}

/// True when a configured test framework value selects JsTestDriver.
/// Surrounding whitespace is ignored.
pub fn is_jstestdriver_framework(framework: Option<&str>) -> bool {
    framework.map(str::trim) == Some(JSTESTDRIVER_FRAMEWORK)
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(key: &str, value: &str) -> Result<bool, SettingsError> {
    match value.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(SettingsError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

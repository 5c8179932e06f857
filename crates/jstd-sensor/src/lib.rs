//! # jstd-sensor
//!
//! **Tier 3 (Sensor)**
//!
//! Defines the `Sensor` and `MeasureSink` contracts with the host platform
//! and the JsTestDriver sensor that turns surefire XML reports into per-file
//! test metrics.
//!
//! ## What belongs here
//! * `Sensor` trait and the host `Project` view
//! * `MeasureSink` trait and an in-memory sink
//! * `ReportIngestor` and `JsTestDriverSensor`
//!
//! ## What does NOT belong here
//! * XML parsing (use jstd-parsing)
//! * Plugin registration or CLI parsing

pub mod charset;
pub mod ingest;
pub mod sink;

use std::fmt;
use std::path::PathBuf;

use anyhow::Result;
use jstd_settings::SensorSettings;
use tracing::debug;

pub use charset::SourceDecoder;
pub use ingest::{
    DirectoryReportSource, IngestIssue, IngestOutcome, ReportEntry, ReportIngestor, ReportSource,
    should_run,
};
pub use sink::{MeasureSink, MemorySink, SavedMeasure};

/// Charset used when the host does not name one.
pub const DEFAULT_SOURCE_CHARSET: &str = "UTF-8";

/// The host's view of the project under analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    /// Language key of the project, e.g. `js`; `None` when unset.
    pub language: Option<String>,
    /// Directory relative settings paths resolve against.
    pub base_dir: PathBuf,
    /// Test source directories known to the host.
    pub test_dirs: Vec<PathBuf>,
    /// Encoding label of the source files.
    pub source_charset: String,
}

impl Project {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            language: None,
            base_dir: base_dir.into(),
            test_dirs: Vec::new(),
            source_charset: DEFAULT_SOURCE_CHARSET.to_string(),
        }
    }

    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    #[must_use]
    pub fn with_test_dirs(mut self, test_dirs: Vec<PathBuf>) -> Self {
        self.test_dirs = test_dirs;
        self
    }

    #[must_use]
    pub fn with_source_charset(mut self, charset: impl Into<String>) -> Self {
        self.source_charset = charset.into();
        self
    }
}

/// A sensor the host runs once per analysis.
///
/// The host asks [`Sensor::should_execute_on_project`] first and only
/// calls [`Sensor::analyse`] when it returns true.
pub trait Sensor {
    /// Sensor name shown in host logs.
    fn name(&self) -> &str;

    /// Whether this sensor applies to `project`. Must not have side effects.
    fn should_execute_on_project(&self, project: &Project) -> bool;

    /// Compute measures for `project` and hand them to `sink`.
    ///
    /// Only sink failures are returned as errors.
    fn analyse(&self, project: &Project, sink: &mut dyn MeasureSink) -> Result<()>;
}

/// Reads JsTestDriver surefire reports and reports test metrics per test file.
#[derive(Debug, Clone, Default)]
pub struct JsTestDriverSensor {
    settings: SensorSettings,
}

impl JsTestDriverSensor {
    pub const NAME: &'static str = "JsTestDriverSurefireSensor";

    pub fn new(settings: SensorSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &SensorSettings {
        &self.settings
    }

    /// Test directories to search: configured ones (relative to the base
    /// directory) when present, else the project's.
    fn test_dirs(&self, project: &Project) -> Vec<PathBuf> {
        if self.settings.test_dirs.is_empty() {
            return project.test_dirs.clone();
        }
        self.settings
            .test_dirs
            .iter()
            .map(|dir| project.base_dir.join(dir))
            .collect()
    }

    fn source_charset<'a>(&'a self, project: &'a Project) -> &'a str {
        self.settings
            .source_encoding
            .as_deref()
            .unwrap_or(&project.source_charset)
    }

    /// Run ingestion for `project` without emitting anything.
    pub fn ingest(&self, project: &Project) -> IngestOutcome {
        let report_dir = self.settings.report_dir(&project.base_dir);
        ReportIngestor::new()
            .recursive(self.settings.recursive)
            .ingest(&report_dir, &self.test_dirs(project), self.source_charset(project))
    }
}

impl Sensor for JsTestDriverSensor {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn should_execute_on_project(&self, project: &Project) -> bool {
        ingest::is_js_project(project.language.as_deref()) && self.settings.is_jstestdriver()
    }

    fn analyse(&self, project: &Project, sink: &mut dyn MeasureSink) -> Result<()> {
        let outcome = self.ingest(project);
        debug!(
            resources = outcome.buckets.len(),
            issues = outcome.issues.len(),
            "JsTestDriver ingestion finished"
        );
        outcome.emit(sink)
    }
}

impl fmt::Display for JsTestDriverSensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Self::NAME)
    }
}

//! Report ingestion: from a report folder to per-source metric buckets.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use jstd_parsing::ReportError;
use jstd_types::{LANGUAGE_KEY, SourceMetricBucket, TestReport};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::charset::SourceDecoder;
use crate::sink::MeasureSink;

/// True when the project is JavaScript and the framework is `jstestdriver`.
pub fn should_run(project_language: Option<&str>, configured_test_framework: Option<&str>) -> bool {
    is_js_project(project_language)
        && jstd_settings::is_jstestdriver_framework(configured_test_framework)
}

pub(crate) fn is_js_project(project_language: Option<&str>) -> bool {
    project_language.map(str::trim) == Some(LANGUAGE_KEY)
}

/// One report file and what parsing it produced.
#[derive(Debug)]
pub struct ReportEntry {
    pub origin: PathBuf,
    pub parsed: Result<Vec<TestReport>, ReportError>,
}

/// Anything that can hand over parsed reports.
pub trait ReportSource {
    fn reports(&self) -> Result<Vec<ReportEntry>>;
}

/// Reports found on disk under one folder.
#[derive(Debug, Clone)]
pub struct DirectoryReportSource {
    dir: PathBuf,
    recursive: bool,
}

impl DirectoryReportSource {
    pub fn new(dir: impl Into<PathBuf>, recursive: bool) -> Self {
        Self {
            dir: dir.into(),
            recursive,
        }
    }
}

impl ReportSource for DirectoryReportSource {
    fn reports(&self) -> Result<Vec<ReportEntry>> {
        let files = jstd_walk::list_reports(&self.dir, self.recursive)?;
        info!(dir = %self.dir.display(), files = files.len(), "reading JsTestDriver reports");
        Ok(files
            .into_iter()
            .map(|path| {
                let parsed = jstd_parsing::parse_report_file(&path);
                ReportEntry {
                    origin: path,
                    parsed,
                }
            })
            .collect())
    }
}

/// Something that went wrong without stopping ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IngestIssue {
    /// A report or test directory does not exist.
    MissingDirectory { path: PathBuf },
    /// The report source could not be listed.
    ReportListingFailed { reason: String },
    /// A report file could not be parsed and was skipped.
    MalformedReport { path: PathBuf, reason: String },
    /// No test directory holds the demangled source path.
    UnresolvedSource { resource: String },
    /// The matched source file could not be read.
    UnreadableSource { path: PathBuf, reason: String },
    /// The configured charset label is unknown; UTF-8 was used.
    UnknownCharset { label: String },
}

/// Result of one ingestion pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestOutcome {
    /// Buckets keyed by resolved source path.
    pub buckets: BTreeMap<String, SourceMetricBucket>,
    pub issues: Vec<IngestIssue>,
    /// Report files successfully parsed.
    pub reports_read: usize,
}

impl IngestOutcome {
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn bucket(&self, path: &str) -> Option<&SourceMetricBucket> {
        self.buckets.get(path)
    }

    /// Hand every bucket to the sink: all metrics, then the source listing
    /// when one was found, then the per-case details.
    pub fn emit(&self, sink: &mut dyn MeasureSink) -> Result<()> {
        for bucket in self.buckets.values() {
            let resource = bucket.resource();
            for (metric, value) in bucket.measures() {
                sink.save_measure(&resource, metric, value)?;
            }
            if let Some(source) = &bucket.source {
                sink.save_source(&resource, source)?;
            }
            sink.save_test_data(&resource, &bucket.cases)?;
        }
        Ok(())
    }
}

/// Turns a folder of JsTestDriver reports into per-source metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportIngestor {
    recursive: bool,
}

impl ReportIngestor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also read reports in subdirectories of the report folder.
    #[must_use]
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Ingest every report in `report_dir`.
    ///
    /// Never fails: problems are logged and collected as
    /// [`IngestIssue`]s, and whatever could be read is returned.
    pub fn ingest(
        &self,
        report_dir: &Path,
        test_dirs: &[PathBuf],
        source_charset: &str,
    ) -> IngestOutcome {
        if !report_dir.is_dir() {
            info!(dir = %report_dir.display(), "report folder not found, nothing to ingest");
            return IngestOutcome {
                issues: vec![IngestIssue::MissingDirectory {
                    path: report_dir.to_path_buf(),
                }],
                ..Default::default()
            };
        }
        let source = DirectoryReportSource::new(report_dir, self.recursive);
        self.ingest_from(&source, test_dirs, source_charset)
    }

    /// Ingest reports from any [`ReportSource`].
    pub fn ingest_from(
        &self,
        source: &dyn ReportSource,
        test_dirs: &[PathBuf],
        source_charset: &str,
    ) -> IngestOutcome {
        let mut outcome = IngestOutcome::default();

        let entries = match source.reports() {
            Ok(entries) => entries,
            Err(err) => {
                warn!(error = %err, "failed to list JsTestDriver reports");
                outcome.issues.push(IngestIssue::ReportListingFailed {
                    reason: format!("{err:#}"),
                });
                return outcome;
            }
        };

        for entry in entries {
            match entry.parsed {
                Ok(reports) => {
                    debug!(
                        file = %entry.origin.display(),
                        reports = reports.len(),
                        "parsed report"
                    );
                    outcome.reports_read += 1;
                    for report in reports {
                        let path = jstd_path::demangle(&report.identifier);
                        outcome
                            .buckets
                            .entry(path.clone())
                            .or_insert_with(|| SourceMetricBucket::new(path))
                            .record_report(report);
                    }
                }
                Err(err) => {
                    warn!(file = %entry.origin.display(), error = %err, "skipping malformed report");
                    outcome.issues.push(IngestIssue::MalformedReport {
                        path: entry.origin,
                        reason: err.to_string(),
                    });
                }
            }
        }

        if !outcome.buckets.is_empty() {
            attach_sources(&mut outcome, test_dirs, source_charset);
        }
        outcome
    }
}

fn attach_sources(outcome: &mut IngestOutcome, test_dirs: &[PathBuf], source_charset: &str) {
    let decoder = SourceDecoder::for_label(source_charset).unwrap_or_else(|| {
        warn!(charset = source_charset, "unknown source charset, falling back to UTF-8");
        outcome.issues.push(IngestIssue::UnknownCharset {
            label: source_charset.to_string(),
        });
        SourceDecoder::utf8()
    });

    for dir in test_dirs.iter().filter(|d| !d.is_dir()) {
        debug!(dir = %dir.display(), "test directory not found");
        outcome
            .issues
            .push(IngestIssue::MissingDirectory { path: dir.clone() });
    }

    for bucket in outcome.buckets.values_mut() {
        let Some(file) = jstd_walk::find_test_source(test_dirs, &bucket.path) else {
            debug!(resource = %bucket.path, "no test source found for report");
            outcome.issues.push(IngestIssue::UnresolvedSource {
                resource: bucket.path.clone(),
            });
            continue;
        };
        match decoder.read(&file) {
            Ok(text) => bucket.source = Some(text),
            Err(err) => {
                warn!(file = %file.display(), error = %err, "failed to read test source");
                outcome.issues.push(IngestIssue::UnreadableSource {
                    path: file,
                    reason: format!("{err:#}"),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jstd_types::{TestCaseResult, TestStatus};

    struct FixedSource(Vec<(&'static str, Vec<TestReport>)>);

    impl ReportSource for FixedSource {
        fn reports(&self) -> Result<Vec<ReportEntry>> {
            Ok(self
                .0
                .iter()
                .map(|(origin, reports)| ReportEntry {
                    origin: PathBuf::from(origin),
                    parsed: Ok(reports.clone()),
                })
                .collect())
        }
    }

    fn report(id: &str, statuses: &[TestStatus]) -> TestReport {
        TestReport {
            identifier: id.to_string(),
            cases: statuses
                .iter()
                .map(|s| TestCaseResult::new("t", *s, 10))
                .collect(),
        }
    }

    #[test]
    fn should_run_requires_language_and_framework() {
        assert!(!should_run(None, None));
        assert!(!should_run(Some("js"), None));
        assert!(!should_run(Some("js"), Some("jasmine")));
        assert!(!should_run(None, Some("jstestdriver")));
        assert!(!should_run(Some("java"), Some("jstestdriver")));
        assert!(should_run(Some("js"), Some("jstestdriver")));
    }

    #[test]
    fn reports_for_same_class_share_a_bucket() {
        let source = FixedSource(vec![
            (
                "TEST-chrome.xml",
                vec![report("Chrome_1_Windows.a.PersonTest", &[TestStatus::Ok])],
            ),
            (
                "TEST-firefox.xml",
                vec![report(
                    "Firefox_2_Linux.a.PersonTest",
                    &[TestStatus::Failure, TestStatus::Skipped],
                )],
            ),
        ]);
        let outcome = ReportIngestor::new().ingest_from(&source, &[], "UTF-8");

        assert_eq!(outcome.buckets.len(), 1);
        let bucket = outcome.bucket("a/PersonTest.js").unwrap();
        assert_eq!(bucket.tests, 3);
        assert_eq!(bucket.failures, 1);
        assert_eq!(bucket.skipped, 1);
        assert_eq!(bucket.execution_time_ms, 30);
        assert_eq!(outcome.reports_read, 2);
        assert_eq!(
            outcome.issues,
            vec![IngestIssue::UnresolvedSource {
                resource: "a/PersonTest.js".to_string()
            }]
        );
    }

    #[test]
    fn empty_source_emits_nothing() {
        let outcome = ReportIngestor::new().ingest_from(&FixedSource(vec![]), &[], "bogus");
        assert!(outcome.is_empty());
        assert!(outcome.issues.is_empty());
    }

    #[test]
    fn issues_serialize_with_kind_tag() {
        let issue = IngestIssue::UnknownCharset {
            label: "klingon".into(),
        };
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"kind": "unknown_charset", "label": "klingon"})
        );
    }

    struct BrokenSource;

    impl ReportSource for BrokenSource {
        fn reports(&self) -> Result<Vec<ReportEntry>> {
            anyhow::bail!("permission denied")
        }
    }

    #[test]
    fn listing_failure_degrades_to_empty_outcome() {
        let outcome = ReportIngestor::new().ingest_from(&BrokenSource, &[], "UTF-8");
        assert!(outcome.is_empty());
        assert!(matches!(
            outcome.issues.as_slice(),
            [IngestIssue::ReportListingFailed { .. }]
        ));
    }
}

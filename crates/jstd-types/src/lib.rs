//! # jstd-types
//!
//! **Tier 0 (Core Types)**
//!
//! Data structures shared by every jstd crate: parsed test reports, the
//! per-source metric buckets they aggregate into, and the metric and
//! resource identifiers handed to the host sink.
//!
//! ## What belongs here
//! * Pure data structs with Serde derive
//! * Aggregation arithmetic on buckets
//! * Metric keys and resource descriptors
//!
//! ## What does NOT belong here
//! * File I/O or XML parsing (use jstd-parsing)
//! * Identifier demangling (use jstd-path)
//! * Sensor orchestration (use jstd-sensor)

use std::fmt;

use serde::{Deserialize, Serialize};

/// Language key of the resources this sensor reports on.
pub const LANGUAGE_KEY: &str = "js";

/// Outcome of a single test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    /// The case passed.
    #[default]
    Ok,
    /// An assertion failed.
    Failure,
    /// The case threw an unexpected error.
    Error,
    /// The case did not run.
    Skipped,
}

impl TestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestStatus::Ok => "ok",
            TestStatus::Failure => "failure",
            TestStatus::Error => "error",
            TestStatus::Skipped => "skipped",
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One executed test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCaseResult {
    pub name: String,
    pub status: TestStatus,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
    /// Failure, error or skip message when the report carried one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl TestCaseResult {
    pub fn new(name: impl Into<String>, status: TestStatus, duration_ms: u64) -> Self {
        Self {
            name: name.into(),
            status,
            duration_ms,
            message: None,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Test cases that share one report identifier.
///
/// The identifier encodes the browser, build, OS and fully qualified test
/// class, e.g. `Chrome_16091263_Windows.com.company.PersonTest`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TestReport {
    pub identifier: String,
    pub cases: Vec<TestCaseResult>,
}

impl TestReport {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            cases: Vec::new(),
        }
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.cases.iter().map(|c| c.duration_ms).sum()
    }
}

/// Measures emitted for each resolved source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Tests,
    SkippedTests,
    TestErrors,
    TestFailures,
    TestExecutionTime,
    TestSuccessDensity,
}

impl Metric {
    /// Every metric, in emission order.
    pub const ALL: [Metric; 6] = [
        Metric::Tests,
        Metric::SkippedTests,
        Metric::TestErrors,
        Metric::TestFailures,
        Metric::TestExecutionTime,
        Metric::TestSuccessDensity,
    ];

    /// Host-facing metric key.
    pub fn key(&self) -> &'static str {
        match self {
            Metric::Tests => "tests",
            Metric::SkippedTests => "skipped_tests",
            Metric::TestErrors => "test_errors",
            Metric::TestFailures => "test_failures",
            Metric::TestExecutionTime => "test_execution_time",
            Metric::TestSuccessDensity => "test_success_density",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Kind of resource a measure is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Qualifier {
    #[default]
    UnitTestFile,
}

/// A host resource: the test source file a bucket resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resource {
    /// Relative path with forward slashes, e.g. `com/company/PersonTest.js`.
    pub key: String,
    pub language: String,
    pub qualifier: Qualifier,
}

impl Resource {
    pub fn unit_test_file(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            language: LANGUAGE_KEY.to_string(),
            qualifier: Qualifier::UnitTestFile,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

/// Aggregated counters for every test case that resolved to one source path.
///
/// `tests` always equals `skipped + errors + failures + passed()`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceMetricBucket {
    /// Resolved relative source path (forward slashes).
    pub path: String,
    pub tests: u64,
    pub skipped: u64,
    pub errors: u64,
    pub failures: u64,
    pub execution_time_ms: u64,
    /// The cases counted above, in ingestion order.
    #[serde(default)]
    pub cases: Vec<TestCaseResult>,
    /// Decoded text of the matched source file, if one was found.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl SourceMetricBucket {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Count one case against this bucket.
    pub fn record(&mut self, case: TestCaseResult) {
        self.tests += 1;
        match case.status {
            TestStatus::Ok => {}
            TestStatus::Skipped => self.skipped += 1,
            TestStatus::Error => self.errors += 1,
            TestStatus::Failure => self.failures += 1,
        }
        self.execution_time_ms = self.execution_time_ms.saturating_add(case.duration_ms);
        self.cases.push(case);
    }

    /// Count every case of a report against this bucket.
    pub fn record_report(&mut self, report: TestReport) {
        for case in report.cases {
            self.record(case);
        }
    }

    /// Fold another bucket for the same path into this one.
    ///
    /// The source text of `self` wins when both carry one.
    pub fn merge(&mut self, other: SourceMetricBucket) {
        self.tests += other.tests;
        self.skipped += other.skipped;
        self.errors += other.errors;
        self.failures += other.failures;
        self.execution_time_ms = self
            .execution_time_ms
            .saturating_add(other.execution_time_ms);
        self.cases.extend(other.cases);
        if self.source.is_none() {
            self.source = other.source;
        }
    }

    pub fn passed(&self) -> u64 {
        self.tests
            .saturating_sub(self.skipped + self.errors + self.failures)
    }

    pub fn success_density(&self) -> f64 {
        jstd_math::success_density(self.tests, self.errors, self.failures)
    }

    /// Value of a single metric for this bucket.
    pub fn measure(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Tests => self.tests as f64,
            Metric::SkippedTests => self.skipped as f64,
            Metric::TestErrors => self.errors as f64,
            Metric::TestFailures => self.failures as f64,
            Metric::TestExecutionTime => self.execution_time_ms as f64,
            Metric::TestSuccessDensity => self.success_density(),
        }
    }

    /// All metrics in emission order.
    pub fn measures(&self) -> Vec<(Metric, f64)> {
        Metric::ALL
            .iter()
            .map(|metric| (*metric, self.measure(*metric)))
            .collect()
    }

    pub fn resource(&self) -> Resource {
        Resource::unit_test_file(self.path.clone())
    }
}

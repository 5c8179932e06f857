//! Host measurement sink.

use anyhow::Result;
use jstd_types::{Metric, Resource, TestCaseResult};

/// Receives the measures a sensor produces.
///
/// Implemented by the host platform. Every method may fail; the sensor
/// propagates sink failures and nothing else.
pub trait MeasureSink {
    /// Store one numeric measure for `resource`.
    fn save_measure(&mut self, resource: &Resource, metric: Metric, value: f64) -> Result<()>;

    /// Store the source listing of `resource`.
    fn save_source(&mut self, resource: &Resource, source: &str) -> Result<()>;

    /// Store per-case details for `resource`. Ignored unless the host
    /// displays individual test cases.
    fn save_test_data(&mut self, _resource: &Resource, _cases: &[TestCaseResult]) -> Result<()> {
        Ok(())
    }
}

/// A measure recorded by [`MemorySink`].
#[derive(Debug, Clone, PartialEq)]
pub struct SavedMeasure {
    pub resource: Resource,
    pub metric: Metric,
    pub value: f64,
}

/// In-memory sink that records every call, for embedding and tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub measures: Vec<SavedMeasure>,
    pub sources: Vec<(Resource, String)>,
    pub test_data: Vec<(Resource, Vec<TestCaseResult>)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value saved for `metric` on the resource keyed `resource_key`.
    pub fn measure(&self, resource_key: &str, metric: Metric) -> Option<f64> {
        self.measures
            .iter()
            .find(|m| m.resource.key == resource_key && m.metric == metric)
            .map(|m| m.value)
    }

    /// Source saved for the resource keyed `resource_key`.
    pub fn source(&self, resource_key: &str) -> Option<&str> {
        self.sources
            .iter()
            .find(|(r, _)| r.key == resource_key)
            .map(|(_, s)| s.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.measures.is_empty() && self.sources.is_empty() && self.test_data.is_empty()
    }
}

impl MeasureSink for MemorySink {
    fn save_measure(&mut self, resource: &Resource, metric: Metric, value: f64) -> Result<()> {
        self.measures.push(SavedMeasure {
            resource: resource.clone(),
            metric,
            value,
        });
        Ok(())
    }

    fn save_source(&mut self, resource: &Resource, source: &str) -> Result<()> {
        self.sources.push((resource.clone(), source.to_string()));
        Ok(())
    }

    fn save_test_data(&mut self, resource: &Resource, cases: &[TestCaseResult]) -> Result<()> {
        self.test_data.push((resource.clone(), cases.to_vec()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_looks_up_by_key_and_metric() {
        let mut sink = MemorySink::new();
        let resource = Resource::unit_test_file("a.js");
        sink.save_measure(&resource, Metric::Tests, 3.0).unwrap();
        sink.save_source(&resource, "code").unwrap();

        assert_eq!(sink.measure("a.js", Metric::Tests), Some(3.0));
        assert_eq!(sink.measure("a.js", Metric::TestErrors), None);
        assert_eq!(sink.source("a.js"), Some("code"));
        assert_eq!(sink.source("b.js"), None);
    }

    struct CountingSink(usize);

    impl MeasureSink for CountingSink {
        fn save_measure(&mut self, _: &Resource, _: Metric, _: f64) -> Result<()> {
            self.0 += 1;
            Ok(())
        }

        fn save_source(&mut self, _: &Resource, _: &str) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_data_is_optional_for_sinks() {
        let mut sink = CountingSink(0);
        let resource = Resource::unit_test_file("a.js");
        sink.save_test_data(&resource, &[]).unwrap();
        sink.save_measure(&resource, Metric::Tests, 1.0).unwrap();
        assert_eq!(sink.0, 1);
    }
}

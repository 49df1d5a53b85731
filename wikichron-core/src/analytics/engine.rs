//! Metrics engine
//!
//! Runs catalog metrics against a loaded [`Dataset`] and reports how each
//! run went.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        METRICS ENGINE                        │
//! │                                                              │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐        │
//! │  │ 0_pages_new  │  │ 6_edits      │  │47_gini_accum │  ...   │
//! │  └──────┬───────┘  └──────┬───────┘  └──────┬───────┘        │
//! │         │                 │                 │                │
//! │         ▼                 ▼                 ▼                │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │            MetricsEngine.run_metric()                  │  │
//! │  │  - Resolves the metric by code or key                  │  │
//! │  │  - Checks the dataset's index covers its log           │  │
//! │  │  - Times the computation                               │  │
//! │  │  - Returns a MetricRunResult with the output           │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use wikichron_core::analytics::MetricsEngine;
//! use wikichron_core::{Config, Dataset};
//!
//! let config = Config::load().expect("failed to load config");
//! let dataset = Dataset::load(Path::new("wiki.csv"), &config.dataset).expect("failed to load");
//!
//! let engine = MetricsEngine::default();
//! for result in engine.run_all(&dataset) {
//!     println!("{}: {}", result.code, result.status.as_str());
//! }
//! ```

use crate::analytics::metrics_registry::{Metric, MetricCategory, MetricRegistry};
use crate::analytics::series::MetricOutput;
use crate::dataset::Dataset;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Instant;

/// Runs slower than this are logged as warnings.
const DEFAULT_SLOW_THRESHOLD_MS: u64 = 5_000;

// ============================================
// Run results
// ============================================

/// Result of running one metric on a dataset.
#[derive(Debug, Clone, Serialize)]
pub struct MetricRunResult {
    /// Code of the metric that was run
    pub code: String,
    pub category: MetricCategory,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// How long the computation took (milliseconds)
    pub duration_ms: i64,
    /// Whether the run succeeded or failed
    pub status: RunStatus,
    /// Error message if the run failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Output of a successful run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<MetricOutput>,
}

/// Status of a metric run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Error,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Success => "success",
            RunStatus::Error => "error",
        }
    }
}

// ============================================
// Metrics engine
// ============================================

/// Engine that resolves and runs catalog metrics.
#[derive(Debug, Clone)]
pub struct MetricsEngine {
    registry: MetricRegistry,
    slow_threshold_ms: u64,
}

impl MetricsEngine {
    pub fn new(registry: MetricRegistry) -> Self {
        tracing::info!(metrics = registry.len(), "Created metrics engine");
        Self {
            registry,
            slow_threshold_ms: DEFAULT_SLOW_THRESHOLD_MS,
        }
    }

    pub fn registry(&self) -> &MetricRegistry {
        &self.registry
    }

    /// Set the duration (milliseconds) above which runs are logged as slow.
    pub fn set_slow_threshold_ms(&mut self, threshold_ms: u64) {
        self.slow_threshold_ms = threshold_ms.max(1);
    }

    /// Run a metric by code or key.
    ///
    /// Only an unknown metric is an `Err`; computation failures come back as
    /// a result with [`RunStatus::Error`].
    pub fn run_metric(&self, code_or_key: &str, dataset: &Dataset) -> Result<MetricRunResult> {
        let metric = self.registry.lookup(code_or_key)?;
        Ok(self.run(metric, dataset))
    }

    /// Run every metric in catalog order.
    ///
    /// Failed metrics don't stop the others from running.
    pub fn run_all(&self, dataset: &Dataset) -> Vec<MetricRunResult> {
        let results: Vec<MetricRunResult> = self
            .registry
            .get_all_metrics()
            .iter()
            .map(|metric| self.run(metric, dataset))
            .collect();

        let failed = results
            .iter()
            .filter(|r| r.status == RunStatus::Error)
            .count();
        tracing::info!(
            dataset = %dataset.name,
            metrics = results.len(),
            failed,
            "Ran metric catalog"
        );

        results
    }

    /// Run the metrics of one category in catalog order.
    pub fn run_category(&self, category: MetricCategory, dataset: &Dataset) -> Vec<MetricRunResult> {
        self.registry
            .get_all_metrics()
            .iter()
            .filter(|m| m.category == category)
            .map(|metric| self.run(metric, dataset))
            .collect()
    }

    fn run(&self, metric: &Metric, dataset: &Dataset) -> MetricRunResult {
        let started_at = Utc::now();
        let start = Instant::now();

        tracing::debug!(
            metric = %metric.code,
            dataset = %dataset.name,
            revisions = dataset.log.len(),
            months = dataset.index.len(),
            "Running metric"
        );

        let outcome = metric.compute(&dataset.log, &dataset.index);
        let duration_ms = start.elapsed().as_millis() as i64;

        if duration_ms as u64 > self.slow_threshold_ms {
            tracing::warn!(
                metric = %metric.code,
                duration_ms,
                threshold_ms = self.slow_threshold_ms,
                "Metric exceeded slow threshold"
            );
        }

        match outcome {
            Ok(output) => {
                tracing::debug!(metric = %metric.code, duration_ms, "Metric completed");
                MetricRunResult {
                    code: metric.code.clone(),
                    category: metric.category,
                    started_at,
                    duration_ms,
                    status: RunStatus::Success,
                    error_message: None,
                    output: Some(output),
                }
            }
            Err(e) => {
                tracing::error!(metric = %metric.code, error = %e, "Metric failed");
                MetricRunResult {
                    code: metric.code.clone(),
                    category: metric.category,
                    started_at,
                    duration_ms,
                    status: RunStatus::Error,
                    error_message: Some(e.to_string()),
                    output: None,
                }
            }
        }
    }
}

impl Default for MetricsEngine {
    fn default() -> Self {
        Self::new(MetricRegistry::build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::families::testing::{dataset, Rev};
    use crate::error::Error;
    use crate::time_index::{Month, TimeIndex};

    fn sample() -> Dataset {
        let (log, _) = dataset(vec![
            Rev { contributor: "alice", month: 1, ..Default::default() },
            Rev { contributor: "bob", month: 3, ns: 1, ..Default::default() },
        ]);
        Dataset::new("sample", log)
    }

    #[test]
    fn test_run_metric_by_key_and_code() {
        crate::logging::init_test();
        let engine = MetricsEngine::default();
        let data = sample();

        let by_key = engine.run_metric("edits", &data).unwrap();
        assert_eq!(by_key.status, RunStatus::Success);
        let by_code = engine.run_metric(&by_key.code, &data).unwrap();
        assert_eq!(by_code.code, by_key.code);

        let output = by_key.output.unwrap();
        assert_eq!(output.as_series().unwrap().series[0].values, vec![1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_unknown_metric_is_an_error() {
        let engine = MetricsEngine::default();
        let result = engine.run_metric("no_such_metric", &sample());
        assert!(matches!(result, Err(Error::MetricNotFound(_))));
    }

    #[test]
    fn test_mismatched_index_reports_error_status() {
        let engine = MetricsEngine::default();
        let mut data = sample();
        let jan = Month::new(2020, 1).unwrap();
        data.index = TimeIndex::span(jan, jan);

        let result = engine.run_metric("edits", &data).unwrap();
        assert_eq!(result.status, RunStatus::Error);
        assert!(result.output.is_none());
        assert!(result.error_message.unwrap().contains("do not cover"));
    }

    #[test]
    fn test_run_all_covers_catalog() {
        let engine = MetricsEngine::default();
        let data = sample();
        let results = engine.run_all(&data);
        assert_eq!(results.len(), engine.registry().len());
        assert!(results.iter().all(|r| r.status == RunStatus::Success));
    }

    #[test]
    fn test_run_category() {
        let engine = MetricsEngine::default();
        let results = engine.run_category(MetricCategory::Retention, &sample());
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.category == MetricCategory::Retention));
    }

    #[test]
    fn test_documented_codes_resolve() {
        let engine = MetricsEngine::default();
        for code in ["0_pages_new", "6_edits", "47_gini_accum", "89_revision_on_pages"] {
            assert!(
                engine.registry().get_metric_by_code(code).is_some(),
                "{code} missing"
            );
        }
        assert_eq!(engine.registry().len(), 90);
    }

    #[test]
    fn test_status_as_str() {
        assert_eq!(RunStatus::Success.as_str(), "success");
        assert_eq!(RunStatus::Error.as_str(), "error");
    }
}

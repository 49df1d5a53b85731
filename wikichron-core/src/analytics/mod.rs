//! Analytics module for wikichron
//!
//! Turns a revision log into per-month metric outputs:
//! - Monthly series, stacked series sets and heatmaps ([`series`], [`heatmap`])
//! - Factoid diffs between consecutive page revisions ([`factoids`])
//! - Contributor cohorts by tenure, recency, experience and streak ([`cohort`])
//! - The metric catalog and its registry ([`metrics_registry`], [`families`])
//! - The engine that runs catalog metrics on a dataset ([`engine`])

pub mod cohort;
pub mod engine;
pub mod factoids;
pub mod families;
pub mod heatmap;
pub mod metrics_registry;
pub mod series;

pub use engine::{MetricRunResult, MetricsEngine, RunStatus};
pub use factoids::{FactoidDelta, FactoidDiffs};
pub use heatmap::{BinSpec, HeatMap};
pub use metrics_registry::{
    ChartShape, ComputeFn, Metric, MetricCategory, MetricDescriptor, MetricRegistry, CATALOG,
    CATALOG_VERSION,
};
pub use series::{MetricOutput, OutputSeries, SeriesSet};

//! Metric families.
//!
//! Each module declares a `METRICS` table of [`MetricDescriptor`]s plus the
//! compute functions behind them. The registry concatenates the tables in
//! [`CATALOG`] order.
//!
//! [`MetricDescriptor`]: crate::analytics::metrics_registry::MetricDescriptor
//! [`CATALOG`]: crate::analytics::metrics_registry::CATALOG

pub mod active_editors;
pub mod distribution;
pub mod distribution_of_edits;
pub mod edit_content;
pub mod editions;
pub mod edits_by_cohort;
pub mod factoid_cohorts;
pub mod factoids;
pub mod heatmaps;
pub mod pages;
pub mod ratios;
pub mod retention;
pub mod users;

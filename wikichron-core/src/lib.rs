//! # wikichron-core
//!
//! Core library for wikichron - a metrics engine over wiki edit histories.
//!
//! This library provides:
//! - Domain types for revisions, namespaces and factoids
//! - Revision dump loading and the canonical monthly time index
//! - The metric catalog, its registry and the engine that runs it
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Architecture
//!
//! Data flows through three stages:
//! - **Dump:** a `;`-delimited CSV export of a wiki's revisions (immutable)
//! - **Log:** a [`RevisionLog`] sorted by time plus its gap-free [`TimeIndex`]
//! - **Outputs:** per-metric series and heatmaps aligned to that index
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use wikichron_core::analytics::MetricsEngine;
//! use wikichron_core::{Config, Dataset};
//!
//! // Load configuration
//! let config = Config::load().expect("failed to load config");
//!
//! // Load a dump and run one metric
//! let dataset = Dataset::load(Path::new("eslagunanegra_pages_full.csv"), &config.dataset)
//!     .expect("failed to load dump");
//! let result = MetricsEngine::default()
//!     .run_metric("edits", &dataset)
//!     .expect("unknown metric");
//! ```

// Re-export commonly used items at the crate root
pub use config::{Config, DatasetConfig};
pub use dataset::{Dataset, LogSummary, RevisionLog};
pub use error::{Error, Result};
pub use time_index::{Month, TimeIndex};
pub use types::*;

// Public modules
pub mod analytics;
pub mod config;
pub mod dataset;
pub mod error;
pub mod logging;
pub mod time_index;
pub mod types;

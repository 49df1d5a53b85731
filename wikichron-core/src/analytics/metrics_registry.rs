//! Metric catalog and registry.
//!
//! Every metric is declared once as a [`MetricDescriptor`] in its family's
//! static table. [`MetricRegistry::build`] concatenates the families in the
//! explicit [`CATALOG`] order and prefixes each key with its position, so
//! codes only change when the catalog version does.

use crate::analytics::families;
use crate::analytics::series::MetricOutput;
use crate::dataset::RevisionLog;
use crate::error::{Error, Result};
use crate::time_index::TimeIndex;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Bumped whenever [`CATALOG`] changes order or content.
pub const CATALOG_VERSION: u32 = 1;

/// Pure metric computation over a log and its time index.
pub type ComputeFn = fn(&RevisionLog, &TimeIndex) -> MetricOutput;

/// Sidebar group of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetricCategory {
    Pages,
    Editions,
    Users,
    Ratios,
    Retention,
    Factoids,
    EditContent,
    Distribution,
    DistributionOfActiveRegisteredUsers,
    DistributionOfEditsAcrossRegisteredUsers,
    DistributionOfEdits,
    DistributionOfFactoidsAcrossRegisteredUsers,
    ActiveUserDistribution,
}

impl MetricCategory {
    pub const ALL: &'static [MetricCategory] = &[
        MetricCategory::Pages,
        MetricCategory::Editions,
        MetricCategory::Users,
        MetricCategory::Ratios,
        MetricCategory::Retention,
        MetricCategory::Factoids,
        MetricCategory::EditContent,
        MetricCategory::Distribution,
        MetricCategory::DistributionOfActiveRegisteredUsers,
        MetricCategory::DistributionOfEditsAcrossRegisteredUsers,
        MetricCategory::DistributionOfEdits,
        MetricCategory::DistributionOfFactoidsAcrossRegisteredUsers,
        MetricCategory::ActiveUserDistribution,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricCategory::Pages => "PAGES",
            MetricCategory::Editions => "EDITIONS",
            MetricCategory::Users => "USERS",
            MetricCategory::Ratios => "RATIOS",
            MetricCategory::Retention => "RETENTION",
            MetricCategory::Factoids => "FACTOIDS",
            MetricCategory::EditContent => "EDIT_CONTENT",
            MetricCategory::Distribution => "DISTRIBUTION",
            MetricCategory::DistributionOfActiveRegisteredUsers => {
                "DISTRIBUTION_OF_ACTIVE_REGISTERED_USERS"
            }
            MetricCategory::DistributionOfEditsAcrossRegisteredUsers => {
                "DISTRIBUTION_OF_EDITS_ACROSS_REGISTERED_USERS"
            }
            MetricCategory::DistributionOfEdits => "DISTRIBUTION_OF_EDITS",
            MetricCategory::DistributionOfFactoidsAcrossRegisteredUsers => {
                "DISTRIBUTION_OF_FACTOIDS_ACROSS_REGISTERED_USERS"
            }
            MetricCategory::ActiveUserDistribution => "ACTIVE_USER_DISTRIBUTION",
        }
    }

    /// Heading shown above the category's metrics.
    pub fn label(&self) -> &'static str {
        match self {
            MetricCategory::Pages => "Pages",
            MetricCategory::Editions => "Editions",
            MetricCategory::Users => "Users",
            MetricCategory::Ratios => "Ratios",
            MetricCategory::Retention => "Retention",
            MetricCategory::Factoids => "Factoids",
            MetricCategory::EditContent => "Edit content",
            MetricCategory::Distribution => "Distribution",
            MetricCategory::DistributionOfActiveRegisteredUsers => {
                "Distribution of active registered users"
            }
            MetricCategory::DistributionOfEditsAcrossRegisteredUsers => {
                "Distribution of edits across registered users"
            }
            MetricCategory::DistributionOfEdits => "Distribution of edits",
            MetricCategory::DistributionOfFactoidsAcrossRegisteredUsers => {
                "Distribution of factoids across registered users"
            }
            MetricCategory::ActiveUserDistribution => "Active user distribution",
        }
    }
}

impl std::fmt::Display for MetricCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for MetricCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().replace(['-', ' '], "_").to_ascii_uppercase();
        MetricCategory::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| format!("unknown metric category: {}", s))
    }
}

/// How the presentation layer plots a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChartShape {
    LineGraph,
    BarGraph,
    AreaChart,
    HeatMap,
}

impl ChartShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartShape::LineGraph => "LineGraph",
            ChartShape::BarGraph => "BarGraph",
            ChartShape::AreaChart => "AreaChart",
            ChartShape::HeatMap => "HeatMap",
        }
    }
}

/// Static declaration of a metric.
#[derive(Clone, Copy)]
pub struct MetricDescriptor {
    pub key: &'static str,
    pub text: &'static str,
    pub category: MetricCategory,
    pub shape: ChartShape,
    pub compute: ComputeFn,
    pub description: &'static str,
}

impl std::fmt::Debug for MetricDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricDescriptor")
            .field("key", &self.key)
            .field("category", &self.category)
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}

/// Metric families in code order.
pub const CATALOG: &[(&str, &[MetricDescriptor])] = &[
    ("pages", families::pages::METRICS),
    ("editions", families::editions::METRICS),
    ("users", families::users::METRICS),
    ("ratios", families::ratios::METRICS),
    ("retention", families::retention::METRICS),
    ("factoids", families::factoids::METRICS),
    ("edit_content", families::edit_content::METRICS),
    ("distribution", families::distribution::METRICS),
    ("active_editors", families::active_editors::METRICS),
    ("edits_by_cohort", families::edits_by_cohort::METRICS),
    ("distribution_of_edits", families::distribution_of_edits::METRICS),
    ("factoid_cohorts", families::factoid_cohorts::METRICS),
    ("heatmaps", families::heatmaps::METRICS),
];

// ============================================
// Registry
// ============================================

/// A catalog entry with its assigned code.
#[derive(Clone, Serialize)]
pub struct Metric {
    /// `{position}_{key}`
    pub code: String,
    pub key: &'static str,
    pub text: &'static str,
    pub category: MetricCategory,
    pub shape: ChartShape,
    pub description: &'static str,
    #[serde(skip)]
    compute: ComputeFn,
}

impl std::fmt::Debug for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metric")
            .field("code", &self.code)
            .field("category", &self.category)
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}

impl Metric {
    /// Run the metric.
    ///
    /// Fails when the index does not cover every revision of the log.
    pub fn compute(&self, log: &RevisionLog, index: &TimeIndex) -> Result<MetricOutput> {
        if !index.covers(log) {
            return Err(Error::TimeIndexMismatch(format!(
                "{} months starting {} do not cover the revision log",
                index.len(),
                index
                    .first()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            )));
        }
        Ok((self.compute)(log, index))
    }
}

/// Immutable catalog with lookups by code, key and category.
#[derive(Debug, Clone)]
pub struct MetricRegistry {
    metrics: Vec<Metric>,
    by_code: HashMap<String, usize>,
    by_key: HashMap<&'static str, usize>,
}

impl MetricRegistry {
    /// Build the registry from [`CATALOG`].
    pub fn build() -> Self {
        Self::from_families(CATALOG)
    }

    /// Build a registry from an explicit family list.
    pub fn from_families(families: &[(&str, &[MetricDescriptor])]) -> Self {
        let metrics: Vec<Metric> = families
            .iter()
            .flat_map(|(_, descriptors)| descriptors.iter())
            .enumerate()
            .map(|(idx, d)| Metric {
                code: format!("{}_{}", idx, d.key),
                key: d.key,
                text: d.text,
                category: d.category,
                shape: d.shape,
                description: d.description,
                compute: d.compute,
            })
            .collect();

        let by_code = metrics
            .iter()
            .enumerate()
            .map(|(i, m)| (m.code.clone(), i))
            .collect();
        let mut by_key = HashMap::new();
        for (i, metric) in metrics.iter().enumerate() {
            by_key.entry(metric.key).or_insert(i);
        }

        tracing::debug!(
            metrics = metrics.len(),
            families = families.len(),
            version = CATALOG_VERSION,
            "Built metric registry"
        );

        Self {
            metrics,
            by_code,
            by_key,
        }
    }

    pub fn get_metric_by_code(&self, code: &str) -> Option<&Metric> {
        self.by_code.get(code).map(|&i| &self.metrics[i])
    }

    pub fn get_metric_by_key(&self, key: &str) -> Option<&Metric> {
        self.by_key.get(key).map(|&i| &self.metrics[i])
    }

    /// Resolve a code, falling back to a bare key.
    pub fn lookup(&self, code_or_key: &str) -> Result<&Metric> {
        self.get_metric_by_code(code_or_key)
            .or_else(|| self.get_metric_by_key(code_or_key))
            .ok_or_else(|| Error::MetricNotFound(code_or_key.to_string()))
    }

    /// Metrics grouped by category, each group in catalog order.
    pub fn get_metrics_by_category(&self) -> BTreeMap<MetricCategory, Vec<&Metric>> {
        let mut grouped: BTreeMap<MetricCategory, Vec<&Metric>> = BTreeMap::new();
        for metric in &self.metrics {
            grouped.entry(metric.category).or_default().push(metric);
        }
        grouped
    }

    pub fn get_all_metrics(&self) -> &[Metric] {
        &self.metrics
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

impl Default for MetricRegistry {
    fn default() -> Self {
        Self::build()
    }
}

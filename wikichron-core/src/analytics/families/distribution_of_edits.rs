//! How concentrated registered contributors' edits are.

use super::distribution::accumulated_edit_counts;
use crate::analytics::heatmap::{BinSpec, HeatMap};
use crate::analytics::metrics_registry::{ChartShape, MetricCategory, MetricDescriptor};
use crate::analytics::series::{MetricOutput, SeriesSet};
use crate::dataset::RevisionLog;
use crate::time_index::{Month, TimeIndex};
use std::collections::{BTreeMap, HashMap};

pub const METRICS: &[MetricDescriptor] = &[
    MetricDescriptor {
        key: "contributorPctg_per_contributionPctg",
        text: "Percentage of registered users making a percentage of edits",
        category: MetricCategory::DistributionOfEdits,
        shape: ChartShape::AreaChart,
        compute: contributor_pctg_per_contribution_pctg,
        description: "Percentage of editors across percentage of editions (Percentage of editions fixed to 50%, 80%, 90% and 99%)",
    },
    MetricDescriptor {
        key: "contributorPctg_per_contributionPctg_month",
        text: "Percentage of registered users making a percentage of edits (monthly)",
        category: MetricCategory::DistributionOfEdits,
        shape: ChartShape::AreaChart,
        compute: contributor_pctg_per_contribution_pctg_month,
        description: "Monthly percentage of editors across percentage of editions (Percentage of editions fixed to 50%, 80%, 90% and 99%)",
    },
    MetricDescriptor {
        key: "edit_distributions_across_editors",
        text: "Distribution of edits across editors (heatmap)",
        category: MetricCategory::DistributionOfEdits,
        shape: ChartShape::HeatMap,
        compute: edit_distributions_across_editors,
        description: "Distribution of editors (z axis) per distribution of edits (y axis).",
    },
];

/// Edits-per-editor bins: `[0,10)` up to `[100,110)`, larger counts clipped.
const EDITS_PER_EDITOR_BINS: BinSpec = BinSpec {
    lower: 0,
    width: 10,
    bins: 11,
};

/// Edit share thresholds and their legend labels.
///
/// The last threshold is strict so it only reports once more than 99% of
/// edits are covered.
const THRESHOLDS: &[(u64, bool, &str)] = &[
    (50, false, "50% of edits"),
    (80, false, "80% of edits"),
    (90, false, "90% of edits"),
    (99, false, "99% of edits"),
    (99, true, "100% of edits"),
];

/// Percentage of contributors needed to reach `percent` of the edits.
///
/// `descending` holds per-contributor edit counts, largest first. Returns 0
/// when there are no edits.
pub fn contributors_reaching(descending: &[u64], percent: u64, strict: bool) -> f64 {
    let total: u64 = descending.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let mut prefix = 0u64;
    for (k, count) in descending.iter().enumerate() {
        prefix += count;
        let reached = if strict {
            prefix * 100 > percent * total
        } else {
            prefix * 100 >= percent * total
        };
        if reached {
            return (k + 1) as f64 / descending.len() as f64 * 100.0;
        }
    }
    0.0
}

fn threshold_series(counts_per_month: &[Vec<u64>], index: &TimeIndex) -> SeriesSet {
    THRESHOLDS
        .iter()
        .fold(SeriesSet::new(index, false), |set, (percent, strict, label)| {
            let values = counts_per_month
                .iter()
                .map(|counts| contributors_reaching(counts, *percent, *strict))
                .collect();
            set.push(*label, values)
        })
}

/// Edits of each registered contributor within each month.
fn monthly_edit_counts(log: &RevisionLog) -> BTreeMap<Month, HashMap<&str, u64>> {
    let mut counts: BTreeMap<Month, HashMap<&str, u64>> = BTreeMap::new();
    for rev in log.registered() {
        *counts
            .entry(rev.month())
            .or_default()
            .entry(rev.contributor_id.as_str())
            .or_insert(0) += 1;
    }
    counts
}

fn contributor_pctg_per_contribution_pctg(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let counts = accumulated_edit_counts(log, index);
    MetricOutput::Series(threshold_series(&counts, index))
}

fn contributor_pctg_per_contribution_pctg_month(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let monthly = monthly_edit_counts(log);
    let counts: Vec<Vec<u64>> = index
        .months()
        .iter()
        .map(|month| {
            let mut counts: Vec<u64> = monthly
                .get(month)
                .map(|per_editor| per_editor.values().copied().collect())
                .unwrap_or_default();
            counts.sort_unstable_by(|a, b| b.cmp(a));
            counts
        })
        .collect();
    MetricOutput::Series(threshold_series(&counts, index))
}

fn edit_distributions_across_editors(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let observations = monthly_edit_counts(log)
        .into_iter()
        .flat_map(|(month, per_editor)| {
            per_editor
                .into_values()
                .map(move |edits| (month, edits as i64))
        })
        .collect::<Vec<_>>();
    MetricOutput::HeatMap(HeatMap::bin(
        index,
        &EDITS_PER_EDITOR_BINS,
        observations,
        "Number of editors",
    ))
}

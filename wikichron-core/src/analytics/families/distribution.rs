//! Inequality of accumulated participation among registered contributors.
//!
//! For every index month each registered contributor who has edited so far
//! contributes their number of edits up to and including that month.

use crate::analytics::metrics_registry::{ChartShape, MetricCategory, MetricDescriptor};
use crate::analytics::series::MetricOutput;
use crate::dataset::RevisionLog;
use crate::time_index::{Month, TimeIndex};
use std::collections::{BTreeMap, HashMap};

macro_rules! distribution_metric {
    ($key:literal, $text:literal, $compute:ident, $description:literal) => {
        MetricDescriptor {
            key: $key,
            text: $text,
            category: MetricCategory::Distribution,
            shape: ChartShape::LineGraph,
            compute: $compute,
            description: $description,
        }
    };
}

pub const METRICS: &[MetricDescriptor] = &[
    distribution_metric!(
        "gini_accum",
        "Gini coefficient",
        gini_accum,
        "Gini coefficient (accumulated)"
    ),
    distribution_metric!(
        "ratio_10_90",
        "10:90 ratio",
        ratio_10_90,
        "Contributions of the top ten percent more active users between the 90% percent less active"
    ),
    distribution_metric!(
        "ratio_percentiles_max_5",
        "Participants prctl. top / 5",
        ratio_percentiles_max_5,
        "Ratio between contributions of the top and the 5th top users"
    ),
    distribution_metric!(
        "ratio_percentiles_max_10",
        "Participants prctl. top / 10",
        ratio_percentiles_max_10,
        "Ratio between contributions of the top user and the 10th top user"
    ),
    distribution_metric!(
        "ratio_percentiles_max_20",
        "Participants prctl. top / 20",
        ratio_percentiles_max_20,
        "Ratio between contributions of the top user and the 20th top user"
    ),
    distribution_metric!(
        "ratio_percentiles_5_10",
        "Participants prctl. 5 / 10",
        ratio_percentiles_5_10,
        "Ratio between contributions of the 5th user and the 10th top user"
    ),
    distribution_metric!(
        "ratio_percentiles_10_20",
        "Participants prctl. 10 / 20",
        ratio_percentiles_10_20,
        "Ratio between contributions of the 10th user and the 20th top user"
    ),
];

/// Accumulated edit counts of registered contributors per index month.
///
/// Each inner vector is sorted in descending order and holds only
/// contributors with at least one edit so far.
pub(crate) fn accumulated_edit_counts(log: &RevisionLog, index: &TimeIndex) -> Vec<Vec<u64>> {
    let mut by_month: BTreeMap<Month, Vec<&str>> = BTreeMap::new();
    for rev in log.registered() {
        by_month
            .entry(rev.month())
            .or_default()
            .push(rev.contributor_id.as_str());
    }

    let mut totals: HashMap<&str, u64> = HashMap::new();
    index
        .months()
        .iter()
        .map(|month| {
            for contributor in by_month.get(month).into_iter().flatten() {
                *totals.entry(*contributor).or_insert(0) += 1;
            }
            let mut counts: Vec<u64> = totals.values().copied().filter(|n| *n > 0).collect();
            counts.sort_unstable_by(|a, b| b.cmp(a));
            counts
        })
        .collect()
}

/// Gini coefficient of a set of counts; 0 for empty or all-zero input.
pub fn gini(counts: &[u64]) -> f64 {
    let n = counts.len() as f64;
    let total: u64 = counts.iter().sum();
    if counts.is_empty() || total == 0 {
        return 0.0;
    }
    let mut ascending = counts.to_vec();
    ascending.sort_unstable();
    let weighted: f64 = ascending
        .iter()
        .enumerate()
        .map(|(i, x)| (i as f64 + 1.0) * *x as f64)
        .sum();
    (2.0 * weighted) / (n * total as f64) - (n + 1.0) / n
}

/// Edits of the top tenth of contributors over the edits of the rest.
pub fn top_tenth_ratio(descending: &[u64]) -> f64 {
    let top = (descending.len() as f64 * 0.1).ceil() as usize;
    let head: u64 = descending[..top].iter().sum();
    let tail: u64 = descending[top..].iter().sum();
    if tail == 0 {
        0.0
    } else {
        head as f64 / tail as f64
    }
}

/// Edits of the contributor ranked `upper` over the one ranked `lower`.
///
/// Ranks are 1-based in descending order; 0 when either rank is missing.
pub fn rank_ratio(descending: &[u64], upper: usize, lower: usize) -> f64 {
    match (descending.get(upper - 1), descending.get(lower - 1)) {
        (Some(a), Some(b)) if *b > 0 => *a as f64 / *b as f64,
        _ => 0.0,
    }
}

fn per_month(log: &RevisionLog, index: &TimeIndex, name: &str, f: impl Fn(&[u64]) -> f64) -> MetricOutput {
    let values = accumulated_edit_counts(log, index)
        .iter()
        .map(|counts| f(counts.as_slice()))
        .collect();
    MetricOutput::single(index, name, values)
}

fn gini_accum(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    per_month(log, index, "Gini coefficient", gini)
}

fn ratio_10_90(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    per_month(log, index, "10:90 ratio", top_tenth_ratio)
}

fn ratio_percentiles_max_5(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    per_month(log, index, "Participants prctl. top / 5", |c| rank_ratio(c, 1, 5))
}

fn ratio_percentiles_max_10(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    per_month(log, index, "Participants prctl. top / 10", |c| rank_ratio(c, 1, 10))
}

fn ratio_percentiles_max_20(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    per_month(log, index, "Participants prctl. top / 20", |c| rank_ratio(c, 1, 20))
}

fn ratio_percentiles_5_10(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    per_month(log, index, "Participants prctl. 5 / 10", |c| rank_ratio(c, 5, 10))
}

fn ratio_percentiles_10_20(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    per_month(log, index, "Participants prctl. 10 / 20", |c| rank_ratio(c, 10, 20))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::families::testing::{dataset, single, Rev};

    #[test]
    fn test_gini() {
        assert_eq!(gini(&[]), 0.0);
        assert_eq!(gini(&[5, 5, 5, 5]), 0.0);
        // one contributor holds everything among four
        assert!((gini(&[0, 0, 0, 4]) - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_top_tenth_ratio() {
        assert_eq!(top_tenth_ratio(&[10]), 0.0);
        assert_eq!(top_tenth_ratio(&[9, 1, 1, 1]), 3.0);
    }

    #[test]
    fn test_rank_ratio() {
        let counts: Vec<u64> = (1..=10).rev().map(|n| n * 2).collect();
        assert_eq!(rank_ratio(&counts, 1, 5), 20.0 / 12.0);
        assert_eq!(rank_ratio(&counts, 5, 10), 6.0);
        assert_eq!(rank_ratio(&counts, 10, 20), 0.0);
    }

    #[test]
    fn test_accumulated_counts_carry_forward() {
        let (log, index) = dataset(vec![
            Rev { contributor: "alice", month: 1, ..Default::default() },
            Rev { contributor: "alice", month: 1, day: 2, ..Default::default() },
            Rev { contributor: "10.0.0.1", month: 2, ..Default::default() },
            Rev { contributor: "bob", month: 3, ..Default::default() },
        ]);
        let counts = accumulated_edit_counts(&log, &index);
        assert_eq!(counts, vec![vec![2], vec![2], vec![2, 1]]);

        let gini_values = single(gini_accum(&log, &index));
        assert_eq!(&gini_values[..2], &[0.0, 0.0]);
        assert!((gini_values[2] - (1.0 / 6.0)).abs() < 1e-9);
    }
}

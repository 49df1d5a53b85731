//! Monthly series aggregation and metric output types.
//!
//! Metrics group their rows by month into named intermediate maps and then
//! [`reindex`] them against the canonical [`TimeIndex`], so every series has
//! exactly one value per index month with gaps filled by zero.

use crate::analytics::heatmap::HeatMap;
use crate::time_index::{Month, TimeIndex};
use crate::types::Revision;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::hash::Hash;

/// Per-month values before reindexing.
pub type MonthlyValues = BTreeMap<Month, f64>;

// ============================================
// Outputs
// ============================================

/// A named, time-indexed numeric sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputSeries {
    /// Legend label
    pub name: String,
    /// One value per month of the owning index
    pub values: Vec<f64>,
}

/// Several series sharing one time index.
///
/// `accumulated` tells the renderer whether the series stack (cohort
/// breakdowns) or overlay (independent counts).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSet {
    pub index: Vec<Month>,
    pub series: Vec<OutputSeries>,
    pub accumulated: bool,
}

impl SeriesSet {
    pub fn new(index: &TimeIndex, accumulated: bool) -> Self {
        Self {
            index: index.months().to_vec(),
            series: Vec::new(),
            accumulated,
        }
    }

    /// Append a series; `values` must have one entry per index month.
    pub fn push(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), self.index.len());
        self.series.push(OutputSeries {
            name: name.into(),
            values,
        });
        self
    }

    /// Series by legend label.
    pub fn get(&self, name: &str) -> Option<&OutputSeries> {
        self.series.iter().find(|s| s.name == name)
    }

    /// Per-month sum over all series.
    pub fn totals(&self) -> Vec<f64> {
        let mut totals = vec![0.0; self.index.len()];
        for series in &self.series {
            for (total, value) in totals.iter_mut().zip(&series.values) {
                *total += value;
            }
        }
        totals
    }
}

/// What a metric's compute function returns.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetricOutput {
    Series(SeriesSet),
    HeatMap(HeatMap),
}

impl MetricOutput {
    /// A single, non-stacked series.
    pub fn single(index: &TimeIndex, name: &str, values: Vec<f64>) -> Self {
        MetricOutput::Series(SeriesSet::new(index, false).push(name, values))
    }

    /// Months the output is defined over.
    pub fn index(&self) -> &[Month] {
        match self {
            MetricOutput::Series(set) => &set.index,
            MetricOutput::HeatMap(map) => &map.index,
        }
    }

    pub fn as_series(&self) -> Option<&SeriesSet> {
        match self {
            MetricOutput::Series(set) => Some(set),
            MetricOutput::HeatMap(_) => None,
        }
    }

    pub fn as_heatmap(&self) -> Option<&HeatMap> {
        match self {
            MetricOutput::HeatMap(map) => Some(map),
            MetricOutput::Series(_) => None,
        }
    }
}

// ============================================
// Grouping
// ============================================

/// Dense vector over the index; months outside it are dropped.
pub fn reindex(values: &MonthlyValues, index: &TimeIndex) -> Vec<f64> {
    let mut dense = index.zeros();
    for (month, value) in values {
        if let Some(pos) = index.position(*month) {
            dense[pos] = *value;
        }
    }
    dense
}

/// Sum `(month, value)` observations per month.
pub fn sum_months<I>(observations: I, index: &TimeIndex) -> Vec<f64>
where
    I: IntoIterator<Item = (Month, f64)>,
{
    let mut grouped = MonthlyValues::new();
    for (month, value) in observations {
        *grouped.entry(month).or_insert(0.0) += value;
    }
    reindex(&grouped, index)
}

/// Count occurrences per month.
pub fn count_months<I>(months: I, index: &TimeIndex) -> Vec<f64>
where
    I: IntoIterator<Item = Month>,
{
    sum_months(months.into_iter().map(|m| (m, 1.0)), index)
}

/// Number of revisions per month.
pub fn count_by_month<'a, I>(revisions: I, index: &TimeIndex) -> Vec<f64>
where
    I: IntoIterator<Item = &'a Revision>,
{
    count_months(revisions.into_iter().map(Revision::month), index)
}

/// Number of distinct keys per month.
pub fn unique_by_month<'a, I, K, F>(revisions: I, index: &TimeIndex, key: F) -> Vec<f64>
where
    I: IntoIterator<Item = &'a Revision>,
    K: Hash + Eq,
    F: Fn(&'a Revision) -> K,
{
    let distinct: HashSet<(Month, K)> = revisions
        .into_iter()
        .map(|rev| (rev.month(), key(rev)))
        .collect();
    count_months(distinct.into_iter().map(|(month, _)| month), index)
}

/// Sum of a per-revision value per month.
pub fn sum_by_month<'a, I, F>(revisions: I, index: &TimeIndex, value: F) -> Vec<f64>
where
    I: IntoIterator<Item = &'a Revision>,
    F: Fn(&'a Revision) -> f64,
{
    sum_months(
        revisions.into_iter().map(|rev| (rev.month(), value(rev))),
        index,
    )
}

/// Number of distinct keys counted in the month they first appear.
pub fn first_seen_by_month<'a, I, K, F>(revisions: I, index: &TimeIndex, key: F) -> Vec<f64>
where
    I: IntoIterator<Item = &'a Revision>,
    K: Hash + Eq,
    F: Fn(&'a Revision) -> K,
{
    let mut seen = HashSet::new();
    let firsts = revisions
        .into_iter()
        .filter(|rev| seen.insert(key(rev)))
        .map(Revision::month)
        .collect::<Vec<_>>();
    count_months(firsts, index)
}

// ============================================
// Arithmetic
// ============================================

/// Running total.
pub fn cumulative(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .scan(0.0, |acc, v| {
            *acc += v;
            Some(*acc)
        })
        .collect()
}

/// Element-wise division, yielding 0 where the denominator is 0.
pub fn ratio(numerator: &[f64], denominator: &[f64]) -> Vec<f64> {
    numerator
        .iter()
        .zip(denominator)
        .map(|(n, d)| if *d == 0.0 { 0.0 } else { n / d })
        .collect()
}

/// [`ratio`] scaled to percent.
pub fn percentage(numerator: &[f64], denominator: &[f64]) -> Vec<f64> {
    ratio(numerator, denominator)
        .into_iter()
        .map(|v| v * 100.0)
        .collect()
}

/// Each part's percentage of the per-month total across all parts.
pub fn share_of_total(parts: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let len = parts.first().map_or(0, Vec::len);
    let totals: Vec<f64> = (0..len)
        .map(|i| parts.iter().map(|p| p[i]).sum())
        .collect();
    parts.iter().map(|p| percentage(p, &totals)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(year: i32, month: u32) -> Month {
        Month::new(year, month).unwrap()
    }

    fn index() -> TimeIndex {
        TimeIndex::span(m(2020, 1), m(2020, 4))
    }

    #[test]
    fn test_reindex_fills_gaps() {
        let mut values = MonthlyValues::new();
        values.insert(m(2020, 2), 3.0);
        values.insert(m(2020, 4), 1.0);
        values.insert(m(2021, 1), 9.0);
        assert_eq!(reindex(&values, &index()), vec![0.0, 3.0, 0.0, 1.0]);
    }

    #[test]
    fn test_count_and_sum() {
        let months = vec![m(2020, 1), m(2020, 1), m(2020, 3)];
        assert_eq!(count_months(months, &index()), vec![2.0, 0.0, 1.0, 0.0]);

        let obs = vec![(m(2020, 4), 2.5), (m(2020, 4), 0.5)];
        assert_eq!(sum_months(obs, &index()), vec![0.0, 0.0, 0.0, 3.0]);
    }

    #[test]
    fn test_cumulative() {
        assert_eq!(cumulative(&[1.0, 0.0, 2.0]), vec![1.0, 1.0, 3.0]);
        assert!(cumulative(&[]).is_empty());
    }

    #[test]
    fn test_ratio_zero_denominator() {
        assert_eq!(ratio(&[4.0, 3.0, 0.0], &[2.0, 0.0, 0.0]), vec![2.0, 0.0, 0.0]);
        assert_eq!(percentage(&[1.0, 1.0], &[4.0, 0.0]), vec![25.0, 0.0]);
    }

    #[test]
    fn test_share_of_total() {
        let shares = share_of_total(&[vec![1.0, 0.0], vec![3.0, 0.0]]);
        assert_eq!(shares, vec![vec![25.0, 0.0], vec![75.0, 0.0]]);
    }

    #[test]
    fn test_series_set_totals() {
        let set = SeriesSet::new(&index(), true)
            .push("a", vec![1.0, 2.0, 0.0, 0.0])
            .push("b", vec![1.0, 0.0, 0.0, 5.0]);
        assert_eq!(set.totals(), vec![2.0, 2.0, 0.0, 5.0]);
        assert!(set.get("b").is_some());
        assert!(set.get("c").is_none());
    }
}

//! Monthly and accumulated ratios between counts.
//!
//! Every ratio is 0 in months whose denominator is 0.

use super::editions::edits_in;
use super::factoids::{added_in_articles, deleted_in_articles};
use super::pages::{edited_pages, new_pages};
use super::users::{active_users, new_users, Who};
use crate::analytics::factoids::FactoidDiffs;
use crate::analytics::metrics_registry::{ChartShape, MetricCategory, MetricDescriptor};
use crate::analytics::series::{self, MetricOutput};
use crate::dataset::RevisionLog;
use crate::time_index::{Month, TimeIndex};
use crate::types::{Namespace, Revision};
use std::collections::HashMap;

macro_rules! ratio_metric {
    ($key:literal, $text:literal, $compute:ident, $description:literal) => {
        MetricDescriptor {
            key: $key,
            text: $text,
            category: MetricCategory::Ratios,
            shape: ChartShape::LineGraph,
            compute: $compute,
            description: $description,
        }
    };
}

pub const METRICS: &[MetricDescriptor] = &[
    ratio_metric!(
        "edits_per_users_monthly",
        "Edits per users",
        edits_per_users_monthly,
        "Number of edits for every month per number of active users that month"
    ),
    ratio_metric!(
        "edits_in_articles_per_users_monthly",
        "Article edits per user",
        edits_in_articles_per_users_monthly,
        "Number of edits in articles per number of users for each month"
    ),
    ratio_metric!(
        "edits_per_page_monthly",
        "Edits per edited pages",
        edits_per_page_monthly,
        "Number of edits for every month per number of pages edited that month"
    ),
    ratio_metric!(
        "percentage_edits_by_anonymous_monthly",
        "Anonymous edits (%)",
        percentage_edits_by_anonymous_monthly,
        "Percentage of edits made by anonymous users of the total edits."
    ),
    ratio_metric!(
        "added_per_deleted_factoids_monthly",
        "Added factoids per deleted factoids",
        added_per_deleted_factoids_monthly,
        "Number of added factoids per number of deleted factoids to the main namespace of the wiki"
    ),
    ratio_metric!(
        "added_factoids_per_users_anonymous_monthly",
        "Added factoids per active anonymous users",
        added_factoids_per_users_anonymous_monthly,
        "Number of added factoids per anonymous users who have made at least one contribution in a month"
    ),
    ratio_metric!(
        "deleted_factoids_per_users_anonymous_monthly",
        "Deleted factoids per active anonymous users",
        deleted_factoids_per_users_anonymous_monthly,
        "Number of deleted factoids per anonymous users who have made at least one contribution in a month"
    ),
    ratio_metric!(
        "added_factoids_per_users_new_monthly",
        "Added factoids per new users",
        added_factoids_per_users_new_monthly,
        "Number of added factoids per users who have made at least one edition grouped by the month they did their first edit"
    ),
    ratio_metric!(
        "deleted_factoids_per_users_new_monthly",
        "Deleted factoids per new users",
        deleted_factoids_per_users_new_monthly,
        "Number of deleted factoids per users who have made at least one edition grouped by the month they did their first edit"
    ),
    ratio_metric!(
        "edits_in_articles_per_users_accum",
        "Total articles edits per user",
        edits_in_articles_per_users_accum,
        "Number of total edits in articles per number of users until a given month"
    ),
    ratio_metric!(
        "edits_per_pages_accum",
        "Total edits per page",
        edits_per_pages_accum,
        "Number of total edits per number of total pages"
    ),
    ratio_metric!(
        "percentage_edits_by_anonymous_accum",
        "Total anonymous edits (%)",
        percentage_edits_by_anonymous_accum,
        "Percentage, per month, of edits made by anonymous users of the total edits."
    ),
    ratio_metric!(
        "added_per_deleted_factoids_acum",
        "Total added factoids per deleted factoids",
        added_per_deleted_factoids_acum,
        "Number of total added factoids per number of total deleted factoids to the main namespace of the wiki"
    ),
];

fn anonymous_edits(log: &RevisionLog, index: &TimeIndex) -> Vec<f64> {
    series::count_by_month(log.iter().filter(|r| r.is_anonymous()), index)
}

/// Revisions made during their contributor's first active month.
fn first_month_revisions(log: &RevisionLog) -> Vec<&Revision> {
    let mut first_month: HashMap<&str, Month> = HashMap::new();
    for rev in log {
        first_month
            .entry(rev.contributor_id.as_str())
            .or_insert_with(|| rev.month());
    }
    log.iter()
        .filter(|r| first_month.get(r.contributor_id.as_str()) == Some(&r.month()))
        .collect()
}

// ============================================
// Monthly
// ============================================

fn edits_per_users_monthly(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let values = series::ratio(&edits_in(log, index, None), &active_users(log, index, Who::All));
    MetricOutput::single(index, "Edits per users", values)
}

fn edits_in_articles_per_users_monthly(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let values = series::ratio(
        &edits_in(log, index, Some(Namespace::Article)),
        &active_users(log, index, Who::All),
    );
    MetricOutput::single(index, "Article edits per user", values)
}

fn edits_per_page_monthly(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let values = series::ratio(&edits_in(log, index, None), &edited_pages(log, index));
    MetricOutput::single(index, "Edits per edited pages", values)
}

fn percentage_edits_by_anonymous_monthly(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let values = series::percentage(&anonymous_edits(log, index), &edits_in(log, index, None));
    MetricOutput::single(index, "Anonymous edits (%)", values)
}

fn added_per_deleted_factoids_monthly(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let diffs = FactoidDiffs::compute(log);
    let values = series::ratio(
        &added_in_articles(log, index, &diffs),
        &deleted_in_articles(log, index, &diffs),
    );
    MetricOutput::single(index, "Added factoids per deleted factoids", values)
}

fn added_factoids_per_users_anonymous_monthly(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let diffs = FactoidDiffs::compute(log);
    let added = added_in_articles(log.iter().filter(|r| r.is_anonymous()), index, &diffs);
    let values = series::ratio(&added, &active_users(log, index, Who::Anonymous));
    MetricOutput::single(index, "Added factoids per active anonymous users", values)
}

fn deleted_factoids_per_users_anonymous_monthly(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let diffs = FactoidDiffs::compute(log);
    let deleted = deleted_in_articles(log.iter().filter(|r| r.is_anonymous()), index, &diffs);
    let values = series::ratio(&deleted, &active_users(log, index, Who::Anonymous));
    MetricOutput::single(index, "Deleted factoids per active anonymous users", values)
}

fn added_factoids_per_users_new_monthly(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let diffs = FactoidDiffs::compute(log);
    let added = added_in_articles(first_month_revisions(log), index, &diffs);
    let values = series::ratio(&added, &new_users(log, index, Who::All));
    MetricOutput::single(index, "Added factoids per new users", values)
}

fn deleted_factoids_per_users_new_monthly(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let diffs = FactoidDiffs::compute(log);
    let deleted = deleted_in_articles(first_month_revisions(log), index, &diffs);
    let values = series::ratio(&deleted, &new_users(log, index, Who::All));
    MetricOutput::single(index, "Deleted factoids per new users", values)
}

// ============================================
// Accumulated
// ============================================

fn edits_in_articles_per_users_accum(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let values = series::ratio(
        &series::cumulative(&edits_in(log, index, Some(Namespace::Article))),
        &series::cumulative(&new_users(log, index, Who::All)),
    );
    MetricOutput::single(index, "Total articles edits per user", values)
}

fn edits_per_pages_accum(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let values = series::ratio(
        &series::cumulative(&edits_in(log, index, None)),
        &series::cumulative(&new_pages(log, index)),
    );
    MetricOutput::single(index, "Total edits per page", values)
}

fn percentage_edits_by_anonymous_accum(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let values = series::percentage(
        &series::cumulative(&anonymous_edits(log, index)),
        &series::cumulative(&edits_in(log, index, None)),
    );
    MetricOutput::single(index, "Total anonymous edits (%)", values)
}

fn added_per_deleted_factoids_acum(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let diffs = FactoidDiffs::compute(log);
    let values = series::ratio(
        &series::cumulative(&added_in_articles(log, index, &diffs)),
        &series::cumulative(&deleted_in_articles(log, index, &diffs)),
    );
    MetricOutput::single(index, "Total added factoids per deleted factoids", values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::families::testing::{dataset, single, Rev};

    fn sample() -> (RevisionLog, TimeIndex) {
        dataset(vec![
            Rev { page: 1, contributor: "alice", month: 1, factoids: "a,b", ..Default::default() },
            Rev { page: 1, contributor: "alice", month: 1, day: 2, factoids: "a", ..Default::default() },
            Rev { page: 2, ns: 1, contributor: "10.0.0.1", month: 1, day: 3, ..Default::default() },
            Rev { page: 1, contributor: "bob", month: 3, factoids: "a,c,d", ..Default::default() },
        ])
    }

    #[test]
    fn test_monthly_ratios() {
        let (log, index) = sample();
        assert_eq!(single(edits_per_users_monthly(&log, &index)), vec![1.5, 0.0, 1.0]);
        assert_eq!(single(edits_in_articles_per_users_monthly(&log, &index)), vec![1.0, 0.0, 1.0]);
        assert_eq!(single(edits_per_page_monthly(&log, &index)), vec![1.5, 0.0, 1.0]);

        let anonymous = single(percentage_edits_by_anonymous_monthly(&log, &index));
        assert!((anonymous[0] - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(&anonymous[1..], &[0.0, 0.0]);
    }

    #[test]
    fn test_factoid_ratios() {
        let (log, index) = sample();
        // month 1 adds a,b then drops b; month 3 adds c,d with no deletion
        assert_eq!(single(added_per_deleted_factoids_monthly(&log, &index)), vec![2.0, 0.0, 0.0]);
        assert_eq!(single(added_per_deleted_factoids_acum(&log, &index)), vec![2.0, 2.0, 4.0]);
        assert_eq!(single(added_factoids_per_users_new_monthly(&log, &index)), vec![1.0, 0.0, 2.0]);
        assert_eq!(single(deleted_factoids_per_users_new_monthly(&log, &index)), vec![0.5, 0.0, 0.0]);
        assert_eq!(single(added_factoids_per_users_anonymous_monthly(&log, &index)), vec![0.0; 3]);
    }

    #[test]
    fn test_accumulated_ratios() {
        let (log, index) = sample();
        assert_eq!(single(edits_per_pages_accum(&log, &index)), vec![1.5, 1.5, 2.0]);
        assert_eq!(single(edits_in_articles_per_users_accum(&log, &index)), vec![1.0, 1.0, 1.0]);

        let anonymous = single(percentage_edits_by_anonymous_accum(&log, &index));
        assert!((anonymous[2] - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_denominator_yields_zero() {
        let (log, index) = dataset(vec![Rev { contributor: "10.0.0.1", ..Default::default() }]);
        assert_eq!(single(added_per_deleted_factoids_monthly(&log, &index)), vec![0.0]);
        assert_eq!(single(deleted_factoids_per_users_anonymous_monthly(&log, &index)), vec![0.0]);
    }
}

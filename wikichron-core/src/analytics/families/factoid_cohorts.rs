//! Factoids added and deleted in articles, by cohort of the registered author.

use crate::analytics::cohort::{
    activity_table, cohort_series, Cohort, ContributorMonth, Experience, Measure, Recency,
    Streak, Tenure,
};
use crate::analytics::factoids::FactoidDiffs;
use crate::analytics::metrics_registry::{ChartShape, MetricCategory, MetricDescriptor};
use crate::analytics::series::MetricOutput;
use crate::dataset::RevisionLog;
use crate::time_index::TimeIndex;

macro_rules! factoid_metric {
    ($key:literal, $text:literal, $compute:ident, $description:literal) => {
        MetricDescriptor {
            key: $key,
            text: $text,
            category: MetricCategory::DistributionOfFactoidsAcrossRegisteredUsers,
            shape: ChartShape::BarGraph,
            compute: $compute,
            description: $description,
        }
    };
}

pub const METRICS: &[MetricDescriptor] = &[
    factoid_metric!(
        "added_factoids_by_edit_experience",
        "Added factoids by editing experience",
        added_factoids_by_edit_experience,
        "Added factoids by editing experience"
    ),
    factoid_metric!(
        "deleted_factoids_by_edit_experience",
        "Deleted factoids by editing experience",
        deleted_factoids_by_edit_experience,
        "Deleted factoids by editing experience"
    ),
    factoid_metric!(
        "added_factoids_by_tenure",
        "Added factoids by users by tenure",
        added_factoids_by_tenure,
        "Added factoids by users by tenure"
    ),
    factoid_metric!(
        "deleted_factoids_by_tenure",
        "Deleted factoids by tenure",
        deleted_factoids_by_tenure,
        "Deleted factoids by users by tenure"
    ),
    factoid_metric!(
        "added_factoids_by_edit_streak",
        "Added factoids by users by edit streak",
        added_factoids_by_edit_streak,
        "Number of added factoids by users by edit streak."
    ),
    factoid_metric!(
        "deleted_factoids_by_edit_streak",
        "Deleted factoids by users by edit streak",
        deleted_factoids_by_edit_streak,
        "Number of deleted factoids by users by edit streak."
    ),
    factoid_metric!(
        "added_factoids_by_last_edit",
        "Added factoids by users by the date of last edit",
        added_factoids_by_last_edit,
        "Added factoids by users by the date of last edit"
    ),
    factoid_metric!(
        "deleted_factoids_by_last_edit",
        "Deleted factoids by the date of last edit",
        deleted_factoids_by_last_edit,
        "Deleted factoids by users by the date of last edit"
    ),
];

/// Activity of registered contributors in articles, with factoid columns.
///
/// Deltas come from the whole log so an article's previous revision counts
/// even when an anonymous contributor made it.
fn article_rows(log: &RevisionLog) -> Vec<ContributorMonth> {
    let diffs = FactoidDiffs::compute(log);
    activity_table(log.iter().filter(|r| r.is_article()), Some(&diffs))
}

fn by_cohort<C: Cohort>(log: &RevisionLog, index: &TimeIndex, measure: Measure) -> MetricOutput {
    MetricOutput::Series(cohort_series::<C>(&article_rows(log), index, measure))
}

fn added_factoids_by_edit_experience(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    by_cohort::<Experience>(log, index, Measure::AddedFactoids)
}

fn deleted_factoids_by_edit_experience(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    by_cohort::<Experience>(log, index, Measure::DeletedFactoids)
}

fn added_factoids_by_tenure(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    by_cohort::<Tenure>(log, index, Measure::AddedFactoids)
}

fn deleted_factoids_by_tenure(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    by_cohort::<Tenure>(log, index, Measure::DeletedFactoids)
}

fn added_factoids_by_edit_streak(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    by_cohort::<Streak>(log, index, Measure::AddedFactoids)
}

fn deleted_factoids_by_edit_streak(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    by_cohort::<Streak>(log, index, Measure::DeletedFactoids)
}

fn added_factoids_by_last_edit(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    by_cohort::<Recency>(log, index, Measure::AddedFactoids)
}

fn deleted_factoids_by_last_edit(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    by_cohort::<Recency>(log, index, Measure::DeletedFactoids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::families::testing::{dataset, Rev};

    fn sample() -> (RevisionLog, TimeIndex) {
        dataset(vec![
            Rev { contributor: "alice", month: 1, factoids: "a,b", ..Default::default() },
            // anonymous edits are skipped but still set the predecessor
            Rev { contributor: "10.0.0.1", month: 1, day: 2, factoids: "a,b,c", ..Default::default() },
            Rev { contributor: "bob", month: 2, factoids: "a,c,d", ..Default::default() },
            Rev { contributor: "alice", month: 2, day: 2, page: 2, ns: 1, factoids: "z", ..Default::default() },
        ])
    }

    #[test]
    fn test_added_factoids_by_tenure() {
        let (log, index) = sample();
        let output = added_factoids_by_tenure(&log, &index);
        let set = output.as_series().unwrap();
        assert!(set.accumulated);
        assert_eq!(set.get("By new users").unwrap().values, vec![2.0, 1.0]);
        assert_eq!(set.totals(), vec![2.0, 1.0]);
    }

    #[test]
    fn test_deleted_factoids_by_experience() {
        let (log, index) = sample();
        let output = deleted_factoids_by_edit_experience(&log, &index);
        let set = output.as_series().unwrap();
        assert_eq!(set.get("By new users").unwrap().values, vec![0.0, 1.0]);
        assert_eq!(set.totals(), vec![0.0, 1.0]);
    }

    #[test]
    fn test_streak_labels_match_edit_labels() {
        let (log, index) = sample();
        let output = added_factoids_by_edit_streak(&log, &index);
        let set = output.as_series().unwrap();
        assert!(set.get("1 month editing").is_some());
        assert_eq!(set.series.len(), 4);
    }
}

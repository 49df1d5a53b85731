//! Edits of registered contributors broken down by the cohort of their author.

use super::active_editors::{namespace_breakdown, NamespaceGroup};
use crate::analytics::cohort::{
    activity_table, cohort_series, cohort_shares, Experience, Measure, Recency, Streak, Tenure,
};
use crate::analytics::metrics_registry::{ChartShape, MetricCategory, MetricDescriptor};
use crate::analytics::series::MetricOutput;
use crate::dataset::RevisionLog;
use crate::time_index::TimeIndex;
use crate::types::Namespace;

macro_rules! edits_metric {
    ($key:literal, $text:literal, $compute:ident, $description:literal) => {
        MetricDescriptor {
            key: $key,
            text: $text,
            category: MetricCategory::DistributionOfEditsAcrossRegisteredUsers,
            shape: ChartShape::BarGraph,
            compute: $compute,
            description: $description,
        }
    };
}

pub const METRICS: &[MetricDescriptor] = &[
    edits_metric!(
        "number_of_edits_experience",
        "By editing experience",
        number_of_edits_experience,
        "Distribution of edits across distribution of editors by their number of previous edits"
    ),
    edits_metric!(
        "percentage_of_edits_experience",
        "By editing experience (in %)",
        percentage_of_edits_experience,
        "Distribution of edits across distribution of editors by their number of previous edits (in %)"
    ),
    edits_metric!(
        "number_of_edits_tenure",
        "By tenure",
        number_of_edits_tenure,
        "Distribution of edits across distribution of editors by their time participating in the wiki"
    ),
    edits_metric!(
        "percentage_of_edits_tenure",
        "By tenure (in %)",
        percentage_of_edits_tenure,
        "Distribution of edits across distribution of editors by their time participating in the wiki (in %)"
    ),
    edits_metric!(
        "edits_by_current_streak",
        "By edit streak",
        edits_by_current_streak,
        "Distribution of edits across distribution of editors by their last streak editing the wiki"
    ),
    edits_metric!(
        "edits_by_current_streak_only_means",
        "By edit in article streak",
        edits_by_current_streak_only_means,
        "Distribution of edits across distribution of editors by their last streak editing articles in the wiki"
    ),
    edits_metric!(
        "number_of_edits_last_edit",
        "By date of the last edit",
        number_of_edits_last_edit,
        "Distribution of edits across distribution of editors by their last edit in the wiki"
    ),
    edits_metric!(
        "percentage_of_edits_last_edit",
        "By date of the last edit (in %)",
        percentage_of_edits_last_edit,
        "Distribution of edits across distribution of editors by their last edit in the wiki (in %)"
    ),
    edits_metric!(
        "edition_on_type_pages",
        "By namespace edited",
        edition_on_type_pages,
        "Distribution of edits in the most popular namespaces"
    ),
    edits_metric!(
        "edition_on_type_pages_extends_rest",
        "By other namespace edited",
        edition_on_type_pages_extends_rest,
        "Distribution of edits in less popular namespaces"
    ),
];

/// Partitions every registered edit.
const EDIT_NAMESPACES: &[NamespaceGroup] = &[
    NamespaceGroup::Only(Namespace::Article),
    NamespaceGroup::Only(Namespace::ArticleTalk),
    NamespaceGroup::Only(Namespace::UserTalk),
    NamespaceGroup::Only(Namespace::User),
    NamespaceGroup::Rest(&[0, 1, 2, 3]),
];

/// Splits the rest group of [`EDIT_NAMESPACES`].
const EDIT_NAMESPACES_EXTENDED: &[NamespaceGroup] = &[
    NamespaceGroup::Only(Namespace::File),
    NamespaceGroup::Only(Namespace::MediaWiki),
    NamespaceGroup::Only(Namespace::Template),
    NamespaceGroup::Only(Namespace::Category),
    NamespaceGroup::Rest(&[0, 1, 2, 3, 6, 8, 10, 14]),
];

fn number_of_edits_experience(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let rows = activity_table(log, None);
    MetricOutput::Series(cohort_series::<Experience>(&rows, index, Measure::Edits))
}

fn percentage_of_edits_experience(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let rows = activity_table(log, None);
    MetricOutput::Series(cohort_shares::<Experience>(&rows, index, Measure::Edits))
}

fn number_of_edits_tenure(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let rows = activity_table(log, None);
    MetricOutput::Series(cohort_series::<Tenure>(&rows, index, Measure::Edits))
}

fn percentage_of_edits_tenure(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let rows = activity_table(log, None);
    MetricOutput::Series(cohort_shares::<Tenure>(&rows, index, Measure::Edits))
}

fn edits_by_current_streak(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let rows = activity_table(log, None);
    MetricOutput::Series(cohort_series::<Streak>(&rows, index, Measure::Edits))
}

fn edits_by_current_streak_only_means(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let rows = activity_table(log.iter().filter(|r| r.is_article()), None);
    MetricOutput::Series(cohort_series::<Streak>(&rows, index, Measure::Edits))
}

fn number_of_edits_last_edit(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let rows = activity_table(log, None);
    MetricOutput::Series(cohort_series::<Recency>(&rows, index, Measure::Edits))
}

fn percentage_of_edits_last_edit(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let rows = activity_table(log, None);
    MetricOutput::Series(cohort_shares::<Recency>(&rows, index, Measure::Edits))
}

fn edition_on_type_pages(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    MetricOutput::Series(namespace_breakdown(log, index, EDIT_NAMESPACES, Measure::Edits))
}

fn edition_on_type_pages_extends_rest(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    MetricOutput::Series(namespace_breakdown(
        log,
        index,
        EDIT_NAMESPACES_EXTENDED,
        Measure::Edits,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::families::testing::{dataset, Rev};
    use crate::analytics::series;

    fn sample() -> (RevisionLog, TimeIndex) {
        let mut rows = vec![
            Rev { contributor: "alice", month: 1, ..Default::default() },
            Rev { contributor: "alice", month: 1, day: 2, ns: 3, ..Default::default() },
            Rev { contributor: "bob", month: 2, ns: 14, ..Default::default() },
            Rev { contributor: "bob", month: 2, day: 2, ns: 2, ..Default::default() },
            Rev { contributor: "10.0.0.1", month: 2, ..Default::default() },
        ];
        rows.extend((1..=6).map(|day| Rev { contributor: "alice", month: 3, day, ..Default::default() }));
        dataset(rows)
    }

    fn registered_edits(log: &RevisionLog, index: &TimeIndex) -> Vec<f64> {
        series::count_by_month(log.registered(), index)
    }

    #[test]
    fn test_cohort_edits_partition_registered_edits() {
        let (log, index) = sample();
        let expected = registered_edits(&log, &index);
        for output in [
            number_of_edits_experience(&log, &index),
            number_of_edits_tenure(&log, &index),
            edits_by_current_streak(&log, &index),
            number_of_edits_last_edit(&log, &index),
        ] {
            assert_eq!(output.as_series().unwrap().totals(), expected);
        }
    }

    #[test]
    fn test_experience_counts_prior_edits() {
        let (log, index) = sample();
        let output = number_of_edits_experience(&log, &index);
        let set = output.as_series().unwrap();
        assert_eq!(set.get("New users").unwrap().values, vec![2.0, 2.0, 0.0]);
        assert_eq!(set.get("Btw. 1 and 4 edits").unwrap().values, vec![0.0, 0.0, 6.0]);

        let shares = percentage_of_edits_experience(&log, &index);
        let set = shares.as_series().unwrap();
        assert_eq!(set.get("Btw. 1 and 4 edits").unwrap().values, vec![0.0, 0.0, 100.0]);
    }

    #[test]
    fn test_namespace_groups_partition_registered_edits() {
        let (log, index) = sample();
        let expected = registered_edits(&log, &index);
        let output = edition_on_type_pages(&log, &index);
        let set = output.as_series().unwrap();
        assert_eq!(set.totals(), expected);
        assert_eq!(set.get("Other pages").unwrap().values, vec![0.0, 1.0, 0.0]);

        let output = edition_on_type_pages_extends_rest(&log, &index);
        let set = output.as_series().unwrap();
        assert_eq!(set.get("Category pages").unwrap().values, vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_article_streak_ignores_other_namespaces() {
        let (log, index) = sample();
        let output = edits_by_current_streak_only_means(&log, &index);
        let set = output.as_series().unwrap();
        assert_eq!(set.totals(), vec![1.0, 0.0, 6.0]);
    }
}

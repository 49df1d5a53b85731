//! Factoids added to and removed from articles.

use crate::analytics::factoids::FactoidDiffs;
use crate::analytics::metrics_registry::{ChartShape, MetricCategory, MetricDescriptor};
use crate::analytics::series::{self, MetricOutput};
use crate::dataset::RevisionLog;
use crate::time_index::TimeIndex;
use crate::types::Revision;

pub const METRICS: &[MetricDescriptor] = &[
    MetricDescriptor {
        key: "monthly_added_factoids",
        text: "Added factoids",
        category: MetricCategory::Factoids,
        shape: ChartShape::LineGraph,
        compute: monthly_added_factoids,
        description: "Number of added factoids in articles.",
    },
    MetricDescriptor {
        key: "monthly_deleted_factoids",
        text: "Deleted factoids",
        category: MetricCategory::Factoids,
        shape: ChartShape::LineGraph,
        compute: monthly_deleted_factoids,
        description: "Number of deleted factoids in articles.",
    },
    MetricDescriptor {
        key: "monthly_added_factoids_acum",
        text: "Total added factoids",
        category: MetricCategory::Factoids,
        shape: ChartShape::LineGraph,
        compute: monthly_added_factoids_acum,
        description: "Total number of added factoids in articles.",
    },
    MetricDescriptor {
        key: "monthly_deleted_factoids_acum",
        text: "Total deleted factoids",
        category: MetricCategory::Factoids,
        shape: ChartShape::LineGraph,
        compute: monthly_deleted_factoids_acum,
        description: "Total number of deleted factoids in articles.",
    },
];

/// Factoids added per month by the article revisions among `revisions`.
pub(crate) fn added_in_articles<'a, I>(revisions: I, index: &TimeIndex, diffs: &FactoidDiffs) -> Vec<f64>
where
    I: IntoIterator<Item = &'a Revision>,
{
    series::sum_by_month(
        revisions.into_iter().filter(|r| r.is_article()),
        index,
        |r| diffs.added(r),
    )
}

/// Factoids removed per month by the article revisions among `revisions`.
pub(crate) fn deleted_in_articles<'a, I>(revisions: I, index: &TimeIndex, diffs: &FactoidDiffs) -> Vec<f64>
where
    I: IntoIterator<Item = &'a Revision>,
{
    series::sum_by_month(
        revisions.into_iter().filter(|r| r.is_article()),
        index,
        |r| diffs.removed(r),
    )
}

fn monthly_added_factoids(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let diffs = FactoidDiffs::compute(log);
    MetricOutput::single(index, "Added factoids", added_in_articles(log, index, &diffs))
}

fn monthly_deleted_factoids(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let diffs = FactoidDiffs::compute(log);
    MetricOutput::single(index, "Deleted factoids", deleted_in_articles(log, index, &diffs))
}

fn monthly_added_factoids_acum(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let diffs = FactoidDiffs::compute(log);
    let values = series::cumulative(&added_in_articles(log, index, &diffs));
    MetricOutput::single(index, "Total added factoids", values)
}

fn monthly_deleted_factoids_acum(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let diffs = FactoidDiffs::compute(log);
    let values = series::cumulative(&deleted_in_articles(log, index, &diffs));
    MetricOutput::single(index, "Total deleted factoids", values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::families::testing::{dataset, single, Rev};

    #[test]
    fn test_article_factoids() {
        let (log, index) = dataset(vec![
            Rev { page: 1, month: 1, factoids: "a,b", ..Default::default() },
            Rev { page: 1, month: 2, factoids: "a,c", ..Default::default() },
            // talk pages never count
            Rev { page: 2, ns: 1, month: 2, factoids: "x,y,z", ..Default::default() },
            Rev { page: 1, month: 3, contributor: "10.0.0.1", factoids: "", ..Default::default() },
        ]);

        assert_eq!(single(monthly_added_factoids(&log, &index)), vec![2.0, 1.0, 0.0]);
        assert_eq!(single(monthly_deleted_factoids(&log, &index)), vec![0.0, 1.0, 2.0]);
        assert_eq!(single(monthly_added_factoids_acum(&log, &index)), vec![2.0, 3.0, 3.0]);
        assert_eq!(single(monthly_deleted_factoids_acum(&log, &index)), vec![0.0, 1.0, 3.0]);
    }
}

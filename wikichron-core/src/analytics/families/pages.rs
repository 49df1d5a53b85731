//! Page creation and page activity.

use crate::analytics::metrics_registry::{ChartShape, MetricCategory, MetricDescriptor};
use crate::analytics::series::{self, MetricOutput};
use crate::dataset::RevisionLog;
use crate::time_index::TimeIndex;
use crate::types::Revision;

pub const METRICS: &[MetricDescriptor] = &[
    MetricDescriptor {
        key: "pages_new",
        text: "New pages",
        category: MetricCategory::Pages,
        shape: ChartShape::LineGraph,
        compute: pages_new,
        description: "Number of new pages created per month",
    },
    MetricDescriptor {
        key: "pages_main_new",
        text: "New articles",
        category: MetricCategory::Pages,
        shape: ChartShape::LineGraph,
        compute: pages_main_new,
        description: "Number of new articles (main content) created per month",
    },
    MetricDescriptor {
        key: "pages_edited",
        text: "Pages edited",
        category: MetricCategory::Pages,
        shape: ChartShape::LineGraph,
        compute: pages_edited,
        description: "Number of different pages edited per month",
    },
    MetricDescriptor {
        key: "main_edited",
        text: "Articles edited",
        category: MetricCategory::Pages,
        shape: ChartShape::LineGraph,
        compute: main_edited,
        description: "Number of different articles edited per month",
    },
    MetricDescriptor {
        key: "pages_accum",
        text: "Total pages",
        category: MetricCategory::Pages,
        shape: ChartShape::LineGraph,
        compute: pages_accum,
        description: "Total of pages accumulated at every month",
    },
    MetricDescriptor {
        key: "pages_main_accum",
        text: "Total articles",
        category: MetricCategory::Pages,
        shape: ChartShape::LineGraph,
        compute: pages_main_accum,
        description: "Total of articles (main content) at every month",
    },
];

/// Pages counted in the month of their first revision.
pub(crate) fn new_pages<'a, I>(revisions: I, index: &TimeIndex) -> Vec<f64>
where
    I: IntoIterator<Item = &'a Revision>,
{
    series::first_seen_by_month(revisions, index, |r| r.page_id)
}

/// Distinct pages edited each month.
pub(crate) fn edited_pages<'a, I>(revisions: I, index: &TimeIndex) -> Vec<f64>
where
    I: IntoIterator<Item = &'a Revision>,
{
    series::unique_by_month(revisions, index, |r| r.page_id)
}

fn pages_new(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    MetricOutput::single(index, "New pages", new_pages(log, index))
}

fn pages_main_new(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let values = new_pages(log.iter().filter(|r| r.is_article()), index);
    MetricOutput::single(index, "New articles", values)
}

fn pages_edited(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    MetricOutput::single(index, "Pages edited", edited_pages(log, index))
}

fn main_edited(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let values = edited_pages(log.iter().filter(|r| r.is_article()), index);
    MetricOutput::single(index, "Articles edited", values)
}

fn pages_accum(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let values = series::cumulative(&new_pages(log, index));
    MetricOutput::single(index, "Total pages", values)
}

fn pages_main_accum(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let values = series::cumulative(&new_pages(log.iter().filter(|r| r.is_article()), index));
    MetricOutput::single(index, "Total articles", values)
}

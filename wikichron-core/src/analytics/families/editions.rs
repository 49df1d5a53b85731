//! Edit volume per namespace.

use crate::analytics::metrics_registry::{ChartShape, MetricCategory, MetricDescriptor};
use crate::analytics::series::{self, MetricOutput};
use crate::dataset::RevisionLog;
use crate::time_index::TimeIndex;
use crate::types::Namespace;

pub const METRICS: &[MetricDescriptor] = &[
    MetricDescriptor {
        key: "edits",
        text: "Edits in pages",
        category: MetricCategory::Editions,
        shape: ChartShape::LineGraph,
        compute: edits,
        description: "Editions to any part of the wiki grouped by month",
    },
    MetricDescriptor {
        key: "edits_main_content",
        text: "Edits in articles",
        category: MetricCategory::Editions,
        shape: ChartShape::LineGraph,
        compute: edits_main_content,
        description: "Editions to articles (main content) per month",
    },
    MetricDescriptor {
        key: "edits_article_talk",
        text: "Edits in articles talk",
        category: MetricCategory::Editions,
        shape: ChartShape::LineGraph,
        compute: edits_article_talk,
        description: "Editions to article discussion pages",
    },
    MetricDescriptor {
        key: "edits_user_talk",
        text: "Edits in user talk",
        category: MetricCategory::Editions,
        shape: ChartShape::LineGraph,
        compute: edits_user_talk,
        description: "Editions to user discussion pages",
    },
    MetricDescriptor {
        key: "edits_accum",
        text: "Total edits in pages",
        category: MetricCategory::Editions,
        shape: ChartShape::LineGraph,
        compute: edits_accum,
        description: "Total editions to any part of the wiki accumulated at every month",
    },
    MetricDescriptor {
        key: "edits_main_content_accum",
        text: "Total edits in articles",
        category: MetricCategory::Editions,
        shape: ChartShape::LineGraph,
        compute: edits_main_content_accum,
        description: "Editions to articles accumulated at every month",
    },
    MetricDescriptor {
        key: "dormantWiki",
        text: "Active or dormant wiki",
        category: MetricCategory::Editions,
        shape: ChartShape::LineGraph,
        compute: dormant_wiki,
        description: "The metric allows you to see the months in which a wiki is inactive",
    },
];

/// Edits per month, optionally restricted to one namespace.
pub(crate) fn edits_in(log: &RevisionLog, index: &TimeIndex, ns: Option<Namespace>) -> Vec<f64> {
    series::count_by_month(
        log.iter()
            .filter(|r| ns.map_or(true, |ns| r.namespace() == ns)),
        index,
    )
}

fn edits(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    MetricOutput::single(index, "Edits in pages", edits_in(log, index, None))
}

fn edits_main_content(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let values = edits_in(log, index, Some(Namespace::Article));
    MetricOutput::single(index, "Edits in articles", values)
}

fn edits_article_talk(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let values = edits_in(log, index, Some(Namespace::ArticleTalk));
    MetricOutput::single(index, "Edits in articles talk", values)
}

fn edits_user_talk(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let values = edits_in(log, index, Some(Namespace::UserTalk));
    MetricOutput::single(index, "Edits in user talk", values)
}

fn edits_accum(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let values = series::cumulative(&edits_in(log, index, None));
    MetricOutput::single(index, "Total edits in pages", values)
}

fn edits_main_content_accum(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let values = series::cumulative(&edits_in(log, index, Some(Namespace::Article)));
    MetricOutput::single(index, "Total edits in articles", values)
}

/// 1 for months with at least one edit, 0 for dormant months.
fn dormant_wiki(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let values = edits_in(log, index, None)
        .into_iter()
        .map(|n| if n > 0.0 { 1.0 } else { 0.0 })
        .collect();
    MetricOutput::single(index, "Active or dormant wiki", values)
}

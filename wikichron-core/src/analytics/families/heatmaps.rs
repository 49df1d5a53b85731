//! Per-page heatmaps over registered contributors' edits.

use crate::analytics::heatmap::{BinSpec, HeatMap};
use crate::analytics::metrics_registry::{ChartShape, MetricCategory, MetricDescriptor};
use crate::analytics::series::MetricOutput;
use crate::dataset::RevisionLog;
use crate::time_index::{Month, TimeIndex};
use crate::types::Revision;
use std::collections::{BTreeMap, HashMap, HashSet};

pub const METRICS: &[MetricDescriptor] = &[
    MetricDescriptor {
        key: "bytes_added_across_articles",
        text: "Bytes added across articles",
        category: MetricCategory::DistributionOfEdits,
        shape: ChartShape::HeatMap,
        compute: bytes_added_across_articles,
        description: "Number of articles (z axis) than added these bytes (y axis).",
    },
    MetricDescriptor {
        key: "bytes_deleted_across_articles",
        text: "Bytes deleted across articles",
        category: MetricCategory::DistributionOfEdits,
        shape: ChartShape::HeatMap,
        compute: bytes_deleted_across_articles,
        description: "Number of articles (z axis) than deleted these bytes (y axis).",
    },
    MetricDescriptor {
        key: "distribution_editors_between_articles_edited_each_month",
        text: "Distribution of editors across articles",
        category: MetricCategory::ActiveUserDistribution,
        shape: ChartShape::HeatMap,
        compute: distribution_editors_between_articles_edited_each_month,
        description: "Number of articles (z axis) with the same number of editors (y axis)",
    },
    MetricDescriptor {
        key: "edition_on_pages",
        text: "Edits on pages",
        category: MetricCategory::DistributionOfEdits,
        shape: ChartShape::HeatMap,
        compute: edition_on_pages,
        description: "Number of pages (z axis) with these edits (y axis)",
    },
    MetricDescriptor {
        key: "revision_on_pages",
        text: "Revisions on pages",
        category: MetricCategory::DistributionOfEdits,
        shape: ChartShape::HeatMap,
        compute: revision_on_pages,
        description: "Number of pages (z axis) with these revisions (y axis)",
    },
];

/// Byte deltas are clipped to 1000 into ten 100-byte bins plus an overflow bin.
const BYTES_BINS: BinSpec = BinSpec {
    lower: 0,
    width: 100,
    bins: 11,
};
const PAGE_EDITS_BIN_WIDTH: i64 = 5;

// ============================================
// Helpers
// ============================================

/// Size change of every registered article revision against the previous
/// registered revision of its page.
///
/// The first such revision of a page changes it by its whole size.
fn byte_deltas(log: &RevisionLog) -> Vec<(Month, i64)> {
    let mut previous: HashMap<i64, i64> = HashMap::new();
    log.registered()
        .filter(|r| r.is_article())
        .map(|rev| {
            let before = previous.insert(rev.page_id, rev.bytes).unwrap_or(0);
            (rev.month(), rev.bytes - before)
        })
        .collect()
}

/// Revisions per `(month, page)`.
fn edits_per_page<'a, I>(revisions: I) -> BTreeMap<(Month, i64), i64>
where
    I: IntoIterator<Item = &'a Revision>,
{
    let mut counts = BTreeMap::new();
    for rev in revisions {
        *counts.entry((rev.month(), rev.page_id)).or_insert(0) += 1;
    }
    counts
}

/// Bin per-page counts into `width`-wide bins starting at 1.
fn page_count_heatmap(
    index: &TimeIndex,
    counts: BTreeMap<(Month, i64), i64>,
    width: i64,
    z_label: &str,
) -> MetricOutput {
    let max = counts.values().copied().max().unwrap_or(1);
    let spec = BinSpec::covering(1, width, max);
    let observations = counts.into_iter().map(|((month, _), n)| (month, n));
    MetricOutput::HeatMap(HeatMap::bin(index, &spec, observations, z_label))
}

fn byte_heatmap(log: &RevisionLog, index: &TimeIndex, added: bool) -> MetricOutput {
    let observations = byte_deltas(log)
        .into_iter()
        .filter_map(|(month, delta)| match (added, delta) {
            (true, d) if d > 0 => Some((month, d)),
            (false, d) if d < 0 => Some((month, -d)),
            _ => None,
        })
        .collect::<Vec<_>>();
    MetricOutput::HeatMap(HeatMap::bin(index, &BYTES_BINS, observations, "Number of articles"))
}

// ============================================
// Compute functions
// ============================================

fn bytes_added_across_articles(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    byte_heatmap(log, index, true)
}

fn bytes_deleted_across_articles(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    byte_heatmap(log, index, false)
}

fn distribution_editors_between_articles_edited_each_month(
    log: &RevisionLog,
    index: &TimeIndex,
) -> MetricOutput {
    let editors: HashSet<(Month, i64, &str)> = log
        .registered()
        .filter(|r| r.is_article())
        .map(|r| (r.month(), r.page_id, r.contributor_id.as_str()))
        .collect();
    let mut counts: BTreeMap<(Month, i64), i64> = BTreeMap::new();
    for (month, page, _) in editors {
        *counts.entry((month, page)).or_insert(0) += 1;
    }
    page_count_heatmap(index, counts, 1, "Number of articles")
}

fn edition_on_pages(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let counts = edits_per_page(log.registered());
    page_count_heatmap(index, counts, PAGE_EDITS_BIN_WIDTH, "Number of pages")
}

fn revision_on_pages(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let mut seen: HashSet<i64> = HashSet::new();
    let later: Vec<&Revision> = log
        .registered()
        .filter(|r| !seen.insert(r.page_id))
        .collect();
    let counts = edits_per_page(later);
    page_count_heatmap(index, counts, PAGE_EDITS_BIN_WIDTH, "Number of pages")
}

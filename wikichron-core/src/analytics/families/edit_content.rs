//! Markup found in the wikitext of registered contributors' edits.

use crate::analytics::metrics_registry::{ChartShape, MetricCategory, MetricDescriptor};
use crate::analytics::series::{self, MetricOutput, SeriesSet};
use crate::dataset::RevisionLog;
use crate::time_index::TimeIndex;

const IMAGE_MARKERS: &[&str] = &[".jpg", ".png"];
const INTERNAL_LINK: &str = "[[";
const EXTERNAL_LINK: &str = "[http";

pub const METRICS: &[MetricDescriptor] = &[
    MetricDescriptor {
        key: "img_by_months",
        text: "Number of pictures",
        category: MetricCategory::EditContent,
        shape: ChartShape::LineGraph,
        compute: img_by_months,
        description: "Number of pictures",
    },
    MetricDescriptor {
        key: "url_by_months",
        text: "Number of urls",
        category: MetricCategory::EditContent,
        shape: ChartShape::LineGraph,
        compute: url_by_months,
        description: "Number of urls",
    },
    MetricDescriptor {
        key: "difference_btw_external_and_internal_links",
        text: "Difference between external and internal urls",
        category: MetricCategory::EditContent,
        shape: ChartShape::BarGraph,
        compute: difference_btw_external_and_internal_links,
        description: "Difference between external and internal urls",
    },
];

/// Non-overlapping occurrences of any marker.
fn occurrences(text: &str, markers: &[&str]) -> f64 {
    markers.iter().map(|m| text.matches(m).count()).sum::<usize>() as f64
}

fn markers_by_month(log: &RevisionLog, index: &TimeIndex, markers: &[&str]) -> Vec<f64> {
    series::sum_by_month(log.registered(), index, |r| occurrences(&r.edit_content, markers))
}

fn img_by_months(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let values = markers_by_month(log, index, IMAGE_MARKERS);
    MetricOutput::single(index, "Number of pictures", values)
}

fn url_by_months(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let values = markers_by_month(log, index, &[INTERNAL_LINK, EXTERNAL_LINK]);
    MetricOutput::single(index, "Number of urls", values)
}

fn difference_btw_external_and_internal_links(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let set = SeriesSet::new(index, true)
        .push("Internal link", markers_by_month(log, index, &[INTERNAL_LINK]))
        .push("External link", markers_by_month(log, index, &[EXTERNAL_LINK]));
    MetricOutput::Series(set)
}

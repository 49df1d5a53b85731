//! New, accumulated and active contributors.

use crate::analytics::metrics_registry::{ChartShape, MetricCategory, MetricDescriptor};
use crate::analytics::series::{self, MetricOutput};
use crate::dataset::RevisionLog;
use crate::time_index::{Month, TimeIndex};
use crate::types::Revision;
use std::collections::HashMap;

/// Which contributors a user metric counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Who {
    All,
    Registered,
    Anonymous,
}

impl Who {
    pub(crate) fn matches(&self, rev: &Revision) -> bool {
        match self {
            Who::All => true,
            Who::Registered => !rev.is_anonymous(),
            Who::Anonymous => rev.is_anonymous(),
        }
    }
}

macro_rules! users_metric {
    ($key:literal, $text:literal, $compute:ident, $description:literal) => {
        MetricDescriptor {
            key: $key,
            text: $text,
            category: MetricCategory::Users,
            shape: ChartShape::LineGraph,
            compute: $compute,
            description: $description,
        }
    };
}

pub const METRICS: &[MetricDescriptor] = &[
    users_metric!(
        "users_new",
        "New users",
        users_new,
        "Users who have made at least one edition grouped by the month they did their first edit."
    ),
    users_metric!(
        "users_new_registered",
        "New registered users",
        users_new_registered,
        "New users registration per month who have made at least one edition."
    ),
    users_metric!(
        "users_new_anonymous",
        "New anonymous users",
        users_new_anonymous,
        "Anonymous users who made at least one edition grouped by the month they did their first edit. Anonymous are identified by their ip."
    ),
    users_metric!(
        "users_accum",
        "Total users",
        users_accum,
        "Users who have made at least one edition accumulated at every month."
    ),
    users_metric!(
        "users_registered_accum",
        "Total registered users",
        users_registered_accum,
        "Total registered users at every month. Note that users have to have made at least one edition and they have to be logged with their account when they did that edition."
    ),
    users_metric!(
        "users_anonymous_accum",
        "Total anonymous users",
        users_anonymous_accum,
        "Anonymous users who have made at least one edition accumulated at every month. Anonymous are identified by their ip."
    ),
    users_metric!(
        "users_active",
        "Active users",
        users_active,
        "Number of users who have made at least one contribution in a month."
    ),
    users_metric!(
        "users_active_registered",
        "Active registered users",
        users_active_registered,
        "Number of registered users who have made at least one contribution in a month."
    ),
    users_metric!(
        "users_active_anonymous",
        "Active anonymous users",
        users_active_anonymous,
        "Number of anonymous users who have made at least one contribution in a month."
    ),
    users_metric!(
        "users_active_more_than_4",
        "Active users with > 4 edits",
        users_active_more_than_4,
        "Active users who have made more than 4 editions in a month."
    ),
    users_metric!(
        "users_active_more_than_24",
        "Active users with > 24 edits",
        users_active_more_than_24,
        "Active users who have made more than 24 editions in a month."
    ),
    users_metric!(
        "users_active_more_than_99",
        "Active users with > 99 edits",
        users_active_more_than_99,
        "Active users who have made more than 99 editions in a month."
    ),
];

/// Contributors counted in the month of their first edit.
pub(crate) fn new_users(log: &RevisionLog, index: &TimeIndex, who: Who) -> Vec<f64> {
    series::first_seen_by_month(
        log.iter().filter(|r| who.matches(r)),
        index,
        |r| r.contributor_id.as_str(),
    )
}

/// Distinct contributors editing each month.
pub(crate) fn active_users(log: &RevisionLog, index: &TimeIndex, who: Who) -> Vec<f64> {
    series::unique_by_month(
        log.iter().filter(|r| who.matches(r)),
        index,
        |r| r.contributor_id.as_str(),
    )
}

/// Contributors with more than `threshold` edits in a month.
fn active_more_than(log: &RevisionLog, index: &TimeIndex, threshold: u64) -> Vec<f64> {
    let mut per_contributor: HashMap<(Month, &str), u64> = HashMap::new();
    for rev in log {
        *per_contributor
            .entry((rev.month(), rev.contributor_id.as_str()))
            .or_insert(0) += 1;
    }
    series::count_months(
        per_contributor
            .into_iter()
            .filter(|(_, edits)| *edits > threshold)
            .map(|((month, _), _)| month),
        index,
    )
}

fn users_new(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    MetricOutput::single(index, "New users", new_users(log, index, Who::All))
}

fn users_new_registered(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let values = new_users(log, index, Who::Registered);
    MetricOutput::single(index, "New registered users", values)
}

fn users_new_anonymous(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let values = new_users(log, index, Who::Anonymous);
    MetricOutput::single(index, "New anonymous users", values)
}

fn users_accum(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let values = series::cumulative(&new_users(log, index, Who::All));
    MetricOutput::single(index, "Total users", values)
}

fn users_registered_accum(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let values = series::cumulative(&new_users(log, index, Who::Registered));
    MetricOutput::single(index, "Total registered users", values)
}

fn users_anonymous_accum(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let values = series::cumulative(&new_users(log, index, Who::Anonymous));
    MetricOutput::single(index, "Total anonymous users", values)
}

fn users_active(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    MetricOutput::single(index, "Active users", active_users(log, index, Who::All))
}

fn users_active_registered(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let values = active_users(log, index, Who::Registered);
    MetricOutput::single(index, "Active registered users", values)
}

fn users_active_anonymous(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let values = active_users(log, index, Who::Anonymous);
    MetricOutput::single(index, "Active anonymous users", values)
}

fn users_active_more_than_4(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let values = active_more_than(log, index, 4);
    MetricOutput::single(index, "Active users with > 4 edits", values)
}

fn users_active_more_than_24(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let values = active_more_than(log, index, 24);
    MetricOutput::single(index, "Active users with > 24 edits", values)
}

fn users_active_more_than_99(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let values = active_more_than(log, index, 99);
    MetricOutput::single(index, "Active users with > 99 edits", values)
}

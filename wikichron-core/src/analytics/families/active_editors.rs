//! Active registered contributors broken down by cohort and namespace.

use crate::analytics::cohort::{
    activity_table, cohort_series, cohort_shares, Experience, Measure, Recency, Streak, Tenure,
};
use crate::analytics::metrics_registry::{ChartShape, MetricCategory, MetricDescriptor};
use crate::analytics::series::{self, MetricOutput, SeriesSet};
use crate::dataset::RevisionLog;
use crate::time_index::TimeIndex;
use crate::types::Namespace;

macro_rules! active_metric {
    ($key:literal, $text:literal, $compute:ident, $description:literal) => {
        MetricDescriptor {
            key: $key,
            text: $text,
            category: MetricCategory::DistributionOfActiveRegisteredUsers,
            shape: ChartShape::BarGraph,
            compute: $compute,
            description: $description,
        }
    };
}

pub const METRICS: &[MetricDescriptor] = &[
    active_metric!(
        "users_edits_number_of_edits",
        "By editing experience",
        users_edits_number_of_edits,
        "Distribution of editors by their number of previous edits"
    ),
    active_metric!(
        "users_edits_number_of_edits_abs",
        "By editing experience (in %)",
        users_edits_number_of_edits_abs,
        "Distribution of editors by their number of previous edits (in %)"
    ),
    active_metric!(
        "users_first_edit",
        "By tenure",
        users_first_edit,
        "Distribution of editors by their time participating in the wiki"
    ),
    active_metric!(
        "users_edits_tenure_abs",
        "By tenure (in %)",
        users_edits_tenure_abs,
        "Distribution of editors by their time participating in the wiki (in %)"
    ),
    active_metric!(
        "Current_streak",
        "By edit streak",
        current_streak,
        "Distribution of editors by their last streak editing the wiki"
    ),
    active_metric!(
        "Current_streak_only_mains",
        "By edit in article streak",
        current_streak_only_mains,
        "Distribution of editors by their last streak editing the wiki (only articles)"
    ),
    active_metric!(
        "users_last_edit",
        "By date of the last edit",
        users_last_edit,
        "Distribution of editors by their last edit in the wiki"
    ),
    active_metric!(
        "users_last_edit_abs",
        "By date of the last edit (in %)",
        users_last_edit_abs,
        "Distribution of editors by their last edit in the wiki (in %)"
    ),
    active_metric!(
        "type_page_users_edit",
        "By namespace edited",
        type_page_users_edit,
        "Distribution of editors by the namespace edited"
    ),
    active_metric!(
        "type_page_users_edit_extends",
        "By other namespace edited",
        type_page_users_edit_extends,
        "Distribution of editors by other namespace edited"
    ),
];

// ============================================
// Namespace groups
// ============================================

/// One series of a namespace breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NamespaceGroup {
    Only(Namespace),
    /// Every namespace code not listed.
    Rest(&'static [i32]),
}

impl NamespaceGroup {
    pub(crate) fn matches(&self, code: i32) -> bool {
        match self {
            NamespaceGroup::Only(ns) => ns.code() == code,
            NamespaceGroup::Rest(excluded) => !excluded.contains(&code),
        }
    }

    pub(crate) fn label(&self) -> &'static str {
        match self {
            NamespaceGroup::Only(ns) => ns.label(),
            NamespaceGroup::Rest(_) => "Other pages",
        }
    }
}

const USER_NAMESPACES: &[NamespaceGroup] = &[
    NamespaceGroup::Only(Namespace::Article),
    NamespaceGroup::Only(Namespace::ArticleTalk),
    NamespaceGroup::Only(Namespace::User),
    NamespaceGroup::Only(Namespace::UserTalk),
    NamespaceGroup::Only(Namespace::Template),
    NamespaceGroup::Rest(&[0, 1, 2, 3, 10]),
];

const USER_NAMESPACES_EXTENDED: &[NamespaceGroup] = &[
    NamespaceGroup::Only(Namespace::File),
    NamespaceGroup::Only(Namespace::MediaWiki),
    NamespaceGroup::Only(Namespace::Category),
    NamespaceGroup::Rest(&[0, 1, 2, 3, 6, 8, 10, 14]),
];

/// Registered contributors or their edits per namespace group and month.
///
/// Only [`Measure::Contributors`] and [`Measure::Edits`] are meaningful here;
/// factoid measures count edits.
pub(crate) fn namespace_breakdown(
    log: &RevisionLog,
    index: &TimeIndex,
    groups: &[NamespaceGroup],
    measure: Measure,
) -> SeriesSet {
    groups.iter().fold(SeriesSet::new(index, false), |set, group| {
        let revisions = log.registered().filter(|r| group.matches(r.page_namespace));
        let values = match measure {
            Measure::Contributors => {
                series::unique_by_month(revisions, index, |r| r.contributor_id.as_str())
            }
            _ => series::count_by_month(revisions, index),
        };
        set.push(group.label(), values)
    })
}

// ============================================
// Compute functions
// ============================================

fn users_edits_number_of_edits(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let rows = activity_table(log, None);
    MetricOutput::Series(cohort_series::<Experience>(&rows, index, Measure::Contributors))
}

fn users_edits_number_of_edits_abs(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let rows = activity_table(log, None);
    MetricOutput::Series(cohort_shares::<Experience>(&rows, index, Measure::Contributors))
}

fn users_first_edit(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let rows = activity_table(log, None);
    MetricOutput::Series(cohort_series::<Tenure>(&rows, index, Measure::Contributors))
}

fn users_edits_tenure_abs(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let rows = activity_table(log, None);
    MetricOutput::Series(cohort_shares::<Tenure>(&rows, index, Measure::Contributors))
}

fn current_streak(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let rows = activity_table(log, None);
    MetricOutput::Series(cohort_series::<Streak>(&rows, index, Measure::Contributors))
}

fn current_streak_only_mains(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let rows = activity_table(log.iter().filter(|r| r.is_article()), None);
    MetricOutput::Series(cohort_series::<Streak>(&rows, index, Measure::Contributors))
}

fn users_last_edit(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let rows = activity_table(log, None);
    MetricOutput::Series(cohort_series::<Recency>(&rows, index, Measure::Contributors))
}

fn users_last_edit_abs(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let rows = activity_table(log, None);
    MetricOutput::Series(cohort_shares::<Recency>(&rows, index, Measure::Contributors))
}

fn type_page_users_edit(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    MetricOutput::Series(namespace_breakdown(log, index, USER_NAMESPACES, Measure::Contributors))
}

fn type_page_users_edit_extends(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    MetricOutput::Series(namespace_breakdown(
        log,
        index,
        USER_NAMESPACES_EXTENDED,
        Measure::Contributors,
    ))
}

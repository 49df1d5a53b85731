//! Retention of newly registered editors.
//!
//! Both metrics follow registered contributors from their first edit and
//! count them in the month of that edit.

use crate::analytics::metrics_registry::{ChartShape, MetricCategory, MetricDescriptor};
use crate::analytics::series::{self, MetricOutput};
use crate::dataset::RevisionLog;
use crate::time_index::{Month, TimeIndex};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// Edits further apart than this start a new session.
pub const SESSION_GAP_MINUTES: i64 = 60;
/// Length of the activation window after the first edit.
pub const ACTIVATION_DAYS: i64 = 30;
/// Length of the survival window following the activation window.
pub const SURVIVAL_DAYS: i64 = 30;

pub const METRICS: &[MetricDescriptor] = &[
    MetricDescriptor {
        key: "returning_new_editors",
        text: "Returning new editors",
        category: MetricCategory::Retention,
        shape: ChartShape::LineGraph,
        compute: returning_new_editors,
        description: "Number of new users who completes at least two edit sessions (60') within the first 30 days since registration.",
    },
    MetricDescriptor {
        key: "surviving_new_editors",
        text: "Surviving new editors",
        category: MetricCategory::Retention,
        shape: ChartShape::LineGraph,
        compute: surviving_new_editors,
        description: "Number of new users who completes at least one edit within the first 30 days since registration and also completes another edit in the survival period, (i.e. the following 30 days).",
    },
];

/// Chronological edit timestamps of every registered contributor.
fn registered_histories(log: &RevisionLog) -> HashMap<&str, Vec<DateTime<Utc>>> {
    let mut histories: HashMap<&str, Vec<DateTime<Utc>>> = HashMap::new();
    for rev in log.registered() {
        histories
            .entry(rev.contributor_id.as_str())
            .or_default()
            .push(rev.timestamp);
    }
    histories
}

/// Number of edit sessions in a sorted timestamp slice.
pub fn count_sessions(timestamps: &[DateTime<Utc>]) -> usize {
    if timestamps.is_empty() {
        return 0;
    }
    let gap = Duration::minutes(SESSION_GAP_MINUTES);
    1 + timestamps
        .windows(2)
        .filter(|pair| pair[1] - pair[0] > gap)
        .count()
}

fn is_returning(history: &[DateTime<Utc>]) -> bool {
    let Some(first) = history.first() else {
        return false;
    };
    let cutoff = *first + Duration::days(ACTIVATION_DAYS);
    let activation: Vec<DateTime<Utc>> = history.iter().copied().take_while(|ts| *ts < cutoff).collect();
    count_sessions(&activation) >= 2
}

fn is_surviving(history: &[DateTime<Utc>]) -> bool {
    let Some(first) = history.first() else {
        return false;
    };
    let start = *first + Duration::days(ACTIVATION_DAYS);
    let end = start + Duration::days(SURVIVAL_DAYS);
    history.iter().any(|ts| *ts >= start && *ts < end)
}

fn new_editors_where(log: &RevisionLog, index: &TimeIndex, keep: fn(&[DateTime<Utc>]) -> bool) -> Vec<f64> {
    let months = registered_histories(log)
        .into_values()
        .filter(|history| keep(history.as_slice()))
        .filter_map(|history| history.first().map(Month::from_datetime))
        .collect::<Vec<_>>();
    series::count_months(months, index)
}

fn returning_new_editors(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let values = new_editors_where(log, index, is_returning);
    MetricOutput::single(index, "Returning new editors", values)
}

fn surviving_new_editors(log: &RevisionLog, index: &TimeIndex) -> MetricOutput {
    let values = new_editors_where(log, index, is_surviving);
    MetricOutput::single(index, "Surviving new editors", values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::families::testing::{dataset, single, Rev};
    use chrono::TimeZone;

    #[test]
    fn test_count_sessions() {
        let at = |h: u32, m: u32| Utc.with_ymd_and_hms(2020, 1, 1, h, m, 0).unwrap();
        assert_eq!(count_sessions(&[]), 0);
        assert_eq!(count_sessions(&[at(0, 0), at(0, 59), at(1, 30)]), 1);
        assert_eq!(count_sessions(&[at(0, 0), at(1, 1)]), 2);
    }

    #[test]
    fn test_returning_new_editors() {
        let (log, index) = dataset(vec![
            // two sessions on day one and day two
            Rev { contributor: "alice", month: 1, day: 1, ..Default::default() },
            Rev { contributor: "alice", month: 1, day: 2, ..Default::default() },
            // one session only
            Rev { contributor: "bob", month: 1, day: 3, ..Default::default() },
            Rev { contributor: "bob", month: 1, day: 3, hour: 0, bytes: 1, ..Default::default() },
            // second session falls outside the first 30 days
            Rev { contributor: "carol", month: 2, day: 1, ..Default::default() },
            Rev { contributor: "carol", month: 3, day: 15, ..Default::default() },
            // anonymous editors are ignored
            Rev { contributor: "10.0.0.1", month: 2, day: 1, hour: 1, ..Default::default() },
            Rev { contributor: "10.0.0.1", month: 2, day: 5, ..Default::default() },
        ]);
        assert_eq!(single(returning_new_editors(&log, &index)), vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_surviving_new_editors() {
        let (log, index) = dataset(vec![
            Rev { contributor: "alice", month: 1, day: 1, ..Default::default() },
            // day 40 lies within [30, 60)
            Rev { contributor: "alice", month: 2, day: 9, ..Default::default() },
            Rev { contributor: "bob", month: 1, day: 1, hour: 1, ..Default::default() },
            // day 70 is past the survival window
            Rev { contributor: "bob", month: 3, day: 11, ..Default::default() },
        ]);
        assert_eq!(single(surviving_new_editors(&log, &index)), vec![1.0, 0.0, 0.0]);
    }
}

//! Cohort classifier.
//!
//! Cohort metrics work on a per-contributor monthly activity table: one row
//! per registered contributor and month they edited in. Each cohort axis
//! assigns every row to exactly one bucket, so per-month bucket counts
//! always add up to the table's per-month total.

use crate::analytics::factoids::FactoidDiffs;
use crate::analytics::series::{self, SeriesSet};
use crate::time_index::{Month, TimeIndex};
use crate::types::Revision;
use std::collections::BTreeMap;

// ============================================
// Activity table
// ============================================

/// Activity of one contributor in one month.
#[derive(Debug, Clone, PartialEq)]
pub struct ContributorMonth {
    pub contributor_id: String,
    pub month: Month,
    pub edits: u64,
    pub added_factoids: u64,
    pub deleted_factoids: u64,
}

/// Build the activity table from a revision slice.
///
/// Anonymous revisions are skipped. Rows are sorted by contributor, then
/// month. Factoid columns stay zero without `diffs`.
pub fn activity_table<'a, I>(revisions: I, diffs: Option<&FactoidDiffs>) -> Vec<ContributorMonth>
where
    I: IntoIterator<Item = &'a Revision>,
{
    let mut grouped: BTreeMap<(&'a str, Month), ContributorMonth> = BTreeMap::new();

    for rev in revisions.into_iter().filter(|r| !r.is_anonymous()) {
        let row = grouped
            .entry((rev.contributor_id.as_str(), rev.month()))
            .or_insert_with(|| ContributorMonth {
                contributor_id: rev.contributor_id.clone(),
                month: rev.month(),
                edits: 0,
                added_factoids: 0,
                deleted_factoids: 0,
            });
        row.edits += 1;
        if let Some(delta) = diffs.and_then(|d| d.get(rev.revision_id)) {
            row.added_factoids += delta.added.len() as u64;
            row.deleted_factoids += delta.removed.len() as u64;
        }
    }

    grouped.into_values().collect()
}

/// Index ranges of consecutive rows belonging to the same contributor.
fn contributor_runs(rows: &[ContributorMonth]) -> Vec<std::ops::Range<usize>> {
    let mut runs = Vec::new();
    let mut start = 0;
    for i in 1..=rows.len() {
        if i == rows.len() || rows[i].contributor_id != rows[start].contributor_id {
            if start < i {
                runs.push(start..i);
            }
            start = i;
        }
    }
    runs
}

// ============================================
// Cohort axes
// ============================================

/// A partition of activity rows along one axis.
pub trait Cohort: Copy + Eq + Sized + 'static {
    /// Every bucket, in legend order.
    const ALL: &'static [Self];

    /// Legend label when counting contributors or edits.
    fn label(&self) -> &'static str;

    /// Legend label when counting factoids.
    fn factoid_label(&self) -> &'static str;

    /// Bucket of every row, in row order.
    fn assign(rows: &[ContributorMonth]) -> Vec<Self>;
}

/// Months since the contributor's first active month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tenure {
    New,
    OneToThree,
    FourToSix,
    SevenToTwelve,
    MoreThanTwelve,
}

impl Tenure {
    pub fn from_months(months: i64) -> Self {
        match months {
            i64::MIN..=0 => Tenure::New,
            1..=3 => Tenure::OneToThree,
            4..=6 => Tenure::FourToSix,
            7..=12 => Tenure::SevenToTwelve,
            _ => Tenure::MoreThanTwelve,
        }
    }
}

impl Cohort for Tenure {
    const ALL: &'static [Self] = &[
        Tenure::New,
        Tenure::OneToThree,
        Tenure::FourToSix,
        Tenure::SevenToTwelve,
        Tenure::MoreThanTwelve,
    ];

    fn label(&self) -> &'static str {
        match self {
            Tenure::New => "New users",
            Tenure::OneToThree => "Btw. 1 and 3 months ago",
            Tenure::FourToSix => "Btw. 4 and 6 months ago",
            Tenure::SevenToTwelve => "Btw. 6 and 12 months ago",
            Tenure::MoreThanTwelve => "More than 12 months ago",
        }
    }

    fn factoid_label(&self) -> &'static str {
        match self {
            Tenure::New => "By new users",
            Tenure::OneToThree => "By users first edit between 1 and 3 months ago",
            Tenure::FourToSix => "By users first edit between 4 and 6 months ago",
            Tenure::SevenToTwelve => "By users first edit between 6 and 12 months ago",
            Tenure::MoreThanTwelve => "By users first edit more than 12 months ago",
        }
    }

    fn assign(rows: &[ContributorMonth]) -> Vec<Self> {
        let mut out = Vec::with_capacity(rows.len());
        for run in contributor_runs(rows) {
            let first = rows[run.start].month;
            out.extend(
                rows[run]
                    .iter()
                    .map(|row| Tenure::from_months(row.month.months_since(&first))),
            );
        }
        out
    }
}

/// Gap since the contributor's previous active month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recency {
    New,
    OneMonth,
    TwoToThree,
    FourToSix,
    MoreThanSix,
}

impl Recency {
    /// `gap` is `None` for a contributor's first active month.
    pub fn from_gap(gap: Option<i64>) -> Self {
        match gap {
            None => Recency::New,
            Some(i64::MIN..=1) => Recency::OneMonth,
            Some(2..=3) => Recency::TwoToThree,
            Some(4..=6) => Recency::FourToSix,
            Some(_) => Recency::MoreThanSix,
        }
    }
}

impl Cohort for Recency {
    const ALL: &'static [Self] = &[
        Recency::New,
        Recency::OneMonth,
        Recency::TwoToThree,
        Recency::FourToSix,
        Recency::MoreThanSix,
    ];

    fn label(&self) -> &'static str {
        match self {
            Recency::New => "New users",
            Recency::OneMonth => "1 month ago",
            Recency::TwoToThree => "Btw. 2 and 3 months ago",
            Recency::FourToSix => "Btw. 4 and 6 months ago",
            Recency::MoreThanSix => "More than six months ago",
        }
    }

    fn factoid_label(&self) -> &'static str {
        match self {
            Recency::New => "By new users",
            Recency::OneMonth => "By users last edit 1 month ago",
            Recency::TwoToThree => "By users last edit between 2 and 3 months ago",
            Recency::FourToSix => "By users last edit between 4 and 6 months ago",
            Recency::MoreThanSix => "By users last edit more than 6 months ago",
        }
    }

    fn assign(rows: &[ContributorMonth]) -> Vec<Self> {
        let mut out = Vec::with_capacity(rows.len());
        for run in contributor_runs(rows) {
            let mut previous: Option<Month> = None;
            for row in &rows[run] {
                let gap = previous.map(|p| row.month.approx_months_since(&p));
                out.push(Recency::from_gap(gap));
                previous = Some(row.month);
            }
        }
        out
    }
}

/// Edits made before the current month.
///
/// Lagged so current-month activity never reclassifies a contributor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Experience {
    New,
    OneToFour,
    FiveToTwentyFour,
    TwentyFiveToNinetyNine,
    HundredOrMore,
}

impl Experience {
    pub fn from_prior_edits(prior: u64) -> Self {
        match prior {
            0 => Experience::New,
            1..=4 => Experience::OneToFour,
            5..=24 => Experience::FiveToTwentyFour,
            25..=99 => Experience::TwentyFiveToNinetyNine,
            _ => Experience::HundredOrMore,
        }
    }
}

impl Cohort for Experience {
    const ALL: &'static [Self] = &[
        Experience::New,
        Experience::OneToFour,
        Experience::FiveToTwentyFour,
        Experience::TwentyFiveToNinetyNine,
        Experience::HundredOrMore,
    ];

    fn label(&self) -> &'static str {
        match self {
            Experience::New => "New users",
            Experience::OneToFour => "Btw. 1 and 4 edits",
            Experience::FiveToTwentyFour => "Btw. 5 and 24 edits",
            Experience::TwentyFiveToNinetyNine => "Btw. 25 and 99 edits",
            Experience::HundredOrMore => "More than 99 edits",
        }
    }

    fn factoid_label(&self) -> &'static str {
        match self {
            Experience::New => "By new users",
            Experience::OneToFour => "By users that have done btw. 1 and 4 edits",
            Experience::FiveToTwentyFour => "By users that have done btw. 5 and 24 edits",
            Experience::TwentyFiveToNinetyNine => "By users that have done btw. 25 and 99 edits",
            Experience::HundredOrMore => "By users that have done more than 99 edits",
        }
    }

    fn assign(rows: &[ContributorMonth]) -> Vec<Self> {
        let mut out = Vec::with_capacity(rows.len());
        for run in contributor_runs(rows) {
            let mut prior = 0u64;
            for row in &rows[run] {
                out.push(Experience::from_prior_edits(prior));
                prior += row.edits;
            }
        }
        out
    }
}

/// Consecutive active months ending at the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Streak {
    One,
    TwoToThree,
    FourToSix,
    MoreThanSix,
}

impl Streak {
    pub fn from_length(length: u32) -> Self {
        match length {
            0..=1 => Streak::One,
            2..=3 => Streak::TwoToThree,
            4..=6 => Streak::FourToSix,
            _ => Streak::MoreThanSix,
        }
    }
}

/// Streak length of every row, in row order.
pub fn streak_lengths(rows: &[ContributorMonth]) -> Vec<u32> {
    let mut out = Vec::with_capacity(rows.len());
    for run in contributor_runs(rows) {
        let mut length = 0u32;
        let mut previous: Option<Month> = None;
        for row in &rows[run] {
            length = match previous {
                Some(p) if row.month.months_since(&p) == 1 => length + 1,
                _ => 1,
            };
            out.push(length);
            previous = Some(row.month);
        }
    }
    out
}

impl Cohort for Streak {
    const ALL: &'static [Self] = &[
        Streak::One,
        Streak::TwoToThree,
        Streak::FourToSix,
        Streak::MoreThanSix,
    ];

    fn label(&self) -> &'static str {
        match self {
            Streak::One => "1 month editing",
            Streak::TwoToThree => "Btw. 2 and 3 consecutive months",
            Streak::FourToSix => "Btw. 4 and 6 consecutive months",
            Streak::MoreThanSix => "More than 6 consecutive months",
        }
    }

    fn factoid_label(&self) -> &'static str {
        self.label()
    }

    fn assign(rows: &[ContributorMonth]) -> Vec<Self> {
        streak_lengths(rows)
            .into_iter()
            .map(Streak::from_length)
            .collect()
    }
}

// ============================================
// Breakdown
// ============================================

/// Quantity summed per cohort and month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    Contributors,
    Edits,
    AddedFactoids,
    DeletedFactoids,
}

impl Measure {
    fn of(&self, row: &ContributorMonth) -> f64 {
        match self {
            Measure::Contributors => 1.0,
            Measure::Edits => row.edits as f64,
            Measure::AddedFactoids => row.added_factoids as f64,
            Measure::DeletedFactoids => row.deleted_factoids as f64,
        }
    }

    fn counts_factoids(&self) -> bool {
        matches!(self, Measure::AddedFactoids | Measure::DeletedFactoids)
    }
}

/// One dense series per cohort bucket, in [`Cohort::ALL`] order.
pub fn breakdown<C: Cohort>(
    rows: &[ContributorMonth],
    index: &TimeIndex,
    measure: Measure,
) -> Vec<(C, Vec<f64>)> {
    let assigned = C::assign(rows);
    C::ALL
        .iter()
        .map(|cohort| {
            let values = series::sum_months(
                rows.iter()
                    .zip(&assigned)
                    .filter(|(_, c)| *c == cohort)
                    .map(|(row, _)| (row.month, measure.of(row))),
                index,
            );
            (*cohort, values)
        })
        .collect()
}

/// Stacked cohort breakdown as absolute values.
pub fn cohort_series<C: Cohort>(
    rows: &[ContributorMonth],
    index: &TimeIndex,
    measure: Measure,
) -> SeriesSet {
    breakdown::<C>(rows, index, measure)
        .into_iter()
        .fold(SeriesSet::new(index, true), |set, (cohort, values)| {
            let name = if measure.counts_factoids() {
                cohort.factoid_label()
            } else {
                cohort.label()
            };
            set.push(name, values)
        })
}

/// Stacked cohort breakdown as a percentage of each month's total.
pub fn cohort_shares<C: Cohort>(
    rows: &[ContributorMonth],
    index: &TimeIndex,
    measure: Measure,
) -> SeriesSet {
    let parts = breakdown::<C>(rows, index, measure);
    let values: Vec<Vec<f64>> = parts.iter().map(|(_, v)| v.clone()).collect();
    parts
        .iter()
        .zip(series::share_of_total(&values))
        .fold(SeriesSet::new(index, true), |set, ((cohort, _), shares)| {
            set.push(cohort.label(), shares)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FactoidSet;
    use chrono::{TimeZone, Utc};

    fn m(year: i32, month: u32) -> Month {
        Month::new(year, month).unwrap()
    }

    fn row(contributor: &str, month: Month, edits: u64) -> ContributorMonth {
        ContributorMonth {
            contributor_id: contributor.to_string(),
            month,
            edits,
            added_factoids: 0,
            deleted_factoids: 0,
        }
    }

    fn rev(id: i64, contributor: &str, name: &str, month: u32) -> Revision {
        Revision {
            revision_id: id,
            page_id: 1,
            page_namespace: 0,
            contributor_id: contributor.to_string(),
            contributor_name: name.to_string(),
            timestamp: Utc.with_ymd_and_hms(2020, month, 3, 0, 0, 0).unwrap(),
            bytes: 0,
            edit_content: String::new(),
            factoids: FactoidSet::new(),
        }
    }

    #[test]
    fn test_activity_table_groups_and_skips_anonymous() {
        let revs = vec![
            rev(1, "b", "Bob", 1),
            rev(2, "a", "Alice", 2),
            rev(3, "a", "Alice", 2),
            rev(4, "10.0.0.1", "Anonymous", 2),
            rev(5, "a", "Alice", 1),
        ];
        let rows = activity_table(&revs, None);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].contributor_id, "a");
        assert_eq!(rows[0].month, m(2020, 1));
        assert_eq!(rows[1].edits, 2);
        assert_eq!(rows[2].contributor_id, "b");
    }

    #[test]
    fn test_streak_resets_after_gap() {
        let rows = vec![
            row("a", m(2020, 1), 1),
            row("a", m(2020, 2), 1),
            row("a", m(2020, 3), 1),
            row("a", m(2020, 5), 1),
        ];
        assert_eq!(streak_lengths(&rows), vec![1, 2, 3, 1]);
        assert_eq!(
            Streak::assign(&rows),
            vec![Streak::One, Streak::TwoToThree, Streak::TwoToThree, Streak::One]
        );
    }

    #[test]
    fn test_streak_per_contributor() {
        let rows = vec![
            row("a", m(2020, 1), 1),
            row("a", m(2020, 2), 1),
            row("b", m(2020, 3), 1),
        ];
        assert_eq!(streak_lengths(&rows), vec![1, 2, 1]);
    }

    #[test]
    fn test_tenure_buckets() {
        let rows = vec![
            row("a", m(2019, 1), 1),
            row("a", m(2019, 3), 1),
            row("a", m(2019, 7), 1),
            row("a", m(2019, 8), 1),
            row("a", m(2020, 1), 1),
            row("a", m(2020, 2), 1),
        ];
        assert_eq!(
            Tenure::assign(&rows),
            vec![
                Tenure::New,
                Tenure::OneToThree,
                Tenure::FourToSix,
                Tenure::SevenToTwelve,
                Tenure::SevenToTwelve,
                Tenure::MoreThanTwelve,
            ]
        );
    }

    #[test]
    fn test_recency_buckets() {
        let rows = vec![
            row("a", m(2019, 1), 1),
            row("a", m(2019, 2), 1),
            row("a", m(2019, 5), 1),
            row("a", m(2019, 11), 1),
            row("a", m(2020, 9), 1),
        ];
        assert_eq!(
            Recency::assign(&rows),
            vec![
                Recency::New,
                Recency::OneMonth,
                Recency::TwoToThree,
                Recency::FourToSix,
                Recency::MoreThanSix,
            ]
        );
    }

    #[test]
    fn test_experience_is_lagged() {
        let rows = vec![
            row("a", m(2020, 1), 4),
            row("a", m(2020, 2), 30),
            row("a", m(2020, 3), 80),
            row("a", m(2020, 4), 1),
        ];
        assert_eq!(
            Experience::assign(&rows),
            vec![
                Experience::New,
                Experience::OneToFour,
                Experience::TwentyFiveToNinetyNine,
                Experience::HundredOrMore,
            ]
        );
    }

    #[test]
    fn test_single_edit_is_new_everywhere() {
        let rows = vec![row("a", m(2020, 1), 1)];
        assert_eq!(Tenure::assign(&rows), vec![Tenure::New]);
        assert_eq!(Recency::assign(&rows), vec![Recency::New]);
        assert_eq!(Experience::assign(&rows), vec![Experience::New]);
    }

    #[test]
    fn test_breakdown_is_exhaustive() {
        let rows = vec![
            row("a", m(2020, 1), 3),
            row("a", m(2020, 2), 2),
            row("b", m(2020, 2), 7),
            row("c", m(2020, 4), 1),
        ];
        let index = TimeIndex::span(m(2020, 1), m(2020, 4));
        let contributors = series::count_months(rows.iter().map(|r| r.month), &index);
        let edits = series::sum_months(rows.iter().map(|r| (r.month, r.edits as f64)), &index);

        assert_eq!(cohort_series::<Tenure>(&rows, &index, Measure::Contributors).totals(), contributors);
        assert_eq!(cohort_series::<Recency>(&rows, &index, Measure::Contributors).totals(), contributors);
        assert_eq!(cohort_series::<Experience>(&rows, &index, Measure::Edits).totals(), edits);
        assert_eq!(cohort_series::<Streak>(&rows, &index, Measure::Edits).totals(), edits);
    }

    #[test]
    fn test_shares_sum_to_hundred() {
        let rows = vec![row("a", m(2020, 1), 3), row("b", m(2020, 1), 1)];
        let index = TimeIndex::span(m(2020, 1), m(2020, 2));
        let shares = cohort_shares::<Experience>(&rows, &index, Measure::Edits);
        assert_eq!(shares.totals(), vec![100.0, 0.0]);
    }
}

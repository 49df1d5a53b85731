//! Calendar months and the canonical time index.
//!
//! Every metric output is defined over a [`TimeIndex`]: the gap-free run of
//! calendar months from the first to the last revision of a log. Series of
//! different provenance can only be compared or stacked because they share
//! this index.

use crate::dataset::RevisionLog;
use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Average Gregorian month length used for rounded month gaps.
pub const AVERAGE_MONTH_DAYS: f64 = 30.44;

// ============================================
// Month
// ============================================

/// A calendar month in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    /// Build a month; `month` is 1-based.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// Month containing the given instant.
    pub fn from_datetime(ts: &DateTime<Utc>) -> Self {
        Self {
            year: ts.year(),
            month: ts.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The following month.
    pub fn succ(&self) -> Self {
        self.add_months(1)
    }

    /// Shift by a signed number of months.
    pub fn add_months(&self, months: i64) -> Self {
        let ordinal = self.ordinal() + months;
        Self {
            year: ordinal.div_euclid(12) as i32,
            month: ordinal.rem_euclid(12) as u32 + 1,
        }
    }

    /// Exact number of calendar months from `earlier` to `self`.
    ///
    /// Negative when `earlier` is after `self`.
    pub fn months_since(&self, earlier: &Month) -> i64 {
        self.ordinal() - earlier.ordinal()
    }

    /// Gap to `earlier` in whole months, using an average month length.
    ///
    /// This is what the recency cohorts use; it agrees with
    /// [`Month::months_since`] except over very long spans.
    pub fn approx_months_since(&self, earlier: &Month) -> i64 {
        let days = (self.start() - earlier.start()).num_seconds() as f64 / 86_400.0;
        (days / AVERAGE_MONTH_DAYS).round() as i64
    }

    /// Instant the month starts at (first day, midnight UTC).
    pub fn start(&self) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(self.year, self.month, 1, 0, 0, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    fn ordinal(&self) -> i64 {
        self.year as i64 * 12 + (self.month as i64 - 1)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl std::str::FromStr for Month {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| format!("invalid month: {}", s))?;
        let year = year
            .parse::<i32>()
            .map_err(|_| format!("invalid month: {}", s))?;
        let month = month
            .parse::<u32>()
            .map_err(|_| format!("invalid month: {}", s))?;
        Month::new(year, month).ok_or_else(|| format!("invalid month: {}", s))
    }
}

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Month {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================
// Time index
// ============================================

/// Ordered, gap-free sequence of months every output is aligned to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TimeIndex {
    months: Vec<Month>,
}

impl TimeIndex {
    /// Index spanning the first to the last revision of the log.
    ///
    /// An empty log yields an empty index.
    pub fn from_log(log: &RevisionLog) -> Self {
        match (log.first(), log.last()) {
            (Some(first), Some(last)) => Self::span(first.month(), last.month()),
            _ => Self::default(),
        }
    }

    /// Every month from `first` to `last` inclusive.
    pub fn span(first: Month, last: Month) -> Self {
        let mut months = Vec::new();
        let mut current = first;
        while current <= last {
            months.push(current);
            current = current.succ();
        }
        Self { months }
    }

    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    pub fn months(&self) -> &[Month] {
        &self.months
    }

    pub fn first(&self) -> Option<Month> {
        self.months.first().copied()
    }

    pub fn last(&self) -> Option<Month> {
        self.months.last().copied()
    }

    /// Row of `month` in the index, by calendar arithmetic.
    pub fn position(&self, month: Month) -> Option<usize> {
        let first = self.first()?;
        let offset = month.months_since(&first);
        (offset >= 0 && (offset as usize) < self.months.len()).then_some(offset as usize)
    }

    /// Whether every revision of the log falls inside the index.
    pub fn covers(&self, log: &RevisionLog) -> bool {
        match (log.first(), log.last()) {
            (Some(first), Some(last)) => {
                self.position(first.month()).is_some() && self.position(last.month()).is_some()
            }
            _ => true,
        }
    }

    /// A zero-filled vector with one slot per month.
    pub fn zeros(&self) -> Vec<f64> {
        vec![0.0; self.months.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(year: i32, month: u32) -> Month {
        Month::new(year, month).unwrap()
    }

    #[test]
    fn test_month_arithmetic() {
        assert_eq!(m(2019, 12).succ(), m(2020, 1));
        assert_eq!(m(2020, 1).add_months(-1), m(2019, 12));
        assert_eq!(m(2020, 3).months_since(&m(2019, 11)), 4);
        assert_eq!(m(2019, 11).months_since(&m(2020, 3)), -4);
        assert!(Month::new(2020, 13).is_none());
        assert!(Month::new(2020, 0).is_none());
    }

    #[test]
    fn test_approx_months_since() {
        assert_eq!(m(2020, 3).approx_months_since(&m(2020, 2)), 1);
        assert_eq!(m(2020, 8).approx_months_since(&m(2020, 1)), 7);
        assert_eq!(m(2020, 1).approx_months_since(&m(2020, 1)), 0);
    }

    #[test]
    fn test_month_display_and_parse() {
        assert_eq!(m(2007, 4).to_string(), "2007-04");
        assert_eq!("2007-04".parse::<Month>().unwrap(), m(2007, 4));
        assert!("2007".parse::<Month>().is_err());
        assert!("2007-13".parse::<Month>().is_err());
        assert_eq!(serde_json::to_string(&m(2007, 4)).unwrap(), "\"2007-04\"");
    }

    #[test]
    fn test_month_start() {
        let start = m(2021, 2).start();
        assert_eq!(start.to_rfc3339(), "2021-02-01T00:00:00+00:00");
    }

    #[test]
    fn test_span_is_gap_free() {
        let index = TimeIndex::span(m(2019, 11), m(2020, 2));
        assert_eq!(
            index.months(),
            &[m(2019, 11), m(2019, 12), m(2020, 1), m(2020, 2)]
        );
        assert_eq!(index.position(m(2020, 1)), Some(2));
        assert_eq!(index.position(m(2020, 3)), None);
        assert_eq!(index.position(m(2019, 10)), None);
    }

    #[test]
    fn test_empty_span() {
        let index = TimeIndex::span(m(2020, 2), m(2020, 1));
        assert!(index.is_empty());
        assert_eq!(index.position(m(2020, 1)), None);
    }
}

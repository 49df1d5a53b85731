//! Revision log loading.
//!
//! A [`RevisionLog`] is the immutable, chronologically ordered input every
//! metric reads. It is built explicitly, either from already parsed rows or
//! from a CSV dump, and never mutated afterwards.

use crate::config::DatasetConfig;
use crate::error::{Error, Result};
use crate::time_index::TimeIndex;
use crate::types::{FactoidSet, Revision};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

/// Column holding the namespace code; older dumps use the long name.
const NAMESPACE_COLUMNS: [&str; 2] = ["page_ns", "page_namespace"];

// ============================================
// Revision log
// ============================================

/// Revisions sorted by `(timestamp, revision_id)`.
#[derive(Debug, Clone, Default)]
pub struct RevisionLog {
    revisions: Vec<Revision>,
}

impl RevisionLog {
    /// Build a log from parsed rows.
    ///
    /// Rows are sorted chronologically. Fails on a repeated `revision_id`.
    pub fn new(mut revisions: Vec<Revision>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(revisions.len());
        for rev in &revisions {
            if !seen.insert(rev.revision_id) {
                return Err(Error::DuplicateRevision(rev.revision_id));
            }
        }
        revisions.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then(a.revision_id.cmp(&b.revision_id))
        });
        Ok(Self { revisions })
    }

    /// Load a CSV dump from disk.
    pub fn from_csv_path(path: &Path, config: &DatasetConfig) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, config)
    }

    /// Load a CSV dump from any reader.
    pub fn from_reader<R: Read>(reader: R, config: &DatasetConfig) -> Result<Self> {
        config.validate()?;

        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(config.delimiter as u8)
            .quote(config.quote as u8)
            .has_headers(true)
            .from_reader(reader);

        let columns = Columns::locate(csv_reader.headers()?)?;

        let mut revisions = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            revisions.push(columns.parse(&record, line, &config.timestamp_format)?);
        }

        tracing::debug!(rows = revisions.len(), "Parsed revision dump");
        Self::new(revisions)
    }

    pub fn len(&self) -> usize {
        self.revisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revisions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Revision> {
        self.revisions.iter()
    }

    pub fn revisions(&self) -> &[Revision] {
        &self.revisions
    }

    /// Earliest revision.
    pub fn first(&self) -> Option<&Revision> {
        self.revisions.first()
    }

    /// Latest revision.
    pub fn last(&self) -> Option<&Revision> {
        self.revisions.last()
    }

    /// Revisions made with an account.
    pub fn registered(&self) -> impl Iterator<Item = &Revision> {
        self.revisions.iter().filter(|r| !r.is_anonymous())
    }

    /// Headline counts for the log.
    pub fn summary(&self) -> LogSummary {
        let pages: HashSet<i64> = self.revisions.iter().map(|r| r.page_id).collect();
        let mut registered = HashSet::new();
        let mut anonymous = HashSet::new();
        for rev in &self.revisions {
            if rev.is_anonymous() {
                anonymous.insert(rev.contributor_id.as_str());
            } else {
                registered.insert(rev.contributor_id.as_str());
            }
        }

        LogSummary {
            revisions: self.revisions.len(),
            pages: pages.len(),
            registered_contributors: registered.len(),
            anonymous_contributors: anonymous.len(),
            first_edit: self.first().map(|r| r.timestamp),
            last_edit: self.last().map(|r| r.timestamp),
            months: TimeIndex::from_log(self).len(),
        }
    }
}

impl<'a> IntoIterator for &'a RevisionLog {
    type Item = &'a Revision;
    type IntoIter = std::slice::Iter<'a, Revision>;

    fn into_iter(self) -> Self::IntoIter {
        self.revisions.iter()
    }
}

/// Headline counts reported by `wikichron summary`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogSummary {
    pub revisions: usize,
    pub pages: usize,
    pub registered_contributors: usize,
    pub anonymous_contributors: usize,
    pub first_edit: Option<DateTime<Utc>>,
    pub last_edit: Option<DateTime<Utc>>,
    pub months: usize,
}

// ============================================
// Column mapping
// ============================================

/// Positions of the required columns in the dump header.
struct Columns {
    revision_id: usize,
    page_id: usize,
    page_namespace: usize,
    contributor_id: usize,
    contributor_name: usize,
    timestamp: usize,
    bytes: usize,
    edit_content: usize,
    factoids: usize,
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> Result<Self> {
        let find = |name: &str| -> Result<usize> {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| Error::MissingColumn(name.to_string()))
        };

        let page_namespace = NAMESPACE_COLUMNS
            .iter()
            .find_map(|name| headers.iter().position(|h| h.trim() == *name))
            .ok_or_else(|| Error::MissingColumn(NAMESPACE_COLUMNS[0].to_string()))?;

        Ok(Self {
            revision_id: find("revision_id")?,
            page_id: find("page_id")?,
            page_namespace,
            contributor_id: find("contributor_id")?,
            contributor_name: find("contributor_name")?,
            timestamp: find("timestamp")?,
            bytes: find("bytes")?,
            edit_content: find("edit_content")?,
            factoids: find("factoids")?,
        })
    }

    fn parse(&self, record: &csv::StringRecord, line: u64, ts_format: &str) -> Result<Revision> {
        let field = |idx: usize| record.get(idx).unwrap_or("");

        Ok(Revision {
            revision_id: parse_int(field(self.revision_id), line, "revision_id")?,
            page_id: parse_int(field(self.page_id), line, "page_id")?,
            page_namespace: parse_namespace(field(self.page_namespace), line)?,
            contributor_id: field(self.contributor_id).trim().to_string(),
            contributor_name: field(self.contributor_name).trim().to_string(),
            timestamp: parse_timestamp(field(self.timestamp), ts_format, line)?,
            bytes: parse_int(field(self.bytes), line, "bytes")?,
            edit_content: field(self.edit_content).to_string(),
            factoids: FactoidSet::parse(field(self.factoids)),
        })
    }
}

fn parse_int(raw: &str, line: u64, column: &'static str) -> Result<i64> {
    let raw = raw.trim();
    // Some exporters write integral columns as floats ("12.0").
    raw.parse::<i64>()
        .or_else(|_| match raw.parse::<f64>() {
            Ok(v) if v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 => {
                Ok(v as i64)
            }
            _ => Err(()),
        })
        .map_err(|_| Error::InvalidField {
            line,
            column,
            message: format!("expected an integer, got {:?}", raw),
        })
}

fn parse_namespace(raw: &str, line: u64) -> Result<i32> {
    let code = parse_int(raw, line, "page_ns")?;
    i32::try_from(code).map_err(|_| Error::InvalidField {
        line,
        column: "page_ns",
        message: format!("namespace code {} out of range", code),
    })
}

/// Parse a timestamp with the configured format.
///
/// Formats without an offset are read as UTC.
pub fn parse_timestamp(raw: &str, format: &str, line: u64) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, format)
        .map(|naive| naive.and_utc())
        .or_else(|_| DateTime::parse_from_str(raw, format).map(|dt| dt.with_timezone(&Utc)))
        .map_err(|e| Error::InvalidField {
            line,
            column: "timestamp",
            message: format!("{:?}: {}", raw, e),
        })
}

// ============================================
// Dataset
// ============================================

/// A named revision log together with its canonical time index.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// File stem of the dump, used in logs and reports
    pub name: String,
    pub log: RevisionLog,
    pub index: TimeIndex,
}

impl Dataset {
    /// Wrap an in-memory log.
    pub fn new(name: impl Into<String>, log: RevisionLog) -> Self {
        let index = TimeIndex::from_log(&log);
        Self {
            name: name.into(),
            log,
            index,
        }
    }

    /// Load a dump and build its time index.
    pub fn load(path: &Path, config: &DatasetConfig) -> Result<Self> {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "dataset".to_string());

        let log = RevisionLog::from_csv_path(path, config)?;
        let dataset = Self::new(name, log);

        tracing::info!(
            dataset = %dataset.name,
            revisions = dataset.log.len(),
            months = dataset.index.len(),
            "Loaded revision dump"
        );

        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_index::Month;

    const HEADER: &str =
        "revision_id;page_id;page_ns;contributor_id;contributor_name;timestamp;bytes;edit_content;factoids";

    fn load(body: &str) -> Result<RevisionLog> {
        let csv = format!("{}\n{}", HEADER, body);
        RevisionLog::from_reader(csv.as_bytes(), &DatasetConfig::default())
    }

    #[test]
    fn test_parse_dump() {
        let log = load(
            "2;10;0;7;Alice;2018-02-01T10:00:00Z;120;|see [[Main]]; ok|;a,b\n\
             1;10;0;7;Alice;2018-01-15T09:30:00Z;100;first;a\n",
        )
        .unwrap();

        assert_eq!(log.len(), 2);
        let first = log.first().unwrap();
        assert_eq!(first.revision_id, 1);
        assert_eq!(first.month(), Month::new(2018, 1).unwrap());

        let last = log.last().unwrap();
        assert_eq!(last.edit_content, "see [[Main]]; ok");
        assert_eq!(last.factoids.len(), 2);
    }

    #[test]
    fn test_missing_column_is_error() {
        let csv = "revision_id;page_id;contributor_id\n1;1;1\n";
        let err = RevisionLog::from_reader(csv.as_bytes(), &DatasetConfig::default()).unwrap_err();
        assert!(matches!(err, Error::MissingColumn(_)));
    }

    #[test]
    fn test_page_namespace_alias() {
        let csv = "revision_id;page_id;page_namespace;contributor_id;contributor_name;timestamp;bytes;edit_content;factoids\n\
                   1;1;2;9;Bob;2018-01-01T00:00:00Z;5;;\n";
        let log = RevisionLog::from_reader(csv.as_bytes(), &DatasetConfig::default()).unwrap();
        assert_eq!(log.first().unwrap().page_namespace, 2);
        assert!(log.first().unwrap().factoids.is_empty());
    }

    #[test]
    fn test_bad_timestamp_is_error() {
        let err = load("1;1;0;1;Alice;15/01/2018;1;;\n").unwrap_err();
        match err {
            Error::InvalidField { line, column, .. } => {
                assert_eq!(column, "timestamp");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_integer_is_error() {
        let err = load("1;1;0;1;Alice;2018-01-01T00:00:00Z;lots;;\n").unwrap_err();
        assert!(matches!(err, Error::InvalidField { column: "bytes", .. }));
    }

    #[test]
    fn test_out_of_range_namespace_is_error() {
        let err = load("1;1;4294967296;1;Alice;2018-01-01T00:00:00Z;1;;\n").unwrap_err();
        assert!(matches!(err, Error::InvalidField { column: "page_ns", .. }));
    }

    #[test]
    fn test_out_of_range_float_is_error() {
        let err = load("1;1;0;1;Alice;2018-01-01T00:00:00Z;1e30;;\n").unwrap_err();
        assert!(matches!(err, Error::InvalidField { column: "bytes", .. }));
    }

    #[test]
    fn test_float_integers_accepted() {
        let log = load("1;1;0.0;1;Alice;2018-01-01T00:00:00Z;12.0;;\n").unwrap();
        assert_eq!(log.first().unwrap().bytes, 12);
    }

    #[test]
    fn test_duplicate_revision_is_error() {
        let err = load(
            "1;1;0;1;Alice;2018-01-01T00:00:00Z;1;;\n\
             1;2;0;1;Alice;2018-01-02T00:00:00Z;1;;\n",
        )
        .unwrap_err();
        assert!(matches!(err, Error::DuplicateRevision(1)));
    }

    #[test]
    fn test_summary_and_dataset() {
        let log = load(
            "1;1;0;1;Alice;2018-01-01T00:00:00Z;1;;\n\
             2;2;1;10.0.0.1;Anonymous;2018-03-01T00:00:00Z;1;;\n\
             3;1;0;2;Bob;2018-03-05T00:00:00Z;1;;\n",
        )
        .unwrap();

        let summary = log.summary();
        assert_eq!(summary.revisions, 3);
        assert_eq!(summary.pages, 2);
        assert_eq!(summary.registered_contributors, 2);
        assert_eq!(summary.anonymous_contributors, 1);
        assert_eq!(summary.months, 3);

        let dataset = Dataset::new("wiki", log);
        assert_eq!(dataset.index.len(), 3);
        assert!(dataset.index.covers(&dataset.log));
    }

    #[test]
    fn test_custom_format() {
        let config = DatasetConfig {
            delimiter: ',',
            quote: '"',
            timestamp_format: "%Y-%m-%d %H:%M:%S".to_string(),
        };
        let csv = "revision_id,page_id,page_ns,contributor_id,contributor_name,timestamp,bytes,edit_content,factoids\n\
                   1,1,0,1,Alice,2018-01-01 12:00:00,1,\"a, b\",\"x,y\"\n";
        let log = RevisionLog::from_reader(csv.as_bytes(), &config).unwrap();
        let rev = log.first().unwrap();
        assert_eq!(rev.edit_content, "a, b");
        assert_eq!(rev.factoids.len(), 2);
    }
}

//! Core domain types for wikichron
//!
//! These types represent one row of a wiki revision dump and the small
//! vocabularies metrics classify rows by.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Revision** | One saved edit of one page |
//! | **Contributor** | Whoever made a revision; either a registered account or an anonymous address |
//! | **Namespace** | MediaWiki page namespace (articles, talk pages, templates, ...) |
//! | **Factoid** | An atomic content unit tracked per revision as a set snapshot |
//!
//! ### Anonymous contributors
//!
//! Dumps mark anonymous edits with the contributor name [`ANONYMOUS_CONTRIBUTOR`].
//! The `contributor_id` of such rows is the network address, so two anonymous
//! edits from different addresses count as two distinct contributors.

use crate::time_index::Month;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Contributor name used by the dumps for anonymous edits.
pub const ANONYMOUS_CONTRIBUTOR: &str = "Anonymous";

// ============================================
// Revision
// ============================================

/// One row of the revision log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revision {
    /// Unique key of the row
    pub revision_id: i64,
    /// Page the revision belongs to
    pub page_id: i64,
    /// Namespace code of the page
    pub page_namespace: i32,
    /// Account id, or network address for anonymous edits
    pub contributor_id: String,
    /// Account name, [`ANONYMOUS_CONTRIBUTOR`] for anonymous edits
    pub contributor_name: String,
    /// When the revision was saved
    pub timestamp: DateTime<Utc>,
    /// Page size in bytes after this revision
    pub bytes: i64,
    /// Raw wikitext, scanned for link and image markers
    pub edit_content: String,
    /// Factoids present on the page after this revision
    pub factoids: FactoidSet,
}

impl Revision {
    /// Whether the revision was made without an account.
    pub fn is_anonymous(&self) -> bool {
        self.contributor_name == ANONYMOUS_CONTRIBUTOR
    }

    /// Calendar month the revision falls in.
    pub fn month(&self) -> Month {
        Month::from_datetime(&self.timestamp)
    }

    /// Namespace group of the page.
    pub fn namespace(&self) -> Namespace {
        Namespace::from_code(self.page_namespace)
    }

    /// Whether the page is an article (main namespace).
    pub fn is_article(&self) -> bool {
        self.page_namespace == Namespace::Article.code()
    }
}

// ============================================
// Factoids
// ============================================

/// Snapshot of the factoids on a page after a revision.
///
/// Ordered so diffs and serialized output are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactoidSet(BTreeSet<String>);

impl FactoidSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the comma separated dump column.
    ///
    /// Entries are trimmed and empty entries dropped, so an empty column is
    /// the empty set.
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, factoid: &str) -> bool {
        self.0.contains(factoid)
    }

    pub fn insert(&mut self, factoid: impl Into<String>) -> bool {
        self.0.insert(factoid.into())
    }

    pub fn remove(&mut self, factoid: &str) -> bool {
        self.0.remove(factoid)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Factoids in `self` that are not in `other`.
    pub fn difference(&self, other: &FactoidSet) -> FactoidSet {
        Self(self.0.difference(&other.0).cloned().collect())
    }
}

impl<S: Into<String>> FromIterator<S> for FactoidSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

// ============================================
// Namespaces
// ============================================

/// MediaWiki namespaces the metrics break edits down by.
///
/// Every other code collapses into [`Namespace::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Namespace {
    Article,
    ArticleTalk,
    User,
    UserTalk,
    File,
    MediaWiki,
    Template,
    Category,
    Other(i32),
}

impl Namespace {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Namespace::Article,
            1 => Namespace::ArticleTalk,
            2 => Namespace::User,
            3 => Namespace::UserTalk,
            6 => Namespace::File,
            8 => Namespace::MediaWiki,
            10 => Namespace::Template,
            14 => Namespace::Category,
            other => Namespace::Other(other),
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            Namespace::Article => 0,
            Namespace::ArticleTalk => 1,
            Namespace::User => 2,
            Namespace::UserTalk => 3,
            Namespace::File => 6,
            Namespace::MediaWiki => 8,
            Namespace::Template => 10,
            Namespace::Category => 14,
            Namespace::Other(code) => *code,
        }
    }

    /// Legend label used by the namespace breakdown charts.
    pub fn label(&self) -> &'static str {
        match self {
            Namespace::Article => "Article pages",
            Namespace::ArticleTalk => "Article talk pages",
            Namespace::User => "User pages",
            Namespace::UserTalk => "User talk pages",
            Namespace::File => "File pages",
            Namespace::MediaWiki => "Media wiki pages",
            Namespace::Template => "Template pages",
            Namespace::Category => "Category pages",
            Namespace::Other(_) => "Other pages",
        }
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

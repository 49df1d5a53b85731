//! Factoid differ.
//!
//! Each revision stores the full factoid set of its page. Deltas are derived
//! here by comparing a revision with the previous revision of the same page,
//! whoever made it. The first revision of a page adds its whole set.

use crate::dataset::RevisionLog;
use crate::types::{FactoidSet, Revision};
use serde::Serialize;
use std::collections::HashMap;

/// Factoids a revision introduced and dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FactoidDelta {
    pub added: FactoidSet,
    pub removed: FactoidSet,
}

impl FactoidDelta {
    /// Delta from `previous` to `current`.
    pub fn between(previous: &FactoidSet, current: &FactoidSet) -> Self {
        Self {
            added: current.difference(previous),
            removed: previous.difference(current),
        }
    }
}

/// Deltas of every revision in a log, keyed by revision id.
#[derive(Debug, Clone, Default)]
pub struct FactoidDiffs {
    by_revision: HashMap<i64, FactoidDelta>,
}

impl FactoidDiffs {
    /// Diff every page history of the log.
    pub fn compute(log: &RevisionLog) -> Self {
        let empty = FactoidSet::new();
        let mut previous: HashMap<i64, &FactoidSet> = HashMap::new();
        let mut by_revision = HashMap::with_capacity(log.len());

        for rev in log {
            let before = previous.get(&rev.page_id).copied().unwrap_or(&empty);
            by_revision.insert(rev.revision_id, FactoidDelta::between(before, &rev.factoids));
            previous.insert(rev.page_id, &rev.factoids);
        }

        Self { by_revision }
    }

    pub fn get(&self, revision_id: i64) -> Option<&FactoidDelta> {
        self.by_revision.get(&revision_id)
    }

    /// Number of factoids the revision added; 0 for unknown revisions.
    pub fn added(&self, rev: &Revision) -> f64 {
        self.get(rev.revision_id)
            .map_or(0.0, |d| d.added.len() as f64)
    }

    /// Number of factoids the revision removed; 0 for unknown revisions.
    pub fn removed(&self, rev: &Revision) -> f64 {
        self.get(rev.revision_id)
            .map_or(0.0, |d| d.removed.len() as f64)
    }
}

/// Deltas along one page's chronological revisions.
pub fn diff_page_history<'a, I>(revisions: I) -> Vec<FactoidDelta>
where
    I: IntoIterator<Item = &'a Revision>,
{
    let mut previous = FactoidSet::new();
    revisions
        .into_iter()
        .map(|rev| {
            let delta = FactoidDelta::between(&previous, &rev.factoids);
            previous = rev.factoids.clone();
            delta
        })
        .collect()
}

/// Replay deltas from an empty page.
pub fn apply(deltas: &[FactoidDelta]) -> FactoidSet {
    let mut set = FactoidSet::new();
    for delta in deltas {
        for factoid in delta.removed.iter() {
            set.remove(factoid);
        }
        for factoid in delta.added.iter() {
            set.insert(factoid);
        }
    }
    set
}

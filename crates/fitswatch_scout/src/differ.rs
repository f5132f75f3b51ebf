//! Inventory differ
//!
//! Compares a folder's previous and current snapshot lists keyed by the
//! case-folded path. Every current entry lands in exactly one of `new`,
//! `modified` or `unchanged`; entries only present in the previous list are
//! collected as `deleted` for logging and never reported to owners.
//!
//! Two entries of the current listing that differ only by case have no
//! defined identity and are rejected with [`ScoutError::CaseCollision`]. A
//! stored listing may still hold such a pair from an earlier scan; there the
//! first entry wins, so the folder recovers once the duplicate is removed.

use crate::error::{Result, ScoutError};
use crate::types::Snapshot;
use std::collections::HashMap;

/// Partition of a rescan relative to the previous scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryDiff {
    /// Present now, absent before
    pub new: Vec<Snapshot>,
    /// Present in both, with a creation or modification instant that moved forward
    pub modified: Vec<Snapshot>,
    /// Present in both, timestamps not advanced
    pub unchanged: Vec<Snapshot>,
    /// Present before, absent now
    pub deleted: Vec<Snapshot>,
}

impl InventoryDiff {
    /// Diff two snapshot lists. Neither input is modified.
    pub fn compute(previous: &[Snapshot], current: &[Snapshot]) -> Result<Self> {
        let previous_by_key = index_first_wins(previous);
        let current_by_key = index_by_key(current)?;

        let mut diff = InventoryDiff::default();
        for snapshot in current {
            match previous_by_key.get(&snapshot.key()) {
                None => diff.new.push(snapshot.clone()),
                Some(prior) if snapshot.is_newer_than(prior) => {
                    diff.modified.push(snapshot.clone())
                }
                Some(_) => diff.unchanged.push(snapshot.clone()),
            }
        }
        diff.deleted = previous
            .iter()
            .filter(|snapshot| !current_by_key.contains_key(&snapshot.key()))
            .cloned()
            .collect();

        Ok(diff)
    }

    /// True when nothing needs validating.
    pub fn is_empty(&self) -> bool {
        self.new.is_empty() && self.modified.is_empty()
    }

    /// New files followed by modified files, in validation order.
    pub fn changed(&self) -> impl Iterator<Item = &Snapshot> {
        self.new.iter().chain(self.modified.iter())
    }

    pub fn changed_count(&self) -> usize {
        self.new.len() + self.modified.len()
    }
}

/// Current entries whose case-folded path is not in `previous`.
pub fn diff_new(previous: &[Snapshot], current: &[Snapshot]) -> Result<Vec<Snapshot>> {
    InventoryDiff::compute(previous, current).map(|diff| diff.new)
}

/// Current entries also in `previous` whose creation or modification instant
/// strictly exceeds the previous one.
pub fn diff_modified(previous: &[Snapshot], current: &[Snapshot]) -> Result<Vec<Snapshot>> {
    InventoryDiff::compute(previous, current).map(|diff| diff.modified)
}

fn index_first_wins(snapshots: &[Snapshot]) -> HashMap<String, &Snapshot> {
    let mut index: HashMap<String, &Snapshot> = HashMap::with_capacity(snapshots.len());
    for snapshot in snapshots {
        index.entry(snapshot.key()).or_insert(snapshot);
    }
    index
}

fn index_by_key(snapshots: &[Snapshot]) -> Result<HashMap<String, &Snapshot>> {
    let mut index: HashMap<String, &Snapshot> = HashMap::with_capacity(snapshots.len());
    for snapshot in snapshots {
        if let Some(existing) = index.insert(snapshot.key(), snapshot) {
            return Err(ScoutError::CaseCollision {
                first: existing.path.clone(),
                second: snapshot.path.clone(),
            });
        }
    }
    Ok(index)
}

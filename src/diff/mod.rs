//! Mapping comparison for runner bookkeeping.
//!
//! Used to diff observed results against expected ones, e.g. checksum or
//! exit-code tables keyed by case name.

use std::collections::{BTreeMap, BTreeSet};

/// Key-level difference between two mappings.
///
/// BTree containers so reports iterate in a stable order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapDiff<K, V> {
    /// Keys present in `ours` only.
    pub added: BTreeSet<K>,
    /// Keys present in `theirs` only.
    pub removed: BTreeSet<K>,
    /// Shared keys whose values differ, as `(ours, theirs)`.
    pub modified: BTreeMap<K, (V, V)>,
    /// Shared keys whose values are equal.
    pub same: BTreeSet<K>,
}

impl<K, V> MapDiff<K, V> {
    /// True when both mappings agree on every key.
    pub fn is_identical(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }
}

/// Compare two mappings key by key.
pub fn compare<K, V>(ours: &BTreeMap<K, V>, theirs: &BTreeMap<K, V>) -> MapDiff<K, V>
where
    K: Ord + Clone,
    V: PartialEq + Clone,
{
    let mut diff = MapDiff {
        added: BTreeSet::new(),
        removed: BTreeSet::new(),
        modified: BTreeMap::new(),
        same: BTreeSet::new(),
    };

    for (key, value) in ours {
        match theirs.get(key) {
            None => {
                diff.added.insert(key.clone());
            }
            Some(other) if other == value => {
                diff.same.insert(key.clone());
            }
            Some(other) => {
                diff.modified
                    .insert(key.clone(), (value.clone(), other.clone()));
            }
        }
    }
    for key in theirs.keys() {
        if !ours.contains_key(key) {
            diff.removed.insert(key.clone());
        }
    }

    diff
}

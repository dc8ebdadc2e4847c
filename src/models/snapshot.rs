//! Stock snapshot and change set structures.

use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::{Deserialize, Serialize};

/// A point-in-time mapping of item name to stock count.
///
/// Serialized as a flat JSON object, e.g. `{"HK-①": 7, "CA": 0}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StockSnapshot {
    items: BTreeMap<String, u64>,
}

impl StockSnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a stock count, replacing any previous value for the name.
    pub fn insert(&mut self, name: impl Into<String>, count: u64) -> Option<u64> {
        self.items.insert(name.into(), count)
    }

    /// Stock count for an item, `None` if the item is not present.
    pub fn get(&self, name: &str) -> Option<u64> {
        self.items.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate items ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.items.iter().map(|(name, count)| (name.as_str(), *count))
    }

    /// Item names ordered by name.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    /// Merge another snapshot into this one; `other` wins on name collisions.
    pub fn merge(&mut self, other: StockSnapshot) {
        self.items.extend(other.items);
    }

    /// Keep only the items whose name satisfies the predicate.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.items.retain(|name, _| keep(name));
    }

    /// Number of items with a non-zero count.
    pub fn available_count(&self) -> usize {
        self.items.values().filter(|count| **count > 0).count()
    }
}

impl FromIterator<(String, u64)> for StockSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<(&'a str, u64)> for StockSnapshot {
    fn from_iter<I: IntoIterator<Item = (&'a str, u64)>>(iter: I) -> Self {
        iter.into_iter()
            .map(|(name, count)| (name.to_string(), count))
            .collect()
    }
}

impl IntoIterator for StockSnapshot {
    type Item = (String, u64);
    type IntoIter = btree_map::IntoIter<String, u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// How an item's presence changed between two snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Present now, absent before
    Added,
    /// Present before, absent now
    Removed,
    /// Present in both with different counts
    Updated,
}

/// Direction indicator shown next to a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Increased,
    Decreased,
}

/// Old and new stock count of a single item. `None` means "not present".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub old: Option<u64>,
    pub new: Option<u64>,
}

impl Change {
    pub fn new(old: Option<u64>, new: Option<u64>) -> Self {
        Self { old, new }
    }

    pub fn kind(&self) -> ChangeKind {
        match (self.old, self.new) {
            (None, Some(_)) => ChangeKind::Added,
            (Some(_), None) => ChangeKind::Removed,
            _ => ChangeKind::Updated,
        }
    }

    /// Absent counts compare as zero; anything that is not an increase is
    /// reported as a decrease.
    pub fn direction(&self) -> Direction {
        if self.new.unwrap_or(0) > self.old.unwrap_or(0) {
            Direction::Increased
        } else {
            Direction::Decreased
        }
    }

    /// The same change seen from the other side.
    pub fn reversed(&self) -> Self {
        Self {
            old: self.new,
            new: self.old,
        }
    }
}

/// Items whose stock differs between two snapshots, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeSet {
    changes: BTreeMap<String, Change>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, change: Change) {
        self.changes.insert(name.into(), change);
    }

    pub fn get(&self, name: &str) -> Option<&Change> {
        self.changes.get(name)
    }

    /// Check if there are any changes.
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Get the total number of changes.
    pub fn change_count(&self) -> usize {
        self.changes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Change)> {
        self.changes.iter().map(|(name, change)| (name.as_str(), change))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.changes.keys().map(String::as_str)
    }

    fn names_of(&self, kind: ChangeKind) -> Vec<&str> {
        self.iter()
            .filter(|(_, change)| change.kind() == kind)
            .map(|(name, _)| name)
            .collect()
    }

    /// Items that appeared since the previous snapshot.
    pub fn added(&self) -> Vec<&str> {
        self.names_of(ChangeKind::Added)
    }

    /// Items that disappeared since the previous snapshot.
    pub fn removed(&self) -> Vec<&str> {
        self.names_of(ChangeKind::Removed)
    }

    /// Items present in both snapshots with a different count.
    pub fn updated(&self) -> Vec<&str> {
        self.names_of(ChangeKind::Updated)
    }
}

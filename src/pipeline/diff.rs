//! Diff calculation between stock snapshots.
//!
//! Computes which items changed between the previously recorded snapshot
//! and the current observation. Absence is a value of its own: an item that
//! appears with stock 0 is a change, just like one that disappears.

use std::collections::BTreeSet;

use crate::models::{Change, ChangeSet, StockSnapshot};

/// Result of comparing the current snapshot against the recorded one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffOutcome {
    /// Nothing was recorded before; report everything, no deltas
    FirstObservation,
    /// A previous snapshot existed; the change set may be empty
    Compared(ChangeSet),
}

impl DiffOutcome {
    /// The change set, if there was a previous snapshot to compare with.
    pub fn changes(&self) -> Option<&ChangeSet> {
        match self {
            DiffOutcome::FirstObservation => None,
            DiffOutcome::Compared(changes) => Some(changes),
        }
    }
}

/// Compare two snapshots item by item.
pub fn compare(previous: &StockSnapshot, current: &StockSnapshot) -> ChangeSet {
    let names: BTreeSet<&str> = previous.names().chain(current.names()).collect();

    let mut changes = ChangeSet::new();
    for name in names {
        let old = previous.get(name);
        let new = current.get(name);
        if old != new {
            changes.insert(name, Change::new(old, new));
        }
    }
    changes
}

/// Calculate the diff against an optional previous snapshot.
pub fn calculate_diff(previous: Option<&StockSnapshot>, current: &StockSnapshot) -> DiffOutcome {
    match previous {
        None => DiffOutcome::FirstObservation,
        Some(previous) => DiffOutcome::Compared(compare(previous, current)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(items: &[(&str, u64)]) -> StockSnapshot {
        items.iter().copied().collect()
    }

    #[test]
    fn test_no_previous_is_first_observation() {
        let current = snapshot(&[("CA", 1)]);
        assert_eq!(calculate_diff(None, &current), DiffOutcome::FirstObservation);
    }

    #[test]
    fn test_no_changes() {
        let prev = snapshot(&[("HK-①", 7), ("CA", 0)]);
        let curr = prev.clone();

        let outcome = calculate_diff(Some(&prev), &curr);
        let changes = outcome.changes().unwrap();
        assert!(!changes.has_changes());
        assert_eq!(changes.change_count(), 0);
    }

    #[test]
    fn test_empty_previous_is_not_first_observation() {
        let prev = StockSnapshot::new();
        let curr = snapshot(&[("CA", 2)]);

        let outcome = calculate_diff(Some(&prev), &curr);
        let changes = outcome.changes().unwrap();
        assert_eq!(changes.added(), vec!["CA"]);
    }

    #[test]
    fn test_appearing_and_changed_items() {
        let prev = snapshot(&[("HK-①", 7), ("CA", 0)]);
        let curr = snapshot(&[("HK-①", 7), ("CA", 3), ("DE", 0)]);

        let changes = compare(&prev, &curr);
        assert_eq!(changes.change_count(), 2);
        assert_eq!(changes.get("CA"), Some(&Change::new(Some(0), Some(3))));
        assert_eq!(changes.get("DE"), Some(&Change::new(None, Some(0))));
        assert!(changes.get("HK-①").is_none());
    }

    #[test]
    fn test_removals() {
        let prev = snapshot(&[("CA", 0), ("FR-②", 4)]);
        let curr = snapshot(&[("CA", 0)]);

        let changes = compare(&prev, &curr);
        assert_eq!(changes.removed(), vec!["FR-②"]);
        assert_eq!(changes.get("FR-②"), Some(&Change::new(Some(4), None)));
    }

    #[test]
    fn test_zero_is_not_absent() {
        let prev = snapshot(&[("CA", 0)]);
        let curr = StockSnapshot::new();

        let changes = compare(&prev, &curr);
        assert_eq!(changes.get("CA"), Some(&Change::new(Some(0), None)));
    }

    #[test]
    fn test_keys_match_inequality() {
        let a = snapshot(&[("A", 1), ("B", 2), ("C", 0), ("D", 5)]);
        let b = snapshot(&[("A", 1), ("B", 3), ("D", 5), ("E", 0)]);

        let changes = compare(&a, &b);
        let union: BTreeSet<&str> = a.names().chain(b.names()).collect();
        for name in union {
            assert_eq!(
                changes.get(name).is_some(),
                a.get(name) != b.get(name),
                "mismatch for {name}"
            );
        }
    }

    #[test]
    fn test_reverse_diff_swaps_sides() {
        let a = snapshot(&[("A", 1), ("B", 2), ("C", 0)]);
        let b = snapshot(&[("A", 4), ("C", 0), ("D", 9)]);

        let forward = compare(&a, &b);
        let backward = compare(&b, &a);

        assert_eq!(
            forward.names().collect::<Vec<_>>(),
            backward.names().collect::<Vec<_>>()
        );
        for (name, change) in forward.iter() {
            assert_eq!(backward.get(name), Some(&change.reversed()));
        }
    }
}

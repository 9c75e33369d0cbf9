// src/units/diff.rs
// =============================================================================
// The diff engine: compares the previous poll with the current one.
//
// This is a pure function. No I/O, no clock, no randomness - which is what
// makes it easy to test exhaustively.
//
// Set semantics:
// - added   = current - previous
// - removed = previous - current
// - changed = current != previous (as sets, so page order never matters)
// =============================================================================

use super::model::{Snapshot, UnitRecord};

// The result of comparing two snapshots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotDiff {
    /// Units present now but not before, ascending
    pub added: Vec<UnitRecord>,
    /// Units present before but not now, ascending
    pub removed: Vec<UnitRecord>,
    /// Whether the two snapshots differ as sets
    pub changed: bool,
}

// Compares `previous` against `current`
//
// BTreeSet::difference yields items in ascending order, so the output
// vectors are already sorted.
pub fn diff(previous: &Snapshot, current: &Snapshot) -> SnapshotDiff {
    let added = current
        .as_set()
        .difference(previous.as_set())
        .cloned()
        .collect();
    let removed = previous
        .as_set()
        .difference(current.as_set())
        .cloned()
        .collect();

    SnapshotDiff {
        added,
        removed,
        changed: current != previous,
    }
}

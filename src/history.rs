// Valuation history - bounded, append-only log of snapshots
//
// A snapshot is an immutable point-in-time copy of the table plus the
// valuation computed at capture time. Later edits to the live table can
// never reach back into a snapshot: the entries are owned clones.

use crate::entry::Entry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Maximum number of snapshots retained; oldest evicted first
pub const HISTORY_CAPACITY: usize = 10;

// ============================================================================
// SNAPSHOT
// ============================================================================

/// Point-in-time record of the cap table and its post-money valuation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Capture instant
    pub timestamp: DateTime<Utc>,

    /// Deep, independent copy of the entries at capture time
    pub entries: Vec<Entry>,

    /// Post-money valuation computed at capture time
    pub valuation: f64,
}

impl Snapshot {
    /// Capture the current entry state; the clone guarantees isolation
    /// from any later mutation of the live table
    pub fn capture(entries: &[Entry], valuation: f64) -> Self {
        Snapshot {
            timestamp: Utc::now(),
            entries: entries.to_vec(),
            valuation,
        }
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}

// ============================================================================
// HISTORY LOG
// ============================================================================

/// Ordered sequence of snapshots, bounded to the most recent
/// `HISTORY_CAPACITY`. Append-only; snapshots are never edited in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryLog {
    snapshots: VecDeque<Snapshot>,
}

impl HistoryLog {
    pub fn new() -> Self {
        HistoryLog {
            snapshots: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    /// Append a snapshot, evicting from the front once the bound is hit
    pub fn append(&mut self, snapshot: Snapshot) {
        self.snapshots.push_back(snapshot);
        while self.snapshots.len() > HISTORY_CAPACITY {
            self.snapshots.pop_front();
        }
    }

    /// Snapshots in chronological order, oldest first.
    ///
    /// Read-only and restartable: re-iterating yields the same sequence
    /// until the next `append`.
    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.snapshots.iter()
    }

    /// Most recent snapshot, if any
    pub fn latest(&self) -> Option<&Snapshot> {
        self.snapshots.back()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_valued(valuation: f64) -> Snapshot {
        Snapshot::capture(&[], valuation)
    }

    #[test]
    fn test_append_and_iterate() {
        let mut log = HistoryLog::new();
        assert!(log.is_empty());

        log.append(snapshot_valued(100.0));
        log.append(snapshot_valued(200.0));

        assert_eq!(log.len(), 2);
        let valuations: Vec<f64> = log.iter().map(|s| s.valuation).collect();
        assert_eq!(valuations, vec![100.0, 200.0]);
        assert_eq!(log.latest().unwrap().valuation, 200.0);
    }

    #[test]
    fn test_iteration_is_restartable() {
        let mut log = HistoryLog::new();
        log.append(snapshot_valued(1.0));
        log.append(snapshot_valued(2.0));

        let first: Vec<f64> = log.iter().map(|s| s.valuation).collect();
        let second: Vec<f64> = log.iter().map(|s| s.valuation).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_bounded_to_ten_with_fifo_eviction() {
        let mut log = HistoryLog::new();
        for i in 0..12 {
            log.append(snapshot_valued(i as f64));
        }

        assert_eq!(log.len(), HISTORY_CAPACITY);

        // Snapshots 0 and 1 were evicted; 2..=11 remain in order
        let valuations: Vec<f64> = log.iter().map(|s| s.valuation).collect();
        assert_eq!(valuations[0], 2.0);
        assert_eq!(*valuations.last().unwrap(), 11.0);
        assert!(!valuations.contains(&0.0));
        assert!(!valuations.contains(&1.0));
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_edits() {
        let mut entries = vec![Entry::founder_seed()];
        let snapshot = Snapshot::capture(&entries, 0.0);

        entries[0].name = "Renamed".to_string();
        entries[0].shares = 1;

        assert_eq!(snapshot.entries[0].name, "Founder 1");
        assert_eq!(snapshot.entries[0].shares, 500_000);
    }

    #[test]
    fn test_snapshot_entry_count() {
        let entries = vec![Entry::founder_seed(), Entry::blank()];
        let snapshot = Snapshot::capture(&entries, 42.0);

        assert_eq!(snapshot.entry_count(), 2);
        assert_eq!(snapshot.valuation, 42.0);
    }
}

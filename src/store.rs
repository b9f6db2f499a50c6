// CapTable - the caller-owned state container for the whole engine
//
// Holds the ordered entry collection, the submitted flag, the valuation
// history, and the active filter criteria. Every operation is synchronous
// and all-or-nothing: an operation that fails leaves the table exactly as
// it found it.

use crate::entry::{coerce_investment, coerce_shares, Entry, EntryField, EntryId};
use crate::filter::FilterCriteria;
use crate::history::{HistoryLog, Snapshot};
use crate::import::{parse_entries, ImportError};
use crate::metrics;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// UPDATE ERRORS
// ============================================================================

/// A per-field update was rejected; the entry is unchanged
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateError {
    /// Raw text could not be coerced to the field's numeric type
    InvalidNumber { field: EntryField, raw: String },
}

impl fmt::Display for UpdateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateError::InvalidNumber { field, raw } => {
                write!(f, "'{}' is not a valid number for {}", raw, field)
            }
        }
    }
}

impl std::error::Error for UpdateError {}

// ============================================================================
// CAP TABLE
// ============================================================================

/// The cap-table state: entries, submission flag, history, filter.
///
/// `Default` seeds the table with the founder row a fresh session starts
/// from; `new` gives an empty table for import flows and tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapTable {
    entries: Vec<Entry>,
    submitted: bool,
    history: HistoryLog,
    pub filter: FilterCriteria,
}

impl Default for CapTable {
    fn default() -> Self {
        CapTable {
            entries: vec![Entry::founder_seed()],
            submitted: false,
            history: HistoryLog::new(),
            filter: FilterCriteria::new(),
        }
    }
}

impl CapTable {
    /// Empty table, no seed row
    pub fn new() -> Self {
        CapTable {
            entries: Vec::new(),
            submitted: false,
            history: HistoryLog::new(),
            filter: FilterCriteria::new(),
        }
    }

    /// Table built from an existing collection (ids are kept as-is;
    /// use `import_json`/`replace_all` for untrusted sources)
    pub fn with_entries(entries: Vec<Entry>) -> Self {
        CapTable {
            entries,
            submitted: false,
            history: HistoryLog::new(),
            filter: FilterCriteria::new(),
        }
    }

    // ========================================================================
    // READS
    // ========================================================================

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, id: EntryId) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Whether the current state has been submitted (snapshotted) and no
    /// mutation has happened since
    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// View of the entries passing the table's own filter criteria,
    /// order-preserving, without mutating anything
    pub fn filtered_entries(&self) -> Vec<&Entry> {
        self.filter.apply(&self.entries)
    }

    // ========================================================================
    // MUTATIONS
    // ========================================================================

    /// Append a blank entry with a fresh id; returns the new id
    pub fn add_entry(&mut self) -> EntryId {
        let entry = Entry::blank();
        let id = entry.id;
        self.entries.push(entry);
        self.submitted = false;
        id
    }

    /// Update one field of one entry from raw text.
    ///
    /// Text fields are stored as-is. `shares`/`investment` go through
    /// checked coercion: empty input clears to 0, invalid input returns
    /// `UpdateError::InvalidNumber` with the entry untouched. An unknown
    /// id is a silent no-op. Any successful mutation clears the submitted
    /// flag so stale derived views are not presented as current.
    pub fn update_field(
        &mut self,
        id: EntryId,
        field: EntryField,
        raw: &str,
    ) -> Result<(), UpdateError> {
        // Coerce before locating the entry so a bad value can never
        // half-apply.
        let shares = if field == EntryField::Shares {
            Some(coerce_shares(raw).ok_or_else(|| UpdateError::InvalidNumber {
                field,
                raw: raw.to_string(),
            })?)
        } else {
            None
        };
        let investment = if field == EntryField::Investment {
            Some(
                coerce_investment(raw).ok_or_else(|| UpdateError::InvalidNumber {
                    field,
                    raw: raw.to_string(),
                })?,
            )
        } else {
            None
        };

        let entry = match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => entry,
            None => return Ok(()), // unknown id: silent no-op
        };

        match field {
            EntryField::Name => entry.name = raw.to_string(),
            EntryField::Role => entry.role = raw.to_string(),
            EntryField::Shares => entry.shares = shares.unwrap_or(0),
            EntryField::Investment => entry.investment = investment.unwrap_or(0.0),
            EntryField::ShareClass => entry.share_class = raw.to_string(),
            EntryField::Round => entry.round = raw.to_string(),
            EntryField::Vesting => entry.vesting = raw.to_string(),
            EntryField::DilutionProtection => entry.dilution_protection = raw.to_string(),
            EntryField::Convertibles => entry.convertibles = raw.to_string(),
            EntryField::Notes => entry.notes = raw.to_string(),
        }

        self.submitted = false;
        Ok(())
    }

    /// Discard the collection and install `new_entries`, each with a
    /// freshly generated id regardless of what the input carried.
    /// Prevents id collisions from untrusted import data.
    pub fn replace_all(&mut self, new_entries: Vec<Entry>) -> usize {
        self.entries = new_entries
            .into_iter()
            .map(|mut entry| {
                entry.id = EntryId::new();
                entry
            })
            .collect();
        self.submitted = false;
        self.entries.len()
    }

    /// Validate raw JSON import text and, only on success, replace the
    /// collection. Any error leaves the table untouched.
    pub fn import_json(&mut self, raw: &str) -> Result<usize, ImportError> {
        let entries = parse_entries(raw)?;
        Ok(self.replace_all(entries))
    }

    // ========================================================================
    // SNAPSHOTS
    // ========================================================================

    /// Submit the table: capture a snapshot of the current entries with
    /// the post-money valuation computed right now, append it to history,
    /// and mark the state submitted.
    pub fn submit(&mut self) -> Snapshot {
        let valuation = metrics::post_money_valuation(&self.entries);
        let snapshot = Snapshot::capture(&self.entries, valuation);
        self.history.append(snapshot.clone());
        self.submitted = true;
        snapshot
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::HISTORY_CAPACITY;

    #[test]
    fn test_default_table_has_founder_seed() {
        let table = CapTable::default();

        assert_eq!(table.len(), 1);
        assert_eq!(table.entries()[0].name, "Founder 1");
        assert_eq!(table.entries()[0].shares, 500_000);
        assert!(!table.is_submitted());
    }

    #[test]
    fn test_add_entry_appends_blank_with_unique_id() {
        let mut table = CapTable::default();
        let id = table.add_entry();

        assert_eq!(table.len(), 2);
        let added = table.entry(id).unwrap();
        assert_eq!(added.name, "");
        assert_eq!(added.shares, 0);
        assert_eq!(added.share_class, "Common");
        assert_ne!(id, table.entries()[0].id);
    }

    #[test]
    fn test_update_text_field() {
        let mut table = CapTable::new();
        let id = table.add_entry();

        table.update_field(id, EntryField::Name, "Angel Fund").unwrap();
        table.update_field(id, EntryField::Round, "Seed").unwrap();

        let entry = table.entry(id).unwrap();
        assert_eq!(entry.name, "Angel Fund");
        assert_eq!(entry.round, "Seed");
    }

    #[test]
    fn test_update_numeric_field_coerces() {
        let mut table = CapTable::new();
        let id = table.add_entry();

        table.update_field(id, EntryField::Shares, "250,000").unwrap();
        table.update_field(id, EntryField::Investment, "1000000.50").unwrap();

        let entry = table.entry(id).unwrap();
        assert_eq!(entry.shares, 250_000);
        assert_eq!(entry.investment, 1_000_000.5);

        // Clearing a numeric cell means zero
        table.update_field(id, EntryField::Shares, "  ").unwrap();
        assert_eq!(table.entry(id).unwrap().shares, 0);
    }

    #[test]
    fn test_update_invalid_number_rejected_entry_untouched() {
        let mut table = CapTable::new();
        let id = table.add_entry();
        table.update_field(id, EntryField::Shares, "100").unwrap();

        let err = table
            .update_field(id, EntryField::Shares, "lots")
            .unwrap_err();
        assert!(matches!(err, UpdateError::InvalidNumber { .. }));
        assert_eq!(table.entry(id).unwrap().shares, 100);

        assert!(table.update_field(id, EntryField::Investment, "-5").is_err());
        assert_eq!(table.entry(id).unwrap().investment, 0.0);
    }

    #[test]
    fn test_update_unknown_id_is_silent_noop() {
        let mut table = CapTable::default();
        let before = table.entries().to_vec();

        let ghost = EntryId::new();
        assert!(table.update_field(ghost, EntryField::Name, "Ghost").is_ok());
        assert_eq!(table.entries(), &before[..]);
    }

    #[test]
    fn test_mutations_clear_submitted_flag() {
        let mut table = CapTable::default();
        table.submit();
        assert!(table.is_submitted());

        let id = table.entries()[0].id;
        table.update_field(id, EntryField::Notes, "edited").unwrap();
        assert!(!table.is_submitted());

        table.submit();
        table.add_entry();
        assert!(!table.is_submitted());

        table.submit();
        table.replace_all(vec![Entry::blank()]);
        assert!(!table.is_submitted());
    }

    #[test]
    fn test_replace_all_regenerates_ids() {
        let mut table = CapTable::default();
        let original = Entry::founder_seed();
        let original_id = original.id;

        table.replace_all(vec![original]);

        assert_eq!(table.len(), 1);
        assert_ne!(table.entries()[0].id, original_id);
        assert_eq!(table.entries()[0].name, "Founder 1");
    }

    #[test]
    fn test_import_json_replaces_store() {
        let mut table = CapTable::default();
        let count = table
            .import_json(r#"[{"name":"A","shares":100,"investment":0}]"#)
            .unwrap();

        assert_eq!(count, 1);
        assert_eq!(table.len(), 1);
        assert_eq!(table.entries()[0].name, "A");
        assert_eq!(table.entries()[0].shares, 100);
    }

    #[test]
    fn test_failed_import_leaves_store_untouched() {
        let mut table = CapTable::default();
        table.submit();
        let before = table.entries().to_vec();

        assert!(table.import_json("{broken").is_err());
        assert!(table.import_json(r#"[{"shares":"many"}]"#).is_err());

        assert_eq!(table.entries(), &before[..]);
        assert!(table.is_submitted());
        assert_eq!(table.history().len(), 1);
    }

    #[test]
    fn test_submit_snapshots_current_valuation() {
        let mut table = CapTable::new();
        let founder = table.add_entry();
        table.update_field(founder, EntryField::Shares, "500000").unwrap();
        table.update_field(founder, EntryField::Round, "Founders").unwrap();
        let vc = table.add_entry();
        table.update_field(vc, EntryField::Shares, "100000").unwrap();
        table.update_field(vc, EntryField::Investment, "1000000").unwrap();
        table.update_field(vc, EntryField::Round, "Series A").unwrap();

        let snapshot = table.submit();
        assert_eq!(snapshot.valuation, 6_000_000.0);
        assert_eq!(snapshot.entry_count(), 2);
        assert!(table.is_submitted());
        assert_eq!(table.history().len(), 1);
    }

    #[test]
    fn test_snapshot_unaffected_by_later_edits() {
        let mut table = CapTable::default();
        table.submit();

        let id = table.entries()[0].id;
        table.update_field(id, EntryField::Name, "Renamed").unwrap();
        table.update_field(id, EntryField::Shares, "1").unwrap();

        let snapshot = table.history().latest().unwrap();
        assert_eq!(snapshot.entries[0].name, "Founder 1");
        assert_eq!(snapshot.entries[0].shares, 500_000);
    }

    #[test]
    fn test_history_bounded_across_submits() {
        let mut table = CapTable::default();
        for _ in 0..12 {
            table.submit();
        }
        assert_eq!(table.history().len(), HISTORY_CAPACITY);
    }

    #[test]
    fn test_filtered_entries_uses_table_criteria() {
        let mut table = CapTable::new();
        let a = table.add_entry();
        table.update_field(a, EntryField::Round, "Seed").unwrap();
        let b = table.add_entry();
        table.update_field(b, EntryField::Round, "Series A").unwrap();

        table.filter.round = "Seed".to_string();
        let view = table.filtered_entries();
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].id, a);
    }
}

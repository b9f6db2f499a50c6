// Report boundary - the data bundle a rendering/delivery collaborator
// consumes, plus the delivery precondition
//
// The engine knows nothing about how reports are drawn, rasterized, or
// sent; it only guarantees that everything a renderer needs is in one
// serializable bundle, and that a delivery request cannot exist without
// a destination address.

use crate::entry::Entry;
use crate::metrics::{
    self, ownership_breakdown, valuation_series, OwnershipSlice, ValuationPoint,
};
use crate::store::CapTable;
use serde::Serialize;
use std::fmt;

// ============================================================================
// REPORT ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    /// Delivery requested without a destination address
    MissingAddress,
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::MissingAddress => {
                write!(f, "a destination address is required before a report can be delivered")
            }
        }
    }
}

impl std::error::Error for ReportError {}

/// Precondition a caller can query before attempting delivery.
/// False for empty or whitespace-only addresses.
pub fn can_deliver_report(address: &str) -> bool {
    !address.trim().is_empty()
}

// ============================================================================
// REPORT DATA
// ============================================================================

/// Aggregate figures for the report header
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportTotals {
    pub total_shares: u64,
    pub total_investment: f64,
    pub pre_money_valuation: f64,
    pub post_money_valuation: f64,
}

/// Everything a rendering collaborator needs for one report: the filtered
/// entry view, chart-ready ownership slices, chart-ready valuation history,
/// and the headline totals.
///
/// Chart sequences are empty until the table has been submitted, so a
/// renderer never charts an unsubmitted (possibly half-edited) state.
#[derive(Debug, Clone, Serialize)]
pub struct ReportData {
    pub entries: Vec<Entry>,
    pub ownership: Vec<OwnershipSlice>,
    pub valuation_history: Vec<ValuationPoint>,
    pub totals: ReportTotals,
}

impl ReportData {
    /// Assemble the bundle for the table's current filter/submission state
    pub fn build(table: &CapTable) -> Self {
        let filtered: Vec<Entry> =
            table.filtered_entries().into_iter().cloned().collect();

        let (ownership, valuation_history) = if table.is_submitted() {
            (ownership_breakdown(&filtered), valuation_series(table.history()))
        } else {
            (Vec::new(), Vec::new())
        };

        ReportData {
            ownership,
            valuation_history,
            totals: ReportTotals {
                total_shares: metrics::total_shares(table.entries()),
                total_investment: metrics::total_investment(table.entries()),
                pre_money_valuation: metrics::pre_money_valuation(table.entries()),
                post_money_valuation: metrics::post_money_valuation(table.entries()),
            },
            entries: filtered,
        }
    }
}

// ============================================================================
// REPORT REQUEST
// ============================================================================

/// A validated delivery request: cannot be constructed without an address
#[derive(Debug, Clone, Serialize)]
pub struct ReportRequest {
    pub to_address: String,
    pub data: ReportData,
}

impl ReportRequest {
    pub fn new(address: &str, data: ReportData) -> Result<Self, ReportError> {
        if !can_deliver_report(address) {
            return Err(ReportError::MissingAddress);
        }
        Ok(ReportRequest {
            to_address: address.trim().to_string(),
            data,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryField;

    fn sample_table() -> CapTable {
        let mut table = CapTable::new();
        let founder = table.add_entry();
        table.update_field(founder, EntryField::Name, "Founder").unwrap();
        table.update_field(founder, EntryField::Shares, "500000").unwrap();
        table.update_field(founder, EntryField::Round, "Founders").unwrap();
        let vc = table.add_entry();
        table.update_field(vc, EntryField::Name, "VC").unwrap();
        table.update_field(vc, EntryField::Shares, "100000").unwrap();
        table.update_field(vc, EntryField::Investment, "1000000").unwrap();
        table.update_field(vc, EntryField::Round, "Series A").unwrap();
        table
    }

    #[test]
    fn test_can_deliver_report() {
        assert!(can_deliver_report("investor@example.com"));
        assert!(!can_deliver_report(""));
        assert!(!can_deliver_report("   "));
    }

    #[test]
    fn test_request_requires_address() {
        let table = sample_table();
        let data = ReportData::build(&table);

        let err = ReportRequest::new("  ", data.clone()).unwrap_err();
        assert_eq!(err, ReportError::MissingAddress);

        let request = ReportRequest::new(" investor@example.com ", data).unwrap();
        assert_eq!(request.to_address, "investor@example.com");
    }

    #[test]
    fn test_charts_gated_on_submission() {
        let mut table = sample_table();

        let before = ReportData::build(&table);
        assert!(before.ownership.is_empty());
        assert!(before.valuation_history.is_empty());

        table.submit();
        let after = ReportData::build(&table);
        assert_eq!(after.ownership.len(), 2);
        assert_eq!(after.valuation_history.len(), 1);
        assert_eq!(after.valuation_history[0].valuation, 6_000_000.0);
    }

    #[test]
    fn test_totals_in_bundle() {
        let mut table = sample_table();
        table.submit();
        let data = ReportData::build(&table);

        assert_eq!(data.totals.total_shares, 600_000);
        assert_eq!(data.totals.total_investment, 1_000_000.0);
        assert_eq!(data.totals.post_money_valuation, 6_000_000.0);
        assert_eq!(data.totals.pre_money_valuation, 5_000_000.0);
    }

    #[test]
    fn test_bundle_respects_filter_but_totals_do_not() {
        let mut table = sample_table();
        table.submit();
        table.filter.round = "Series A".to_string();
        // Filter changes are reads over the same state; re-submit not needed
        // for the entry view, but charts follow the submitted flag.
        let data = ReportData::build(&table);

        assert_eq!(data.entries.len(), 1);
        assert_eq!(data.entries[0].name, "VC");
        assert_eq!(data.ownership.len(), 1);
        // Totals always cover the whole table, filtered or not
        assert_eq!(data.totals.total_shares, 600_000);
    }

    #[test]
    fn test_bundle_serializes() {
        let mut table = sample_table();
        table.submit();
        let json = serde_json::to_value(ReportData::build(&table)).unwrap();

        assert!(json.get("entries").is_some());
        assert!(json.get("ownership").is_some());
        assert!(json.get("valuation_history").is_some());
        assert!(json["totals"].get("post_money_valuation").is_some());
    }
}

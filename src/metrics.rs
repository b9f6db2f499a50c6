// Derived metrics - totals, ownership percentages, valuations
//
// Every function here is pure and recomputed on each read. There is no
// cached state, so a metric can never be stale relative to the entries
// it was derived from.

use crate::entry::Entry;
use crate::history::HistoryLog;
use serde::Serialize;

// ============================================================================
// TOTALS
// ============================================================================

/// Sum of shares across all entries (0 for an empty table)
pub fn total_shares(entries: &[Entry]) -> u64 {
    entries.iter().map(|e| e.shares).sum()
}

/// Sum of invested amounts across all entries (0 for an empty table)
pub fn total_investment(entries: &[Entry]) -> f64 {
    entries.iter().map(|e| e.investment).sum()
}

// ============================================================================
// OWNERSHIP
// ============================================================================

/// Ownership percentage of one entry relative to the whole table.
///
/// Convention for the zero-denominator edge case: when the table holds no
/// shares at all, every entry owns 0% rather than an undefined value.
/// Consumers never see NaN or infinity from this function.
pub fn ownership_percent(entry: &Entry, entries: &[Entry]) -> f64 {
    let total = total_shares(entries);
    if total == 0 {
        return 0.0;
    }
    (entry.shares as f64 / total as f64) * 100.0
}

/// Render a percentage to two decimal places, e.g. "83.33%"
pub fn format_percent(pct: f64) -> String {
    format!("{:.2}%", pct)
}

// ============================================================================
// VALUATION
// ============================================================================

/// Share basis for the per-share price: the share count of the first entry
/// (in table order) whose round contains "series", case-insensitively.
///
/// Falls back to 1 when no such entry exists or when that entry holds zero
/// shares. The first-match tie-break and the zero-shares fallback are kept
/// exactly as the reference behavior defines them; changing either silently
/// changes every valuation.
pub fn series_share_basis(entries: &[Entry]) -> u64 {
    entries
        .iter()
        .find(|e| e.round.to_lowercase().contains("series"))
        .map(|e| e.shares)
        .filter(|&shares| shares > 0)
        .unwrap_or(1)
}

/// Post-money valuation: the implied per-share price of the series round,
/// extrapolated across all outstanding shares.
///
/// `(total_investment / series_share_basis) * total_shares`, or 0 when no
/// money has been invested. This is a deliberate approximation, not a
/// rigorous valuation model.
pub fn post_money_valuation(entries: &[Entry]) -> f64 {
    let invested = total_investment(entries);
    if invested == 0.0 {
        return 0.0;
    }
    (invested / series_share_basis(entries) as f64) * total_shares(entries) as f64
}

/// Pre-money valuation: post-money minus the investment counted in it
pub fn pre_money_valuation(entries: &[Entry]) -> f64 {
    post_money_valuation(entries) - total_investment(entries)
}

// ============================================================================
// CHART-READY DATA
// ============================================================================

/// One slice of the ownership breakdown, ready for a pie-chart renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnershipSlice {
    pub name: String,
    pub value: u64,
}

/// One point of the valuation-over-time series, ready for a line-chart renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuationPoint {
    pub date: String,
    pub valuation: f64,
}

/// `{name, value}` pairs for the share-ownership breakdown.
///
/// Unnamed entries appear as "Unnamed" so the renderer never deals with
/// empty labels.
pub fn ownership_breakdown(entries: &[Entry]) -> Vec<OwnershipSlice> {
    entries
        .iter()
        .map(|e| OwnershipSlice {
            name: e.display_name().to_string(),
            value: e.shares,
        })
        .collect()
}

/// `{date, valuation}` pairs for the valuation history, oldest first
pub fn valuation_series(history: &HistoryLog) -> Vec<ValuationPoint> {
    history
        .iter()
        .map(|snapshot| ValuationPoint {
            date: snapshot.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            valuation: snapshot.valuation,
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

// Cap Table Engine - Core Library
// Exposes the computation and state-history engine for the CLI, the TUI,
// and tests. Rendering, charting, and delivery live outside this crate's
// concern; they consume the report bundle.

pub mod entry;
pub mod export;
pub mod filter;
pub mod history;
pub mod import;
pub mod metrics;
pub mod report;
pub mod store;

// Re-export commonly used types
pub use entry::{coerce_investment, coerce_shares, Entry, EntryField, EntryId};
pub use filter::FilterCriteria;
pub use history::{HistoryLog, Snapshot, HISTORY_CAPACITY};
pub use import::{load_entries, parse_entries, ImportError};
pub use metrics::{
    format_percent, ownership_breakdown, ownership_percent, post_money_valuation,
    pre_money_valuation, series_share_basis, total_investment, total_shares,
    valuation_series, OwnershipSlice, ValuationPoint,
};
pub use report::{can_deliver_report, ReportData, ReportError, ReportRequest, ReportTotals};
pub use store::{CapTable, UpdateError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

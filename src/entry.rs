// Entry model - one ownership stakeholder record
// Identity is a UUID assigned on creation; it never changes and is never reused.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// ENTRY IDENTITY
// ============================================================================

/// Stable identity for an entry (UUID v4).
///
/// Identity is separate from the entry's values: every field of an `Entry`
/// may change over time, the id never does. Imported records always get a
/// fresh id regardless of what the source file claims (see `import`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(Uuid);

impl EntryId {
    /// Generate a fresh, never-before-used id
    pub fn new() -> Self {
        EntryId(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        EntryId::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ENTRY
// ============================================================================

/// One row of the cap table: a stakeholder with shares and investment.
///
/// `shares` and `investment` are numeric by construction; raw text only
/// reaches them through the checked coercion in `CapTable::update_field`
/// or the import validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: EntryId,
    pub name: String,
    pub role: String,
    pub shares: u64,
    pub investment: f64,
    pub share_class: String,
    pub round: String,
    pub vesting: String,
    pub dilution_protection: String,
    pub convertibles: String,
    pub notes: String,
}

impl Entry {
    /// Blank entry with field defaults, as created by "Add Entry".
    ///
    /// All text fields start empty except `share_class`, which defaults to
    /// "Common" for interactively added rows.
    pub fn blank() -> Self {
        Entry {
            id: EntryId::new(),
            name: String::new(),
            role: String::new(),
            shares: 0,
            investment: 0.0,
            share_class: "Common".to_string(),
            round: String::new(),
            vesting: String::new(),
            dilution_protection: String::new(),
            convertibles: String::new(),
            notes: String::new(),
        }
    }

    /// The founder row every fresh table is seeded with
    pub fn founder_seed() -> Self {
        Entry {
            id: EntryId::new(),
            name: "Founder 1".to_string(),
            role: "CEO".to_string(),
            shares: 500_000,
            investment: 0.0,
            share_class: "Common".to_string(),
            round: "Founders".to_string(),
            vesting: "4yr/1yr cliff".to_string(),
            dilution_protection: "None".to_string(),
            convertibles: "No".to_string(),
            notes: String::new(),
        }
    }

    /// Display name with the chart fallback for unnamed rows
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "Unnamed"
        } else {
            &self.name
        }
    }
}

// ============================================================================
// ENTRY FIELDS
// ============================================================================

/// Every mutable field of an `Entry`, used to address per-field updates
/// and to drive the UI's column model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryField {
    Name,
    Role,
    Shares,
    Investment,
    ShareClass,
    Round,
    Vesting,
    DilutionProtection,
    Convertibles,
    Notes,
}

impl EntryField {
    pub fn name(&self) -> &'static str {
        match self {
            EntryField::Name => "name",
            EntryField::Role => "role",
            EntryField::Shares => "shares",
            EntryField::Investment => "investment",
            EntryField::ShareClass => "shareClass",
            EntryField::Round => "round",
            EntryField::Vesting => "vesting",
            EntryField::DilutionProtection => "dilutionProtection",
            EntryField::Convertibles => "convertibles",
            EntryField::Notes => "notes",
        }
    }

    /// Fields that require numeric coercion on update
    pub fn is_numeric(&self) -> bool {
        matches!(self, EntryField::Shares | EntryField::Investment)
    }

    /// Current raw value of this field on an entry, as editable text
    pub fn get(&self, entry: &Entry) -> String {
        match self {
            EntryField::Name => entry.name.clone(),
            EntryField::Role => entry.role.clone(),
            EntryField::Shares => entry.shares.to_string(),
            EntryField::Investment => entry.investment.to_string(),
            EntryField::ShareClass => entry.share_class.clone(),
            EntryField::Round => entry.round.clone(),
            EntryField::Vesting => entry.vesting.clone(),
            EntryField::DilutionProtection => entry.dilution_protection.clone(),
            EntryField::Convertibles => entry.convertibles.clone(),
            EntryField::Notes => entry.notes.clone(),
        }
    }
}

impl fmt::Display for EntryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// NUMERIC COERCION
// ============================================================================

/// Coerce raw share-count text to a non-negative integer.
///
/// Empty/whitespace input means "cleared" and coerces to 0. Thousands
/// separators ("500,000", "500_000") are accepted. Anything else is None.
pub fn coerce_shares(raw: &str) -> Option<u64> {
    let cleaned = raw.trim().replace([',', '_'], "");
    if cleaned.is_empty() {
        return Some(0);
    }
    cleaned.parse::<u64>().ok()
}

/// Coerce raw investment text to a non-negative finite amount.
///
/// Same clearing and separator rules as `coerce_shares`.
pub fn coerce_investment(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().replace([',', '_'], "");
    if cleaned.is_empty() {
        return Some(0.0);
    }
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Some(v),
        _ => None,
    }
}

// ============================================================================
// TESTS
// ============================================================================

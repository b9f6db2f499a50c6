// Import validation - parse and sanitize external entry collections
//
// Import text must be a JSON array of entry-shaped objects. Records are
// type-checked field by field: missing fields take the model defaults,
// unknown fields are ignored, wrong-typed or negative values reject the
// whole import with the offending record's index. Any id in the source
// data is discarded; the store assigns fresh ones on replacement.

use crate::entry::{Entry, EntryId};
use anyhow::{Context, Result};
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::Path;

// ============================================================================
// IMPORT ERRORS
// ============================================================================

/// Why an import was rejected. The store is never touched when any of
/// these occur; import is all-or-nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportError {
    /// Not syntactically valid JSON
    Syntax(String),
    /// Valid JSON, but the top level is not an array
    NotAnArray,
    /// One record in the array is malformed
    BadRecord {
        index: usize,
        field: String,
        reason: String,
    },
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::Syntax(msg) => write!(f, "invalid JSON: {}", msg),
            ImportError::NotAnArray => {
                write!(f, "expected a JSON array of entry records")
            }
            ImportError::BadRecord {
                index,
                field,
                reason,
            } => write!(f, "record {}: field '{}': {}", index, field, reason),
        }
    }
}

impl std::error::Error for ImportError {}

// ============================================================================
// PARSING
// ============================================================================

/// Parse raw import text into a candidate entry collection.
///
/// On success every record carries a fresh id; whatever identifier the
/// source file claimed is gone before the collection can reach the store.
pub fn parse_entries(raw: &str) -> Result<Vec<Entry>, ImportError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| ImportError::Syntax(e.to_string()))?;

    let records = match value {
        Value::Array(records) => records,
        _ => return Err(ImportError::NotAnArray),
    };

    let mut entries = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        entries.push(parse_record(index, record)?);
    }
    Ok(entries)
}

fn parse_record(index: usize, record: &Value) -> Result<Entry, ImportError> {
    let obj = record.as_object().ok_or_else(|| ImportError::BadRecord {
        index,
        field: "(record)".to_string(),
        reason: "not a JSON object".to_string(),
    })?;

    Ok(Entry {
        id: EntryId::new(), // source ids are untrusted; always regenerate
        name: text_field(index, obj, "name")?,
        role: text_field(index, obj, "role")?,
        shares: shares_field(index, obj)?,
        investment: investment_field(index, obj)?,
        share_class: text_field(index, obj, "shareClass")?,
        round: text_field(index, obj, "round")?,
        vesting: text_field(index, obj, "vesting")?,
        dilution_protection: text_field(index, obj, "dilutionProtection")?,
        convertibles: text_field(index, obj, "convertibles")?,
        notes: text_field(index, obj, "notes")?,
    })
}

fn text_field(
    index: usize,
    obj: &serde_json::Map<String, Value>,
    field: &str,
) -> Result<String, ImportError> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(ImportError::BadRecord {
            index,
            field: field.to_string(),
            reason: format!("expected a string, got {}", type_name(other)),
        }),
    }
}

fn shares_field(
    index: usize,
    obj: &serde_json::Map<String, Value>,
) -> Result<u64, ImportError> {
    match obj.get("shares") {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Number(n)) => n.as_u64().ok_or_else(|| ImportError::BadRecord {
            index,
            field: "shares".to_string(),
            reason: format!("expected a non-negative integer, got {}", n),
        }),
        Some(other) => Err(ImportError::BadRecord {
            index,
            field: "shares".to_string(),
            reason: format!("expected a number, got {}", type_name(other)),
        }),
    }
}

fn investment_field(
    index: usize,
    obj: &serde_json::Map<String, Value>,
) -> Result<f64, ImportError> {
    match obj.get("investment") {
        None | Some(Value::Null) => Ok(0.0),
        Some(Value::Number(n)) => {
            let amount = n.as_f64().unwrap_or(f64::NAN);
            if amount.is_finite() && amount >= 0.0 {
                Ok(amount)
            } else {
                Err(ImportError::BadRecord {
                    index,
                    field: "investment".to_string(),
                    reason: format!("expected a non-negative amount, got {}", n),
                })
            }
        }
        Some(other) => Err(ImportError::BadRecord {
            index,
            field: "investment".to_string(),
            reason: format!("expected a number, got {}", type_name(other)),
        }),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ============================================================================
// FILE BOUNDARY
// ============================================================================

/// Read and validate an import file
pub fn load_entries(path: &Path) -> Result<Vec<Entry>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read import file {}", path.display()))?;
    let entries = parse_entries(&raw)
        .with_context(|| format!("failed to import {}", path.display()))?;
    Ok(entries)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_record() {
        let entries =
            parse_entries(r#"[{"name":"A","shares":100,"investment":0}]"#).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "A");
        assert_eq!(entries[0].shares, 100);
        assert_eq!(entries[0].investment, 0.0);
        // Missing fields default
        assert_eq!(entries[0].role, "");
        assert_eq!(entries[0].share_class, "");
        assert_eq!(entries[0].round, "");
    }

    #[test]
    fn test_incoming_ids_are_discarded() {
        let raw = r#"[
            {"id": "same-id", "name": "A"},
            {"id": "same-id", "name": "B"}
        ]"#;
        let entries = parse_entries(raw).unwrap();

        assert_ne!(entries[0].id, entries[1].id);
        assert_ne!(entries[0].id.to_string(), "same-id");
    }

    #[test]
    fn test_full_record_roundtrip_fields() {
        let raw = r#"[{
            "name": "VC Fund", "role": "Investor", "shares": 100000,
            "investment": 1000000.5, "shareClass": "Preferred",
            "round": "Series A", "vesting": "None",
            "dilutionProtection": "Weighted average",
            "convertibles": "Yes", "notes": "Lead"
        }]"#;
        let entries = parse_entries(raw).unwrap();
        let e = &entries[0];

        assert_eq!(e.role, "Investor");
        assert_eq!(e.investment, 1_000_000.5);
        assert_eq!(e.share_class, "Preferred");
        assert_eq!(e.round, "Series A");
        assert_eq!(e.dilution_protection, "Weighted average");
        assert_eq!(e.notes, "Lead");
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let entries =
            parse_entries(r#"[{"name":"A","favoriteColor":"blue"}]"#).unwrap();
        assert_eq!(entries[0].name, "A");
    }

    #[test]
    fn test_syntax_error() {
        let err = parse_entries("not json at all").unwrap_err();
        assert!(matches!(err, ImportError::Syntax(_)));
    }

    #[test]
    fn test_not_an_array() {
        let err = parse_entries(r#"{"name":"A"}"#).unwrap_err();
        assert_eq!(err, ImportError::NotAnArray);
    }

    #[test]
    fn test_record_not_an_object() {
        let err = parse_entries(r#"[{"name":"A"}, 42]"#).unwrap_err();
        match err {
            ImportError::BadRecord { index, .. } => assert_eq!(index, 1),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_wrong_typed_text_field_rejected() {
        let err = parse_entries(r#"[{"name": 42}]"#).unwrap_err();
        match err {
            ImportError::BadRecord { field, .. } => assert_eq!(field, "name"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_negative_and_fractional_shares_rejected() {
        assert!(parse_entries(r#"[{"shares": -5}]"#).is_err());
        assert!(parse_entries(r#"[{"shares": 1.5}]"#).is_err());
        assert!(parse_entries(r#"[{"shares": "100"}]"#).is_err());
    }

    #[test]
    fn test_negative_investment_rejected() {
        let err = parse_entries(r#"[{"investment": -1000}]"#).unwrap_err();
        match err {
            ImportError::BadRecord { field, .. } => assert_eq!(field, "investment"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_empty_array_is_valid() {
        assert_eq!(parse_entries("[]").unwrap().len(), 0);
    }
}

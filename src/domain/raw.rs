// ==========================================
// Deportation Registry - Decoded file model
// ==========================================
// Intermediate products of the tabular decoder. Transient:
// scoped to a single pipeline run, immutable once produced.
// ==========================================

use crate::domain::field::RegistryField;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// RawRow - one decoded data row
// ==========================================
// Header order is significant for preview and template output,
// and lives in DecodedTable.headers; the row itself is a plain
// header -> raw cell mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRow {
    /// 1-based position among kept data rows (blank lines excluded).
    pub row_number: usize,
    values: HashMap<String, String>,
}

impl RawRow {
    pub fn new(row_number: usize, values: HashMap<String, String>) -> Self {
        Self { row_number, values }
    }

    /// Raw cell value of a recognized field; empty string when absent.
    pub fn value(&self, field: RegistryField) -> &str {
        self.values.get(field.header()).map(String::as_str).unwrap_or("")
    }

    /// Raw cell value by header name; empty string when absent.
    pub fn value_by_header(&self, header: &str) -> &str {
        self.values.get(header).map(String::as_str).unwrap_or("")
    }

    /// True when every cell trims to blank.
    pub fn is_blank(&self) -> bool {
        self.values.values().all(|v| v.trim().is_empty())
    }
}

// ==========================================
// DecodedTable - decoder output
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodedTable {
    /// Headers in file order, recognized or not.
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
    /// Count of kept data rows (equals rows.len()).
    pub total_rows: usize,
    /// Headers present in the file but not part of the recognized set.
    /// Tolerated; their cells are ignored downstream.
    pub extra_headers: Vec<String>,
}

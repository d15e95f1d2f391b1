// ==========================================
// Deportation Registry - Pipeline reports
// ==========================================
// Structured results handed back to the caller. Validation
// issues and conflicts are data, never panics: the caller
// renders them and decides how to proceed.
// ==========================================

use crate::domain::field::RegistryField;
use crate::domain::person::PersonSummary;
use crate::domain::types::{ConflictAction, Severity};
use serde::{Deserialize, Serialize};

// ==========================================
// ValidationIssue
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// 1-based data row number.
    pub row: usize,
    /// Affected field; None for row-level issues (e.g. write failures).
    pub field: Option<RegistryField>,
    pub raw_value: String,
    pub message: String,
    pub severity: Severity,
}

impl ValidationIssue {
    pub fn error(row: usize, field: RegistryField, raw_value: &str, message: String) -> Self {
        Self {
            row,
            field: Some(field),
            raw_value: raw_value.to_string(),
            message,
            severity: Severity::Error,
        }
    }

    pub fn warning(row: usize, field: RegistryField, raw_value: &str, message: String) -> Self {
        Self {
            row,
            field: Some(field),
            raw_value: raw_value.to_string(),
            message,
            severity: Severity::Warning,
        }
    }

    pub fn row_error(row: usize, raw_value: &str, message: String) -> Self {
        Self {
            row,
            field: None,
            raw_value: raw_value.to_string(),
            message,
            severity: Severity::Error,
        }
    }
}

// ==========================================
// ValidationReport
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// True when no error-severity issue exists. Warnings alone
    /// never turn this false.
    pub is_valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    /// Rows with zero errors (warnings do not disqualify).
    pub valid_rows: usize,
    pub total_rows: usize,
}

// ==========================================
// DuplicateConflict
// ==========================================
// Produced by the detector, round-trips through caller-owned
// state where the action is chosen, consumed by the executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateConflict {
    /// 1-based data row number of the incoming row.
    pub row: usize,
    /// Running number shared with the existing record.
    pub logical_key: i64,
    /// Snapshot of the existing current version at detection time.
    pub existing: PersonSummary,
    /// Defaults to Skip; the caller mutates this before execution.
    pub action: ConflictAction,
}

// ==========================================
// ImportOutcome
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportOutcome {
    /// True iff no row failed during execution.
    pub success: bool,
    pub imported_count: usize,
    pub skipped_count: usize,
    pub error_count: usize,
    /// Write-time failures, distinct from validation-time issues.
    pub errors: Vec<ValidationIssue>,
}

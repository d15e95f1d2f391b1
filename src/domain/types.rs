// ==========================================
// Deportation Registry - Shared domain enums
// ==========================================

use serde::{Deserialize, Serialize};

/// Severity of a validation issue.
///
/// Errors block the affected row from import; warnings are advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

/// Caller-chosen resolution for a duplicate conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictAction {
    /// Leave the existing current version untouched. The safe default;
    /// the pipeline never silently overwrites.
    Skip,
    /// Overwrite the fields of the current version in place, keeping
    /// its identity and valid_from. A correction, not a new temporal state.
    Update,
    /// Close the current version and insert a new one carrying the
    /// imported fields. Preserves full history.
    CreateNewVersion,
}

impl Default for ConflictAction {
    fn default() -> Self {
        ConflictAction::Skip
    }
}

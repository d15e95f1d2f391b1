// ==========================================
// Deportation Registry - Schema validator
// ==========================================
// Applies the per-field rule table plus batch-level checks.
// Pure over the decoded data apart from one store lookup
// (pre-existing record check). No writes happen here.
// ==========================================

use crate::domain::{
    DecodedTable, FieldType, RawRow, RegistryField, Severity, ValidationIssue, ValidationReport,
};
use crate::importer::error::ImportResult;
use crate::repository::PersonStore;
use std::collections::BTreeMap;
use tracing::{info, instrument};

// ==========================================
// SchemaValidator
// ==========================================
#[derive(Debug, Default)]
pub struct SchemaValidator;

impl SchemaValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate a decoded table against the field rules, batch
    /// uniqueness, and the store's existing current versions.
    #[instrument(skip_all, fields(total_rows = table.total_rows))]
    pub async fn validate<S: PersonStore + ?Sized>(
        &self,
        table: &DecodedTable,
        store: &S,
    ) -> ImportResult<ValidationReport> {
        let mut issues: Vec<ValidationIssue> = Vec::new();

        for row in &table.rows {
            for field in RegistryField::ALL {
                check_field(row, field, &mut issues);
            }
        }

        check_batch_uniqueness(&table.rows, &mut issues);
        self.check_existing_records(&table.rows, store, &mut issues).await?;

        let (errors, warnings): (Vec<_>, Vec<_>) = issues
            .into_iter()
            .partition(|i| i.severity == Severity::Error);

        // A row counts as valid only with zero errors; warnings
        // do not disqualify it.
        let error_rows: std::collections::HashSet<usize> =
            errors.iter().map(|i| i.row).collect();
        let valid_rows = table.rows.len() - error_rows.len();

        info!(
            errors = errors.len(),
            warnings = warnings.len(),
            valid_rows,
            "validation finished"
        );

        Ok(ValidationReport {
            is_valid: errors.is_empty(),
            valid_rows,
            total_rows: table.total_rows,
            errors,
            warnings,
        })
    }

    /// Warn for every row whose running number already has a current
    /// version. Existence alone never blocks; the conflict-resolution
    /// step downstream is where the user decides.
    async fn check_existing_records<S: PersonStore + ?Sized>(
        &self,
        rows: &[RawRow],
        store: &S,
        issues: &mut Vec<ValidationIssue>,
    ) -> ImportResult<()> {
        let mut rows_by_key: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for row in rows {
            if let Ok(key) = row.value(RegistryField::RunningNumber).trim().parse::<i64>() {
                rows_by_key.entry(key).or_default().push(row.row_number);
            }
        }

        // One lookup per distinct key, awaited sequentially.
        for (key, row_numbers) in rows_by_key {
            if store.find_current_by_key(key).await?.is_some() {
                for row_number in row_numbers {
                    issues.push(ValidationIssue::warning(
                        row_number,
                        RegistryField::RunningNumber,
                        &key.to_string(),
                        format!("a record with running number {key} already exists"),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Apply one field rule to one row.
fn check_field(row: &RawRow, field: RegistryField, issues: &mut Vec<ValidationIssue>) {
    let rule = field.rule();
    let raw = row.value(field);
    let value = raw.trim();

    if value.is_empty() {
        // Required-and-blank is an error and short-circuits the
        // remaining checks for this field; blank-and-optional is fine.
        if rule.required {
            issues.push(ValidationIssue::error(
                row.row_number,
                field,
                raw,
                format!("required field '{}' is blank", field.header()),
            ));
        }
        return;
    }

    match rule.field_type {
        FieldType::Integer | FieldType::Year => {
            let parsed = match value.parse::<i64>() {
                Ok(v) => v,
                Err(_) => {
                    issues.push(ValidationIssue::error(
                        row.row_number,
                        field,
                        raw,
                        format!("'{}' is not a whole number", value),
                    ));
                    return;
                }
            };
            if let Some(min) = rule.min_value {
                if parsed < min {
                    issues.push(ValidationIssue::error(
                        row.row_number,
                        field,
                        raw,
                        format!("{parsed} is below the minimum of {min}"),
                    ));
                }
            }
            if let Some(max) = rule.max_value {
                if parsed > max {
                    issues.push(ValidationIssue::error(
                        row.row_number,
                        field,
                        raw,
                        format!("{parsed} is above the maximum of {max}"),
                    ));
                }
            }
        }
        FieldType::Text => {
            if let Some(max_length) = rule.max_length {
                if value.chars().count() > max_length {
                    issues.push(ValidationIssue::error(
                        row.row_number,
                        field,
                        raw,
                        format!("value exceeds the maximum length of {max_length}"),
                    ));
                }
            }
        }
    }

    // Enumeration violations are warnings: registries contain
    // legitimate variants not yet in the list.
    if let Some(allowed) = rule.allowed_values {
        if !allowed.contains(&value) {
            issues.push(ValidationIssue::warning(
                row.row_number,
                field,
                raw,
                format!(
                    "'{}' is not a known value (expected one of: {})",
                    value,
                    allowed.join(", ")
                ),
            ));
        }
    }
}

/// Natural-key uniqueness within the batch: every member of a
/// duplicate group gets one error citing its sibling rows.
fn check_batch_uniqueness(rows: &[RawRow], issues: &mut Vec<ValidationIssue>) {
    let mut rows_by_key: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for row in rows {
        if let Ok(key) = row.value(RegistryField::RunningNumber).trim().parse::<i64>() {
            rows_by_key.entry(key).or_default().push(row.row_number);
        }
    }

    for (key, members) in rows_by_key {
        if members.len() < 2 {
            continue;
        }
        for &row_number in &members {
            let siblings: Vec<String> = members
                .iter()
                .filter(|&&r| r != row_number)
                .map(|r| r.to_string())
                .collect();
            issues.push(ValidationIssue::error(
                row_number,
                RegistryField::RunningNumber,
                &key.to_string(),
                format!(
                    "running number {key} appears more than once in this file (also rows {})",
                    siblings.join(", ")
                ),
            ));
        }
    }
}

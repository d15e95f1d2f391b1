// ==========================================
// Deportation Registry - Conflict detector
// ==========================================
// Classifies batch rows as new vs. conflicting against the
// store's current versions. Detection only; resolution is
// caller-owned and consumed later by the executor.
// ==========================================

use crate::domain::{ConflictAction, DuplicateConflict, PersonSummary, RawRow, RegistryField};
use crate::importer::error::ImportResult;
use crate::repository::PersonStore;
use tracing::{info, instrument};

// ==========================================
// ConflictDetector
// ==========================================
#[derive(Debug, Default)]
pub struct ConflictDetector;

impl ConflictDetector {
    pub fn new() -> Self {
        Self
    }

    /// One conflict per row whose running number already has a
    /// current version, in row order, action defaulting to Skip.
    ///
    /// A key appearing in multiple rows (already a batch-uniqueness
    /// error upstream) yields one entry per occurrence.
    #[instrument(skip_all, fields(rows = rows.len()))]
    pub async fn detect_conflicts<S: PersonStore + ?Sized>(
        &self,
        rows: &[RawRow],
        store: &S,
    ) -> ImportResult<Vec<DuplicateConflict>> {
        let mut conflicts = Vec::new();

        for row in rows {
            let key = match row.value(RegistryField::RunningNumber).trim().parse::<i64>() {
                Ok(key) => key,
                // Unparseable keys are a validation concern, not a conflict.
                Err(_) => continue,
            };

            if let Some(existing) = store.find_current_by_key(key).await? {
                conflicts.push(DuplicateConflict {
                    row: row.row_number,
                    logical_key: key,
                    existing: PersonSummary::from(&existing),
                    action: ConflictAction::Skip,
                });
            }
        }

        info!(conflicts = conflicts.len(), "conflict detection finished");
        Ok(conflicts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PersonFields, PersonRecord};
    use crate::repository::MemoryPersonStore;
    use chrono::Utc;
    use std::collections::HashMap;

    fn key_row(row_number: usize, key: &str) -> RawRow {
        let mut values = HashMap::new();
        values.insert(
            RegistryField::RunningNumber.header().to_string(),
            key.to_string(),
        );
        RawRow::new(row_number, values)
    }

    fn seed_fields(key: i64) -> PersonFields {
        PersonFields {
            running_number: key,
            page_number: None,
            family_number: None,
            entry_number: None,
            family_name: Some("Tamm".to_string()),
            given_name: Some("Jaan".to_string()),
            patronymic: None,
            family_role: None,
            sex: None,
            birth_year: Some(1898),
            birthplace: None,
            workplace: None,
        }
    }

    #[tokio::test]
    async fn test_new_keys_produce_no_conflicts() {
        let store = MemoryPersonStore::new();
        let rows = vec![key_row(1, "1001"), key_row(2, "1002")];
        let conflicts = ConflictDetector::new()
            .detect_conflicts(&rows, &store)
            .await
            .unwrap();
        assert!(conflicts.is_empty());
    }

    #[tokio::test]
    async fn test_existing_key_conflicts_with_skip_default() {
        let store = MemoryPersonStore::new();
        store
            .insert_new_current_version(PersonRecord::new_current(
                seed_fields(1001),
                "seed",
                Utc::now(),
            ))
            .await
            .unwrap();

        let rows = vec![key_row(1, "1001"), key_row(2, "1002")];
        let conflicts = ConflictDetector::new()
            .detect_conflicts(&rows, &store)
            .await
            .unwrap();

        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].row, 1);
        assert_eq!(conflicts[0].logical_key, 1001);
        assert_eq!(conflicts[0].action, ConflictAction::Skip);
        assert_eq!(conflicts[0].existing.family_name.as_deref(), Some("Tamm"));
    }

    #[tokio::test]
    async fn test_repeated_key_yields_one_entry_per_occurrence() {
        let store = MemoryPersonStore::new();
        store
            .insert_new_current_version(PersonRecord::new_current(
                seed_fields(1001),
                "seed",
                Utc::now(),
            ))
            .await
            .unwrap();

        let rows = vec![key_row(1, "1001"), key_row(2, "1001")];
        let conflicts = ConflictDetector::new()
            .detect_conflicts(&rows, &store)
            .await
            .unwrap();

        assert_eq!(conflicts.len(), 2);
        assert_eq!(conflicts[0].row, 1);
        assert_eq!(conflicts[1].row, 2);
    }

    #[tokio::test]
    async fn test_unparseable_key_is_skipped() {
        let store = MemoryPersonStore::new();
        let rows = vec![key_row(1, "not-a-number")];
        let conflicts = ConflictDetector::new()
            .detect_conflicts(&rows, &store)
            .await
            .unwrap();
        assert!(conflicts.is_empty());
    }
}

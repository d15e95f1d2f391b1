// ==========================================
// Deportation Registry - Import executor
// ==========================================
// The only pipeline stage with side effects. Rows are processed
// strictly in input order: a later row with the same running
// number must observe the earlier row's write, so writes are
// never parallelized within a run. One bad row never aborts
// the batch.
// ==========================================

use crate::domain::{
    ConflictAction, DuplicateConflict, ImportOutcome, PersonFields, PersonRecord, RawRow,
    RegistryField, ValidationIssue,
};
use crate::repository::{PersonStore, StoreError};
use chrono::Utc;
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

/// What happened to one row.
enum RowDisposition {
    Imported(&'static str),
    Skipped,
}

// ==========================================
// ImportExecutor
// ==========================================
#[derive(Debug, Default)]
pub struct ImportExecutor;

impl ImportExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Execute the import of a batch against the store.
    ///
    /// `resolutions` carries the caller-decided action per conflicting
    /// running number; keys without an entry default to Skip. The
    /// existing-version check is re-done here per row, at write time,
    /// so concurrent external writes are observed.
    ///
    /// `on_progress(percent, message)` is invoked synchronously after
    /// every row; there is no mid-batch cancellation.
    #[instrument(skip_all, fields(actor = %actor, rows = rows.len()))]
    pub async fn execute<S, F>(
        &self,
        rows: &[RawRow],
        actor: &str,
        resolutions: &[DuplicateConflict],
        store: &S,
        mut on_progress: F,
    ) -> ImportOutcome
    where
        S: PersonStore + ?Sized,
        F: FnMut(u8, &str),
    {
        let actions: HashMap<i64, ConflictAction> = resolutions
            .iter()
            .map(|c| (c.logical_key, c.action))
            .collect();

        let total = rows.len();
        let mut imported_count = 0usize;
        let mut skipped_count = 0usize;
        let mut errors: Vec<ValidationIssue> = Vec::new();

        for (idx, row) in rows.iter().enumerate() {
            let status = match self.execute_row(row, actor, &actions, store).await {
                Ok(RowDisposition::Imported(verb)) => {
                    imported_count += 1;
                    format!("row {}/{}: {}", idx + 1, total, verb)
                }
                Ok(RowDisposition::Skipped) => {
                    skipped_count += 1;
                    format!("row {}/{}: skipped", idx + 1, total)
                }
                Err(issue) => {
                    warn!(row = row.row_number, message = %issue.message, "row failed");
                    let status = format!("row {}/{}: failed", idx + 1, total);
                    errors.push(issue);
                    status
                }
            };

            let percent = ((idx + 1) * 100 / total.max(1)) as u8;
            on_progress(percent, &status);
        }

        let error_count = errors.len();
        let outcome = ImportOutcome {
            success: error_count == 0,
            imported_count,
            skipped_count,
            error_count,
            errors,
        };

        info!(
            imported = outcome.imported_count,
            skipped = outcome.skipped_count,
            failed = outcome.error_count,
            "import executed"
        );
        outcome
    }

    /// Process one row. Store failures come back as row-level issues,
    /// never as panics or batch aborts.
    async fn execute_row<S: PersonStore + ?Sized>(
        &self,
        row: &RawRow,
        actor: &str,
        actions: &HashMap<i64, ConflictAction>,
        store: &S,
    ) -> Result<RowDisposition, ValidationIssue> {
        let fields = PersonFields::from_row(row).map_err(|raw| {
            ValidationIssue::row_error(
                row.row_number,
                &raw,
                format!("running number '{raw}' is not a whole number"),
            )
        })?;
        let key = fields.running_number;

        let to_issue = |e: StoreError| {
            ValidationIssue::row_error(
                row.row_number,
                row.value(RegistryField::RunningNumber),
                e.to_string(),
            )
        };

        // Authoritative re-check at write time, not the detector's
        // earlier snapshot.
        let existing = store.find_current_by_key(key).await.map_err(to_issue)?;

        let Some(_existing) = existing else {
            let record = PersonRecord::new_current(fields, actor, Utc::now());
            store
                .insert_new_current_version(record)
                .await
                .map_err(to_issue)?;
            debug!(key, "new record imported");
            return Ok(RowDisposition::Imported("imported"));
        };

        match actions.get(&key).copied().unwrap_or_default() {
            ConflictAction::Skip => {
                debug!(key, "existing record skipped");
                Ok(RowDisposition::Skipped)
            }
            ConflictAction::Update => {
                // In-place correction: identity and valid_from survive,
                // no history entry is created.
                store
                    .update_current_version_in_place(key, fields, actor)
                    .await
                    .map_err(to_issue)?;
                debug!(key, "current version updated in place");
                Ok(RowDisposition::Imported("updated"))
            }
            ConflictAction::CreateNewVersion => {
                let now = Utc::now();
                store.close_current_version(key, now).await.map_err(to_issue)?;
                let record = PersonRecord::new_current(fields, actor, now);
                store
                    .insert_new_current_version(record)
                    .await
                    .map_err(to_issue)?;
                debug!(key, "new version appended");
                Ok(RowDisposition::Imported("new version created"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PersonSummary;
    use crate::repository::MemoryPersonStore;
    use std::collections::HashMap as Map;

    fn make_row(row_number: usize, key: &str, family_name: &str) -> RawRow {
        let mut values = Map::new();
        values.insert(
            RegistryField::RunningNumber.header().to_string(),
            key.to_string(),
        );
        values.insert(
            RegistryField::FamilyName.header().to_string(),
            family_name.to_string(),
        );
        RawRow::new(row_number, values)
    }

    async fn seed(store: &MemoryPersonStore, key: i64, family_name: &str) -> PersonRecord {
        store
            .insert_new_current_version(PersonRecord::new_current(
                PersonFields::from_row(&make_row(0, &key.to_string(), family_name)).unwrap(),
                "seed",
                Utc::now(),
            ))
            .await
            .unwrap()
    }

    fn resolution(key: i64, existing: &PersonRecord, action: ConflictAction) -> DuplicateConflict {
        DuplicateConflict {
            row: 1,
            logical_key: key,
            existing: PersonSummary::from(existing),
            action,
        }
    }

    #[tokio::test]
    async fn test_new_rows_are_inserted() {
        let store = MemoryPersonStore::new();
        let rows = vec![make_row(1, "1001", "Tamm"), make_row(2, "1002", "Saar")];

        let outcome = ImportExecutor::new()
            .execute(&rows, "tester", &[], &store, |_, _| {})
            .await;

        assert!(outcome.success);
        assert_eq!(outcome.imported_count, 2);
        assert_eq!(outcome.skipped_count, 0);
        assert!(store.find_current_by_key(1001).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_default_skip_leaves_existing_untouched() {
        let store = MemoryPersonStore::new();
        let before = seed(&store, 1001, "Tamm").await;

        let rows = vec![make_row(1, "1001", "Saar")];
        let outcome = ImportExecutor::new()
            .execute(&rows, "tester", &[], &store, |_, _| {})
            .await;

        assert!(outcome.success);
        assert_eq!(outcome.skipped_count, 1);
        assert_eq!(outcome.imported_count, 0);
        let after = store.find_current_by_key(1001).await.unwrap().unwrap();
        assert_eq!(after, before);
    }

    #[tokio::test]
    async fn test_update_overwrites_in_place_preserving_valid_from() {
        let store = MemoryPersonStore::new();
        let before = seed(&store, 1001, "Tamm").await;

        let rows = vec![make_row(1, "1001", "Saar")];
        let resolutions = vec![resolution(1001, &before, ConflictAction::Update)];
        let outcome = ImportExecutor::new()
            .execute(&rows, "corrector", &resolutions, &store, |_, _| {})
            .await;

        assert!(outcome.success);
        assert_eq!(outcome.imported_count, 1);
        let after = store.find_current_by_key(1001).await.unwrap().unwrap();
        assert_eq!(after.fields.family_name.as_deref(), Some("Saar"));
        assert_eq!(after.valid_from, before.valid_from);
        assert_eq!(after.updated_by, "corrector");
        assert_eq!(store.find_all_versions_by_key(1001).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_new_version_appends_history() {
        let store = MemoryPersonStore::new();
        let before = seed(&store, 1001, "Tamm").await;

        let rows = vec![make_row(1, "1001", "Saar")];
        let resolutions = vec![resolution(1001, &before, ConflictAction::CreateNewVersion)];
        let outcome = ImportExecutor::new()
            .execute(&rows, "tester", &resolutions, &store, |_, _| {})
            .await;

        assert!(outcome.success);
        let versions = store.find_all_versions_by_key(1001).await.unwrap();
        assert_eq!(versions.len(), 2);
        assert_eq!(versions.iter().filter(|v| v.is_current()).count(), 1);
        let current = store.find_current_by_key(1001).await.unwrap().unwrap();
        assert_eq!(current.fields.family_name.as_deref(), Some("Saar"));
    }

    #[tokio::test]
    async fn test_unparseable_key_is_a_row_error_not_an_abort() {
        let store = MemoryPersonStore::new();
        let rows = vec![
            make_row(1, "1001", "Tamm"),
            make_row(2, "abc", "Kask"),
            make_row(3, "1003", "Saar"),
        ];

        let outcome = ImportExecutor::new()
            .execute(&rows, "tester", &[], &store, |_, _| {})
            .await;

        assert!(!outcome.success);
        assert_eq!(outcome.imported_count, 2);
        assert_eq!(outcome.error_count, 1);
        assert_eq!(outcome.errors[0].row, 2);
    }

    #[tokio::test]
    async fn test_same_key_twice_in_batch_observes_first_write() {
        let store = MemoryPersonStore::new();
        let rows = vec![make_row(1, "1001", "Tamm"), make_row(2, "1001", "Saar")];

        let outcome = ImportExecutor::new()
            .execute(&rows, "tester", &[], &store, |_, _| {})
            .await;

        // Row 1 inserts; row 2 re-checks, finds row 1's record,
        // and skips by default.
        assert_eq!(outcome.imported_count, 1);
        assert_eq!(outcome.skipped_count, 1);
    }

    #[tokio::test]
    async fn test_progress_is_reported_per_row() {
        let store = MemoryPersonStore::new();
        let rows = vec![make_row(1, "1001", "Tamm"), make_row(2, "1002", "Saar")];

        let mut calls: Vec<u8> = Vec::new();
        ImportExecutor::new()
            .execute(&rows, "tester", &[], &store, |percent, _| calls.push(percent))
            .await;

        assert_eq!(calls, vec![50, 100]);
    }
}

// ==========================================
// Executor partial-failure tests
// ==========================================
// A store that fails on one running number, to prove a single
// bad row never aborts the rest of the batch.
// ==========================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deport_registry::domain::{PersonFields, PersonRecord, RegistryField};
use deport_registry::importer::{FileDecoder, ImportExecutor};
use deport_registry::repository::{MemoryPersonStore, PersonStore, StoreError, StoreResult};

/// Delegating store that rejects writes for one poisoned key.
struct FailingStore {
    inner: MemoryPersonStore,
    poison_key: i64,
}

#[async_trait]
impl PersonStore for FailingStore {
    async fn find_current_by_key(&self, key: i64) -> StoreResult<Option<PersonRecord>> {
        self.inner.find_current_by_key(key).await
    }

    async fn find_all_versions_by_key(&self, key: i64) -> StoreResult<Vec<PersonRecord>> {
        self.inner.find_all_versions_by_key(key).await
    }

    async fn insert_new_current_version(&self, record: PersonRecord) -> StoreResult<PersonRecord> {
        if record.fields.running_number == self.poison_key {
            return Err(StoreError::Query("disk I/O error".to_string()));
        }
        self.inner.insert_new_current_version(record).await
    }

    async fn close_current_version(&self, key: i64, closed_at: DateTime<Utc>) -> StoreResult<()> {
        self.inner.close_current_version(key, closed_at).await
    }

    async fn update_current_version_in_place(
        &self,
        key: i64,
        fields: PersonFields,
        updated_by: &str,
    ) -> StoreResult<()> {
        self.inner
            .update_current_version_in_place(key, fields, updated_by)
            .await
    }
}

fn decode_batch(keys: &[i64]) -> Vec<deport_registry::domain::RawRow> {
    let header_line = RegistryField::ALL
        .iter()
        .map(|f| f.header())
        .collect::<Vec<_>>()
        .join(";");
    let mut input = format!("{header_line}\n");
    for key in keys {
        input.push_str(&format!("12;3;1;{key};Tamm;Jaan;;head;M;1898;Tartu;\n"));
    }
    FileDecoder::new()
        .decode(input.as_bytes(), "batch.csv")
        .unwrap()
        .rows
}

#[tokio::test]
async fn test_failing_row_does_not_abort_the_batch() {
    let store = FailingStore {
        inner: MemoryPersonStore::new(),
        poison_key: 1003,
    };
    let rows = decode_batch(&[1001, 1002, 1003, 1004, 1005]);

    let outcome = ImportExecutor::new()
        .execute(&rows, "tester", &[], &store, |_, _| {})
        .await;

    // Row 3 fails; rows 1, 2, 4, 5 still complete.
    assert!(!outcome.success);
    assert_eq!(outcome.error_count, 1);
    assert_eq!(outcome.imported_count + outcome.skipped_count, 4);
    assert_eq!(outcome.errors[0].row, 3);
    assert!(outcome.errors[0].message.contains("disk I/O error"));

    assert!(store.inner.find_current_by_key(1001).await.unwrap().is_some());
    assert!(store.inner.find_current_by_key(1003).await.unwrap().is_none());
    assert!(store.inner.find_current_by_key(1005).await.unwrap().is_some());
}

#[tokio::test]
async fn test_counts_stay_within_total_rows() {
    let store = FailingStore {
        inner: MemoryPersonStore::new(),
        poison_key: 1002,
    };
    let rows = decode_batch(&[1001, 1002, 1003]);

    let outcome = ImportExecutor::new()
        .execute(&rows, "tester", &[], &store, |_, _| {})
        .await;

    assert!(outcome.imported_count + outcome.skipped_count + outcome.error_count <= rows.len());
    assert_eq!(outcome.error_count, 1);
}

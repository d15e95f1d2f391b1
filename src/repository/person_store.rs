// ==========================================
// Deportation Registry - PersonStore trait
// ==========================================
// Data access contract for the historized record store.
// Red line: no business rules here, only record CRUD.
// Every pipeline entry point takes the store as a parameter;
// nothing reaches for ambient global state.
// ==========================================

use crate::domain::{PersonFields, PersonRecord};
use crate::repository::error::StoreResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

// ==========================================
// PersonStore Trait
// ==========================================
// Implementors: SqlitePersonStore, MemoryPersonStore
#[async_trait]
pub trait PersonStore: Send + Sync {
    /// Current version (valid_to IS NULL) for a running number, if any.
    async fn find_current_by_key(&self, key: i64) -> StoreResult<Option<PersonRecord>>;

    /// Full history for a running number, ordered by valid_from descending.
    ///
    /// Consumed by history displays, not by the pipeline itself.
    async fn find_all_versions_by_key(&self, key: i64) -> StoreResult<Vec<PersonRecord>>;

    /// Insert a new current version. The store assigns the storage id.
    ///
    /// Callers must have closed any previous current version first;
    /// the store enforces the at-most-one-current invariant.
    async fn insert_new_current_version(&self, record: PersonRecord) -> StoreResult<PersonRecord>;

    /// Close the current version of a key by stamping valid_to.
    ///
    /// Errors with CurrentVersionNotFound when the key has no
    /// current version.
    async fn close_current_version(&self, key: i64, closed_at: DateTime<Utc>) -> StoreResult<()>;

    /// Overwrite the fields of the current version in place.
    ///
    /// Identity and valid_from are preserved; only the field values
    /// and updated_by change. No history entry is created.
    async fn update_current_version_in_place(
        &self,
        key: i64,
        fields: PersonFields,
        updated_by: &str,
    ) -> StoreResult<()>;

    /// Soft delete: close the current version without inserting a
    /// successor. History stays intact. Privileged callers only;
    /// the pipeline itself never deletes.
    async fn delete_current_version(
        &self,
        key: i64,
        deleted_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        self.close_current_version(key, deleted_at).await
    }
}

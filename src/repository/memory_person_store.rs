// ==========================================
// Deportation Registry - In-memory record store
// ==========================================
// Trait-complete substitute for the SQLite store. Exists so
// tests and callers can run the pipeline without a database
// file; the invariants match the SQLite implementation.
// ==========================================

use crate::domain::{PersonFields, PersonRecord};
use crate::repository::error::{StoreError, StoreResult};
use crate::repository::person_store::PersonStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Mutex;

#[derive(Default)]
struct MemoryState {
    next_id: i64,
    records: Vec<PersonRecord>,
}

// ==========================================
// MemoryPersonStore
// ==========================================
#[derive(Default)]
pub struct MemoryPersonStore {
    state: Mutex<MemoryState>,
}

impl MemoryPersonStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<std::sync::MutexGuard<'_, MemoryState>> {
        self.state.lock().map_err(|e| StoreError::Lock(e.to_string()))
    }

    /// Snapshot of every stored version, for test assertions.
    pub fn all_records(&self) -> Vec<PersonRecord> {
        self.state
            .lock()
            .map(|s| s.records.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl PersonStore for MemoryPersonStore {
    async fn find_current_by_key(&self, key: i64) -> StoreResult<Option<PersonRecord>> {
        let state = self.lock()?;
        Ok(state
            .records
            .iter()
            .find(|r| r.fields.running_number == key && r.valid_to.is_none())
            .cloned())
    }

    async fn find_all_versions_by_key(&self, key: i64) -> StoreResult<Vec<PersonRecord>> {
        let state = self.lock()?;
        let mut versions: Vec<PersonRecord> = state
            .records
            .iter()
            .filter(|r| r.fields.running_number == key)
            .cloned()
            .collect();
        versions.sort_by(|a, b| b.valid_from.cmp(&a.valid_from).then(b.id.cmp(&a.id)));
        Ok(versions)
    }

    async fn insert_new_current_version(&self, record: PersonRecord) -> StoreResult<PersonRecord> {
        let mut state = self.lock()?;
        let key = record.fields.running_number;
        let already_current = state
            .records
            .iter()
            .any(|r| r.fields.running_number == key && r.valid_to.is_none());
        if already_current {
            return Err(StoreError::Query(format!(
                "current version already exists for running number {key}"
            )));
        }

        state.next_id += 1;
        let stored = PersonRecord {
            id: Some(state.next_id),
            ..record
        };
        state.records.push(stored.clone());
        Ok(stored)
    }

    async fn close_current_version(&self, key: i64, closed_at: DateTime<Utc>) -> StoreResult<()> {
        let mut state = self.lock()?;
        let current = state
            .records
            .iter_mut()
            .find(|r| r.fields.running_number == key && r.valid_to.is_none())
            .ok_or(StoreError::CurrentVersionNotFound(key))?;
        current.valid_to = Some(closed_at);
        Ok(())
    }

    async fn update_current_version_in_place(
        &self,
        key: i64,
        fields: PersonFields,
        updated_by: &str,
    ) -> StoreResult<()> {
        let mut state = self.lock()?;
        let current = state
            .records
            .iter_mut()
            .find(|r| r.fields.running_number == key && r.valid_to.is_none())
            .ok_or(StoreError::CurrentVersionNotFound(key))?;
        // valid_from stays as-is: in-place update is a correction.
        current.fields = fields;
        current.updated_by = updated_by.to_string();
        Ok(())
    }
}

// ==========================================
// Deportation Registry - SQLite record store
// ==========================================
// Bitemporal person_record table. A partial unique index on
// (running_number) WHERE valid_to IS NULL makes the
// at-most-one-current-version invariant a database guarantee,
// not just a convention.
// ==========================================

use crate::db::{open_in_memory_connection, open_sqlite_connection};
use crate::domain::{PersonFields, PersonRecord};
use crate::repository::error::{StoreError, StoreResult};
use crate::repository::person_store::PersonStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS person_record (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    running_number  INTEGER NOT NULL,
    page_number     INTEGER,
    family_number   INTEGER,
    entry_number    INTEGER,
    family_name     TEXT,
    given_name      TEXT,
    patronymic      TEXT,
    family_role     TEXT,
    sex             TEXT,
    birth_year      INTEGER,
    birthplace      TEXT,
    workplace       TEXT,
    valid_from      TEXT NOT NULL,
    valid_to        TEXT,
    updated_by      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_person_record_key
    ON person_record (running_number);

CREATE UNIQUE INDEX IF NOT EXISTS idx_person_record_current
    ON person_record (running_number) WHERE valid_to IS NULL;
"#;

const RECORD_COLUMNS: &str = "id, running_number, page_number, family_number, entry_number, \
     family_name, given_name, patronymic, family_role, sex, birth_year, \
     birthplace, workplace, valid_from, valid_to, updated_by";

// ==========================================
// SqlitePersonStore
// ==========================================
pub struct SqlitePersonStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqlitePersonStore {
    /// Open (or create) the store at the given database path.
    pub fn new(db_path: &str) -> StoreResult<Self> {
        let conn =
            open_sqlite_connection(db_path).map_err(|e| StoreError::Connection(e.to_string()))?;
        Self::from_connection(conn)
    }

    /// Throwaway in-memory store, used by tests.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn =
            open_in_memory_connection().map_err(|e| StoreError::Connection(e.to_string()))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> StoreResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| StoreError::Lock(e.to_string()))
    }

    fn row_to_record(row: &Row<'_>) -> rusqlite::Result<PersonRecord> {
        Ok(PersonRecord {
            id: Some(row.get(0)?),
            fields: PersonFields {
                running_number: row.get(1)?,
                page_number: row.get(2)?,
                family_number: row.get(3)?,
                entry_number: row.get(4)?,
                family_name: row.get(5)?,
                given_name: row.get(6)?,
                patronymic: row.get(7)?,
                family_role: row.get(8)?,
                sex: row.get(9)?,
                birth_year: row.get(10)?,
                birthplace: row.get(11)?,
                workplace: row.get(12)?,
            },
            valid_from: row.get(13)?,
            valid_to: row.get(14)?,
            updated_by: row.get(15)?,
        })
    }
}

#[async_trait]
impl PersonStore for SqlitePersonStore {
    async fn find_current_by_key(&self, key: i64) -> StoreResult<Option<PersonRecord>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM person_record \
             WHERE running_number = ?1 AND valid_to IS NULL"
        );
        let record = conn
            .query_row(&sql, params![key], Self::row_to_record)
            .optional()?;
        Ok(record)
    }

    async fn find_all_versions_by_key(&self, key: i64) -> StoreResult<Vec<PersonRecord>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM person_record \
             WHERE running_number = ?1 ORDER BY valid_from DESC, id DESC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params![key], Self::row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    async fn insert_new_current_version(&self, record: PersonRecord) -> StoreResult<PersonRecord> {
        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO person_record (
                running_number, page_number, family_number, entry_number,
                family_name, given_name, patronymic, family_role, sex,
                birth_year, birthplace, workplace, valid_from, valid_to, updated_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
            params![
                record.fields.running_number,
                record.fields.page_number,
                record.fields.family_number,
                record.fields.entry_number,
                record.fields.family_name,
                record.fields.given_name,
                record.fields.patronymic,
                record.fields.family_role,
                record.fields.sex,
                record.fields.birth_year,
                record.fields.birthplace,
                record.fields.workplace,
                record.valid_from,
                record.valid_to,
                record.updated_by,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Ok(PersonRecord {
            id: Some(id),
            ..record
        })
    }

    async fn close_current_version(&self, key: i64, closed_at: DateTime<Utc>) -> StoreResult<()> {
        let conn = self.lock()?;
        let affected = conn.execute(
            "UPDATE person_record SET valid_to = ?2 \
             WHERE running_number = ?1 AND valid_to IS NULL",
            params![key, closed_at],
        )?;
        if affected == 0 {
            return Err(StoreError::CurrentVersionNotFound(key));
        }
        Ok(())
    }

    async fn update_current_version_in_place(
        &self,
        key: i64,
        fields: PersonFields,
        updated_by: &str,
    ) -> StoreResult<()> {
        let conn = self.lock()?;
        // valid_from is deliberately untouched: this is a correction
        // to the current version, not a new temporal state.
        let affected = conn.execute(
            r#"
            UPDATE person_record SET
                page_number   = ?2,
                family_number = ?3,
                entry_number  = ?4,
                family_name   = ?5,
                given_name    = ?6,
                patronymic    = ?7,
                family_role   = ?8,
                sex           = ?9,
                birth_year    = ?10,
                birthplace    = ?11,
                workplace     = ?12,
                updated_by    = ?13
            WHERE running_number = ?1 AND valid_to IS NULL
            "#,
            params![
                key,
                fields.page_number,
                fields.family_number,
                fields.entry_number,
                fields.family_name,
                fields.given_name,
                fields.patronymic,
                fields.family_role,
                fields.sex,
                fields.birth_year,
                fields.birthplace,
                fields.workplace,
                updated_by,
            ],
        )?;
        if affected == 0 {
            return Err(StoreError::CurrentVersionNotFound(key));
        }
        Ok(())
    }
}

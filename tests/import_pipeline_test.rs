// ==========================================
// Import pipeline integration tests
// ==========================================
// Full decode -> validate -> detect -> execute runs against
// a real SQLite-backed store, driven through the orchestrator
// exactly as the CLI drives it.
// ==========================================

use chrono::Utc;
use deport_registry::domain::{
    ConflictAction, DuplicateConflict, PersonFields, PersonRecord, PersonSummary, RegistryField,
};
use deport_registry::importer::{RegistryImporter, RegistryImporterImpl};
use deport_registry::logging;
use deport_registry::repository::{PersonStore, SqlitePersonStore};
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

fn header_line() -> String {
    RegistryField::ALL
        .iter()
        .map(|f| f.header())
        .collect::<Vec<_>>()
        .join(";")
}

/// One data line: (running number, family name, birth year).
fn data_line(key: i64, family_name: &str, birth_year: &str) -> String {
    format!("12;3;1;{key};{family_name};Jaan;;head;M;{birth_year};Tartu County;")
}

fn write_csv(lines: &[String]) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "{}", header_line()).unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    file
}

fn open_store(dir: &TempDir) -> SqlitePersonStore {
    let db_path = dir.path().join("registry.db");
    SqlitePersonStore::new(db_path.to_str().unwrap()).unwrap()
}

fn seed_fields(key: i64, family_name: &str) -> PersonFields {
    PersonFields {
        running_number: key,
        page_number: Some(1),
        family_number: Some(1),
        entry_number: Some(1),
        family_name: Some(family_name.to_string()),
        given_name: Some("Liisa".to_string()),
        patronymic: None,
        family_role: Some("wife".to_string()),
        sex: Some("F".to_string()),
        birth_year: Some(1903),
        birthplace: None,
        workplace: None,
    }
}

async fn seed(store: &SqlitePersonStore, key: i64, family_name: &str) -> PersonRecord {
    store
        .insert_new_current_version(PersonRecord::new_current(
            seed_fields(key, family_name),
            "seed",
            Utc::now(),
        ))
        .await
        .unwrap()
}

fn resolution(existing: &PersonRecord, action: ConflictAction) -> DuplicateConflict {
    DuplicateConflict {
        row: 0,
        logical_key: existing.fields.running_number,
        existing: PersonSummary::from(existing),
        action,
    }
}

#[tokio::test]
async fn test_import_of_new_records_end_to_end() {
    logging::init_test();
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let file = write_csv(&[data_line(1001, "Tamm", "1898"), data_line(1002, "Saar", "1903")]);

    let importer = RegistryImporterImpl::new(store);
    let report = importer
        .import_file(file.path(), "archivist", &[])
        .await
        .unwrap();

    assert!(report.validation.is_valid);
    assert!(report.conflicts.is_empty());
    let outcome = report.outcome.unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.imported_count, 2);
    assert_eq!(outcome.skipped_count, 0);

    let current = importer.store().find_current_by_key(1001).await.unwrap().unwrap();
    assert_eq!(current.fields.family_name.as_deref(), Some("Tamm"));
    assert_eq!(current.updated_by, "archivist");
    assert!(current.is_current());
}

#[tokio::test]
async fn test_one_new_and_one_updated_record() {
    // The documented end-to-end example: 1001 is new, 1002 already
    // exists and is resolved as an in-place update.
    logging::init_test();
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let before = seed(&store, 1002, "Saar").await;

    let file = write_csv(&[data_line(1001, "Tamm", "1898"), data_line(1002, "Kask", "1903")]);
    let importer = RegistryImporterImpl::new(store);
    let report = importer
        .import_file(file.path(), "archivist", &[resolution(&before, ConflictAction::Update)])
        .await
        .unwrap();

    // Pre-existing key shows up as a warning, never an error.
    assert!(report.validation.is_valid);
    assert_eq!(report.validation.warnings.len(), 1);
    assert_eq!(report.conflicts.len(), 1);
    assert_eq!(report.conflicts[0].action, ConflictAction::Update);

    let outcome = report.outcome.unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.imported_count, 2);
    assert_eq!(outcome.skipped_count, 0);
    assert_eq!(outcome.error_count, 0);

    assert!(importer.store().find_current_by_key(1001).await.unwrap().is_some());
    let after = importer.store().find_current_by_key(1002).await.unwrap().unwrap();
    assert_eq!(after.fields.family_name.as_deref(), Some("Kask"));
    // Overwritten in place: same temporal validity start, no new version.
    assert_eq!(after.valid_from, before.valid_from);
    assert_eq!(importer.store().find_all_versions_by_key(1002).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_skip_default_is_idempotent() {
    logging::init_test();
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let before = seed(&store, 1002, "Saar").await;

    let file = write_csv(&[data_line(1001, "Tamm", "1898"), data_line(1002, "Kask", "1903")]);
    let importer = RegistryImporterImpl::new(store);
    let report = importer
        .import_file(file.path(), "archivist", &[])
        .await
        .unwrap();

    let outcome = report.outcome.unwrap();
    assert_eq!(outcome.imported_count, 1);
    assert_eq!(outcome.skipped_count, 1);

    // The existing current version is untouched.
    let after = importer.store().find_current_by_key(1002).await.unwrap().unwrap();
    assert_eq!(after, before);
}

#[tokio::test]
async fn test_create_new_version_appends_history() {
    logging::init_test();
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let before = seed(&store, 1002, "Saar").await;

    let file = write_csv(&[data_line(1002, "Kask", "1903")]);
    let importer = RegistryImporterImpl::new(store);
    let report = importer
        .import_file(
            file.path(),
            "archivist",
            &[resolution(&before, ConflictAction::CreateNewVersion)],
        )
        .await
        .unwrap();

    assert!(report.outcome.unwrap().success);

    let versions = importer.store().find_all_versions_by_key(1002).await.unwrap();
    assert_eq!(versions.len(), 2);
    assert_eq!(versions.iter().filter(|v| v.is_current()).count(), 1);
    // Newest first, previous version closed out.
    assert_eq!(versions[0].fields.family_name.as_deref(), Some("Kask"));
    assert!(versions[1].valid_to.is_some());
}

#[tokio::test]
async fn test_validation_errors_stop_the_run_before_any_write() {
    logging::init_test();
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    // Duplicate running number within the batch blocks both rows.
    let file = write_csv(&[data_line(1001, "Tamm", "1898"), data_line(1001, "Saar", "1903")]);
    let importer = RegistryImporterImpl::new(store);
    let report = importer
        .import_file(file.path(), "archivist", &[])
        .await
        .unwrap();

    assert!(!report.validation.is_valid);
    assert_eq!(report.validation.errors.len(), 2);
    assert_eq!(report.validation.valid_rows, 0);
    assert!(report.outcome.is_none());
    assert!(importer.store().find_current_by_key(1001).await.unwrap().is_none());
}

#[tokio::test]
async fn test_missing_file_is_a_fatal_error() {
    logging::init_test();
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    let importer = RegistryImporterImpl::new(store);
    let result = importer
        .import_file(std::path::Path::new("no-such-file.csv"), "archivist", &[])
        .await;
    assert!(result.is_err());
}

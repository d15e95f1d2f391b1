// ==========================================
// Deportation Registry - Core Library
// ==========================================
// Tech stack: Rust + SQLite
// Purpose: import pipeline for deportation registry
// card files, with full record historization
// ==========================================

// ==========================================
// Module declarations
// ==========================================

// Domain layer - entities and types
pub mod domain;

// Repository layer - historized record store
pub mod repository;

// Importer layer - decode / validate / reconcile
pub mod importer;

// Database infrastructure (connection init / unified PRAGMA)
pub mod db;

// Logging
pub mod logging;

// ==========================================
// Re-exports of core types
// ==========================================

// Domain types
pub use domain::types::{ConflictAction, Severity};

// Domain entities
pub use domain::{
    DecodedTable, DuplicateConflict, FieldRule, FieldType, ImportOutcome, PersonFields,
    PersonRecord, PersonSummary, RawRow, RegistryField, ValidationIssue, ValidationReport,
};

// Importer
pub use importer::{
    ConflictDetector, FileDecoder, ImportExecutor, ImportRunReport, RegistryImporter,
    RegistryImporterImpl, SchemaValidator, TemplateGenerator,
};

// Repository
pub use repository::{MemoryPersonStore, PersonStore, SqlitePersonStore};

// ==========================================
// Constants
// ==========================================

// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// System name
pub const APP_NAME: &str = "Deportation Registry";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}

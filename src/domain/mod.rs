// ==========================================
// Deportation Registry - Domain layer
// ==========================================
// Entities and value types shared by the importer and
// the record store. No I/O lives here.
// ==========================================

pub mod field;
pub mod person;
pub mod raw;
pub mod report;
pub mod types;

pub use field::{FieldRule, FieldType, RegistryField, BIRTH_YEAR_MAX, BIRTH_YEAR_MIN};
pub use person::{PersonFields, PersonRecord, PersonSummary};
pub use raw::{DecodedTable, RawRow};
pub use report::{DuplicateConflict, ImportOutcome, ValidationIssue, ValidationReport};
pub use types::{ConflictAction, Severity};

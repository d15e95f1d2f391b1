// ==========================================
// Deportation Registry - Importer layer
// ==========================================
// The import pipeline: decode -> validate -> detect -> execute,
// plus the template/docs generator. Only the executor writes;
// everything upstream is pure over the decoded data and the
// injected store.
// ==========================================

// Module declarations
pub mod conflict_detector;
pub mod error;
pub mod file_decoder;
pub mod import_executor;
pub mod registry_importer;
pub mod schema_validator;
pub mod template;

// Re-exports of core types
pub use conflict_detector::ConflictDetector;
pub use error::{ImportError, ImportResult};
pub use file_decoder::{FileDecoder, CANDIDATE_DELIMITERS, MAX_FILE_BYTES};
pub use import_executor::ImportExecutor;
pub use registry_importer::{ImportRunReport, RegistryImporter, RegistryImporterImpl};
pub use schema_validator::SchemaValidator;
pub use template::{TemplateGenerator, CANONICAL_DELIMITER};

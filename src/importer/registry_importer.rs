// ==========================================
// Deportation Registry - Import orchestrator
// ==========================================
// Convenience wiring of the pipeline stages:
// decode -> validate -> detect -> execute.
// Stops before any write when validation reports errors,
// and applies per-conflict resolutions supplied by the caller
// (defaulting to skip-everything).
// ==========================================

use crate::domain::{DuplicateConflict, ImportOutcome, ValidationReport};
use crate::importer::conflict_detector::ConflictDetector;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_decoder::FileDecoder;
use crate::importer::import_executor::ImportExecutor;
use crate::importer::schema_validator::SchemaValidator;
use crate::repository::PersonStore;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};
use uuid::Uuid;

// ==========================================
// ImportRunReport - result of one orchestrated run
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRunReport {
    pub run_id: String,
    pub file_name: String,
    pub validation: ValidationReport,
    pub conflicts: Vec<DuplicateConflict>,
    /// None when validation errors stopped the run before any write.
    pub outcome: Option<ImportOutcome>,
}

// ==========================================
// RegistryImporter Trait
// ==========================================
#[async_trait::async_trait]
pub trait RegistryImporter: Send + Sync {
    /// Run the full pipeline for one file.
    ///
    /// `resolutions` overrides the detected conflicts' actions by
    /// running number; pass an empty slice to keep the skip default.
    async fn import_file(
        &self,
        file_path: &Path,
        actor: &str,
        resolutions: &[DuplicateConflict],
    ) -> ImportResult<ImportRunReport>;
}

// ==========================================
// RegistryImporterImpl
// ==========================================
pub struct RegistryImporterImpl<S: PersonStore> {
    store: S,
    decoder: FileDecoder,
    validator: SchemaValidator,
    detector: ConflictDetector,
    executor: ImportExecutor,
}

impl<S: PersonStore> RegistryImporterImpl<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            decoder: FileDecoder::new(),
            validator: SchemaValidator::new(),
            detector: ConflictDetector::new(),
            executor: ImportExecutor::new(),
        }
    }

    /// The record store this importer writes to.
    pub fn store(&self) -> &S {
        &self.store
    }
}

#[async_trait::async_trait]
impl<S: PersonStore> RegistryImporter for RegistryImporterImpl<S> {
    #[instrument(skip(self, resolutions), fields(run_id))]
    async fn import_file(
        &self,
        file_path: &Path,
        actor: &str,
        resolutions: &[DuplicateConflict],
    ) -> ImportResult<ImportRunReport> {
        let run_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("run_id", run_id.as_str());

        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }
        let file_name = file_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        info!(file = %file_name, actor = %actor, "import run started");

        let bytes = tokio::fs::read(file_path).await?;
        let table = self.decoder.decode(&bytes, &file_name)?;

        let validation = self.validator.validate(&table, &self.store).await?;
        if !validation.is_valid {
            // Error-severity issues stop the run before any write; the
            // caller fixes the source file and re-runs the whole batch.
            info!(errors = validation.errors.len(), "run stopped by validation errors");
            return Ok(ImportRunReport {
                run_id,
                file_name,
                validation,
                conflicts: Vec::new(),
                outcome: None,
            });
        }

        let mut conflicts = self.detector.detect_conflicts(&table.rows, &self.store).await?;
        for conflict in &mut conflicts {
            if let Some(resolved) = resolutions
                .iter()
                .find(|r| r.logical_key == conflict.logical_key)
            {
                conflict.action = resolved.action;
            }
        }

        let outcome = self
            .executor
            .execute(&table.rows, actor, &conflicts, &self.store, |percent, status| {
                debug!(percent, status, "import progress");
            })
            .await;

        info!(
            imported = outcome.imported_count,
            skipped = outcome.skipped_count,
            failed = outcome.error_count,
            "import run finished"
        );

        Ok(ImportRunReport {
            run_id,
            file_name,
            validation,
            conflicts,
            outcome: Some(outcome),
        })
    }
}

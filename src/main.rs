// ==========================================
// Deportation Registry - CLI entry point
// ==========================================
// Thin wrapper over the import pipeline against the SQLite
// store. Usage:
//   deport-registry import <file> <db-path> [actor] [--json]
//   deport-registry template
//   deport-registry field-docs
// ==========================================

use deport_registry::importer::{RegistryImporter, RegistryImporterImpl, TemplateGenerator};
use deport_registry::repository::SqlitePersonStore;
use deport_registry::{logging, APP_NAME, VERSION};
use std::path::Path;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();
    tracing::info!("{} v{}", APP_NAME, VERSION);

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("import") => run_import(&args[2..]).await,
        Some("template") => {
            print!("{}", TemplateGenerator::new().generate_template());
            ExitCode::SUCCESS
        }
        Some("field-docs") => {
            print!("{}", TemplateGenerator::new().generate_field_docs());
            ExitCode::SUCCESS
        }
        _ => {
            eprintln!("usage: deport-registry import <file> <db-path> [actor] [--json]");
            eprintln!("       deport-registry template");
            eprintln!("       deport-registry field-docs");
            ExitCode::FAILURE
        }
    }
}

async fn run_import(args: &[String]) -> ExitCode {
    let json_output = args.iter().any(|a| a == "--json");
    let args: Vec<&String> = args.iter().filter(|a| !a.starts_with("--")).collect();
    let (Some(file), Some(db_path)) = (args.first(), args.get(1)) else {
        eprintln!("usage: deport-registry import <file> <db-path> [actor] [--json]");
        return ExitCode::FAILURE;
    };
    let actor = args.get(2).map(|s| s.as_str()).unwrap_or("cli");

    let store = match SqlitePersonStore::new(db_path.as_str()) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(error = %e, "could not open record store");
            return ExitCode::FAILURE;
        }
    };

    let importer = RegistryImporterImpl::new(store);
    let report = match importer.import_file(Path::new(file), actor, &[]).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %e, "import failed");
            return ExitCode::FAILURE;
        }
    };

    if json_output {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                tracing::error!(error = %e, "could not serialize report");
                return ExitCode::FAILURE;
            }
        }
        let ok = report.outcome.as_ref().map(|o| o.success).unwrap_or(false);
        return if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE };
    }

    for issue in report.validation.errors.iter().chain(&report.validation.warnings) {
        let field = issue
            .field
            .map(|f| f.header().to_string())
            .unwrap_or_else(|| "(row)".to_string());
        eprintln!(
            "{:?} row {} [{}]: {}",
            issue.severity, issue.row, field, issue.message
        );
    }

    match report.outcome {
        Some(outcome) => {
            println!(
                "imported {}, skipped {}, failed {} (of {} rows, {} conflicts)",
                outcome.imported_count,
                outcome.skipped_count,
                outcome.error_count,
                report.validation.total_rows,
                report.conflicts.len(),
            );
            if outcome.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        None => {
            eprintln!(
                "validation failed with {} error(s); nothing was written",
                report.validation.errors.len()
            );
            ExitCode::FAILURE
        }
    }
}

// ==========================================
// Deportation Registry - Template and docs generator
// ==========================================
// Produces the reference artifacts for registry typists:
// an example file with the expected headers and a plain-text
// rule listing. Pure string producers; saving is the
// caller's concern.
// ==========================================

use crate::domain::{FieldType, RegistryField};
use std::fmt::Write;

/// Delimiter used in generated artifacts.
pub const CANONICAL_DELIMITER: char = ';';

// ==========================================
// TemplateGenerator
// ==========================================
#[derive(Debug, Default)]
pub struct TemplateGenerator;

impl TemplateGenerator {
    pub fn new() -> Self {
        Self
    }

    /// The 12 canonical headers plus example rows satisfying
    /// every field rule.
    pub fn generate_template(&self) -> String {
        let delimiter = CANONICAL_DELIMITER.to_string();
        let header_line: String = RegistryField::ALL
            .iter()
            .map(|f| f.header())
            .collect::<Vec<_>>()
            .join(&delimiter);

        let example_rows = [
            [
                "12", "3", "1", "1001", "Tamm", "Jaan", "Juhan", "head", "M", "1898",
                "Tartu County", "collective farm",
            ],
            [
                "12", "3", "2", "1002", "Tamm", "Liisa", "Peeter", "wife", "F", "1903",
                "Tartu County", "",
            ],
            [
                "12", "4", "1", "1003", "Saar", "Endel", "", "son", "M", "1931", "Viljandi", "",
            ],
        ];

        let mut out = String::new();
        out.push_str(&header_line);
        out.push('\n');
        for row in example_rows {
            out.push_str(&row.join(&delimiter));
            out.push('\n');
        }
        out
    }

    /// Human-readable rule listing, one block per field.
    pub fn generate_field_docs(&self) -> String {
        let mut out = String::new();
        out.push_str("Deportation registry import - field reference\n");
        out.push_str("=============================================\n\n");

        for field in RegistryField::ALL {
            let rule = field.rule();
            writeln!(out, "{} ({})", field.header(), field.label()).ok();
            writeln!(
                out,
                "  required: {}",
                if rule.required { "yes" } else { "no" }
            )
            .ok();
            let type_name = match rule.field_type {
                FieldType::Text => "text",
                FieldType::Integer => "integer",
                FieldType::Year => "year",
            };
            writeln!(out, "  type: {type_name}").ok();
            if let Some(max_length) = rule.max_length {
                writeln!(out, "  max length: {max_length}").ok();
            }
            if let (Some(min), Some(max)) = (rule.min_value, rule.max_value) {
                writeln!(out, "  range: {min}-{max}").ok();
            } else if let Some(min) = rule.min_value {
                writeln!(out, "  minimum: {min}").ok();
            }
            if let Some(allowed) = rule.allowed_values {
                writeln!(
                    out,
                    "  known values: {} (others import with a warning)",
                    allowed.join(", ")
                )
                .ok();
            }
            out.push('\n');
        }
        out
    }
}

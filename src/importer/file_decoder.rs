// ==========================================
// Deportation Registry - Tabular file decoder
// ==========================================
// Turns raw file bytes into headers + ordered rows.
// Delimited text goes through delimiter auto-detection;
// spreadsheets skip detection and read the first sheet.
// ==========================================

use crate::domain::{DecodedTable, RawRow, RegistryField};
use crate::importer::error::{ImportError, ImportResult};
use calamine::{Reader, Xlsx};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Input size cap. The whole file is held in memory.
pub const MAX_FILE_BYTES: usize = 10 * 1024 * 1024;

/// Candidate field delimiters, tried in this order.
pub const CANDIDATE_DELIMITERS: [char; 4] = [';', ',', '|', '\t'];

/// Minimum detection confidence (percent of the 12 recognized
/// headers matched). Below this the decode fails outright:
/// silently guessing wrong would corrupt every field mapping.
pub const MIN_DELIMITER_CONFIDENCE: f64 = 50.0;

// ==========================================
// FileDecoder
// ==========================================
#[derive(Debug, Default)]
pub struct FileDecoder;

impl FileDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Decode raw file bytes into a table, dispatching on the
    /// filename extension.
    #[instrument(skip(self, bytes), fields(filename = %filename, size = bytes.len()))]
    pub fn decode(&self, bytes: &[u8], filename: &str) -> ImportResult<DecodedTable> {
        if bytes.is_empty() {
            return Err(ImportError::EmptyFile);
        }
        if bytes.len() > MAX_FILE_BYTES {
            return Err(ImportError::FileTooLarge {
                size: bytes.len(),
                max: MAX_FILE_BYTES,
            });
        }

        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        let table = match ext.as_str() {
            "csv" | "txt" | "tsv" | "" => self.decode_delimited(bytes)?,
            "xlsx" | "xls" => self.decode_workbook(bytes)?,
            _ => return Err(ImportError::UnsupportedFormat(ext)),
        };

        info!(
            total_rows = table.total_rows,
            extra_headers = table.extra_headers.len(),
            "file decoded"
        );
        Ok(table)
    }

    // ==========================================
    // Delimited text path
    // ==========================================
    fn decode_delimited(&self, bytes: &[u8]) -> ImportResult<DecodedTable> {
        let text = String::from_utf8_lossy(bytes);
        let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

        let first_line = text
            .lines()
            .find(|l| !l.trim().is_empty())
            .ok_or(ImportError::EmptyFile)?;

        let (delimiter, confidence) = detect_delimiter(first_line)?;
        debug!(delimiter = %delimiter.escape_default(), confidence, "delimiter selected");

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter as u8)
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        let extra_headers = validate_headers(&headers)?;

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let fields: Vec<&str> = record.iter().collect();

            // Incidental blank lines (only whitespace/delimiters) are
            // dropped, not counted, not an error.
            if fields.iter().all(|f| f.trim().is_empty()) {
                continue;
            }
            if fields.len() > headers.len() {
                return Err(ImportError::FieldCountMismatch {
                    row: rows.len() + 1,
                    expected: headers.len(),
                    actual: fields.len(),
                });
            }

            rows.push(build_row(&headers, &fields, rows.len() + 1));
        }

        if rows.is_empty() {
            return Err(ImportError::NoDataRows);
        }

        let total_rows = rows.len();
        Ok(DecodedTable {
            headers,
            rows,
            total_rows,
            extra_headers,
        })
    }

    // ==========================================
    // Spreadsheet path (first sheet only)
    // ==========================================
    fn decode_workbook(&self, bytes: &[u8]) -> ImportResult<DecodedTable> {
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes.to_vec()))?;

        let sheet_names = workbook.sheet_names();
        let sheet_name = sheet_names
            .first()
            .cloned()
            .ok_or_else(|| ImportError::WorkbookParseError("workbook has no sheets".to_string()))?;

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| ImportError::WorkbookParseError(e.to_string()))?;

        let mut sheet_rows = range.rows();
        let header_row = sheet_rows.next().ok_or(ImportError::NoDataRows)?;
        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();
        let extra_headers = validate_headers(&headers)?;

        let mut rows = Vec::new();
        for data_row in sheet_rows {
            let fields: Vec<String> = data_row.iter().map(|c| c.to_string()).collect();
            if fields.iter().all(|f| f.trim().is_empty()) {
                continue;
            }
            let fields: Vec<&str> = fields.iter().map(String::as_str).collect();
            rows.push(build_row(&headers, &fields, rows.len() + 1));
        }

        if rows.is_empty() {
            return Err(ImportError::NoDataRows);
        }

        let total_rows = rows.len();
        Ok(DecodedTable {
            headers,
            rows,
            total_rows,
            extra_headers,
        })
    }
}

/// Pick the candidate delimiter whose split of the header line
/// matches the most recognized header names.
fn detect_delimiter(first_line: &str) -> ImportResult<(char, f64)> {
    let mut best: (char, usize) = (CANDIDATE_DELIMITERS[0], 0);

    for candidate in CANDIDATE_DELIMITERS {
        let matches = split_quoted(first_line, candidate)
            .iter()
            .filter(|field| RegistryField::from_header(field.trim()).is_some())
            .count();
        if matches > best.1 {
            best = (candidate, matches);
        }
    }

    let confidence = best.1 as f64 / RegistryField::ALL.len() as f64 * 100.0;
    if confidence < MIN_DELIMITER_CONFIDENCE {
        return Err(ImportError::AmbiguousDelimiter {
            matches: best.1,
            confidence,
        });
    }
    Ok((best.0, confidence))
}

/// Quote-aware split: a quote toggles the in-quote state, a doubled
/// quote inside a quoted segment is a literal quote character.
fn split_quoted(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '"' {
            if in_quotes && chars.peek() == Some(&'"') {
                current.push('"');
                chars.next();
            } else {
                in_quotes = !in_quotes;
            }
        } else if c == delimiter && !in_quotes {
            fields.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    fields.push(current);
    fields
}

/// All 12 recognized headers must be present; extra headers are
/// tolerated and reported back for a non-fatal warning.
fn validate_headers(headers: &[String]) -> ImportResult<Vec<String>> {
    let missing: Vec<&str> = RegistryField::ALL
        .iter()
        .filter(|f| !headers.iter().any(|h| h == f.header()))
        .map(|f| f.header())
        .collect();
    if !missing.is_empty() {
        return Err(ImportError::MissingHeaders(missing.join(", ")));
    }

    let extra: Vec<String> = headers
        .iter()
        .filter(|h| !h.is_empty() && RegistryField::from_header(h).is_none())
        .cloned()
        .collect();
    for header in &extra {
        warn!(header = %header, "unrecognized header ignored");
    }
    Ok(extra)
}

/// Zip split values positionally against headers; missing trailing
/// fields become empty strings.
fn build_row(headers: &[String], fields: &[&str], row_number: usize) -> RawRow {
    let mut values = HashMap::new();
    for (idx, header) in headers.iter().enumerate() {
        let value = fields.get(idx).copied().unwrap_or("");
        values.insert(header.clone(), value.to_string());
    }
    RawRow::new(row_number, values)
}

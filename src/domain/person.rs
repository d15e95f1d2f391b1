// ==========================================
// Deportation Registry - Person domain model
// ==========================================
// PersonRecord is the only durable entity of the pipeline.
// History is bitemporal and append-only: a superseded version
// is closed out via valid_to, never mutated or erased.
// ==========================================

use crate::domain::field::RegistryField;
use crate::domain::raw::RawRow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// PersonFields - the 12 registry fields of one entry
// ==========================================
// Written by the importer, read by everything else.
// All fields except the natural key are optional; the
// validator decides what blocks import, not this struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonFields {
    /// Natural key: registry running number.
    pub running_number: i64,

    // Card position
    pub page_number: Option<i64>,
    pub family_number: Option<i64>,
    pub entry_number: Option<i64>,

    // Names
    pub family_name: Option<String>,
    pub given_name: Option<String>,
    pub patronymic: Option<String>,

    // Person attributes
    pub family_role: Option<String>,
    pub sex: Option<String>,
    pub birth_year: Option<i64>,

    // Places
    pub birthplace: Option<String>,
    pub workplace: Option<String>,
}

impl PersonFields {
    /// Build a payload from a decoded row.
    ///
    /// Returns Err with the raw cell value when the running number does
    /// not parse; other numeric fields degrade to None since the
    /// validator has already reported them.
    pub fn from_row(row: &RawRow) -> Result<PersonFields, String> {
        let raw_key = row.value(RegistryField::RunningNumber);
        let running_number = raw_key
            .trim()
            .parse::<i64>()
            .map_err(|_| raw_key.trim().to_string())?;

        Ok(PersonFields {
            running_number,
            page_number: parse_optional_int(row, RegistryField::PageNumber),
            family_number: parse_optional_int(row, RegistryField::FamilyNumber),
            entry_number: parse_optional_int(row, RegistryField::EntryNumber),
            family_name: non_blank(row, RegistryField::FamilyName),
            given_name: non_blank(row, RegistryField::GivenName),
            patronymic: non_blank(row, RegistryField::Patronymic),
            family_role: non_blank(row, RegistryField::FamilyRole),
            sex: non_blank(row, RegistryField::Sex),
            birth_year: parse_optional_int(row, RegistryField::BirthYear),
            birthplace: non_blank(row, RegistryField::Birthplace),
            workplace: non_blank(row, RegistryField::Workplace),
        })
    }
}

fn non_blank(row: &RawRow, field: RegistryField) -> Option<String> {
    let v = row.value(field).trim();
    if v.is_empty() {
        None
    } else {
        Some(v.to_string())
    }
}

fn parse_optional_int(row: &RawRow, field: RegistryField) -> Option<i64> {
    row.value(field).trim().parse::<i64>().ok()
}

// ==========================================
// PersonRecord - one historized version
// ==========================================
// Invariant: per running_number at most one record has
// valid_to = NULL ("the current version").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRecord {
    /// Storage id, assigned by the store on insert.
    pub id: Option<i64>,

    pub fields: PersonFields,

    /// When this version became current.
    pub valid_from: DateTime<Utc>,
    /// When this version was superseded; NULL while current.
    pub valid_to: Option<DateTime<Utc>>,
    /// Actor identifier for audit attribution.
    pub updated_by: String,
}

impl PersonRecord {
    /// New current version stamped with the given actor and instant.
    pub fn new_current(fields: PersonFields, actor: &str, at: DateTime<Utc>) -> Self {
        Self {
            id: None,
            fields,
            valid_from: at,
            valid_to: None,
            updated_by: actor.to_string(),
        }
    }

    pub fn is_current(&self) -> bool {
        self.valid_to.is_none()
    }
}

// ==========================================
// PersonSummary - conflict display projection
// ==========================================
// Carried inside DuplicateConflict so a resolution UI can show
// what already exists without another store round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonSummary {
    pub id: Option<i64>,
    pub running_number: i64,
    pub family_name: Option<String>,
    pub given_name: Option<String>,
    pub birth_year: Option<i64>,
    pub valid_from: DateTime<Utc>,
}

impl From<&PersonRecord> for PersonSummary {
    fn from(record: &PersonRecord) -> Self {
        Self {
            id: record.id,
            running_number: record.fields.running_number,
            family_name: record.fields.family_name.clone(),
            given_name: record.fields.given_name.clone(),
            birth_year: record.fields.birth_year,
            valid_from: record.valid_from,
        }
    }
}

// ==========================================
// Deportation Registry - Field catalog
// ==========================================
// The recognized column set of a registry card file is
// fixed. Fields are an enum with an exhaustive rule table,
// so adding or removing one is a compile-time change
// rather than a runtime string lookup.
// ==========================================

use serde::{Deserialize, Serialize};

/// The 12 recognized registry fields, in canonical column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistryField {
    PageNumber,
    FamilyNumber,
    EntryNumber,
    /// Natural key: unique across all non-deleted current versions.
    RunningNumber,
    FamilyName,
    GivenName,
    Patronymic,
    FamilyRole,
    Sex,
    BirthYear,
    Birthplace,
    Workplace,
}

/// Value type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Integer,
    Year,
}

/// Per-field contract applied by the schema validator.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub required: bool,
    pub field_type: FieldType,
    pub max_length: Option<usize>,
    pub min_value: Option<i64>,
    pub max_value: Option<i64>,
    /// Violations of the enumeration are warnings, not errors:
    /// registries contain legitimate variants not yet listed.
    pub allowed_values: Option<&'static [&'static str]>,
}

impl FieldRule {
    const fn text(required: bool, max_length: usize) -> Self {
        Self {
            required,
            field_type: FieldType::Text,
            max_length: Some(max_length),
            min_value: None,
            max_value: None,
            allowed_values: None,
        }
    }

    const fn integer(min_value: i64) -> Self {
        Self {
            required: false,
            field_type: FieldType::Integer,
            max_length: None,
            min_value: Some(min_value),
            max_value: None,
            allowed_values: None,
        }
    }
}

/// Birth year policy band: deportation-era registries; years
/// outside this band are schema violations, not merely implausible.
pub const BIRTH_YEAR_MIN: i64 = 1800;
pub const BIRTH_YEAR_MAX: i64 = 1950;

/// Known family role codes. Unlisted values import with a warning.
pub const FAMILY_ROLES: &[&str] = &[
    "head", "wife", "husband", "son", "daughter", "father", "mother", "relative",
];

/// Known sex codes. Unlisted values import with a warning.
pub const SEX_CODES: &[&str] = &["M", "F"];

impl RegistryField {
    /// All fields in canonical column order.
    pub const ALL: [RegistryField; 12] = [
        RegistryField::PageNumber,
        RegistryField::FamilyNumber,
        RegistryField::EntryNumber,
        RegistryField::RunningNumber,
        RegistryField::FamilyName,
        RegistryField::GivenName,
        RegistryField::Patronymic,
        RegistryField::FamilyRole,
        RegistryField::Sex,
        RegistryField::BirthYear,
        RegistryField::Birthplace,
        RegistryField::Workplace,
    ];

    /// Canonical header name as it appears in input files.
    pub fn header(&self) -> &'static str {
        match self {
            RegistryField::PageNumber => "page_number",
            RegistryField::FamilyNumber => "family_number",
            RegistryField::EntryNumber => "entry_number",
            RegistryField::RunningNumber => "running_number",
            RegistryField::FamilyName => "family_name",
            RegistryField::GivenName => "given_name",
            RegistryField::Patronymic => "patronymic",
            RegistryField::FamilyRole => "family_role",
            RegistryField::Sex => "sex",
            RegistryField::BirthYear => "birth_year",
            RegistryField::Birthplace => "birthplace",
            RegistryField::Workplace => "workplace",
        }
    }

    /// Resolve a header name (case-sensitive exact match).
    pub fn from_header(header: &str) -> Option<RegistryField> {
        RegistryField::ALL.iter().copied().find(|f| f.header() == header)
    }

    /// Human-readable label for documentation output.
    pub fn label(&self) -> &'static str {
        match self {
            RegistryField::PageNumber => "Page number",
            RegistryField::FamilyNumber => "Family number",
            RegistryField::EntryNumber => "Entry number",
            RegistryField::RunningNumber => "Running number (natural key)",
            RegistryField::FamilyName => "Family name",
            RegistryField::GivenName => "Given name",
            RegistryField::Patronymic => "Patronymic",
            RegistryField::FamilyRole => "Role within the family",
            RegistryField::Sex => "Sex",
            RegistryField::BirthYear => "Birth year",
            RegistryField::Birthplace => "Birthplace",
            RegistryField::Workplace => "Workplace",
        }
    }

    /// Validation rule of this field. Exhaustive by construction.
    pub fn rule(&self) -> FieldRule {
        match self {
            RegistryField::PageNumber => FieldRule::integer(1),
            RegistryField::FamilyNumber => FieldRule::integer(1),
            RegistryField::EntryNumber => FieldRule::integer(1),
            RegistryField::RunningNumber => FieldRule {
                required: true,
                field_type: FieldType::Integer,
                max_length: None,
                min_value: Some(1),
                max_value: None,
                allowed_values: None,
            },
            RegistryField::FamilyName => FieldRule::text(true, 100),
            RegistryField::GivenName => FieldRule::text(false, 100),
            RegistryField::Patronymic => FieldRule::text(false, 100),
            RegistryField::FamilyRole => FieldRule {
                required: false,
                field_type: FieldType::Text,
                max_length: Some(50),
                min_value: None,
                max_value: None,
                allowed_values: Some(FAMILY_ROLES),
            },
            RegistryField::Sex => FieldRule {
                required: false,
                field_type: FieldType::Text,
                max_length: Some(10),
                min_value: None,
                max_value: None,
                allowed_values: Some(SEX_CODES),
            },
            RegistryField::BirthYear => FieldRule {
                required: false,
                field_type: FieldType::Year,
                max_length: None,
                min_value: Some(BIRTH_YEAR_MIN),
                max_value: Some(BIRTH_YEAR_MAX),
                allowed_values: None,
            },
            RegistryField::Birthplace => FieldRule::text(false, 200),
            RegistryField::Workplace => FieldRule::text(false, 200),
        }
    }
}

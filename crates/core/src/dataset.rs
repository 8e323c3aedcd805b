//! Tabular dataset reader.
//!
//! Reads the CSV layout written by the synthetic data generator (one row per encounter) and
//! turns each row into a validated [`ClinicalRecord`]. Empty lab cells mean "not measured".
//!
//! The reader accepts any [`std::io::Read`]; opening files and applying timeouts belong to the
//! caller.

use crate::constants::DATASET_LIST_DELIMITER;
use crate::error::{ClinragError, ClinragResult, ValidationError};
use crate::record::{
    ClinicalRecord, Gender, LabValues, Outcome, RecordInput, VisitType, VitalSigns,
};
use crate::validation::{
    Domain, DIASTOLIC_BP, HEART_RATE, OXYGEN_SATURATION, RESPIRATORY_RATE, SYSTOLIC_BP,
};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::Deserialize;

/// Columns every dataset must provide.
pub const REQUIRED_COLUMNS: [&str; 23] = [
    "patient_id",
    "visit_date",
    "age",
    "gender",
    "visit_type",
    "primary_symptom",
    "all_symptoms",
    "diagnosis",
    "treatment",
    "specialty",
    "systolic_bp",
    "diastolic_bp",
    "heart_rate",
    "temperature",
    "respiratory_rate",
    "oxygen_saturation",
    "glucose",
    "cholesterol",
    "hemoglobin",
    "clinical_note",
    "outcome",
    "risk_factors",
    "created_at",
];

/// What to do with a row that fails to parse or validate.
///
/// The policy applies to a whole batch; it is never chosen per row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RowPolicy {
    /// Stop at the first bad row.
    #[default]
    Abort,
    /// Drop bad rows and report them in [`LoadedDataset::rejected`].
    Skip,
}

impl RowPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            RowPolicy::Abort => "abort",
            RowPolicy::Skip => "skip",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Some(RowPolicy::Abort),
            "skip" => Some(RowPolicy::Skip),
            _ => None,
        }
    }
}

/// A row dropped under [`RowPolicy::Skip`].
#[derive(Debug)]
pub struct RejectedRow {
    /// Zero-based data row index, not counting the header.
    pub index: usize,
    pub error: ClinragError,
}

/// Result of reading a dataset.
#[derive(Debug, Default)]
pub struct LoadedDataset {
    /// Accepted records in source order.
    pub records: Vec<ClinicalRecord>,
    pub rejected: Vec<RejectedRow>,
}

#[derive(Debug, Deserialize)]
struct DatasetRow {
    patient_id: String,
    visit_date: String,
    age: i64,
    gender: String,
    visit_type: String,
    primary_symptom: String,
    #[serde(default)]
    all_symptoms: String,
    diagnosis: String,
    treatment: String,
    specialty: String,
    systolic_bp: f64,
    diastolic_bp: f64,
    heart_rate: f64,
    temperature: f64,
    respiratory_rate: f64,
    oxygen_saturation: f64,
    #[serde(default)]
    glucose: Option<String>,
    #[serde(default)]
    cholesterol: Option<String>,
    #[serde(default)]
    hemoglobin: Option<String>,
    clinical_note: String,
    outcome: String,
    #[serde(default)]
    risk_factors: String,
    created_at: String,
}

/// Reads every row of a CSV dataset.
///
/// # Errors
///
/// Returns a [`ClinragError`] if:
/// - the header cannot be read or lacks a required column,
/// - under [`RowPolicy::Abort`], any row is malformed ([`ClinragError::DatasetRow`]) or fails
///   record validation ([`ClinragError::Validation`]); both carry the row index.
pub fn read_records<R: std::io::Read>(
    reader: R,
    policy: RowPolicy,
) -> ClinragResult<LoadedDataset> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(ClinragError::DatasetHeader)?
        .clone();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|column| !headers.iter().any(|h| h == *column))
        .collect();
    if !missing.is_empty() {
        return Err(ClinragError::InvalidInput(format!(
            "dataset is missing required columns: {}",
            missing.join(", ")
        )));
    }

    let mut loaded = LoadedDataset::default();
    for (index, row) in csv_reader.deserialize::<DatasetRow>().enumerate() {
        let outcome = row
            .map_err(|source| ClinragError::DatasetRow { index, source })
            .and_then(|row| {
                row_to_record(row).map_err(|source| ClinragError::Validation { index, source })
            });

        match (outcome, policy) {
            (Ok(record), _) => loaded.records.push(record),
            (Err(error), RowPolicy::Abort) => return Err(error),
            (Err(error), RowPolicy::Skip) => {
                tracing::warn!(row = index, %error, "skipping invalid dataset row");
                loaded.rejected.push(RejectedRow { index, error });
            }
        }
    }

    tracing::info!(
        accepted = loaded.records.len(),
        rejected = loaded.rejected.len(),
        policy = policy.as_str(),
        "read clinical dataset"
    );
    Ok(loaded)
}

fn row_to_record(row: DatasetRow) -> Result<ClinicalRecord, ValidationError> {
    let primary_symptom = row.primary_symptom.trim().to_string();
    let mut secondary_symptoms = split_list(&row.all_symptoms);
    // The generator writes the primary symptom first; casing may differ.
    if secondary_symptoms
        .first()
        .is_some_and(|first| first.to_lowercase() == primary_symptom.to_lowercase())
    {
        secondary_symptoms.remove(0);
    }

    let input = RecordInput {
        patient_id: row.patient_id,
        visit_date: parse_date(&row.visit_date)?,
        age: row.age,
        gender: Gender::parse(&row.gender)?,
        visit_type: VisitType::parse(&row.visit_type)?,
        primary_symptom,
        secondary_symptoms,
        diagnosis: row.diagnosis,
        treatment: row.treatment,
        specialty: row.specialty,
        vitals: VitalSigns {
            systolic_bp: whole(SYSTOLIC_BP, row.systolic_bp)?,
            diastolic_bp: whole(DIASTOLIC_BP, row.diastolic_bp)?,
            heart_rate: whole(HEART_RATE, row.heart_rate)?,
            temperature_f: row.temperature,
            respiratory_rate: whole(RESPIRATORY_RATE, row.respiratory_rate)?,
            oxygen_saturation: whole(OXYGEN_SATURATION, row.oxygen_saturation)?,
        },
        labs: LabValues {
            glucose: lab_cell("glucose", row.glucose)?,
            cholesterol: lab_cell("cholesterol", row.cholesterol)?,
            hemoglobin: lab_cell("hemoglobin", row.hemoglobin)?,
        },
        clinical_note: row.clinical_note,
        outcome: Outcome::parse(&row.outcome)?,
        risk_factors: split_list(&row.risk_factors),
        created_at: parse_created_at(&row.created_at)?,
    };

    ClinicalRecord::new(input)
}

fn split_list(cell: &str) -> Vec<String> {
    cell.split(DATASET_LIST_DELIMITER)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| ValidationError::Unparseable {
        field: "visit_date",
        value: value.to_string(),
    })
}

/// Accepts RFC 3339, keeping its offset, or a naive ISO timestamp which is taken to be UTC.
fn parse_created_at(value: &str) -> Result<DateTime<FixedOffset>, ValidationError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed);
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc().fixed_offset())
        .map_err(|_| ValidationError::Unparseable {
            field: "created_at",
            value: value.to_string(),
        })
}

/// Integer vitals may arrive as `120` or `120.0`; fractional values are rejected.
fn whole<T: TryFrom<u16>>(domain: Domain, value: f64) -> Result<T, ValidationError> {
    domain.check(value)?;
    let unparseable = || ValidationError::Unparseable {
        field: domain.field,
        value: value.to_string(),
    };
    if value.fract() != 0.0 {
        return Err(unparseable());
    }
    T::try_from(value as u16).map_err(|_| unparseable())
}

/// Empty cells and `NaN` sentinels are absent values.
fn lab_cell(field: &'static str, cell: Option<String>) -> Result<Option<f64>, ValidationError> {
    let Some(cell) = cell else {
        return Ok(None);
    };
    let cell = cell.trim();
    if cell.is_empty() || cell.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    cell.parse::<f64>()
        .map(Some)
        .map_err(|_| ValidationError::Unparseable {
            field,
            value: cell.to_string(),
        })
}

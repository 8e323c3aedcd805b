//! Rendering of clinical records into retrieval-ready text.
//!
//! The rendered content is a pure function of the record: the same record always yields
//! byte-identical content and metadata, so downstream retrieval systems can cache on it.
//!
//! Content layout:
//! ```text
//! MEDICAL RECORD - <visit date>
//!
//! PATIENT INFORMATION:
//! - Age: <age> years
//! - Gender: <gender>
//! - Visit Type: <visit type>
//!
//! CLINICAL PRESENTATION:
//! - Primary Symptom: <primary symptom>
//! - All Symptoms: <symptom>; <symptom>; ...
//! - Diagnosis: <diagnosis>
//! - Specialty: <specialty>
//!
//! VITAL SIGNS:
//! - Blood Pressure: <systolic>/<diastolic> mmHg
//! - Heart Rate: <bpm> bpm
//! - Temperature: <temp>°F
//! - Respiratory Rate: <rate>/min
//! - Oxygen Saturation: <sat>%
//!
//! LABORATORY VALUES:
//! - Glucose: <value> mg/dL | Not measured
//! - Cholesterol: <value> mg/dL | Not measured
//! - Hemoglobin: <value> g/dL | Not measured
//!
//! TREATMENT & OUTCOME:
//! - Treatment: <treatment>
//! - Outcome: <outcome>
//! - Risk Factors: <factor>; <factor> | None documented
//!
//! CLINICAL NOTES:
//! <note>
//! ```

use crate::constants::{LIST_SEPARATOR, NONE_DOCUMENTED, NOT_MEASURED};
use crate::document::{DocumentMetadata, FormattedDocument};
use crate::error::FormattingError;
use crate::record::ClinicalRecord;
use clinrag_types::NonEmptyText;
use std::fmt::Write;

/// Service that turns validated records into formatted documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentFormatter;

impl DocumentFormatter {
    /// Creates a new `DocumentFormatter` instance.
    pub fn new() -> Self {
        Self
    }

    /// Renders `record` into content plus metadata.
    ///
    /// # Errors
    ///
    /// Returns a [`FormattingError`] if the template cannot be written or the rendered content is
    /// empty. Neither can happen for a record built by [`ClinicalRecord::new`].
    pub fn format(&self, record: &ClinicalRecord) -> Result<FormattedDocument, FormattingError> {
        Ok(FormattedDocument {
            patient_id: record.patient_id().clone(),
            content: self.render_content(record)?,
            metadata: self.metadata(record),
        })
    }

    /// Renders the multi-section text block for `record`.
    pub fn render_content(&self, record: &ClinicalRecord) -> Result<NonEmptyText, FormattingError> {
        let mut out = String::with_capacity(1024);
        let vitals = record.vitals();
        let labs = record.labs();

        writeln!(out, "MEDICAL RECORD - {}", record.visit_date().format("%Y-%m-%d"))?;
        writeln!(out)?;

        writeln!(out, "PATIENT INFORMATION:")?;
        writeln!(out, "- Age: {} years", record.age())?;
        writeln!(out, "- Gender: {}", record.gender())?;
        writeln!(out, "- Visit Type: {}", record.visit_type())?;
        writeln!(out)?;

        writeln!(out, "CLINICAL PRESENTATION:")?;
        writeln!(out, "- Primary Symptom: {}", record.primary_symptom())?;
        writeln!(out, "- All Symptoms: {}", join(record.all_symptoms()))?;
        writeln!(out, "- Diagnosis: {}", record.diagnosis())?;
        writeln!(out, "- Specialty: {}", record.specialty())?;
        writeln!(out)?;

        writeln!(out, "VITAL SIGNS:")?;
        writeln!(
            out,
            "- Blood Pressure: {}/{} mmHg",
            vitals.systolic_bp, vitals.diastolic_bp
        )?;
        writeln!(out, "- Heart Rate: {} bpm", vitals.heart_rate)?;
        writeln!(out, "- Temperature: {}°F", vitals.temperature_f)?;
        writeln!(out, "- Respiratory Rate: {}/min", vitals.respiratory_rate)?;
        writeln!(out, "- Oxygen Saturation: {}%", vitals.oxygen_saturation)?;
        writeln!(out)?;

        writeln!(out, "LABORATORY VALUES:")?;
        writeln!(out, "- Glucose: {}", lab_value(labs.glucose, "mg/dL"))?;
        writeln!(out, "- Cholesterol: {}", lab_value(labs.cholesterol, "mg/dL"))?;
        writeln!(out, "- Hemoglobin: {}", lab_value(labs.hemoglobin, "g/dL"))?;
        writeln!(out)?;

        writeln!(out, "TREATMENT & OUTCOME:")?;
        writeln!(out, "- Treatment: {}", record.treatment())?;
        writeln!(out, "- Outcome: {}", record.outcome())?;
        let risk_factors = if record.risk_factors().is_empty() {
            NONE_DOCUMENTED.to_string()
        } else {
            join(record.risk_factors().iter())
        };
        writeln!(out, "- Risk Factors: {}", risk_factors)?;
        writeln!(out)?;

        writeln!(out, "CLINICAL NOTES:")?;
        write!(out, "{}", record.clinical_note())?;

        NonEmptyText::new(out).map_err(|_| FormattingError::EmptyContent)
    }

    /// Copies the seven metadata fields from `record`. No derived fields are added.
    pub fn metadata(&self, record: &ClinicalRecord) -> DocumentMetadata {
        DocumentMetadata {
            visit_date: record.visit_date(),
            age: record.age(),
            gender: record.gender(),
            diagnosis: record.diagnosis().clone(),
            specialty: record.specialty().clone(),
            primary_symptom: record.primary_symptom().clone(),
            outcome: record.outcome(),
        }
    }
}

fn join<'a>(items: impl Iterator<Item = &'a NonEmptyText>) -> String {
    items
        .map(NonEmptyText::as_str)
        .collect::<Vec<_>>()
        .join(LIST_SEPARATOR)
}

fn lab_value(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{} {}", v, unit),
        None => NOT_MEASURED.to_string(),
    }
}

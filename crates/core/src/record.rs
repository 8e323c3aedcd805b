//! Clinical encounter record model.
//!
//! A [`ClinicalRecord`] can only be obtained through [`ClinicalRecord::new`], which validates
//! every field domain. Downstream stages (formatting, summaries) therefore never re-check
//! ranges or required text.

use crate::error::ValidationError;
use crate::validation::{
    validate_age, validate_visit_date, CHOLESTEROL, DIASTOLIC_BP, GLUCOSE, HEART_RATE,
    HEMOGLOBIN, OXYGEN_SATURATION, RESPIRATORY_RATE, SYSTOLIC_BP, TEMPERATURE_F,
};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use clinrag_types::NonEmptyText;
use std::collections::BTreeSet;

/// Patient gender as recorded at the encounter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }

    /// Parses a dataset or wire value, ignoring case and surrounding whitespace.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            _ => Err(ValidationError::UnknownVariant {
                field: "gender",
                value: s.to_string(),
            }),
        }
    }
}

/// Kind of encounter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VisitType {
    Outpatient,
    Inpatient,
    Emergency,
    Telehealth,
    FollowUp,
}

impl VisitType {
    pub fn as_str(self) -> &'static str {
        match self {
            VisitType::Outpatient => "Outpatient",
            VisitType::Inpatient => "Inpatient",
            VisitType::Emergency => "Emergency",
            VisitType::Telehealth => "Telehealth",
            VisitType::FollowUp => "Follow-up",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "outpatient" => Ok(VisitType::Outpatient),
            "inpatient" => Ok(VisitType::Inpatient),
            "emergency" => Ok(VisitType::Emergency),
            "telehealth" => Ok(VisitType::Telehealth),
            "follow-up" | "follow_up" | "followup" => Ok(VisitType::FollowUp),
            _ => Err(ValidationError::UnknownVariant {
                field: "visit_type",
                value: s.to_string(),
            }),
        }
    }
}

/// Encounter outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Outcome {
    Improved,
    Stable,
    Worsened,
    Resolved,
    Referred,
    Hospitalized,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Improved => "Improved",
            Outcome::Stable => "Stable",
            Outcome::Worsened => "Worsened",
            Outcome::Resolved => "Resolved",
            Outcome::Referred => "Referred",
            Outcome::Hospitalized => "Hospitalized",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "improved" => Ok(Outcome::Improved),
            "stable" => Ok(Outcome::Stable),
            "worsened" => Ok(Outcome::Worsened),
            "resolved" => Ok(Outcome::Resolved),
            "referred" => Ok(Outcome::Referred),
            "hospitalized" | "hospitalised" => Ok(Outcome::Hospitalized),
            _ => Err(ValidationError::UnknownVariant {
                field: "outcome",
                value: s.to_string(),
            }),
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),+) => {
        $(impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        })+
    };
}

display_as_str!(Gender, VisitType, Outcome);

/// The six vital signs taken at every encounter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VitalSigns {
    /// mmHg
    pub systolic_bp: u16,
    /// mmHg
    pub diastolic_bp: u16,
    /// beats per minute
    pub heart_rate: u16,
    /// degrees Fahrenheit
    pub temperature_f: f64,
    /// breaths per minute
    pub respiratory_rate: u16,
    /// percent
    pub oxygen_saturation: u8,
}

impl VitalSigns {
    fn validate(&self) -> Result<(), ValidationError> {
        SYSTOLIC_BP.check(f64::from(self.systolic_bp))?;
        DIASTOLIC_BP.check(f64::from(self.diastolic_bp))?;
        HEART_RATE.check(f64::from(self.heart_rate))?;
        TEMPERATURE_F.check(self.temperature_f)?;
        RESPIRATORY_RATE.check(f64::from(self.respiratory_rate))?;
        OXYGEN_SATURATION.check(f64::from(self.oxygen_saturation))
    }
}

/// Optional laboratory values. `None` means "not measured", which is distinct from zero.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LabValues {
    /// mg/dL
    pub glucose: Option<f64>,
    /// mg/dL
    pub cholesterol: Option<f64>,
    /// g/dL
    pub hemoglobin: Option<f64>,
}

impl LabValues {
    fn validate(&self) -> Result<(), ValidationError> {
        GLUCOSE.check_optional(self.glucose)?;
        CHOLESTEROL.check_optional(self.cholesterol)?;
        HEMOGLOBIN.check_optional(self.hemoglobin)
    }
}

/// Unvalidated field values for a [`ClinicalRecord`].
#[derive(Clone, Debug, PartialEq)]
pub struct RecordInput {
    pub patient_id: String,
    pub visit_date: NaiveDate,
    pub age: i64,
    pub gender: Gender,
    pub visit_type: VisitType,
    pub primary_symptom: String,
    pub secondary_symptoms: Vec<String>,
    pub diagnosis: String,
    pub treatment: String,
    pub specialty: String,
    pub vitals: VitalSigns,
    pub labs: LabValues,
    pub clinical_note: String,
    pub outcome: Outcome,
    pub risk_factors: Vec<String>,
    /// Creation timestamp with the offset it was recorded in.
    pub created_at: DateTime<FixedOffset>,
}

/// One validated clinical encounter.
#[derive(Clone, Debug, PartialEq)]
pub struct ClinicalRecord {
    patient_id: NonEmptyText,
    visit_date: NaiveDate,
    age: u8,
    gender: Gender,
    visit_type: VisitType,
    primary_symptom: NonEmptyText,
    secondary_symptoms: Vec<NonEmptyText>,
    diagnosis: NonEmptyText,
    treatment: NonEmptyText,
    specialty: NonEmptyText,
    vitals: VitalSigns,
    labs: LabValues,
    clinical_note: NonEmptyText,
    outcome: Outcome,
    risk_factors: BTreeSet<NonEmptyText>,
    created_at: DateTime<FixedOffset>,
}

fn required(field: &'static str, value: String) -> Result<NonEmptyText, ValidationError> {
    NonEmptyText::new(value).map_err(|_| ValidationError::EmptyField(field))
}

impl ClinicalRecord {
    /// Validates `input` and builds a record.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if:
    /// - the age is outside 0..=130,
    /// - the visit date is before 1900-01-01 or after the creation date,
    /// - any vital sign or present lab value is outside its plausible range,
    /// - the clinical note or any other required text field is empty,
    /// - a secondary symptom or risk factor entry is empty.
    pub fn new(input: RecordInput) -> Result<Self, ValidationError> {
        let age = validate_age(input.age)?;
        validate_visit_date(input.visit_date, &input.created_at)?;
        input.vitals.validate()?;
        input.labs.validate()?;

        let clinical_note = NonEmptyText::new(input.clinical_note)
            .map_err(|_| ValidationError::EmptyClinicalNote)?;

        let secondary_symptoms = input
            .secondary_symptoms
            .into_iter()
            .map(|s| required("secondary_symptoms", s))
            .collect::<Result<Vec<_>, _>>()?;

        let risk_factors = input
            .risk_factors
            .into_iter()
            .map(|s| required("risk_factors", s))
            .collect::<Result<BTreeSet<_>, _>>()?;

        Ok(Self {
            patient_id: required("patient_id", input.patient_id)?,
            visit_date: input.visit_date,
            age,
            gender: input.gender,
            visit_type: input.visit_type,
            primary_symptom: required("primary_symptom", input.primary_symptom)?,
            secondary_symptoms,
            diagnosis: required("diagnosis", input.diagnosis)?,
            treatment: required("treatment", input.treatment)?,
            specialty: required("specialty", input.specialty)?,
            vitals: input.vitals,
            labs: input.labs,
            clinical_note,
            outcome: input.outcome,
            risk_factors,
            created_at: input.created_at,
        })
    }

    pub fn patient_id(&self) -> &NonEmptyText {
        &self.patient_id
    }

    pub fn visit_date(&self) -> NaiveDate {
        self.visit_date
    }

    pub fn age(&self) -> u8 {
        self.age
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn visit_type(&self) -> VisitType {
        self.visit_type
    }

    pub fn primary_symptom(&self) -> &NonEmptyText {
        &self.primary_symptom
    }

    pub fn secondary_symptoms(&self) -> &[NonEmptyText] {
        &self.secondary_symptoms
    }

    /// Primary symptom followed by the secondary symptoms, in recorded order.
    pub fn all_symptoms(&self) -> impl Iterator<Item = &NonEmptyText> {
        std::iter::once(&self.primary_symptom).chain(self.secondary_symptoms.iter())
    }

    pub fn diagnosis(&self) -> &NonEmptyText {
        &self.diagnosis
    }

    pub fn treatment(&self) -> &NonEmptyText {
        &self.treatment
    }

    pub fn specialty(&self) -> &NonEmptyText {
        &self.specialty
    }

    pub fn vitals(&self) -> &VitalSigns {
        &self.vitals
    }

    pub fn labs(&self) -> &LabValues {
        &self.labs
    }

    pub fn clinical_note(&self) -> &NonEmptyText {
        &self.clinical_note
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Risk factors in sorted order. Duplicates in the input collapse to one entry.
    pub fn risk_factors(&self) -> &BTreeSet<NonEmptyText> {
        &self.risk_factors
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at.with_timezone(&Utc)
    }

    /// Calendar date of creation in the offset the timestamp was recorded in.
    pub fn created_on(&self) -> NaiveDate {
        self.created_at.date_naive()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use chrono::TimeZone;

    /// A valid input that individual tests tweak.
    pub(crate) fn sample_input() -> RecordInput {
        RecordInput {
            patient_id: "6f1c2a9e-3b1d-4c55-9a1e-0d2f7c1b8e44".into(),
            visit_date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            age: 45,
            gender: Gender::Male,
            visit_type: VisitType::Outpatient,
            primary_symptom: "Chest pain".into(),
            secondary_symptoms: vec!["Fatigue".into(), "Sweating".into()],
            diagnosis: "Hypertension".into(),
            treatment: "Blood pressure monitoring".into(),
            specialty: "Cardiology".into(),
            vitals: VitalSigns {
                systolic_bp: 150,
                diastolic_bp: 95,
                heart_rate: 88,
                temperature_f: 98.6,
                respiratory_rate: 16,
                oxygen_saturation: 97,
            },
            labs: LabValues {
                glucose: Some(110.0),
                cholesterol: Some(210.0),
                hemoglobin: Some(13.5),
            },
            clinical_note: "Patient presents with chest pain for 3 days. Recommend follow-up."
                .into(),
            outcome: Outcome::Improved,
            risk_factors: vec!["Smoking".into(), "Family History".into()],
            created_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap().fixed_offset(),
        }
    }

    pub(crate) fn sample_record() -> ClinicalRecord {
        ClinicalRecord::new(sample_input()).expect("sample input is valid")
    }

    pub(crate) fn record_with(edit: impl FnOnce(&mut RecordInput)) -> ClinicalRecord {
        let mut input = sample_input();
        edit(&mut input);
        ClinicalRecord::new(input).expect("edited input is valid")
    }
}

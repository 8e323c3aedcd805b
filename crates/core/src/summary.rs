//! Dataset and collection statistics.
//!
//! Both summaries are pure functions of their input and serialize to JSON for the CLI.

use crate::document::DocumentCollection;
use crate::record::ClinicalRecord;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// How many entries the "top" lists keep.
pub const TOP_N: usize = 10;

/// How many specialties the specialty ranking keeps.
pub const TOP_SPECIALTIES: usize = 8;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AgeStats {
    pub min: u8,
    pub max: u8,
    pub mean: f64,
    pub median: f64,
}

impl AgeStats {
    fn from_ages(ages: impl Iterator<Item = u8>) -> Option<Self> {
        let mut ages: Vec<u8> = ages.collect();
        if ages.is_empty() {
            return None;
        }
        ages.sort_unstable();

        let count = ages.len();
        let sum: u64 = ages.iter().map(|&age| u64::from(age)).sum();
        let middle = count / 2;
        let median = if count % 2 == 0 {
            (f64::from(ages[middle - 1]) + f64::from(ages[middle])) / 2.0
        } else {
            f64::from(ages[middle])
        };

        Some(AgeStats {
            min: ages[0],
            max: ages[count - 1],
            mean: sum as f64 / count as f64,
            median,
        })
    }
}

/// Mean, spread and range of one measured quantity.
///
/// `std_dev` is the sample standard deviation (n - 1 denominator), `0.0` for a single value.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NumericStats {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl NumericStats {
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let values: Vec<f64> = values.into_iter().collect();
        if values.is_empty() {
            return None;
        }

        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let std_dev = if count < 2 {
            0.0
        } else {
            let squares: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (squares / (count - 1) as f64).sqrt()
        };
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Some(NumericStats {
            count,
            mean,
            std_dev,
            min,
            max,
        })
    }
}

/// Statistics for each vital sign. `None` only for an empty dataset.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct VitalStats {
    pub systolic_bp: Option<NumericStats>,
    pub diastolic_bp: Option<NumericStats>,
    pub heart_rate: Option<NumericStats>,
    pub temperature: Option<NumericStats>,
    pub respiratory_rate: Option<NumericStats>,
    pub oxygen_saturation: Option<NumericStats>,
}

impl VitalStats {
    fn from_records(records: &[ClinicalRecord]) -> Self {
        let stats = |value: fn(&ClinicalRecord) -> f64| {
            NumericStats::from_values(records.iter().map(value))
        };
        Self {
            systolic_bp: stats(|r| f64::from(r.vitals().systolic_bp)),
            diastolic_bp: stats(|r| f64::from(r.vitals().diastolic_bp)),
            heart_rate: stats(|r| f64::from(r.vitals().heart_rate)),
            temperature: stats(|r| r.vitals().temperature_f),
            respiratory_rate: stats(|r| f64::from(r.vitals().respiratory_rate)),
            oxygen_saturation: stats(|r| f64::from(r.vitals().oxygen_saturation)),
        }
    }
}

/// Statistics over the measured values of each lab. Unmeasured labs are left out, so
/// `count` is the number of records with the value present.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LabStats {
    pub glucose: Option<NumericStats>,
    pub cholesterol: Option<NumericStats>,
    pub hemoglobin: Option<NumericStats>,
}

impl LabStats {
    fn from_records(records: &[ClinicalRecord]) -> Self {
        let stats = |value: fn(&ClinicalRecord) -> Option<f64>| {
            NumericStats::from_values(records.iter().filter_map(value))
        };
        Self {
            glucose: stats(|r| r.labs().glucose),
            cholesterol: stats(|r| r.labs().cholesterol),
            hemoglobin: stats(|r| r.labs().hemoglobin),
        }
    }
}

/// Count of records with each lab value measured.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LabAvailability {
    pub glucose: usize,
    pub cholesterol: usize,
    pub hemoglobin: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub earliest: NaiveDate,
    pub latest: NaiveDate,
}

/// A value and how often it occurs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Ranked {
    pub value: String,
    pub count: usize,
}

/// Statistics over a set of validated records.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub total_records: usize,
    pub age: Option<AgeStats>,
    pub gender_distribution: BTreeMap<String, usize>,
    pub visit_type_distribution: BTreeMap<String, usize>,
    pub outcome_distribution: BTreeMap<String, usize>,
    pub top_diagnoses: Vec<Ranked>,
    pub top_primary_symptoms: Vec<Ranked>,
    pub top_specialties: Vec<Ranked>,
    pub top_risk_factors: Vec<Ranked>,
    pub vitals: VitalStats,
    pub labs: LabStats,
    pub lab_availability: LabAvailability,
    pub unique_diagnoses: usize,
    pub unique_symptoms: usize,
    pub visit_dates: Option<DateRange>,
}

impl DatasetSummary {
    pub fn from_records(records: &[ClinicalRecord]) -> Self {
        let mut gender_distribution = BTreeMap::new();
        let mut visit_type_distribution = BTreeMap::new();
        let mut outcome_distribution = BTreeMap::new();
        let mut diagnoses: BTreeMap<&str, usize> = BTreeMap::new();
        let mut primary_symptoms: BTreeMap<&str, usize> = BTreeMap::new();
        let mut specialties: BTreeMap<&str, usize> = BTreeMap::new();
        let mut risk_factors: BTreeMap<&str, usize> = BTreeMap::new();
        let mut symptoms = BTreeSet::new();
        let mut labs = LabAvailability::default();
        let mut visit_dates: Option<DateRange> = None;

        for record in records {
            *gender_distribution
                .entry(record.gender().to_string())
                .or_insert(0) += 1;
            *visit_type_distribution
                .entry(record.visit_type().to_string())
                .or_insert(0) += 1;
            *outcome_distribution
                .entry(record.outcome().to_string())
                .or_insert(0) += 1;
            *diagnoses.entry(record.diagnosis().as_str()).or_insert(0) += 1;
            *primary_symptoms
                .entry(record.primary_symptom().as_str())
                .or_insert(0) += 1;
            *specialties.entry(record.specialty().as_str()).or_insert(0) += 1;
            for factor in record.risk_factors() {
                *risk_factors.entry(factor.as_str()).or_insert(0) += 1;
            }
            symptoms.extend(record.all_symptoms().map(|s| s.as_str()));

            let measured = record.labs();
            labs.glucose += usize::from(measured.glucose.is_some());
            labs.cholesterol += usize::from(measured.cholesterol.is_some());
            labs.hemoglobin += usize::from(measured.hemoglobin.is_some());

            let date = record.visit_date();
            visit_dates = Some(match visit_dates {
                None => DateRange {
                    earliest: date,
                    latest: date,
                },
                Some(range) => DateRange {
                    earliest: range.earliest.min(date),
                    latest: range.latest.max(date),
                },
            });
        }

        Self {
            total_records: records.len(),
            age: AgeStats::from_ages(records.iter().map(ClinicalRecord::age)),
            gender_distribution,
            visit_type_distribution,
            outcome_distribution,
            unique_diagnoses: diagnoses.len(),
            unique_symptoms: symptoms.len(),
            top_diagnoses: top_n(diagnoses, TOP_N),
            top_primary_symptoms: top_n(primary_symptoms, TOP_N),
            top_specialties: top_n(specialties, TOP_SPECIALTIES),
            top_risk_factors: top_n(risk_factors, TOP_N),
            vitals: VitalStats::from_records(records),
            labs: LabStats::from_records(records),
            lab_availability: labs,
            visit_dates,
        }
    }
}

/// Statistics over an ingested document collection.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CollectionSummary {
    pub total_documents: usize,
    pub age: Option<AgeStats>,
    pub gender_distribution: BTreeMap<String, usize>,
    pub specialty_distribution: BTreeMap<String, usize>,
    pub unique_diagnoses: usize,
    /// Mean content length in characters, `0.0` for an empty collection.
    pub average_content_length: f64,
}

impl CollectionSummary {
    pub fn from_collection(collection: &DocumentCollection) -> Self {
        let mut gender_distribution = BTreeMap::new();
        let mut specialty_distribution = BTreeMap::new();
        let mut diagnoses = BTreeSet::new();
        let mut total_chars = 0usize;

        for document in collection {
            let meta = document.metadata();
            *gender_distribution
                .entry(meta.gender.to_string())
                .or_insert(0) += 1;
            *specialty_distribution
                .entry(meta.specialty.to_string())
                .or_insert(0) += 1;
            diagnoses.insert(meta.diagnosis.as_str());
            total_chars += document.content().chars().count();
        }

        let average_content_length = if collection.is_empty() {
            0.0
        } else {
            total_chars as f64 / collection.len() as f64
        };

        Self {
            total_documents: collection.len(),
            age: AgeStats::from_ages(collection.iter().map(|d| d.metadata().age)),
            gender_distribution,
            specialty_distribution,
            unique_diagnoses: diagnoses.len(),
            average_content_length,
        }
    }
}

/// Most frequent first; ties broken alphabetically.
fn top_n(counts: BTreeMap<&str, usize>, limit: usize) -> Vec<Ranked> {
    let mut ranked: Vec<Ranked> = counts
        .into_iter()
        .map(|(value, count)| Ranked {
            value: value.to_string(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
    ranked.truncate(limit);
    ranked
}

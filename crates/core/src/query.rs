//! Metadata filters and the benchmark query catalogue.
//!
//! Filtering is a smoke test for retrieval readiness, not retrieval itself: matches are
//! case-insensitive substring tests against a single metadata field, results keep source order
//! and are not ranked.
//!
//! An empty or whitespace-only term matches every document. Callers that need strict matching
//! must validate the term before calling.

use crate::constants::BENCHMARK_CATALOGUE_VERSION;
use crate::document::{Document, DocumentCollection};
use crate::error::{ClinragError, ClinragResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Metadata field a filter can match against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetadataField {
    Diagnosis,
    PrimarySymptom,
    Specialty,
    Outcome,
    Gender,
}

impl MetadataField {
    fn value(self, document: &Document) -> &str {
        let meta = document.metadata();
        match self {
            MetadataField::Diagnosis => meta.diagnosis.as_str(),
            MetadataField::PrimarySymptom => meta.primary_symptom.as_str(),
            MetadataField::Specialty => meta.specialty.as_str(),
            MetadataField::Outcome => meta.outcome.as_str(),
            MetadataField::Gender => meta.gender.as_str(),
        }
    }
}

/// Documents whose `field` contains `term`, ignoring case.
pub fn filter_by_field(
    collection: &DocumentCollection,
    field: MetadataField,
    term: &str,
) -> DocumentCollection {
    let needle = term.trim().to_lowercase();
    let filtered = if needle.is_empty() {
        collection.clone()
    } else {
        collection.retain_matching(|doc| field.value(doc).to_lowercase().contains(&needle))
    };

    tracing::debug!(
        ?field,
        term,
        matched = filtered.len(),
        total = collection.len(),
        "filtered documents"
    );
    filtered
}

/// Documents whose diagnosis contains `term`, ignoring case.
pub fn filter_by_diagnosis(collection: &DocumentCollection, term: &str) -> DocumentCollection {
    filter_by_field(collection, MetadataField::Diagnosis, term)
}

/// Documents whose primary symptom contains `term`, ignoring case.
pub fn filter_by_symptom(collection: &DocumentCollection, term: &str) -> DocumentCollection {
    filter_by_field(collection, MetadataField::PrimarySymptom, term)
}

/// Category of a benchmark query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryCategory {
    Symptoms,
    Treatment,
    Emergency,
    RiskFactors,
    SymptomSearch,
    Medications,
    NormalValues,
    Diagnosis,
    SideEffects,
    Referral,
}

impl QueryCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            QueryCategory::Symptoms => "symptoms",
            QueryCategory::Treatment => "treatment",
            QueryCategory::Emergency => "emergency",
            QueryCategory::RiskFactors => "risk_factors",
            QueryCategory::SymptomSearch => "symptom_search",
            QueryCategory::Medications => "medications",
            QueryCategory::NormalValues => "normal_values",
            QueryCategory::Diagnosis => "diagnosis",
            QueryCategory::SideEffects => "side_effects",
            QueryCategory::Referral => "referral",
        }
    }
}

impl std::fmt::Display for QueryCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One benchmark query used by external evaluation harnesses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuerySpec {
    pub query: String,
    pub category: QueryCategory,
    pub expected_topics: BTreeSet<String>,
}

impl QuerySpec {
    fn new(query: &str, category: QueryCategory, topics: &[&str]) -> Self {
        Self {
            query: query.to_string(),
            category,
            expected_topics: topics.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// Versioned envelope used when the catalogue is serialized.
#[derive(Debug, Serialize)]
struct Catalogue<'a> {
    version: u32,
    queries: &'a [QuerySpec],
}

/// The fixed benchmark query catalogue, in stable order.
///
/// The content is part of the public contract; changing it requires bumping
/// [`BENCHMARK_CATALOGUE_VERSION`].
pub fn benchmark_queries() -> Vec<QuerySpec> {
    use QueryCategory::*;

    vec![
        QuerySpec::new(
            "What are the symptoms of diabetes?",
            Symptoms,
            &["diabetes", "symptoms", "glucose"],
        ),
        QuerySpec::new(
            "How is hypertension typically treated?",
            Treatment,
            &["hypertension", "blood pressure", "treatment"],
        ),
        QuerySpec::new(
            "What vital signs indicate emergency care?",
            Emergency,
            &["vital signs", "emergency", "critical values"],
        ),
        QuerySpec::new(
            "What are common risk factors for heart disease?",
            RiskFactors,
            &["heart disease", "risk factors", "cardiovascular"],
        ),
        QuerySpec::new(
            "Show me cases with chest pain and shortness of breath",
            SymptomSearch,
            &["chest pain", "shortness of breath", "cardiac"],
        ),
        QuerySpec::new(
            "What medications are commonly prescribed for anxiety?",
            Medications,
            &["anxiety", "medications", "treatment"],
        ),
        QuerySpec::new(
            "What are normal ranges for blood pressure?",
            NormalValues,
            &["blood pressure", "normal", "ranges"],
        ),
        QuerySpec::new(
            "How do you diagnose sleep apnea?",
            Diagnosis,
            &["sleep apnea", "diagnosis", "symptoms"],
        ),
        QuerySpec::new(
            "What are the side effects of insulin therapy?",
            SideEffects,
            &["insulin", "side effects", "diabetes"],
        ),
        QuerySpec::new(
            "When should someone see a cardiologist?",
            Referral,
            &["cardiology", "heart", "referral"],
        ),
    ]
}

/// The catalogue as pretty JSON, `{"version": 1, "queries": [...]}`.
pub fn benchmark_queries_json() -> ClinragResult<String> {
    let queries = benchmark_queries();
    serde_json::to_string_pretty(&Catalogue {
        version: BENCHMARK_CATALOGUE_VERSION,
        queries: &queries,
    })
    .map_err(ClinragError::Serialization)
}

//! Serialized form of a document collection.
//!
//! This module provides:
//! - a strict wire model for each exported document,
//! - translation helpers between the wire model and [`Document`],
//! - export/import in pretty JSON, JSON Lines and YAML.
//!
//! Each entry has the shape
//! `{id, patient_id, content, metadata: {visit_date, age, gender, diagnosis, specialty,
//! primary_symptom, outcome}}`. Import is the exact inverse of export for identifier, content and
//! metadata; unknown keys are rejected.

use crate::document::{
    Document, DocumentCollection, DocumentId, DocumentMetadata, FormattedDocument,
};
use crate::error::{ClinragError, ClinragResult, DeserializationError};
use crate::record::{Gender, Outcome};
use crate::validation::{validate_age, validate_visit_date_floor};
use chrono::NaiveDate;
use clinrag_types::NonEmptyText;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Serialization format of an exported collection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    /// A single pretty-printed JSON array.
    #[default]
    Json,
    /// One compact JSON object per line.
    JsonLines,
    /// A YAML sequence.
    Yaml,
}

impl ExportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::JsonLines => "jsonl",
            ExportFormat::Yaml => "yaml",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Some(ExportFormat::Json),
            "jsonl" | "ndjson" | "json-lines" => Some(ExportFormat::JsonLines),
            "yaml" | "yml" => Some(ExportFormat::Yaml),
            _ => None,
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serializes `collection` in the requested format.
///
/// # Errors
///
/// Returns [`ClinragError::Serialization`] or [`ClinragError::YamlSerialization`] if the
/// serializer fails.
pub fn export(collection: &DocumentCollection, format: ExportFormat) -> ClinragResult<String> {
    let wires: Vec<DocumentWire> = collection.iter().map(domain_to_wire).collect();

    let output = match format {
        ExportFormat::Json => {
            let mut text =
                serde_json::to_string_pretty(&wires).map_err(ClinragError::Serialization)?;
            text.push('\n');
            text
        }
        ExportFormat::JsonLines => {
            let mut text = String::new();
            for wire in &wires {
                text.push_str(&serde_json::to_string(wire).map_err(ClinragError::Serialization)?);
                text.push('\n');
            }
            text
        }
        ExportFormat::Yaml => {
            serde_yaml::to_string(&wires).map_err(ClinragError::YamlSerialization)?
        }
    };

    tracing::debug!(documents = wires.len(), format = %format, "exported document collection");
    Ok(output)
}

/// Parses a collection previously produced by [`export`].
///
/// # Errors
///
/// Returns [`ClinragError::Deserialization`] if:
/// - the text is not well-formed for the format,
/// - a required key is missing, an unknown key is present, or a value has the wrong type,
/// - an identifier is not of the form `med_record_<index>` or occurs twice,
/// - a date, gender, outcome or age is not valid,
/// - a required text value is empty.
pub fn import(text: &str, format: ExportFormat) -> ClinragResult<DocumentCollection> {
    let located: Vec<(String, DocumentWire)> = match format {
        ExportFormat::Json => {
            let mut de = serde_json::Deserializer::from_str(text);
            let wires: Vec<DocumentWire> = serde_path_to_error::deserialize(&mut de)
                .map_err(|err| path_error("", err))?;
            de.end()
                .map_err(|err| DeserializationError::new("", err.to_string()))?;
            indexed(wires)
        }
        ExportFormat::JsonLines => {
            let mut located = Vec::new();
            for (line_index, line) in text.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                let location = format!("line {}", line_index + 1);
                let mut de = serde_json::Deserializer::from_str(line);
                let wire: DocumentWire = serde_path_to_error::deserialize(&mut de)
                    .map_err(|err| path_error(&location, err))?;
                de.end()
                    .map_err(|err| DeserializationError::new(location.as_str(), err.to_string()))?;
                located.push((location, wire));
            }
            located
        }
        ExportFormat::Yaml => {
            let de = serde_yaml::Deserializer::from_str(text);
            let wires: Vec<DocumentWire> =
                serde_path_to_error::deserialize(de).map_err(|err| path_error("", err))?;
            indexed(wires)
        }
    };

    let mut seen = HashSet::with_capacity(located.len());
    let mut documents = Vec::with_capacity(located.len());
    for (location, wire) in located {
        let document = wire_to_domain(&location, wire)?;
        if !seen.insert(document.id()) {
            return Err(DeserializationError::new(
                format!("{location}.id"),
                format!("duplicate document id {}", document.id()),
            )
            .into());
        }
        documents.push(document);
    }

    tracing::debug!(documents = documents.len(), format = %format, "imported document collection");
    Ok(DocumentCollection::from_documents(documents))
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct DocumentWire {
    id: String,
    patient_id: String,
    content: String,
    metadata: MetadataWire,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct MetadataWire {
    visit_date: String,
    age: i64,
    gender: String,
    diagnosis: String,
    specialty: String,
    primary_symptom: String,
    outcome: String,
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

fn indexed(wires: Vec<DocumentWire>) -> Vec<(String, DocumentWire)> {
    wires
        .into_iter()
        .enumerate()
        .map(|(i, wire)| (format!("[{i}]"), wire))
        .collect()
}

fn path_error<E: std::fmt::Display>(
    prefix: &str,
    err: serde_path_to_error::Error<E>,
) -> DeserializationError {
    let path = match err.path().to_string() {
        root if root == "." => String::new(),
        path => path,
    };
    let source = err.into_inner();
    let location = match (prefix.is_empty(), path.is_empty()) {
        (true, _) => path,
        (false, true) => prefix.to_string(),
        (false, false) => format!("{prefix}: {path}"),
    };
    DeserializationError::new(location, source.to_string())
}

fn text_field(
    location: &str,
    field: &str,
    value: String,
) -> Result<NonEmptyText, DeserializationError> {
    NonEmptyText::new(value)
        .map_err(|e| DeserializationError::new(format!("{location}.{field}"), e.to_string()))
}

fn wire_to_domain(location: &str, wire: DocumentWire) -> Result<Document, DeserializationError> {
    let id = DocumentId::parse(&wire.id).ok_or_else(|| {
        DeserializationError::new(
            format!("{location}.id"),
            format!("expected med_record_<index>, got {:?}", wire.id),
        )
    })?;

    let meta = wire.metadata;
    let meta_location = format!("{location}.metadata");

    let visit_date = NaiveDate::parse_from_str(&meta.visit_date, "%Y-%m-%d")
        .map_err(|e| e.to_string())
        .and_then(|date| {
            validate_visit_date_floor(date)
                .map(|()| date)
                .map_err(|e| e.to_string())
        })
        .map_err(|message| {
            DeserializationError::new(format!("{meta_location}.visit_date"), message)
        })?;
    let age = validate_age(meta.age)
        .map_err(|e| DeserializationError::new(format!("{meta_location}.age"), e.to_string()))?;
    let gender = Gender::parse(&meta.gender)
        .map_err(|e| DeserializationError::new(format!("{meta_location}.gender"), e.to_string()))?;
    let outcome = Outcome::parse(&meta.outcome)
        .map_err(|e| DeserializationError::new(format!("{meta_location}.outcome"), e.to_string()))?;

    let metadata = DocumentMetadata {
        visit_date,
        age,
        gender,
        diagnosis: text_field(&meta_location, "diagnosis", meta.diagnosis)?,
        specialty: text_field(&meta_location, "specialty", meta.specialty)?,
        primary_symptom: text_field(&meta_location, "primary_symptom", meta.primary_symptom)?,
        outcome,
    };

    Ok(Document::new(
        id,
        FormattedDocument {
            patient_id: text_field(location, "patient_id", wire.patient_id)?,
            content: text_field(location, "content", wire.content)?,
            metadata,
        },
    ))
}

fn domain_to_wire(document: &Document) -> DocumentWire {
    let meta = document.metadata();
    DocumentWire {
        id: document.id().to_string(),
        patient_id: document.patient_id().to_string(),
        content: document.content().to_string(),
        metadata: MetadataWire {
            visit_date: meta.visit_date.format("%Y-%m-%d").to_string(),
            age: i64::from(meta.age),
            gender: meta.gender.as_str().to_string(),
            diagnosis: meta.diagnosis.to_string(),
            specialty: meta.specialty.to_string(),
            primary_symptom: meta.primary_symptom.to_string(),
            outcome: meta.outcome.as_str().to_string(),
        },
    }
}

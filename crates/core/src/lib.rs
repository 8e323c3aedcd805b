//! # ClinRAG Core
//!
//! Core logic for turning clinical encounter records into retrieval-ready documents.
//!
//! This crate contains pure data operations:
//! - Validated clinical records and the CSV dataset reader
//! - Deterministic document formatting and the in-memory document store
//! - Export and import of document collections (JSON, JSON Lines, YAML)
//! - Metadata filters, the benchmark query catalogue and summary statistics
//!
//! **No process concerns**: reading environment variables, opening files and logging setup belong
//! in the binaries.

pub mod config;
pub mod constants;
pub mod dataset;
pub mod document;
pub mod error;
pub mod export;
pub mod formatter;
pub mod query;
pub mod record;
pub mod store;
pub mod summary;
pub mod validation;

pub use config::PipelineConfig;
pub use dataset::{read_records, LoadedDataset, RejectedRow, RowPolicy};
pub use document::{Document, DocumentCollection, DocumentId, DocumentMetadata};
pub use error::{
    ClinragError, ClinragResult, DeserializationError, FormattingError, ValidationError,
};
pub use export::{export, import, ExportFormat};
pub use formatter::DocumentFormatter;
pub use query::{
    benchmark_queries, benchmark_queries_json, filter_by_diagnosis, filter_by_field,
    filter_by_symptom, MetadataField, QueryCategory, QuerySpec,
};
pub use record::{
    ClinicalRecord, Gender, LabValues, Outcome, RecordInput, VisitType, VitalSigns,
};
pub use store::{ingest, ingest_parallel, DocumentStore};
pub use summary::{CollectionSummary, DatasetSummary};

//! Document ingestion and the in-memory document store.
//!
//! Ingestion formats records in input order and numbers the resulting documents by position.
//! The store holds one published collection at a time; a rebuild replaces it wholesale by
//! swapping the shared snapshot, so readers never observe a partially built collection.

use crate::document::{Document, DocumentCollection, DocumentId};
use crate::error::{ClinragError, ClinragResult};
use crate::formatter::DocumentFormatter;
use crate::record::ClinicalRecord;
use rayon::prelude::*;
use std::sync::{Arc, PoisonError, RwLock};

fn format_at(
    formatter: &DocumentFormatter,
    index: usize,
    record: &ClinicalRecord,
) -> ClinragResult<Document> {
    formatter
        .format(record)
        .map(|formatted| Document::new(DocumentId::from_index(index), formatted))
        .map_err(|source| ClinragError::Formatting { index, source })
}

/// Formats every record in input order, assigning `med_record_<index>` identifiers.
///
/// # Errors
///
/// Returns [`ClinragError::Formatting`] carrying the index of the first record that could not be
/// formatted. Formatting failures indicate a programming fault, so the whole batch is abandoned.
pub fn ingest(records: &[ClinicalRecord]) -> ClinragResult<DocumentCollection> {
    let formatter = DocumentFormatter::new();
    let documents = records
        .iter()
        .enumerate()
        .map(|(index, record)| format_at(&formatter, index, record))
        .collect::<ClinragResult<Vec<_>>>()?;

    tracing::debug!(documents = documents.len(), "ingested records");
    Ok(DocumentCollection::from_documents(documents))
}

/// Parallel variant of [`ingest`]. Produces exactly the same collection.
pub fn ingest_parallel(records: &[ClinicalRecord]) -> ClinragResult<DocumentCollection> {
    let formatter = DocumentFormatter::new();
    let documents = records
        .par_iter()
        .enumerate()
        .map(|(index, record)| format_at(&formatter, index, record))
        .collect::<ClinragResult<Vec<_>>>()?;

    tracing::debug!(documents = documents.len(), "ingested records in parallel");
    Ok(DocumentCollection::from_documents(documents))
}

/// Holds the currently published document collection.
///
/// There is no update or delete: each ingestion batch replaces the collection.
#[derive(Debug, Default)]
pub struct DocumentStore {
    current: RwLock<Arc<DocumentCollection>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a new collection from `records` and publishes it once complete.
    ///
    /// On error the previously published collection stays in place.
    pub fn ingest(
        &self,
        records: &[ClinicalRecord],
        parallel: bool,
    ) -> ClinragResult<Arc<DocumentCollection>> {
        let collection = if parallel {
            ingest_parallel(records)?
        } else {
            ingest(records)?
        };
        Ok(self.publish(collection))
    }

    /// Replaces the published collection, for example with one loaded from an export.
    pub fn publish(&self, collection: DocumentCollection) -> Arc<DocumentCollection> {
        let collection = Arc::new(collection);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::clone(&collection);
        tracing::info!(documents = collection.len(), "published document collection");
        collection
    }

    /// The currently published collection. Later publications do not affect it.
    pub fn snapshot(&self) -> Arc<DocumentCollection> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    pub fn get(&self, id: DocumentId) -> Option<Document> {
        self.snapshot().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}

//! Retrieval-ready documents and ordered document collections.

use crate::constants::DOCUMENT_ID_PREFIX;
use crate::record::{Gender, Outcome};
use chrono::NaiveDate;
use clinrag_types::NonEmptyText;

/// Identifier of a document, `med_record_<index>`.
///
/// The index is the zero-based position of the source record in the ingested batch, so the
/// identifier is only as stable as the order of the source rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(usize);

impl DocumentId {
    pub fn from_index(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }

    /// Parses the canonical `med_record_<index>` form.
    ///
    /// Leading zeros, signs and surrounding whitespace are rejected so that every identifier has
    /// exactly one textual form.
    pub fn parse(s: &str) -> Option<Self> {
        let digits = s.strip_prefix(DOCUMENT_ID_PREFIX)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if digits.len() > 1 && digits.starts_with('0') {
            return None;
        }
        digits.parse().ok().map(Self)
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", DOCUMENT_ID_PREFIX, self.0)
    }
}

/// Structured metadata copied verbatim from seven record fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentMetadata {
    pub visit_date: NaiveDate,
    pub age: u8,
    pub gender: Gender,
    pub diagnosis: NonEmptyText,
    pub specialty: NonEmptyText,
    pub primary_symptom: NonEmptyText,
    pub outcome: Outcome,
}

/// Formatter output before an identifier has been assigned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormattedDocument {
    pub patient_id: NonEmptyText,
    pub content: NonEmptyText,
    pub metadata: DocumentMetadata,
}

/// The retrieval-ready projection of exactly one clinical record.
///
/// Documents are immutable; re-rendering a record produces a new document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    id: DocumentId,
    patient_id: NonEmptyText,
    content: NonEmptyText,
    metadata: DocumentMetadata,
}

impl Document {
    pub fn new(id: DocumentId, formatted: FormattedDocument) -> Self {
        Self {
            id,
            patient_id: formatted.patient_id,
            content: formatted.content,
            metadata: formatted.metadata,
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn patient_id(&self) -> &NonEmptyText {
        &self.patient_id
    }

    pub fn content(&self) -> &str {
        self.content.as_str()
    }

    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }
}

/// Ordered sequence of documents. Order reflects source record order, not relevance.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DocumentCollection {
    documents: Vec<Document>,
}

impl DocumentCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_documents(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Document> {
        self.documents.iter()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn get(&self, id: DocumentId) -> Option<&Document> {
        self.documents.iter().find(|doc| doc.id == id)
    }

    /// Subsequence of documents satisfying `keep`, in original relative order.
    pub fn retain_matching(&self, mut keep: impl FnMut(&Document) -> bool) -> Self {
        Self {
            documents: self
                .documents
                .iter()
                .filter(|doc| keep(doc))
                .cloned()
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a DocumentCollection {
    type Item = &'a Document;
    type IntoIter = std::slice::Iter<'a, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.iter()
    }
}

impl IntoIterator for DocumentCollection {
    type Item = Document;
    type IntoIter = std::vec::IntoIter<Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_id_round_trips_through_text() {
        let id = DocumentId::from_index(42);
        assert_eq!(id.to_string(), "med_record_42");
        assert_eq!(DocumentId::parse("med_record_42"), Some(id));
        assert_eq!(DocumentId::parse("med_record_0"), Some(DocumentId::from_index(0)));
    }

    #[test]
    fn document_id_rejects_non_canonical_forms() {
        for bad in [
            "med_record_",
            "med_record_007",
            "med_record_-1",
            "med_record_+1",
            "record_1",
            " med_record_1",
            "med_record_1a",
        ] {
            assert_eq!(DocumentId::parse(bad), None, "{bad} should be rejected");
        }
    }
}

//! Constants used throughout the ClinRAG core crate.
//!
//! Template tokens, identifier prefixes and default locations live here so that the formatter,
//! the store and the binaries agree on them.

/// Prefix of every document identifier (`med_record_<index>`).
pub const DOCUMENT_ID_PREFIX: &str = "med_record_";

/// Rendered in place of a lab value that was not measured.
pub const NOT_MEASURED: &str = "Not measured";

/// Rendered in place of an empty risk-factor set.
pub const NONE_DOCUMENTED: &str = "None documented";

/// Separator used when rendering symptom and risk-factor lists.
pub const LIST_SEPARATOR: &str = "; ";

/// Separator used by the tabular dataset for multi-valued cells.
pub const DATASET_LIST_DELIMITER: char = ';';

/// Default location of the source dataset when no explicit path is configured.
pub const DEFAULT_DATASET_PATH: &str = "data/clinical_data_5000.csv";

/// Default location of the exported document collection.
pub const DEFAULT_EXPORT_PATH: &str = "data/rag_documents.json";

/// Version of the benchmark query catalogue. Bump when the catalogue content changes.
pub const BENCHMARK_CATALOGUE_VERSION: u32 = 1;

/// Inclusive age domain in years.
pub const MIN_AGE: i64 = 0;
pub const MAX_AGE: i64 = 130;

/// Earliest visit date accepted by the record model.
pub const EARLIEST_VISIT_DATE: (i32, u32, u32) = (1900, 1, 1);

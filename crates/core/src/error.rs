/// A record field value fell outside its declared domain, or a required field was empty.
///
/// Raised by [`crate::record::ClinicalRecord::new`] and never reaches the formatter.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("age {0} is outside the supported range 0..=130")]
    AgeOutOfRange(i64),
    #[error("visit date {visit_date} is outside the supported range ({reason})")]
    VisitDateOutOfRange {
        visit_date: chrono::NaiveDate,
        reason: &'static str,
    },
    #[error("{field} value {value} is outside the plausible range {min}..={max}")]
    ValueOutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("{0} must be a finite number")]
    NotFinite(&'static str),
    #[error("clinical note cannot be empty")]
    EmptyClinicalNote,
    #[error("{0} cannot be empty")]
    EmptyField(&'static str),
    #[error("unrecognised {field}: {value:?}")]
    UnknownVariant { field: &'static str, value: String },
    #[error("{field} could not be parsed from {value:?}")]
    Unparseable { field: &'static str, value: String },
}

/// The formatter received a record it cannot render.
///
/// Record construction guarantees every required field, so this indicates a programming fault
/// rather than a data-quality problem.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormattingError {
    #[error("failed to write document template")]
    Template(#[from] std::fmt::Error),
    #[error("rendered document content is empty")]
    EmptyContent,
}

/// A serialized document collection could not be read back.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{location}: {message}")]
pub struct DeserializationError {
    /// Best-effort location of the failure, for example `[3].metadata.age` or `line 4: id`.
    pub location: String,
    pub message: String,
}

impl DeserializationError {
    pub fn new(location: impl Into<String>, message: impl Into<String>) -> Self {
        let location = location.into();
        Self {
            location: if location.is_empty() {
                "<root>".into()
            } else {
                location
            },
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClinragError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("record {index}: {source}")]
    Validation {
        index: usize,
        #[source]
        source: ValidationError,
    },
    #[error("record {index}: {source}")]
    Formatting {
        index: usize,
        #[source]
        source: FormattingError,
    },
    #[error("failed to import document collection at {0}")]
    Deserialization(#[from] DeserializationError),
    #[error("failed to read dataset row {index}: {source}")]
    DatasetRow {
        index: usize,
        #[source]
        source: csv::Error,
    },
    #[error("failed to read dataset header: {0}")]
    DatasetHeader(csv::Error),
    #[error("failed to serialize document collection: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to serialize YAML: {0}")]
    YamlSerialization(serde_yaml::Error),
}

impl ClinragError {
    /// Index of the originating record or dataset row, when the error is tied to one.
    pub fn record_index(&self) -> Option<usize> {
        match self {
            ClinragError::Validation { index, .. }
            | ClinragError::Formatting { index, .. }
            | ClinragError::DatasetRow { index, .. } => Some(*index),
            _ => None,
        }
    }
}

pub type ClinragResult<T> = std::result::Result<T, ClinragError>;

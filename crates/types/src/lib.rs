//! Shared validated primitives for the ClinRAG workspace.
//!
//! Clinical text fields (identifiers, diagnoses, symptoms, notes) must never be blank once they
//! reach the document pipeline. [`NonEmptyText`] carries that guarantee in the type.

/// Rejection reasons for clinical text values.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// Nothing was left after trimming surrounding whitespace.
    #[error("text must contain at least one non-whitespace character")]
    Empty,
}

/// Trimmed text with at least one character.
///
/// Ordering is lexicographic on the trimmed value, so sets of `NonEmptyText` (risk factors,
/// unique diagnoses) iterate in a stable order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Trims `input` and rejects it if nothing is left.
    ///
    /// # Arguments
    ///
    /// * `input` - Raw text, typically a dataset cell or an imported field value
    ///
    /// # Returns
    ///
    /// `Ok(NonEmptyText)` holding the trimmed text, or `Err(TextError::Empty)` when the input is
    /// empty or whitespace only.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        match input.as_ref().trim() {
            "" => Err(TextError::Empty),
            text => Ok(Self(text.to_owned())),
        }
    }

    /// Borrows the trimmed text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper, returning the owned trimmed text.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::str::FromStr for NonEmptyText {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Blank strings in imported documents fail deserialization at their own path.
impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

//! Pipeline runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the pipeline. The
//! `*_from_env_value` helpers take the raw variable value so callers decide when the process
//! environment is read.

use crate::constants::{DEFAULT_DATASET_PATH, DEFAULT_EXPORT_PATH};
use crate::dataset::RowPolicy;
use crate::error::{ClinragError, ClinragResult};
use crate::export::ExportFormat;
use std::path::{Path, PathBuf};

/// Pipeline configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    dataset_path: PathBuf,
    export_path: PathBuf,
    export_format: ExportFormat,
    row_policy: RowPolicy,
    parallel: bool,
}

impl PipelineConfig {
    /// Create a new `PipelineConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`ClinragError::InvalidInput`] if either path is empty or both point at the same
    /// file.
    pub fn new(
        dataset_path: PathBuf,
        export_path: PathBuf,
        export_format: ExportFormat,
        row_policy: RowPolicy,
        parallel: bool,
    ) -> ClinragResult<Self> {
        if dataset_path.as_os_str().is_empty() {
            return Err(ClinragError::InvalidInput(
                "dataset path cannot be empty".into(),
            ));
        }
        if export_path.as_os_str().is_empty() {
            return Err(ClinragError::InvalidInput(
                "export path cannot be empty".into(),
            ));
        }
        if dataset_path == export_path {
            return Err(ClinragError::InvalidInput(
                "export path must differ from the dataset path".into(),
            ));
        }

        Ok(Self {
            dataset_path,
            export_path,
            export_format,
            row_policy,
            parallel,
        })
    }

    pub fn dataset_path(&self) -> &Path {
        &self.dataset_path
    }

    pub fn export_path(&self) -> &Path {
        &self.export_path
    }

    pub fn export_format(&self) -> ExportFormat {
        self.export_format
    }

    pub fn row_policy(&self) -> RowPolicy {
        self.row_policy
    }

    pub fn parallel(&self) -> bool {
        self.parallel
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Dataset path from an optional value, defaulting to [`DEFAULT_DATASET_PATH`].
pub fn dataset_path_from_env_value(value: Option<String>) -> PathBuf {
    PathBuf::from(non_blank(value).unwrap_or_else(|| DEFAULT_DATASET_PATH.to_string()))
}

/// Export path from an optional value, defaulting to [`DEFAULT_EXPORT_PATH`].
pub fn export_path_from_env_value(value: Option<String>) -> PathBuf {
    PathBuf::from(non_blank(value).unwrap_or_else(|| DEFAULT_EXPORT_PATH.to_string()))
}

/// Parse the export format. `None` or blank selects [`ExportFormat::Json`].
pub fn export_format_from_env_value(value: Option<String>) -> ClinragResult<ExportFormat> {
    match non_blank(value) {
        None => Ok(ExportFormat::default()),
        Some(v) => ExportFormat::parse(&v).ok_or_else(|| {
            ClinragError::InvalidInput(format!(
                "unknown export format '{v}' (expected json, jsonl or yaml)"
            ))
        }),
    }
}

/// Parse the row policy. `None` or blank selects [`RowPolicy::Abort`].
pub fn row_policy_from_env_value(value: Option<String>) -> ClinragResult<RowPolicy> {
    match non_blank(value) {
        None => Ok(RowPolicy::default()),
        Some(v) => RowPolicy::parse(&v).ok_or_else(|| {
            ClinragError::InvalidInput(format!(
                "unknown row policy '{v}' (expected abort or skip)"
            ))
        }),
    }
}

/// Parse a boolean flag. Accepts `1/0`, `true/false`, `yes/no`, `on/off`; blank is `false`.
pub fn parallel_from_env_value(value: Option<String>) -> ClinragResult<bool> {
    let Some(v) = non_blank(value) else {
        return Ok(false);
    };
    match v.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ClinragError::InvalidInput(format!(
            "invalid parallel flag '{v}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_default_when_unset_or_blank() {
        assert_eq!(
            dataset_path_from_env_value(None),
            PathBuf::from(DEFAULT_DATASET_PATH)
        );
        assert_eq!(
            export_path_from_env_value(Some("  ".into())),
            PathBuf::from(DEFAULT_EXPORT_PATH)
        );
        assert_eq!(
            dataset_path_from_env_value(Some(" /tmp/data.csv ".into())),
            PathBuf::from("/tmp/data.csv")
        );
    }

    #[test]
    fn export_format_parses_known_values() {
        assert_eq!(export_format_from_env_value(None).expect("default"), ExportFormat::Json);
        assert_eq!(
            export_format_from_env_value(Some("JSONL".into())).expect("jsonl"),
            ExportFormat::JsonLines
        );
        assert_eq!(
            export_format_from_env_value(Some("yaml".into())).expect("yaml"),
            ExportFormat::Yaml
        );
        assert!(matches!(
            export_format_from_env_value(Some("xml".into())),
            Err(ClinragError::InvalidInput(_))
        ));
    }

    #[test]
    fn row_policy_defaults_to_abort() {
        assert_eq!(row_policy_from_env_value(None).expect("default"), RowPolicy::Abort);
        assert_eq!(
            row_policy_from_env_value(Some("Skip".into())).expect("skip"),
            RowPolicy::Skip
        );
        assert!(row_policy_from_env_value(Some("ignore".into())).is_err());
    }

    #[test]
    fn parallel_flag_parsing() {
        assert!(!parallel_from_env_value(None).expect("default"));
        assert!(parallel_from_env_value(Some("true".into())).expect("true"));
        assert!(parallel_from_env_value(Some("1".into())).expect("1"));
        assert!(!parallel_from_env_value(Some("off".into())).expect("off"));
        assert!(parallel_from_env_value(Some("maybe".into())).is_err());
    }

    #[test]
    fn config_rejects_empty_and_clashing_paths() {
        let ok = PipelineConfig::new(
            "in.csv".into(),
            "out.json".into(),
            ExportFormat::Json,
            RowPolicy::Skip,
            true,
        )
        .expect("valid config");
        assert_eq!(ok.dataset_path(), Path::new("in.csv"));
        assert_eq!(ok.row_policy(), RowPolicy::Skip);
        assert!(ok.parallel());

        assert!(PipelineConfig::new(
            PathBuf::new(),
            "out.json".into(),
            ExportFormat::Json,
            RowPolicy::Abort,
            false
        )
        .is_err());
        assert!(PipelineConfig::new(
            "same".into(),
            "same".into(),
            ExportFormat::Json,
            RowPolicy::Abort,
            false
        )
        .is_err());
    }
}

use anyhow::Context;
use std::fs::File;
use std::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clinrag_core::config::{
    dataset_path_from_env_value, export_format_from_env_value, export_path_from_env_value,
    parallel_from_env_value, row_policy_from_env_value,
};
use clinrag_core::{
    export, read_records, CollectionSummary, DatasetSummary, DocumentStore, PipelineConfig,
};

/// Counts reported by a pipeline run.
#[derive(Debug, PartialEq, Eq)]
struct RunReport {
    documents: usize,
    rejected_rows: usize,
}

/// Resolve the pipeline configuration from process environment variables.
///
/// # Environment Variables
/// - `CLINRAG_DATASET_PATH`: CSV dataset to read (default: "data/clinical_data_5000.csv")
/// - `CLINRAG_EXPORT_PATH`: where to write the collection (default: "data/rag_documents.json")
/// - `CLINRAG_EXPORT_FORMAT`: `json`, `jsonl` or `yaml` (default: `json`)
/// - `CLINRAG_ROW_POLICY`: `abort` or `skip` (default: `abort`)
/// - `CLINRAG_PARALLEL`: format records on all cores (default: `false`)
fn config_from_env() -> anyhow::Result<PipelineConfig> {
    let config = PipelineConfig::new(
        dataset_path_from_env_value(std::env::var("CLINRAG_DATASET_PATH").ok()),
        export_path_from_env_value(std::env::var("CLINRAG_EXPORT_PATH").ok()),
        export_format_from_env_value(std::env::var("CLINRAG_EXPORT_FORMAT").ok())?,
        row_policy_from_env_value(std::env::var("CLINRAG_ROW_POLICY").ok())?,
        parallel_from_env_value(std::env::var("CLINRAG_PARALLEL").ok())?,
    )?;
    Ok(config)
}

/// Load the dataset, ingest it into a fresh store and write the export.
fn run_pipeline(config: &PipelineConfig) -> anyhow::Result<RunReport> {
    let dataset = config.dataset_path();
    let file = File::open(dataset).with_context(|| format!("opening {}", dataset.display()))?;
    let loaded = read_records(BufReader::new(file), config.row_policy())?;

    let dataset_summary = DatasetSummary::from_records(&loaded.records);
    tracing::info!(
        records = dataset_summary.total_records,
        rejected = loaded.rejected.len(),
        unique_diagnoses = dataset_summary.unique_diagnoses,
        unique_symptoms = dataset_summary.unique_symptoms,
        "loaded dataset"
    );

    let store = DocumentStore::new();
    let collection = store.ingest(&loaded.records, config.parallel())?;
    let collection_summary = CollectionSummary::from_collection(&collection);
    tracing::info!(
        documents = collection_summary.total_documents,
        average_content_length = collection_summary.average_content_length,
        "ingested documents"
    );

    let text = export(&collection, config.export_format())?;
    let export_path = config.export_path();
    if let Some(parent) = export_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    std::fs::write(export_path, text)
        .with_context(|| format!("writing {}", export_path.display()))?;
    tracing::info!(
        path = %export_path.display(),
        format = %config.export_format(),
        "exported document collection"
    );

    Ok(RunReport {
        documents: collection.len(),
        rejected_rows: loaded.rejected.len(),
    })
}

/// Batch entry point: CSV dataset in, exported document collection out.
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("clinrag=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config_from_env()?;
    tracing::info!(
        dataset = %config.dataset_path().display(),
        export = %config.export_path().display(),
        row_policy = config.row_policy().as_str(),
        parallel = config.parallel(),
        "starting pipeline"
    );

    let report = run_pipeline(&config)?;
    tracing::info!(
        documents = report.documents,
        rejected_rows = report.rejected_rows,
        "pipeline finished"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinrag_core::{import, ExportFormat, RowPolicy};

    const DATASET: &str = "patient_id,visit_date,age,gender,visit_type,primary_symptom,all_symptoms,diagnosis,treatment,specialty,systolic_bp,diastolic_bp,heart_rate,temperature,respiratory_rate,oxygen_saturation,glucose,cholesterol,hemoglobin,clinical_note,outcome,risk_factors,created_at
p-1,2024-03-15,45,Male,Outpatient,Chest pain,Chest pain; Fatigue,Hypertension,Medication therapy,Cardiology,140,90,80,98.6,16,98,,210.0,,Chest pain on exertion.,Improved,Smoking,2024-06-01T10:15:30
p-2,2024-02-01,200,Female,Emergency,Fever,Fever,Influenza,Rest and observation,Internal Medicine,120,80,72,101.2,18,96,,,,Febrile.,Resolved,,2024-06-01T10:15:30
p-3,2023-11-02,70,Female,Follow-up,Fatigue,Fatigue,Anemia,Blood tests,Hematology,120,80,72,98.2,14,99,95,,11.2,Follow-up for anemia.,Stable,,2024-06-01T10:15:30
";

    fn write_dataset(dir: &std::path::Path) -> std::path::PathBuf {
        let path = dir.join("dataset.csv");
        std::fs::write(&path, DATASET).expect("write dataset");
        path
    }

    #[test]
    fn pipeline_writes_importable_export() {
        let dir = tempfile::tempdir().expect("tempdir");
        let dataset = write_dataset(dir.path());
        let export_path = dir.path().join("out").join("docs.jsonl");

        let config = PipelineConfig::new(
            dataset,
            export_path.clone(),
            ExportFormat::JsonLines,
            RowPolicy::Skip,
            false,
        )
        .expect("config");

        let report = run_pipeline(&config).expect("pipeline runs");
        assert_eq!(
            report,
            RunReport {
                documents: 2,
                rejected_rows: 1
            }
        );

        let text = std::fs::read_to_string(&export_path).expect("export written");
        let collection = import(&text, ExportFormat::JsonLines).expect("export imports");
        let ids: Vec<String> = collection.iter().map(|d| d.id().to_string()).collect();
        assert_eq!(ids, vec!["med_record_0", "med_record_1"]);
        assert_eq!(collection.documents()[1].patient_id().as_str(), "p-3");
    }

    #[test]
    fn abort_policy_stops_before_writing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let dataset = write_dataset(dir.path());
        let export_path = dir.path().join("docs.json");

        let config = PipelineConfig::new(
            dataset,
            export_path.clone(),
            ExportFormat::Json,
            RowPolicy::Abort,
            true,
        )
        .expect("config");

        let err = run_pipeline(&config).expect_err("invalid age aborts");
        assert!(err.to_string().contains("record 1"));
        assert!(!export_path.exists());
    }

    #[test]
    fn missing_dataset_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = PipelineConfig::new(
            dir.path().join("absent.csv"),
            dir.path().join("docs.json"),
            ExportFormat::Json,
            RowPolicy::Abort,
            false,
        )
        .expect("config");

        let err = run_pipeline(&config).expect_err("missing file");
        assert!(err.to_string().contains("absent.csv"));
    }
}

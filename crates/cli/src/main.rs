use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use clinrag_core::{
    benchmark_queries_json, export, filter_by_field, import, read_records, CollectionSummary,
    DatasetSummary, DocumentStore, ExportFormat, LoadedDataset, MetadataField, RowPolicy,
};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "clinrag")]
#[command(about = "Clinical record to retrieval document pipeline CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Json,
    Jsonl,
    Yaml,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => ExportFormat::Json,
            FormatArg::Jsonl => ExportFormat::JsonLines,
            FormatArg::Yaml => ExportFormat::Yaml,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Read a CSV dataset, format every record and write the document collection
    Ingest {
        /// Path to the CSV dataset
        dataset: PathBuf,
        /// Where to write the exported collection
        #[arg(long)]
        output: PathBuf,
        /// Export format
        #[arg(long, value_enum, default_value = "json")]
        format: FormatArg,
        /// Drop invalid rows instead of aborting
        #[arg(long)]
        skip_invalid: bool,
        /// Format records on all cores
        #[arg(long)]
        parallel: bool,
    },
    /// Filter an exported collection by one metadata field
    Filter {
        /// Path to an exported collection
        export: PathBuf,
        /// Format of the export
        #[arg(long, value_enum, default_value = "json")]
        format: FormatArg,
        /// Diagnosis substring
        #[arg(long, group = "field")]
        diagnosis: Option<String>,
        /// Primary symptom substring
        #[arg(long, group = "field")]
        symptom: Option<String>,
        /// Specialty substring
        #[arg(long, group = "field")]
        specialty: Option<String>,
        /// Outcome substring
        #[arg(long, group = "field")]
        outcome: Option<String>,
    },
    /// Print the benchmark query catalogue as JSON
    Queries,
    /// Print dataset statistics as JSON
    Summary {
        /// Path to the CSV dataset
        dataset: PathBuf,
        /// Drop invalid rows instead of aborting
        #[arg(long)]
        skip_invalid: bool,
    },
}

fn row_policy(skip_invalid: bool) -> RowPolicy {
    if skip_invalid {
        RowPolicy::Skip
    } else {
        RowPolicy::Abort
    }
}

fn load_dataset(path: &Path, policy: RowPolicy) -> anyhow::Result<LoadedDataset> {
    tracing::debug!(path = %path.display(), policy = policy.as_str(), "loading dataset");
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let loaded = read_records(BufReader::new(file), policy)
        .with_context(|| format!("reading {}", path.display()))?;
    for rejected in &loaded.rejected {
        eprintln!("Skipped row {}: {}", rejected.index, rejected.error);
    }
    Ok(loaded)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("clinrag=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Ingest {
            dataset,
            output,
            format,
            skip_invalid,
            parallel,
        }) => {
            let loaded = load_dataset(&dataset, row_policy(skip_invalid))?;
            let store = DocumentStore::new();
            let collection = store.ingest(&loaded.records, parallel)?;
            let text = export(&collection, format.into())?;
            std::fs::write(&output, text)
                .with_context(|| format!("writing {}", output.display()))?;
            println!(
                "Wrote {} documents to {} ({} rows skipped)",
                collection.len(),
                output.display(),
                loaded.rejected.len()
            );
        }
        Some(Commands::Filter {
            export: path,
            format,
            diagnosis,
            symptom,
            specialty,
            outcome,
        }) => {
            let (field, term) = match (diagnosis, symptom, specialty, outcome) {
                (Some(term), _, _, _) => (MetadataField::Diagnosis, term),
                (_, Some(term), _, _) => (MetadataField::PrimarySymptom, term),
                (_, _, Some(term), _) => (MetadataField::Specialty, term),
                (_, _, _, Some(term)) => (MetadataField::Outcome, term),
                _ => anyhow::bail!(
                    "one of --diagnosis, --symptom, --specialty or --outcome is required"
                ),
            };
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let collection = import(&text, format.into())?;
            let matched = filter_by_field(&collection, field, &term);
            for document in &matched {
                let meta = document.metadata();
                println!(
                    "{}: {} | {} | {} | {}",
                    document.id(),
                    meta.diagnosis,
                    meta.primary_symptom,
                    meta.specialty,
                    meta.outcome
                );
            }
            println!("{} of {} documents matched", matched.len(), collection.len());
        }
        Some(Commands::Queries) => {
            println!("{}", benchmark_queries_json()?);
        }
        Some(Commands::Summary {
            dataset,
            skip_invalid,
        }) => {
            let loaded = load_dataset(&dataset, row_policy(skip_invalid))?;
            let summary = DatasetSummary::from_records(&loaded.records);
            println!("{}", serde_json::to_string_pretty(&summary)?);

            let collection = DocumentStore::new().ingest(&loaded.records, true)?;
            let documents = CollectionSummary::from_collection(&collection);
            println!("{}", serde_json::to_string_pretty(&documents)?);
        }
        None => {
            println!("Use 'clinrag --help' for commands");
        }
    }

    Ok(())
}

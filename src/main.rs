use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use diagram_model::diagram::Warning;
use diagram_model::persistence::{FileSink, PersistError, SnapshotSink};
use diagram_model::serialize::serialize_element;
use diagram_model::{Diagram, ModelError, registry};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("model rejected: {0}")]
    Model(#[from] ModelError),
    #[error("write failed: {0}")]
    Write(#[from] PersistError),
}

#[derive(Parser, Debug)]
#[command(name = "diagram-model", about = "Inspect and normalize diagram model files")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print one default element per kind as JSON.
    Palette,
    /// Import a model file and report orphaned elements.
    Validate { file: PathBuf },
    /// Import a model file, lay out every container and export it again.
    Normalize {
        input: PathBuf,
        /// Output file; stdout when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    // Logs go to stderr so stdout stays valid JSON.
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Palette => {
            let palette: Vec<Value> = registry::palette().iter().map(serialize_element).collect();
            println!("{}", serde_json::to_string_pretty(&palette)?);
        }
        Command::Validate { file } => {
            let diagram = load(&file).await?;
            let warnings = diagram.warnings();
            for warning in &warnings {
                match warning {
                    Warning::Orphan(id) => println!("warning: element {id} has no owning container"),
                }
            }
            println!(
                "ok: {} elements, {} relationships, {} warnings",
                diagram.element_count(),
                diagram.relationship_count(),
                warnings.len()
            );
        }
        Command::Normalize { input, output } => {
            let mut diagram = load(&input).await?;
            diagram.relayout_all();
            let model = diagram.to_model()?;
            match output {
                Some(path) => {
                    FileSink::new(&path).write(&model).await?;
                    tracing::info!(path = %path.display(), "normalized model written");
                }
                None => println!("{}", serde_json::to_string_pretty(&model)?),
            }
        }
    }
    Ok(())
}

async fn load(path: &Path) -> Result<Diagram, CliError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::Read { path: path.to_path_buf(), source })?;
    let value: Value = serde_json::from_str(&raw)?;
    Ok(Diagram::from_model(&value)?)
}

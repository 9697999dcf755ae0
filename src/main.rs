// src/main.rs
use std::fs;
use std::path::PathBuf;

use clap::Parser;

use soi_extractor::pipeline::Pipeline;
use soi_extractor::utils::{self, AppError};

/// Command Line Interface for the Schedule of Investments extractor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a locally saved filing document (inline-tagged HTML)
    #[arg(short, long)]
    input: PathBuf,

    /// Filer dialect used to parse holding descriptions
    #[arg(short, long, default_value = "default")]
    filer: String,

    /// Write records to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(short, long)]
    pretty: bool,
}

fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting extraction for args: {:?}", args);

    // 3. Build the pipeline for the requested filer dialect
    let pipeline = Pipeline::for_filer(&args.filer)?;

    // 4. Read the filing body
    let body = fs::read_to_string(&args.input)?;
    tracing::info!("Read filing document ({} bytes)", body.len());

    // 5. Run the extraction
    let extraction = pipeline.extract(&body);
    if extraction.records.is_empty() {
        tracing::warn!(
            "No records extracted from {}; an HTML-table fallback may be needed",
            args.input.display()
        );
    }
    for diagnostic in &extraction.diagnostics {
        tracing::warn!(
            "Diagnostic [{}]: {} ({})",
            diagnostic.context_ref.as_deref().unwrap_or("-"),
            diagnostic.kind,
            diagnostic.detail
        );
    }

    // 6. Serialize and write the records
    let json = if args.pretty {
        serde_json::to_string_pretty(&extraction.records)?
    } else {
        serde_json::to_string(&extraction.records)?
    };

    match &args.output {
        Some(path) => {
            fs::write(path, &json)?;
            tracing::info!("Saved records to: {}", path.display());
        }
        None => println!("{json}"),
    }

    tracing::info!(
        "Extraction finished. Records: {}, Diagnostics: {}",
        extraction.records.len(),
        extraction.diagnostics.len()
    );

    Ok(())
}

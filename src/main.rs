// ==============================================================================
// main.rs - Summary Statistics Merger Entry Point
// ==============================================================================
// Description: Command-line entry point for filtering and merging GWAS sources
// Author: Matt Barham
// Created: 2025-11-20
// Modified: 2025-11-21
// Version: 1.1.0
// ==============================================================================

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod chromosome;
mod codec;
mod config;
mod merge;
mod models;
mod parsers;
mod processor;

use processor::{MergeProcessor, SourceSpec};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Source to merge, as CONFIG_JSON=DATA_FILE (repeatable)
    #[arg(long = "input", value_name = "CONFIG=DATA", required = true)]
    inputs: Vec<String>,

    /// Output path for the merged table
    #[arg(short, long)]
    output: PathBuf,

    /// Output field delimiter (tab or comma)
    #[arg(long, default_value = "tab")]
    delimiter: String,

    /// Prepend chromosome/position/ref/alt columns to each output row
    #[arg(long)]
    cpra: bool,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sumstats_merger=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Summary statistics merger starting...");

    let args = Args::parse();

    let delimiter = match args.delimiter.to_lowercase().as_str() {
        "tab" => "\t".to_string(),
        "comma" => ",".to_string(),
        other => anyhow::bail!("Unsupported delimiter '{}' (expected tab or comma)", other),
    };

    let mut sources = Vec::with_capacity(args.inputs.len());
    for input in &args.inputs {
        let (config, data) = input.split_once('=').ok_or_else(|| {
            anyhow::anyhow!("Invalid --input '{}' (expected CONFIG_JSON=DATA_FILE)", input)
        })?;
        sources.push(SourceSpec {
            config_path: PathBuf::from(config),
            data_path: PathBuf::from(data),
        });
    }

    let processor = MergeProcessor::new(sources, args.output, delimiter, args.cpra);

    match processor.process() {
        Ok(output_path) => {
            info!("Merge completed successfully: {:?}", output_path);
            Ok(())
        }
        Err(error) => {
            tracing::warn!("Merge failed: {}", error);
            Err(error)
        }
    }
}

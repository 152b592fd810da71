// ==============================================================================
// processor.rs - Summary Statistics Merge Pipeline
// ==============================================================================
// Description: End-to-end filter/extract/merge across multiple summary sources
// Author: Matt Barham
// Created: 2025-11-20
// Modified: 2025-11-21
// Version: 1.1.0
// ==============================================================================
// Per source: resolve columns from the file's header line, filter variants by
// significance, extract one block, serialize it. Then merge all blocks into a
// single NA-padded output table.
// ==============================================================================

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::codec::marshal_blocks;
use crate::config::{parse_file_configuration, resolve_columns};
use crate::merge::{header_line, merged_rows};
use crate::models::SummaryBlock;
use crate::parsers::{collect_partitions, collect_variants};

/// One summary-statistic source: its JSON configuration and its data file
#[derive(Debug, Clone)]
pub struct SourceSpec {
    pub config_path: PathBuf,
    pub data_path: PathBuf,
}

pub struct MergeProcessor {
    sources: Vec<SourceSpec>,
    output_path: PathBuf,
    delimiter: String,
    include_cpra: bool,
}

impl MergeProcessor {
    pub fn new(
        sources: Vec<SourceSpec>,
        output_path: PathBuf,
        delimiter: String,
        include_cpra: bool,
    ) -> Self {
        Self {
            sources,
            output_path,
            delimiter,
            include_cpra,
        }
    }

    /// Main processing pipeline
    ///
    /// Each source keeps its own configured delimiter for parsing and key
    /// construction; `delimiter` only shapes the merged output. With
    /// `include_cpra`, sources should be configured with the same delimiter
    /// as the output so key components split cleanly.
    pub fn process(&self) -> Result<PathBuf> {
        info!("Merging {} summary-statistic sources", self.sources.len());

        // 1. Filter and extract one block per source
        let mut blocks = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            let block = self
                .process_source(source)
                .with_context(|| format!("Failed to process source {:?}", source.data_path))?;
            blocks.push(block);
        }

        // 2. Serialize blocks to the binary interchange format
        let blobs = marshal_blocks(&blocks).context("Failed to serialize blocks")?;
        debug!("Serialized {} blocks", blobs.len());

        // 3. Merge into the aligned output table
        let header = header_line(&blobs, &self.delimiter)?;
        let rows = merged_rows(&blobs, &self.delimiter, self.include_cpra)?;
        info!("Merged table: {} variants", rows.len());

        // 4. Write the output table
        let mut writer = std::io::BufWriter::new(
            fs::File::create(&self.output_path)
                .with_context(|| format!("Failed to create output {:?}", self.output_path))?,
        );
        writeln!(writer, "{}", header)?;
        for row in &rows {
            writeln!(writer, "{}", row)?;
        }
        writer.flush()?;

        info!("Wrote merged table to {:?}", self.output_path);
        Ok(self.output_path.clone())
    }

    /// Filter one source by significance and extract its block
    fn process_source(&self, source: &SourceSpec) -> Result<SummaryBlock> {
        let config_bytes = fs::read(&source.config_path)
            .with_context(|| format!("Failed to read configuration {:?}", source.config_path))?;
        let configuration = parse_file_configuration(&config_bytes)?;

        let data = fs::read(&source.data_path)
            .with_context(|| format!("Failed to read data file {:?}", source.data_path))?;
        let (header, body) = split_first_line(&data);

        let metadata = resolve_columns(header, &configuration)?;
        debug!("Resolved columns for source '{}'", metadata.tag);

        let keys = collect_variants(body, &metadata)?;
        info!(
            "Source '{}': {} variants below threshold {}",
            metadata.tag,
            keys.len(),
            metadata.pval_threshold
        );

        let partitions = vec![keys];
        let mut blocks = collect_partitions(body, &metadata, &partitions)?;
        Ok(blocks.remove(0))
    }
}

/// Split a buffer into its first line and the remainder
fn split_first_line(data: &[u8]) -> (&[u8], &[u8]) {
    match data.iter().position(|&byte| byte == b'\n') {
        Some(index) => (&data[..index], &data[index + 1..]),
        None => (data, &[]),
    }
}

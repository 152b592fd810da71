// ==============================================================================
// config.rs - Source File Configuration
// ==============================================================================
// Description: JSON configuration for summary-stat sources and column resolution
// Author: Matt Barham
// Created: 2025-11-20
// Modified: 2025-11-21
// Version: 1.1.0
// ==============================================================================
// A configuration names the columns of one source file by header name. It is
// resolved once against the file's real header line into positional indices
// (BlockMetadata); every scan after that works purely off positions.
// ==============================================================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use validator::Validate;

/// Errors that can occur while loading or resolving a configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Column '{0}' not found in header")]
    MissingColumn(String),
}

/// Per-source configuration, deserialized from JSON
///
/// Column fields carry the header names as they appear in the source file;
/// `resolve_columns` turns them into positional indices.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FileConfiguration {
    /// Short source/study identifier, used as the output column prefix
    #[validate(length(min = 1))]
    pub tag: String,

    #[serde(rename = "chromosomeColumn")]
    #[validate(length(min = 1))]
    pub chromosome_column: String,

    #[serde(rename = "positionColumn")]
    #[validate(length(min = 1))]
    pub position_column: String,

    #[serde(rename = "referenceColumn")]
    #[validate(length(min = 1))]
    pub reference_column: String,

    #[serde(rename = "alternativeColumn")]
    #[validate(length(min = 1))]
    pub alternative_column: String,

    #[serde(rename = "pValueColumn")]
    #[validate(length(min = 1))]
    pub pvalue_column: String,

    #[serde(rename = "betaColumn")]
    #[validate(length(min = 1))]
    pub beta_column: String,

    #[serde(rename = "sebetaColumn")]
    #[validate(length(min = 1))]
    pub sebeta_column: String,

    #[serde(rename = "afColumn")]
    #[validate(length(min = 1))]
    pub af_column: String,

    /// Significance threshold; rows are kept when pvalue < threshold
    #[serde(rename = "pval_threshold")]
    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    pub pval_threshold: f32,

    /// Single-character field delimiter (e.g., "\t" or ",")
    #[validate(length(min = 1))]
    pub delimiter: String,
}

/// Positional indices of the eight required columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndex {
    pub chromosome: usize,
    pub position: usize,
    pub reference: usize,
    pub alternate: usize,
    pub pvalue: usize,
    pub beta: usize,
    pub sebeta: usize,
    pub af: usize,
}

impl ColumnIndex {
    /// Minimum field count for a p-value filter scan (variant + pvalue columns)
    pub fn filter_width(&self) -> usize {
        let max_index = self
            .chromosome
            .max(self.position)
            .max(self.reference)
            .max(self.alternate)
            .max(self.pvalue);
        max_index + 1
    }

    /// Minimum field count for a partition-extraction scan (all eight columns)
    pub fn extract_width(&self) -> usize {
        let max_index = self
            .chromosome
            .max(self.position)
            .max(self.reference)
            .max(self.alternate)
            .max(self.pvalue)
            .max(self.beta)
            .max(self.sebeta)
            .max(self.af);
        max_index + 1
    }
}

/// Resolved, read-only metadata for one source file
///
/// Produced once per source by `resolve_columns`; scans only ever read it.
#[derive(Debug, Clone)]
pub struct BlockMetadata {
    /// Source/study tag ("{tag}_pval" column prefix)
    pub tag: String,

    /// Positional column indices
    pub columns: ColumnIndex,

    /// Significance threshold (strict less-than)
    pub pval_threshold: f32,

    /// Field delimiter, shared by the source file and its variant keys
    pub delimiter: String,
}

impl BlockMetadata {
    /// First byte of the delimiter, as required by the CSV reader
    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter.as_bytes().first().copied().unwrap_or(b'\t')
    }
}

/// Parse and validate a JSON file configuration
///
/// # Arguments
/// * `data` - Raw JSON bytes
///
/// # Returns
/// * `Ok(FileConfiguration)` - Parsed and validated configuration
/// * `Err(ConfigError)` - Malformed JSON or failed field validation
pub fn parse_file_configuration(data: &[u8]) -> Result<FileConfiguration, ConfigError> {
    let configuration: FileConfiguration = serde_json::from_slice(data)?;
    configuration.validate()?;
    Ok(configuration)
}

/// Resolve configured column names against a real header line
///
/// The header is split on the configured delimiter and each cell is trimmed
/// before matching. Fails with the first missing column's configured name.
///
/// # Arguments
/// * `header` - Raw bytes of the source file's header line
/// * `configuration` - Validated file configuration
///
/// # Returns
/// * `Ok(BlockMetadata)` - Positional metadata for subsequent scans
/// * `Err(ConfigError::MissingColumn)` - A configured column is absent
pub fn resolve_columns(
    header: &[u8],
    configuration: &FileConfiguration,
) -> Result<BlockMetadata, ConfigError> {
    let header_str = String::from_utf8_lossy(header);
    let header_str = header_str.trim();

    let mut column_map: HashMap<&str, usize> = HashMap::new();
    for (index, cell) in header_str.split(&configuration.delimiter).enumerate() {
        column_map.insert(cell.trim(), index);
    }

    let find = |name: &str| -> Result<usize, ConfigError> {
        column_map
            .get(name)
            .copied()
            .ok_or_else(|| ConfigError::MissingColumn(name.to_string()))
    };

    Ok(BlockMetadata {
        tag: configuration.tag.clone(),
        pval_threshold: configuration.pval_threshold,
        delimiter: configuration.delimiter.clone(),
        columns: ColumnIndex {
            chromosome: find(&configuration.chromosome_column)?,
            position: find(&configuration.position_column)?,
            reference: find(&configuration.reference_column)?,
            alternate: find(&configuration.alternative_column)?,
            pvalue: find(&configuration.pvalue_column)?,
            beta: find(&configuration.beta_column)?,
            sebeta: find(&configuration.sebeta_column)?,
            af: find(&configuration.af_column)?,
        },
    })
}

// ==============================================================================
// lib.rs - Summary Statistics Merger Library
// ==============================================================================
// Description: Library interface for summary-statistic merger modules
// Author: Matt Barham
// Created: 2025-11-20
// Modified: 2025-11-21
// Version: 1.1.0
// ==============================================================================

pub mod chromosome;
pub mod codec;
pub mod config;
pub mod merge;
pub mod models;
pub mod parsers;
pub mod processor;

pub use chromosome::{parse_chromosome, ChromosomeParseError};
pub use codec::{marshal_blocks, unmarshal_blocks, BlockCodecError};
pub use config::{
    parse_file_configuration, resolve_columns, BlockMetadata, ColumnIndex, ConfigError,
    FileConfiguration,
};
pub use merge::{header_line, merged_rows};
pub use models::{block_header, AssociationStatistic, SummaryBlock, Variant};
pub use parsers::{collect_partitions, collect_variants, SumstatsParseError};

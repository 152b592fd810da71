// ==============================================================================
// parsers/mod.rs - File parser modules
// ==============================================================================
// Description: Parsers for delimited summary-statistic sources
// Author: Matt Barham
// Created: 2025-11-20
// Modified: 2025-11-21
// Version: 1.1.0
// ==============================================================================

pub mod sumstats;

pub use sumstats::{collect_partitions, collect_variants, SumstatsParseError};

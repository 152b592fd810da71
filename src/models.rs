// ==============================================================================
// models.rs - Summary Statistics Data Models
// ==============================================================================
// Description: Data structures for variant-keyed summary-statistic processing
// Author: Matt Barham
// Created: 2025-11-20
// Modified: 2025-11-21
// Version: 1.1.0
// ==============================================================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A genomic variant parsed from one summary-statistic row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    /// Numeric chromosome identifier (1-22, X=23, Y=24, MT=25)
    pub chromosome: u32,

    /// Base pair position
    pub position: u64,

    /// Reference allele
    pub reference: String,

    /// Alternate allele
    pub alternate: String,
}

impl Variant {
    /// Build the canonical delimited variant key: chrom, position, ref, alt
    ///
    /// The key is the sole join identity used across filtering, partitioning,
    /// and merging. The delimiter is not escaped inside the allele strings, so
    /// keys are only unique while alleles stay free of the delimiter character
    /// (true for ACGT/indel alleles).
    pub fn key(&self, delimiter: &str) -> String {
        let mut key = String::with_capacity(32);
        key.push_str(&self.chromosome.to_string());
        key.push_str(delimiter);
        key.push_str(&self.position.to_string());
        key.push_str(delimiter);
        key.push_str(&self.reference);
        key.push_str(delimiter);
        key.push_str(&self.alternate);
        key
    }
}

/// Association statistics reported for a variant by one source/study
#[derive(Debug, Clone, PartialEq)]
pub struct AssociationStatistic {
    /// Association p-value
    pub pvalue: f32,

    /// Effect size
    pub beta: f32,

    /// Standard error of the effect size
    pub sebeta: f32,

    /// Allele frequency
    pub af: f32,
}

impl AssociationStatistic {
    /// Render the statistic as output-ready text fields
    ///
    /// Formatting happens exactly once, at storage time: the p-value in
    /// scientific notation with 6 fractional digits ("1.000000e-03"), the
    /// remaining values fixed-point with 6 fractional digits ("0.500000").
    /// The strings are carried verbatim through serialization and merging.
    pub fn formatted_values(&self) -> Vec<String> {
        vec![
            format_scientific(self.pvalue),
            format!("{:.6}", self.beta),
            format!("{:.6}", self.sebeta),
            format!("{:.6}", self.af),
        ]
    }
}

/// Per-partition payload: column headers plus per-variant value rows
///
/// One block is produced per partition per source, serialized to an opaque
/// binary blob, and only ever read back by the merger. Rows are keyed by the
/// canonical variant key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryBlock {
    /// Ordered column headers ("{tag}_pval", "{tag}_beta", ...)
    pub header: Vec<String>,

    /// Variant key → formatted statistic values, same order as `header`
    pub rows: HashMap<String, Vec<String>>,
}

impl SummaryBlock {
    /// Create an empty block with the standard four-column header for `tag`
    pub fn new(tag: &str) -> Self {
        Self {
            header: block_header(tag),
            rows: HashMap::new(),
        }
    }
}

/// Standard column headers for a source tagged `tag`
pub fn block_header(tag: &str) -> Vec<String> {
    vec![
        format!("{}_pval", tag),
        format!("{}_beta", tag),
        format!("{}_sebeta", tag),
        format!("{}_af", tag),
    ]
}

/// Format a float in C-style `%e` scientific notation with 6 fractional
/// digits and a signed two-digit exponent (e.g., "1.000000e-03").
fn format_scientific(value: f32) -> String {
    let v = value as f64;

    if v == 0.0 {
        return "0.000000e+00".to_string();
    }
    if !v.is_finite() {
        return format!("{}", v);
    }

    let mut exponent = v.abs().log10().floor() as i32;
    let mut mantissa = v / 10f64.powi(exponent);

    // Rounding to 6 digits can carry the mantissa into the next decade
    let rounded = (mantissa.abs() * 1e6).round() / 1e6;
    if rounded >= 10.0 {
        mantissa /= 10.0;
        exponent += 1;
    }

    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{:.6}e{}{:02}", mantissa, sign, exponent.abs())
}

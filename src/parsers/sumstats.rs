// ==============================================================================
// sumstats.rs - Summary Statistics Scans
// ==============================================================================
// Description: Streaming scans over delimited GWAS summary-statistic buffers
// Author: Matt Barham
// Created: 2025-11-20
// Modified: 2025-11-21
// Version: 1.1.0
// ==============================================================================
// Format: delimited rows without a header line (the header is consumed
// upstream during column resolution). Example (tab-delimited):
//   1    12345    A    T    0.001    0.5    0.1    0.3
//   2    67890    G    C    0.5      0.2    0.05   0.4
// ==============================================================================

use csv::{ReaderBuilder, StringRecord};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

use crate::chromosome::parse_chromosome;
use crate::config::{BlockMetadata, ColumnIndex};
use crate::models::{AssociationStatistic, SummaryBlock, Variant};

/// Errors that can occur while scanning a summary-statistic buffer
#[derive(Error, Debug)]
pub enum SumstatsParseError {
    #[error("Insufficient columns: expected at least {expected}, found {found}")]
    InsufficientColumns { expected: usize, found: usize },

    #[error("Invalid {field} at row {row}: '{value}'")]
    MalformedValue {
        row: usize,
        field: &'static str,
        value: String,
    },

    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),
}

/// Scan a source buffer and emit the keys of all significant variants
///
/// Rows are emitted in source order; a row qualifies when its p-value is
/// strictly below the configured threshold (boundary-equal rows are
/// excluded). Duplicate source rows yield duplicate keys.
///
/// The first data row must carry every referenced variant/p-value column or
/// the call fails with `InsufficientColumns`. Any malformed chromosome,
/// position, or p-value aborts the whole scan; a trailing line with a
/// different field count ends the scan as benign end-of-input.
///
/// # Arguments
/// * `buffer` - Raw delimited rows, no header line
/// * `metadata` - Resolved column metadata for this source
///
/// # Returns
/// * `Ok(Vec<String>)` - Variant keys passing the threshold, in row order
/// * `Err(SumstatsParseError)` - First structural or value error encountered
pub fn collect_variants(
    buffer: &[u8],
    metadata: &BlockMetadata,
) -> Result<Vec<String>, SumstatsParseError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(metadata.delimiter_byte())
        .has_headers(false)
        .from_reader(buffer);

    let required = metadata.columns.filter_width();
    let mut result = Vec::new();
    let mut row_number = 0usize;

    for record_result in reader.records() {
        let record = match record_result {
            Ok(record) => record,
            // A ragged trailing line ends the scan, same as end-of-input
            Err(error) if is_ragged_line(&error) => break,
            Err(error) => return Err(error.into()),
        };
        row_number += 1;

        if row_number == 1 && record.len() < required {
            return Err(SumstatsParseError::InsufficientColumns {
                expected: required,
                found: record.len(),
            });
        }

        let pvalue = parse_float_field(&record, metadata.columns.pvalue, "pvalue", row_number)?;

        if pvalue < metadata.pval_threshold {
            let variant = parse_variant(&record, &metadata.columns, row_number)?;
            result.push(variant.key(&metadata.delimiter));
        }
    }

    debug!(
        "Variant filter scan complete: {} rows scanned, {} matched",
        row_number,
        result.len()
    );
    Ok(result)
}

/// Scan a source buffer once and extract matching rows into per-partition blocks
///
/// Each partition is a caller-declared list of variant keys; a reverse index
/// from key to partition ordinal routes rows as they stream by. A key listed
/// in more than one partition lands only in the last one (later partitions
/// overwrite the index entry); within a block, a key appearing on multiple
/// source rows keeps the last row's values.
///
/// Every block gets the standard `{tag}_*` four-column header, even when it
/// matches no rows. No p-value filtering is applied here: partition
/// membership is expected to come from an already-filtered key set.
///
/// # Arguments
/// * `buffer` - Raw delimited rows, no header line
/// * `metadata` - Resolved column metadata for this source
/// * `partitions` - Ordered variant-key groups to extract together
///
/// # Returns
/// * `Ok(Vec<SummaryBlock>)` - One block per partition, same order as input
/// * `Err(SumstatsParseError)` - First structural or value error encountered
pub fn collect_partitions(
    buffer: &[u8],
    metadata: &BlockMetadata,
    partitions: &[Vec<String>],
) -> Result<Vec<SummaryBlock>, SumstatsParseError> {
    let mut partition_index: HashMap<&str, usize> = HashMap::new();
    for (ordinal, group) in partitions.iter().enumerate() {
        for key in group {
            partition_index.insert(key.as_str(), ordinal);
        }
    }

    let mut blocks: Vec<SummaryBlock> = partitions
        .iter()
        .map(|_| SummaryBlock::new(&metadata.tag))
        .collect();

    let mut reader = ReaderBuilder::new()
        .delimiter(metadata.delimiter_byte())
        .has_headers(false)
        .from_reader(buffer);

    let required = metadata.columns.extract_width();
    let mut row_number = 0usize;
    let mut matched = 0usize;

    for record_result in reader.records() {
        let record = match record_result {
            Ok(record) => record,
            Err(error) if is_ragged_line(&error) => break,
            Err(error) => return Err(error.into()),
        };
        row_number += 1;

        if row_number == 1 && record.len() < required {
            return Err(SumstatsParseError::InsufficientColumns {
                expected: required,
                found: record.len(),
            });
        }

        let variant = parse_variant(&record, &metadata.columns, row_number)?;
        let key = variant.key(&metadata.delimiter);

        if let Some(&ordinal) = partition_index.get(key.as_str()) {
            let statistic = parse_statistic(&record, &metadata.columns, row_number)?;
            blocks[ordinal].rows.insert(key, statistic.formatted_values());
            matched += 1;
        }
    }

    debug!(
        "Partition scan complete: {} rows scanned, {} matched across {} partitions",
        row_number,
        matched,
        partitions.len()
    );
    Ok(blocks)
}

/// A record whose field count differs from the first record's
fn is_ragged_line(error: &csv::Error) -> bool {
    matches!(error.kind(), csv::ErrorKind::UnequalLengths { .. })
}

fn field<'a>(record: &'a StringRecord, index: usize) -> &'a str {
    record.get(index).unwrap_or("")
}

fn parse_variant(
    record: &StringRecord,
    columns: &ColumnIndex,
    row: usize,
) -> Result<Variant, SumstatsParseError> {
    let chromosome_field = field(record, columns.chromosome);
    let chromosome =
        parse_chromosome(chromosome_field).map_err(|_| SumstatsParseError::MalformedValue {
            row,
            field: "chromosome",
            value: chromosome_field.to_string(),
        })?;

    let position_field = field(record, columns.position);
    let position =
        position_field
            .parse::<u64>()
            .map_err(|_| SumstatsParseError::MalformedValue {
                row,
                field: "position",
                value: position_field.to_string(),
            })?;

    Ok(Variant {
        chromosome,
        position,
        reference: field(record, columns.reference).to_string(),
        alternate: field(record, columns.alternate).to_string(),
    })
}

fn parse_statistic(
    record: &StringRecord,
    columns: &ColumnIndex,
    row: usize,
) -> Result<AssociationStatistic, SumstatsParseError> {
    Ok(AssociationStatistic {
        pvalue: parse_float_field(record, columns.pvalue, "pvalue", row)?,
        beta: parse_float_field(record, columns.beta, "beta", row)?,
        sebeta: parse_float_field(record, columns.sebeta, "sebeta", row)?,
        af: parse_float_field(record, columns.af, "allele frequency", row)?,
    })
}

fn parse_float_field(
    record: &StringRecord,
    index: usize,
    name: &'static str,
    row: usize,
) -> Result<f32, SumstatsParseError> {
    let raw = field(record, index);
    raw.parse::<f32>()
        .map_err(|_| SumstatsParseError::MalformedValue {
            row,
            field: name,
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BlockMetadata, ColumnIndex};

    fn test_metadata(threshold: f32, delimiter: &str) -> BlockMetadata {
        BlockMetadata {
            tag: "study1".to_string(),
            pval_threshold: threshold,
            delimiter: delimiter.to_string(),
            columns: ColumnIndex {
                chromosome: 0,
                position: 1,
                reference: 2,
                alternate: 3,
                pvalue: 4,
                beta: 5,
                sebeta: 6,
                af: 7,
            },
        }
    }

    const TWO_ROWS: &[u8] = b"1\t12345\tA\tT\t0.001\t0.5\t0.1\t0.3\n\
                              2\t67890\tG\tC\t0.5\t0.2\t0.05\t0.4\n";

    #[test]
    fn test_collect_variants_threshold() {
        let metadata = test_metadata(0.01, "\t");
        let keys = collect_variants(TWO_ROWS, &metadata).unwrap();
        assert_eq!(keys, vec!["1\t12345\tA\tT"]);
    }

    #[test]
    fn test_collect_variants_strict_boundary() {
        // threshold 0.05 excludes pvalue == 0.05, includes 0.049999
        let buffer = b"1\t100\tA\tT\t0.05\t0.5\t0.1\t0.3\n\
                       1\t200\tG\tC\t0.049999\t0.5\t0.1\t0.3\n";
        let metadata = test_metadata(0.05, "\t");
        let keys = collect_variants(buffer, &metadata).unwrap();
        assert_eq!(keys, vec!["1\t200\tG\tC"]);
    }

    #[test]
    fn test_collect_variants_preserves_duplicates_and_order() {
        let buffer = b"2\t200\tG\tC\t0.001\t0.5\t0.1\t0.3\n\
                       1\t100\tA\tT\t0.002\t0.5\t0.1\t0.3\n\
                       2\t200\tG\tC\t0.003\t0.5\t0.1\t0.3\n";
        let metadata = test_metadata(0.05, "\t");
        let keys = collect_variants(buffer, &metadata).unwrap();
        assert_eq!(keys, vec!["2\t200\tG\tC", "1\t100\tA\tT", "2\t200\tG\tC"]);
    }

    #[test]
    fn test_collect_variants_comma_delimiter() {
        let buffer = b"1,12345,A,T,0.001,0.5,0.1,0.3\n";
        let metadata = test_metadata(0.01, ",");
        let keys = collect_variants(buffer, &metadata).unwrap();
        assert_eq!(keys, vec!["1,12345,A,T"]);
    }

    #[test]
    fn test_collect_variants_chromosome_aliases() {
        let buffer = b"X\t100\tA\tT\t0.001\t0.5\t0.1\t0.3\n\
                       MT\t200\tG\tC\t0.002\t0.5\t0.1\t0.3\n";
        let metadata = test_metadata(0.05, "\t");
        let keys = collect_variants(buffer, &metadata).unwrap();
        // Keys carry the decoded numeric chromosome, not the source token
        assert_eq!(keys, vec!["23\t100\tA\tT", "25\t200\tG\tC"]);
    }

    #[test]
    fn test_collect_variants_insufficient_columns() {
        let buffer = b"1\t12345\tA\n";
        let metadata = test_metadata(0.05, "\t");
        let result = collect_variants(buffer, &metadata);
        match result.unwrap_err() {
            SumstatsParseError::InsufficientColumns { expected, found } => {
                assert_eq!(expected, 5);
                assert_eq!(found, 3);
            }
            other => panic!("Expected InsufficientColumns, got {:?}", other),
        }
    }

    #[test]
    fn test_collect_variants_malformed_pvalue_aborts() {
        let buffer = b"1\t100\tA\tT\t0.001\t0.5\t0.1\t0.3\n\
                       2\t200\tG\tC\tBAD\t0.5\t0.1\t0.3\n";
        let metadata = test_metadata(0.05, "\t");
        let result = collect_variants(buffer, &metadata);
        match result.unwrap_err() {
            SumstatsParseError::MalformedValue { row, field, value } => {
                assert_eq!(row, 2);
                assert_eq!(field, "pvalue");
                assert_eq!(value, "BAD");
            }
            other => panic!("Expected MalformedValue, got {:?}", other),
        }
    }

    #[test]
    fn test_collect_variants_malformed_chromosome_aborts() {
        let buffer = b"chrBAD\t100\tA\tT\t0.001\t0.5\t0.1\t0.3\n";
        let metadata = test_metadata(0.05, "\t");
        let result = collect_variants(buffer, &metadata);
        match result.unwrap_err() {
            SumstatsParseError::MalformedValue { field, .. } => {
                assert_eq!(field, "chromosome");
            }
            other => panic!("Expected MalformedValue, got {:?}", other),
        }
    }

    #[test]
    fn test_collect_variants_ragged_trailing_line_is_benign() {
        // Truncated final line ends the scan without error
        let buffer = b"1\t100\tA\tT\t0.001\t0.5\t0.1\t0.3\n1\t200\n";
        let metadata = test_metadata(0.05, "\t");
        let keys = collect_variants(buffer, &metadata).unwrap();
        assert_eq!(keys, vec!["1\t100\tA\tT"]);
    }

    #[test]
    fn test_collect_variants_empty_buffer() {
        let metadata = test_metadata(0.05, "\t");
        let keys = collect_variants(b"", &metadata).unwrap();
        assert!(keys.is_empty());
    }

    #[test]
    fn test_collect_partitions_end_to_end() {
        let metadata = test_metadata(0.01, "\t");
        let partitions = vec![vec!["1\t12345\tA\tT".to_string()]];

        let blocks = collect_partitions(TWO_ROWS, &metadata, &partitions).unwrap();

        assert_eq!(blocks.len(), 1);
        assert_eq!(
            blocks[0].header,
            vec!["study1_pval", "study1_beta", "study1_sebeta", "study1_af"]
        );
        assert_eq!(
            blocks[0].rows.get("1\t12345\tA\tT").unwrap(),
            &vec!["1.000000e-03", "0.500000", "0.100000", "0.300000"]
        );
    }

    #[test]
    fn test_collect_partitions_no_pvalue_refilter() {
        // The scan extracts listed keys regardless of significance
        let metadata = test_metadata(0.01, "\t");
        let partitions = vec![vec!["2\t67890\tG\tC".to_string()]];

        let blocks = collect_partitions(TWO_ROWS, &metadata, &partitions).unwrap();
        assert!(blocks[0].rows.contains_key("2\t67890\tG\tC"));
    }

    #[test]
    fn test_collect_partitions_empty_partition_keeps_header() {
        let metadata = test_metadata(0.01, "\t");
        let partitions = vec![
            vec!["1\t12345\tA\tT".to_string()],
            vec!["9\t999\tA\tG".to_string()], // matches nothing
        ];

        let blocks = collect_partitions(TWO_ROWS, &metadata, &partitions).unwrap();

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].header.len(), 4);
        assert!(blocks[1].rows.is_empty());
    }

    #[test]
    fn test_collect_partitions_last_partition_wins_on_collision() {
        let metadata = test_metadata(0.01, "\t");
        let shared = "1\t12345\tA\tT".to_string();
        let partitions = vec![vec![shared.clone()], vec![shared.clone()]];

        let blocks = collect_partitions(TWO_ROWS, &metadata, &partitions).unwrap();

        assert!(blocks[0].rows.is_empty());
        assert!(blocks[1].rows.contains_key(shared.as_str()));
    }

    #[test]
    fn test_collect_partitions_last_row_wins_on_duplicate_key() {
        let buffer = b"1\t100\tA\tT\t0.001\t0.5\t0.1\t0.3\n\
                       1\t100\tA\tT\t0.002\t0.7\t0.2\t0.4\n";
        let metadata = test_metadata(0.05, "\t");
        let partitions = vec![vec!["1\t100\tA\tT".to_string()]];

        let blocks = collect_partitions(buffer, &metadata, &partitions).unwrap();

        assert_eq!(
            blocks[0].rows.get("1\t100\tA\tT").unwrap(),
            &vec!["2.000000e-03", "0.700000", "0.200000", "0.400000"]
        );
    }

    #[test]
    fn test_collect_partitions_insufficient_columns_for_statistics() {
        // Five columns satisfy a filter scan but not an extraction scan
        let buffer = b"1\t12345\tA\tT\t0.001\n";
        let metadata = test_metadata(0.05, "\t");
        let result = collect_partitions(buffer, &metadata, &[vec![]]);
        match result.unwrap_err() {
            SumstatsParseError::InsufficientColumns { expected, found } => {
                assert_eq!(expected, 8);
                assert_eq!(found, 5);
            }
            other => panic!("Expected InsufficientColumns, got {:?}", other),
        }
    }

    #[test]
    fn test_collect_partitions_malformed_beta_aborts() {
        let buffer = b"1\t100\tA\tT\t0.001\tNOPE\t0.1\t0.3\n";
        let metadata = test_metadata(0.05, "\t");
        let partitions = vec![vec!["1\t100\tA\tT".to_string()]];

        let result = collect_partitions(buffer, &metadata, &partitions);
        match result.unwrap_err() {
            SumstatsParseError::MalformedValue { field, .. } => assert_eq!(field, "beta"),
            other => panic!("Expected MalformedValue, got {:?}", other),
        }
    }

    #[test]
    fn test_collect_partitions_unlisted_rows_skip_statistic_parse() {
        // Malformed statistics on a row outside every partition are never read
        let buffer = b"1\t100\tA\tT\t0.001\t0.5\t0.1\t0.3\n\
                       2\t200\tG\tC\t0.5\tBAD\tBAD\tBAD\n";
        let metadata = test_metadata(0.05, "\t");
        let partitions = vec![vec!["1\t100\tA\tT".to_string()]];

        let blocks = collect_partitions(buffer, &metadata, &partitions).unwrap();
        assert_eq!(blocks[0].rows.len(), 1);
    }
}

// ==============================================================================
// merge.rs - Block Merger
// ==============================================================================
// Description: Outer-join merge of decoded blocks into an NA-padded table
// Author: Matt Barham
// Created: 2025-11-20
// Modified: 2025-11-21
// Version: 1.1.0
// ==============================================================================
// The merger aligns the union of variant keys across all blocks. A block
// missing a key contributes one "NA" per header column, so every output row
// has the same width regardless of which blocks matched.
// ==============================================================================

use std::collections::HashSet;
use tracing::debug;

use crate::codec::{unmarshal_blocks, BlockCodecError};

/// Missing-value sentinel for variants absent from a block
pub const NA: &str = "NA";

/// Build the concatenated header line for a set of serialized blocks
///
/// Headers are concatenated in block order and joined with `delimiter`.
/// An empty blob list yields an empty string.
pub fn header_line(blobs: &[Vec<u8>], delimiter: &str) -> Result<String, BlockCodecError> {
    let blocks = unmarshal_blocks(blobs)?;
    if blocks.is_empty() {
        return Ok(String::new());
    }

    let mut headers: Vec<&str> = Vec::new();
    for block in &blocks {
        headers.extend(block.header.iter().map(String::as_str));
    }
    Ok(headers.join(delimiter))
}

/// Merge serialized blocks into aligned output rows
///
/// Computes the union of variant keys over all blocks (an outer join on
/// key; iteration order over the union is unspecified) and emits one row
/// per key. Each block contributes its stored values for the key, or
/// `len(header)` copies of "NA" when the key is absent. With `include_cpra`
/// the key's chromosome/position/ref/alt components are prepended.
///
/// # Arguments
/// * `blobs` - Serialized blocks, in output column order
/// * `delimiter` - Output field delimiter; also the key component delimiter
/// * `include_cpra` - Prepend the four variant identity fields to each row
///
/// # Returns
/// * `Ok(Vec<String>)` - One delimiter-joined line per variant in the union
/// * `Err(BlockCodecError)` - A blob failed to decode
pub fn merged_rows(
    blobs: &[Vec<u8>],
    delimiter: &str,
    include_cpra: bool,
) -> Result<Vec<String>, BlockCodecError> {
    let blocks = unmarshal_blocks(blobs)?;
    if blocks.is_empty() {
        return Ok(Vec::new());
    }

    let widths: Vec<usize> = blocks.iter().map(|block| block.header.len()).collect();
    let total_width: usize = widths.iter().sum();

    let mut variant_union: HashSet<&str> = HashSet::new();
    for block in &blocks {
        variant_union.extend(block.rows.keys().map(String::as_str));
    }

    let mut result = Vec::with_capacity(variant_union.len());

    for variant in variant_union.iter() {
        let cpra = if include_cpra {
            variant_cpra(variant, delimiter)
        } else {
            Vec::new()
        };

        let mut values: Vec<&str> = Vec::with_capacity(total_width + cpra.len());
        values.extend(cpra.iter().map(String::as_str));

        for (block, width) in blocks.iter().zip(widths.iter()) {
            match block.rows.get(*variant) {
                Some(stored) => values.extend(stored.iter().map(String::as_str)),
                None => values.extend(std::iter::repeat(NA).take(*width)),
            }
        }

        result.push(values.join(delimiter));
    }

    debug!(
        "Merged {} blocks into {} rows",
        blocks.len(),
        result.len()
    );
    Ok(result)
}

/// Split a variant key back into its chromosome/position/ref/alt components
fn variant_cpra(key: &str, delimiter: &str) -> Vec<String> {
    key.split(delimiter).map(str::to_string).collect()
}

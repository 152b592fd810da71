// ==============================================================================
// codec.rs - Block Binary Codec
// ==============================================================================
// Description: Serializes summary blocks to/from opaque binary blobs
// Author: Matt Barham
// Created: 2025-11-20
// Modified: 2025-11-20
// Version: 1.0.0
// ==============================================================================
// Each block is encoded independently with bincode (length-prefixed strings
// and collections). Blobs carry no reference to their producing source; the
// merger only sees headers and rows.
// ==============================================================================

use thiserror::Error;

use crate::models::SummaryBlock;

/// Errors that can occur while encoding or decoding block blobs
#[derive(Error, Debug)]
pub enum BlockCodecError {
    #[error("Failed to encode block {index}: {source}")]
    Encode {
        index: usize,
        source: bincode::Error,
    },

    #[error("Failed to decode block {index}: {source}")]
    Decode {
        index: usize,
        source: bincode::Error,
    },
}

/// Serialize blocks into independent binary blobs, preserving input order
pub fn marshal_blocks(blocks: &[SummaryBlock]) -> Result<Vec<Vec<u8>>, BlockCodecError> {
    blocks
        .iter()
        .enumerate()
        .map(|(index, block)| {
            bincode::serialize(block).map_err(|source| BlockCodecError::Encode { index, source })
        })
        .collect()
}

/// Deserialize binary blobs back into blocks, preserving input order
///
/// A single corrupt blob aborts the whole call; the error names the
/// offending blob's ordinal.
pub fn unmarshal_blocks(blobs: &[Vec<u8>]) -> Result<Vec<SummaryBlock>, BlockCodecError> {
    blobs
        .iter()
        .enumerate()
        .map(|(index, blob)| {
            bincode::deserialize(blob).map_err(|source| BlockCodecError::Decode { index, source })
        })
        .collect()
}

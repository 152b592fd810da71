// ==============================================================================
// chromosome.rs - Chromosome Token Codec
// ==============================================================================
// Description: Normalizes chromosome tokens to numeric identifiers
// Author: Matt Barham
// Created: 2025-11-20
// Modified: 2025-11-20
// Version: 1.0.0
// ==============================================================================
// Encoding:
//   "1".."22" → 1..22 (autosomes)
//   "X"       → 23
//   "Y"       → 24
//   "MT", "M", "MITO", "MITOCHONDRIAL" → 25
// ==============================================================================

use thiserror::Error;

/// Errors that can occur during chromosome parsing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChromosomeParseError {
    #[error("Invalid chromosome: '{0}'")]
    Invalid(String),
}

/// Parse a chromosome token to its numeric identifier
///
/// Surrounding whitespace is trimmed and sex/mitochondrial names are matched
/// case-insensitively. Anything else must parse as a non-negative base-10
/// integer fitting in 32 bits.
///
/// # Arguments
/// * `token` - Raw chromosome field (e.g., "1", " 22 ", "x", "MT")
///
/// # Returns
/// * `Ok(u32)` - Numeric chromosome identifier
/// * `Err(ChromosomeParseError)` - Empty, negative, non-numeric, or overflowing token
///
/// # Examples
/// ```
/// use sumstats_merger::chromosome::parse_chromosome;
///
/// assert_eq!(parse_chromosome("7").unwrap(), 7);
/// assert_eq!(parse_chromosome("X").unwrap(), 23);
/// assert_eq!(parse_chromosome("mt").unwrap(), 25);
/// assert!(parse_chromosome("-1").is_err());
/// ```
pub fn parse_chromosome(token: &str) -> Result<u32, ChromosomeParseError> {
    let trimmed = token.trim();

    match trimmed.to_ascii_uppercase().as_str() {
        "X" => Ok(23),
        "Y" => Ok(24),
        "MT" | "M" | "MITO" | "MITOCHONDRIAL" => Ok(25),
        _ => trimmed
            .parse::<u32>()
            .map_err(|_| ChromosomeParseError::Invalid(token.to_string())),
    }
}

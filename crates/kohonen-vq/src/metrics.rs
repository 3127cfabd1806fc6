//! Distortion and compression metrics.
//!
//! Reporting only; nothing here feeds back into training.

use crate::{Grid, Result, VqError};
use serde::{Deserialize, Serialize};

/// Peak value of 8-bit imagery, used for PSNR.
pub const PEAK_VALUE: f64 = 255.0;

/// Bits per value of the uncompressed grid and of stored codebook components.
pub const BITS_PER_VALUE: u64 = 8;

/// Distortion between an original and a reconstructed grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    /// Mean squared error
    pub mse: f64,
    /// Peak signal-to-noise ratio in decibels (infinite for an exact match)
    pub psnr: f64,
    /// Number of values compared
    pub num_elements: usize,
}

impl QualityReport {
    /// Compare two grids of the same shape.
    pub fn compute(original: &Grid, reconstructed: &Grid) -> Result<Self> {
        if original.height() != reconstructed.height() || original.width() != reconstructed.width() {
            return Err(VqError::DimensionMismatch {
                expected: original.as_slice().len(),
                actual: reconstructed.as_slice().len(),
            });
        }

        let mse_val = mse(original.as_slice(), reconstructed.as_slice())?;
        Ok(Self {
            mse: mse_val,
            psnr: psnr(mse_val),
            num_elements: original.as_slice().len(),
        })
    }
}

impl std::fmt::Display for QualityReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MSE: {:.4}, PSNR: {:.2} dB", self.mse, self.psnr)
    }
}

/// Mean squared error between two equally long sequences.
///
/// `MSE = (1/n) * Σ(original[i] - reconstructed[i])²`
pub fn mse(original: &[f32], reconstructed: &[f32]) -> Result<f64> {
    if original.len() != reconstructed.len() {
        return Err(VqError::DimensionMismatch {
            expected: original.len(),
            actual: reconstructed.len(),
        });
    }
    if original.is_empty() {
        return Ok(0.0);
    }

    let sum_sq: f64 = original
        .iter()
        .zip(reconstructed.iter())
        .map(|(&a, &b)| (a as f64 - b as f64).powi(2))
        .sum();

    Ok(sum_sq / original.len() as f64)
}

/// PSNR in decibels for a given MSE against [`PEAK_VALUE`].
pub fn psnr(mse: f64) -> f64 {
    if mse <= 0.0 {
        return f64::INFINITY;
    }
    10.0 * (PEAK_VALUE * PEAK_VALUE / mse).log10()
}

/// Closed-form bit cost of a codebook-compressed grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionEstimate {
    /// Uncompressed cost: one 8-bit value per grid cell
    pub original_bits: u64,
    /// One `ceil(log2 N)`-bit index per block
    pub index_bits: u64,
    /// Codebook storage: D × N × 8
    pub codebook_bits: u64,
    /// One 8-bit scale per block in normalized mode, otherwise 0
    pub scale_bits: u64,
}

impl CompressionEstimate {
    /// Estimate for a `height`×`width` grid cut into `block_size` tiles.
    pub fn new(
        height: usize,
        width: usize,
        block_size: usize,
        num_codes: usize,
        normalize: bool,
    ) -> Result<Self> {
        if height == 0 || width == 0 || block_size == 0 || num_codes == 0 {
            return Err(VqError::InvalidConfig(
                "grid size, block size and code count must be positive".into(),
            ));
        }
        if !height.is_multiple_of(block_size) || !width.is_multiple_of(block_size) {
            return Err(VqError::InvalidConfig(format!(
                "{}x{} grid is not a multiple of block size {}",
                height, width, block_size
            )));
        }

        let pixels = (height * width) as u64;
        let dim = (block_size * block_size) as u64;
        let blocks = pixels / dim;

        Ok(Self {
            original_bits: pixels * BITS_PER_VALUE,
            index_bits: blocks * index_bits(num_codes) as u64,
            codebook_bits: dim * num_codes as u64 * BITS_PER_VALUE,
            scale_bits: if normalize { blocks * BITS_PER_VALUE } else { 0 },
        })
    }

    /// Total compressed cost in bits
    pub fn compressed_bits(&self) -> u64 {
        self.index_bits + self.codebook_bits + self.scale_bits
    }

    /// Original bits over compressed bits
    pub fn ratio(&self) -> f64 {
        self.original_bits as f64 / self.compressed_bits() as f64
    }
}

/// Compression ratio for the given grid and codebook shape.
pub fn compression_ratio(
    height: usize,
    width: usize,
    block_size: usize,
    num_codes: usize,
    normalize: bool,
) -> Result<f64> {
    Ok(CompressionEstimate::new(height, width, block_size, num_codes, normalize)?.ratio())
}

/// `ceil(log2 n)` for n ≥ 1; a single-code book needs no index bits.
pub fn index_bits(num_codes: usize) -> u32 {
    if num_codes <= 1 {
        0
    } else {
        usize::BITS - (num_codes - 1).leading_zeros()
    }
}

//! Block decoder: code indices back to a grid

use crate::{Codebook, EncodedGrid, Grid, Result, VqError};
use tracing::debug;

/// Rebuilds grids from encoded tiles and a codebook
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockDecoder;

impl BlockDecoder {
    /// Create a decoder
    pub fn new() -> Self {
        Self
    }

    /// Reconstruct a grid of the original dimensions.
    ///
    /// Each tile becomes its code vector reshaped to `block_size`×`block_size`,
    /// multiplied by the tile's scale when one was recorded. Values are not
    /// clipped; see [`Grid::to_u8_clipped`].
    pub fn decode(&self, encoded: &EncodedGrid, codebook: &Codebook) -> Result<Grid> {
        let size = encoded.block_size;
        // Header is checked before anything is allocated from it
        let tiles = encoded.tile_count()?;

        if codebook.dim() != size * size {
            return Err(VqError::DimensionMismatch {
                expected: size * size,
                actual: codebook.dim(),
            });
        }
        if encoded.blocks.len() != tiles {
            return Err(VqError::DimensionMismatch {
                expected: tiles,
                actual: encoded.blocks.len(),
            });
        }

        let mut grid = Grid::zeros(encoded.height, encoded.width)?;
        let origins = grid.tile_origins(size)?;

        let mut block = Vec::with_capacity(size * size);
        for (&(top, left), encoded_block) in origins.iter().zip(encoded.blocks.iter()) {
            let code = codebook
                .get(encoded_block.index)
                .ok_or(VqError::InvalidIndex {
                    index: encoded_block.index,
                    num_codes: codebook.num_codes(),
                })?;

            block.clear();
            match encoded_block.scale {
                Some(scale) => block.extend(code.iter().map(|c| c * scale)),
                None => block.extend_from_slice(code),
            }
            grid.write_block(top, left, size, &block);
        }

        debug!(
            blocks = encoded.blocks.len(),
            height = encoded.height,
            width = encoded.width,
            "Decoded grid"
        );

        Ok(grid)
    }
}

//! Block encoder: grid tiles to code indices

use crate::sample::normalize_in_place;
use crate::{CompetitiveNetwork, Grid, Result, VqError};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One encoded tile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EncodedBlock {
    /// Winning code index
    pub index: usize,
    /// L2 norm of the tile, present when encoded in normalized mode
    pub scale: Option<f32>,
}

/// Per-tile encoding of a grid, tiles in row-major order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedGrid {
    /// Grid rows
    pub height: usize,
    /// Grid columns
    pub width: usize,
    /// Tile side length
    pub block_size: usize,
    /// Whether tiles were normalized before matching
    pub normalized: bool,
    /// Encoded tiles
    pub blocks: Vec<EncodedBlock>,
}

impl EncodedGrid {
    /// Number of tiles per row (0 for a zero block size)
    pub fn blocks_per_row(&self) -> usize {
        self.width.checked_div(self.block_size).unwrap_or(0)
    }

    /// Number of tiles the header describes.
    ///
    /// Fails with `InvalidFormat` unless the dimensions are positive, exact
    /// multiples of the block size and small enough to address.
    pub fn tile_count(&self) -> Result<usize> {
        let (h, w, bs) = (self.height, self.width, self.block_size);
        if h == 0 || w == 0 || bs == 0 {
            return Err(VqError::InvalidFormat(format!(
                "encoded grid header has zero dimension: {}x{} with block size {}",
                h, w, bs
            )));
        }
        if !h.is_multiple_of(bs) || !w.is_multiple_of(bs) {
            return Err(VqError::InvalidFormat(format!(
                "{}x{} grid is not a multiple of block size {}",
                h, w, bs
            )));
        }
        h.checked_mul(w)
            .and_then(|_| bs.checked_mul(bs))
            .map(|_| (h / bs) * (w / bs))
            .ok_or_else(|| {
                VqError::InvalidFormat(format!("{}x{} grid is too large to address", h, w))
            })
    }

    /// Serialize to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| VqError::InvalidFormat(e.to_string()))
    }

    /// Deserialize from bytes, checking the header against the tile list
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let encoded: Self =
            bincode::deserialize(bytes).map_err(|e| VqError::InvalidFormat(e.to_string()))?;
        let tiles = encoded.tile_count()?;
        if encoded.blocks.len() != tiles {
            return Err(VqError::InvalidFormat(format!(
                "encoded grid holds {} tiles, header describes {}",
                encoded.blocks.len(),
                tiles
            )));
        }
        if encoded.blocks.iter().any(|b| b.scale.is_some() != encoded.normalized) {
            return Err(VqError::InvalidFormat(
                "tile scales do not match the normalized flag".into(),
            ));
        }
        Ok(encoded)
    }
}

/// Encodes a grid tile by tile against a trained network
#[derive(Debug, Clone, Copy)]
pub struct BlockEncoder {
    block_size: usize,
    normalize: bool,
}

impl BlockEncoder {
    /// Create an encoder for `block_size`×`block_size` tiles
    pub fn new(block_size: usize, normalize: bool) -> Self {
        Self {
            block_size,
            normalize,
        }
    }

    /// Assign every tile of `grid` to its winning code.
    ///
    /// Grid dimensions must be exact multiples of the block size. In
    /// normalized mode each tile is divided by its L2 norm before matching
    /// and the norm is kept for reconstruction; an all-zero tile keeps a
    /// scale of 0.
    pub fn encode(&self, grid: &Grid, network: &CompetitiveNetwork) -> Result<EncodedGrid> {
        let origins = grid.tile_origins(self.block_size)?;
        let dim = self.block_size * self.block_size;

        if network.codebook().dim() != dim {
            return Err(VqError::DimensionMismatch {
                expected: network.codebook().dim(),
                actual: dim,
            });
        }
        if network.config().normalize != self.normalize {
            return Err(VqError::InvalidConfig(format!(
                "encoder normalize={} does not match network normalize={}",
                self.normalize,
                network.config().normalize
            )));
        }

        let mut queries = Vec::with_capacity(origins.len() * dim);
        let mut scales = Vec::with_capacity(if self.normalize { origins.len() } else { 0 });
        for &(top, left) in &origins {
            let start = queries.len();
            grid.read_block(top, left, self.block_size, &mut queries);
            if self.normalize {
                scales.push(normalize_in_place(&mut queries[start..]));
            }
        }

        let indices = network.winner(&queries)?;
        let blocks = if self.normalize {
            indices
                .into_iter()
                .zip(scales)
                .map(|(index, scale)| EncodedBlock {
                    index,
                    scale: Some(scale),
                })
                .collect::<Vec<_>>()
        } else {
            indices
                .into_iter()
                .map(|index| EncodedBlock { index, scale: None })
                .collect::<Vec<_>>()
        };

        debug!(
            blocks = blocks.len(),
            block_size = self.block_size,
            normalize = self.normalize,
            "Encoded grid"
        );

        Ok(EncodedGrid {
            height: grid.height(),
            width: grid.width(),
            block_size: self.block_size,
            normalized: self.normalize,
            blocks,
        })
    }

    /// Tile side length
    pub fn block_size(&self) -> usize {
        self.block_size
    }
}

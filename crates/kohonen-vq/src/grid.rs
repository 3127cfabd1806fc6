//! 2-D scalar grids and block tiling

use crate::{Result, SampleSet, VqError};
use rand::Rng;

/// A height × width grid of scalar samples, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    height: usize,
    width: usize,
    data: Vec<f32>,
}

impl Grid {
    /// Create a grid from row-major values
    pub fn new(height: usize, width: usize, data: Vec<f32>) -> Result<Self> {
        if height == 0 || width == 0 {
            return Err(VqError::InvalidConfig(format!(
                "grid dimensions must be positive, got {}x{}",
                height, width
            )));
        }
        let len = checked_len(height, width)?;
        if data.len() != len {
            return Err(VqError::DimensionMismatch {
                expected: len,
                actual: data.len(),
            });
        }
        Ok(Self {
            height,
            width,
            data,
        })
    }

    /// Create a grid from 8-bit intensities
    pub fn from_u8(height: usize, width: usize, pixels: &[u8]) -> Result<Self> {
        Self::new(height, width, pixels.iter().map(|&p| p as f32).collect())
    }

    /// Create a zero-filled grid
    pub fn zeros(height: usize, width: usize) -> Result<Self> {
        let len = checked_len(height, width)?;
        Self::new(height, width, vec![0.0; len])
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.width
    }

    /// Row-major view of all values
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Value at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.height || col >= self.width {
            return None;
        }
        Some(self.data[row * self.width + col])
    }

    /// Round and clip every value into 0..=255
    pub fn to_u8_clipped(&self) -> Vec<u8> {
        self.data
            .iter()
            .map(|&v| v.round().clamp(0.0, 255.0) as u8)
            .collect()
    }

    /// Copy the `size`×`size` window at (top, left) into `out`, row-major.
    ///
    /// Callers guarantee the window lies inside the grid.
    pub(crate) fn read_block(&self, top: usize, left: usize, size: usize, out: &mut Vec<f32>) {
        for r in top..top + size {
            let offset = r * self.width + left;
            out.extend_from_slice(&self.data[offset..offset + size]);
        }
    }

    /// Overwrite the `size`×`size` window at (top, left) from a row-major block.
    pub(crate) fn write_block(&mut self, top: usize, left: usize, size: usize, block: &[f32]) {
        for (i, row) in block.chunks_exact(size).enumerate() {
            let offset = (top + i) * self.width + left;
            self.data[offset..offset + size].copy_from_slice(row);
        }
    }

    /// Check that `block_size` fits inside the grid.
    pub fn check_block_fits(&self, block_size: usize) -> Result<()> {
        if block_size == 0 {
            return Err(VqError::InvalidConfig("block size must be positive".into()));
        }
        if block_size > self.height || block_size > self.width {
            return Err(VqError::InvalidConfig(format!(
                "block size {} larger than {}x{} grid",
                block_size, self.height, self.width
            )));
        }
        Ok(())
    }

    /// Check that the grid tiles exactly into `block_size` blocks.
    pub fn check_tiling(&self, block_size: usize) -> Result<()> {
        self.check_block_fits(block_size)?;
        if !self.height.is_multiple_of(block_size) || !self.width.is_multiple_of(block_size) {
            return Err(VqError::InvalidConfig(format!(
                "{}x{} grid is not a multiple of block size {}",
                self.height, self.width, block_size
            )));
        }
        Ok(())
    }

    /// Top-left corners of the non-overlapping tiles, in row-major tile order.
    pub fn tile_origins(&self, block_size: usize) -> Result<Vec<(usize, usize)>> {
        self.check_tiling(block_size)?;
        Ok((0..self.height)
            .step_by(block_size)
            .flat_map(|top| (0..self.width).step_by(block_size).map(move |left| (top, left)))
            .collect())
    }

    /// Sample `count` windows at uniformly random positions as a training set.
    ///
    /// Top-left corners range over `[0, height - block_size]` × `[0, width - block_size]`;
    /// each window is flattened into a `block_size²` vector.
    pub fn random_blocks<R: Rng + ?Sized>(
        &self,
        block_size: usize,
        count: usize,
        rng: &mut R,
    ) -> Result<SampleSet> {
        self.check_block_fits(block_size)?;
        if count == 0 {
            return Err(VqError::InvalidConfig("block sample count must be positive".into()));
        }

        let mut data = Vec::with_capacity(count * block_size * block_size);
        for _ in 0..count {
            let top = rng.gen_range(0..=self.height - block_size);
            let left = rng.gen_range(0..=self.width - block_size);
            self.read_block(top, left, block_size, &mut data);
        }

        SampleSet::new(data, block_size * block_size)
    }
}

fn checked_len(height: usize, width: usize) -> Result<usize> {
    height.checked_mul(width).ok_or_else(|| {
        VqError::InvalidConfig(format!("{}x{} grid is too large to address", height, width))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn ramp(height: usize, width: usize) -> Grid {
        Grid::new(height, width, (0..height * width).map(|i| i as f32).collect()).unwrap()
    }

    #[test]
    fn test_shape_checks() {
        assert!(Grid::new(0, 4, vec![]).is_err());
        assert!(matches!(
            Grid::new(2, 2, vec![0.0; 3]),
            Err(VqError::DimensionMismatch { expected: 4, actual: 3 })
        ));
    }

    #[test]
    fn test_zeros_rejects_overflowing_dimensions() {
        assert!(matches!(
            Grid::zeros(usize::MAX / 2 + 1, 2),
            Err(VqError::InvalidConfig(_))
        ));
        assert!(matches!(
            Grid::new(usize::MAX, usize::MAX, Vec::new()),
            Err(VqError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_tile_origins_row_major() {
        let grid = ramp(4, 6);
        let origins = grid.tile_origins(2).unwrap();
        assert_eq!(
            origins,
            vec![(0, 0), (0, 2), (0, 4), (2, 0), (2, 2), (2, 4)]
        );
    }

    #[test]
    fn test_tiling_rejects_remainder() {
        let grid = ramp(5, 4);
        assert!(matches!(grid.tile_origins(2), Err(VqError::InvalidConfig(_))));
        assert!(matches!(grid.tile_origins(8), Err(VqError::InvalidConfig(_))));
        assert!(matches!(grid.tile_origins(0), Err(VqError::InvalidConfig(_))));
    }

    #[test]
    fn test_read_write_block() {
        let grid = ramp(4, 4);
        let mut block = Vec::new();
        grid.read_block(2, 2, 2, &mut block);
        assert_eq!(block, vec![10.0, 11.0, 14.0, 15.0]);

        let mut target = Grid::zeros(4, 4).unwrap();
        target.write_block(2, 2, 2, &block);
        assert_eq!(target.get(3, 3), Some(15.0));
        assert_eq!(target.get(0, 0), Some(0.0));
    }

    #[test]
    fn test_random_blocks_are_windows() {
        let grid = ramp(8, 8);
        let mut rng = StdRng::seed_from_u64(17);
        let samples = grid.random_blocks(3, 50, &mut rng).unwrap();

        assert_eq!(samples.len(), 50);
        assert_eq!(samples.dim(), 9);
        for row in samples.rows() {
            // A window of a ramp: consecutive within rows, stride 8 between rows
            let origin = row[0] as usize;
            assert!(origin / 8 <= 5 && origin % 8 <= 5);
            assert_eq!(row[1], row[0] + 1.0);
            assert_eq!(row[3], row[0] + 8.0);
        }
    }

    #[test]
    fn test_random_blocks_whole_grid() {
        // Block as large as the grid has exactly one valid position
        let grid = ramp(2, 2);
        let mut rng = StdRng::seed_from_u64(1);
        let samples = grid.random_blocks(2, 3, &mut rng).unwrap();
        for row in samples.rows() {
            assert_eq!(row, grid.as_slice());
        }
    }

    #[test]
    fn test_random_blocks_rejects_oversize() {
        let grid = ramp(4, 4);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(grid.random_blocks(5, 10, &mut rng).is_err());
        assert!(grid.random_blocks(2, 0, &mut rng).is_err());
    }

    #[test]
    fn test_to_u8_clipped() {
        let grid = Grid::new(1, 4, vec![-3.0, 12.4, 12.6, 300.0]).unwrap();
        assert_eq!(grid.to_u8_clipped(), vec![0, 12, 13, 255]);
    }
}

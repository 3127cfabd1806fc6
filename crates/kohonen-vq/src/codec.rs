//! End-to-end block codec: sample, train, encode, decode, measure

use crate::{
    BlockDecoder, BlockEncoder, Codebook, CompetitiveNetwork, CompressionEstimate, EncodedGrid,
    Grid, NetworkConfig, QualityReport, Result, StepStats, Trainer, TrainingConfig,
    TrainingReport, VqError,
};
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Configuration for a compression run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Tile side length; vectors have block_size² components
    #[serde(default = "default_block_size")]
    pub block_size: usize,

    /// Number of code vectors
    #[serde(default = "default_num_codes")]
    pub num_codes: usize,

    /// Random windows sampled from the grid for training
    #[serde(default = "default_num_samples")]
    pub num_samples: usize,

    /// Learning rate for competitive updates
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f32,

    /// Match tiles by direction and store a per-tile scale
    #[serde(default)]
    pub normalize: bool,

    /// Seed for sampling and codebook initialization
    #[serde(default)]
    pub seed: Option<u64>,

    /// Optional cap on training steps
    #[serde(default)]
    pub max_steps: Option<usize>,

    /// Convergence tolerance as a fraction of the sample value range
    #[serde(default = "default_stop_tolerance")]
    pub stop_tolerance: f32,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            block_size: default_block_size(),
            num_codes: default_num_codes(),
            num_samples: default_num_samples(),
            learning_rate: default_learning_rate(),
            normalize: false,
            seed: None,
            max_steps: None,
            stop_tolerance: default_stop_tolerance(),
        }
    }
}

impl CodecConfig {
    /// Parse a JSON configuration; omitted fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| VqError::InvalidFormat(e.to_string()))
    }

    /// Engine settings derived from this configuration
    pub fn network_config(&self) -> NetworkConfig {
        NetworkConfig {
            num_codes: self.num_codes,
            normalize: self.normalize,
            stop_tolerance: self.stop_tolerance,
            seed: self.seed,
        }
    }

    /// Training loop settings derived from this configuration
    pub fn training_config(&self) -> TrainingConfig {
        TrainingConfig {
            learning_rate: self.learning_rate,
            max_steps: self.max_steps,
            ..Default::default()
        }
    }
}

fn default_block_size() -> usize {
    8
}

fn default_num_codes() -> usize {
    64
}

fn default_num_samples() -> usize {
    10_000
}

fn default_learning_rate() -> f32 {
    TrainingConfig::default().learning_rate
}

fn default_stop_tolerance() -> f32 {
    NetworkConfig::default().stop_tolerance
}

/// Everything a compression run produces
#[derive(Debug, Clone)]
pub struct CompressionResult {
    /// Per-tile indices and scales
    pub encoded: EncodedGrid,
    /// Grid rebuilt from the codebook
    pub reconstructed: Grid,
    /// Trained codebook
    pub codebook: Codebook,
    /// Training outcome
    pub training: TrainingReport,
    /// Distortion of the reconstruction
    pub quality: QualityReport,
    /// Estimated bit costs
    pub compression: CompressionEstimate,
}

/// Compresses grids with a codebook learned from their own blocks
#[derive(Debug, Clone)]
pub struct BlockCodec {
    config: CodecConfig,
}

impl BlockCodec {
    /// Create a codec
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    /// Compress `grid` and reconstruct it
    pub fn compress(&self, grid: &Grid) -> Result<CompressionResult> {
        self.compress_with(grid, |_| {})
    }

    /// Compress `grid`, reporting each training step to `on_step`
    pub fn compress_with<F>(&self, grid: &Grid, on_step: F) -> Result<CompressionResult>
    where
        F: FnMut(&StepStats),
    {
        let config = &self.config;
        grid.check_tiling(config.block_size)?;

        let mut rng = match config.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };

        let samples = grid.random_blocks(config.block_size, config.num_samples, &mut rng)?;
        let mut network = CompetitiveNetwork::with_rng(config.network_config(), samples, rng)?;
        let training = Trainer::new(config.training_config()).train_with(&mut network, on_step)?;

        let encoded = BlockEncoder::new(config.block_size, config.normalize).encode(grid, &network)?;
        let codebook = network.into_codebook();
        let reconstructed = BlockDecoder::new().decode(&encoded, &codebook)?;

        let quality = QualityReport::compute(grid, &reconstructed)?;
        let compression = CompressionEstimate::new(
            grid.height(),
            grid.width(),
            config.block_size,
            config.num_codes,
            config.normalize,
        )?;

        info!(
            steps = training.steps,
            converged = training.converged,
            mse = quality.mse,
            psnr = quality.psnr,
            ratio = compression.ratio(),
            "Compressed grid"
        );

        Ok(CompressionResult {
            encoded,
            reconstructed,
            codebook,
            training,
            quality,
            compression,
        })
    }

    /// Get codec configuration
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }
}

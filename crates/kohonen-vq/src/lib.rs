//! Competitive-Learning Vector Quantization
//!
//! Learns a compact codebook from sampled grid blocks with winner-take-all
//! updates, then indexes and reconstructs every block of a grid against it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Block Codec Pipeline                         │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                  │
//! │  Training (offline):                                             │
//! │  ┌─────────┐    ┌─────────┐    ┌─────────────┐                  │
//! │  │  Grid   │ -> │ Random  │ -> │ Competitive │ -> codebook      │
//! │  │         │    │ Blocks  │    │   Network   │   (N × D)        │
//! │  └─────────┘    └─────────┘    └─────────────┘                  │
//! │                                                                  │
//! │  Encode:                                                         │
//! │  ┌─────────┐    ┌─────────┐    ┌─────────┐                      │
//! │  │  Tiles  │ -> │ (scale) │ -> │ Winner  │ -> index per tile    │
//! │  └─────────┘    └─────────┘    └─────────┘                      │
//! │                                                                  │
//! │  Decode:                                                         │
//! │  ┌─────────┐    ┌─────────┐    ┌─────────┐                      │
//! │  │ Indices │ -> │ Codebook│ -> │ × scale │ -> reconstructed grid│
//! │  │         │    │ Lookup  │    │         │                      │
//! │  └─────────┘    └─────────┘    └─────────┘                      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Training Step
//!
//! Every sample is assigned to its winning code; each winner moves toward
//! its samples (`code += lr * (sample - code)`, in sample order); codes that
//! won nothing are redrawn from the sample value range. Training stops once
//! a step has no losers and winner movement is below
//! `stop_tolerance × (max - min)` of the samples.
//!
//! # Similarity
//!
//! - Unnormalized: squared Euclidean distance (raw intensities)
//! - Normalized: dot product on unit vectors, so a dim and a bright block
//!   of the same shape share a code; the block's norm is stored as its scale

mod codebook;
mod codec;
mod decoder;
mod encoder;
mod error;
mod grid;
mod metrics;
mod network;
mod sample;
mod training;

pub use codebook::{Codebook, Similarity};
pub use codec::{BlockCodec, CodecConfig, CompressionResult};
pub use decoder::BlockDecoder;
pub use encoder::{BlockEncoder, EncodedBlock, EncodedGrid};
pub use error::{Result, VqError};
pub use grid::Grid;
pub use metrics::{
    BITS_PER_VALUE, CompressionEstimate, PEAK_VALUE, QualityReport, compression_ratio,
    index_bits, mse, psnr,
};
pub use network::{CompetitiveNetwork, NetworkConfig, StepStats};
pub use sample::SampleSet;
pub use training::{Trainer, TrainingConfig, TrainingReport};

/// Prelude for common imports
pub mod prelude {
    pub use super::{
        BlockCodec, BlockDecoder, BlockEncoder, CodecConfig, CompetitiveNetwork, Grid,
        NetworkConfig, Result, SampleSet, Trainer, TrainingConfig,
    };
}

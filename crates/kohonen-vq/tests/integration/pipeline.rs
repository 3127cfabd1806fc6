//! Full codec pipeline tests on synthetic grids.

use kohonen_vq::{
    BlockCodec, BlockDecoder, Codebook, CodecConfig, EncodedBlock, EncodedGrid, Grid,
    QualityReport, compression_ratio,
};

/// A square grid of four flat quadrants with different intensities.
fn quadrants(size: usize) -> Grid {
    let half = size / 2;
    let mut data = Vec::with_capacity(size * size);
    for r in 0..size {
        for c in 0..size {
            let value = match (r < half, c < half) {
                (true, true) => 16u8,
                (true, false) => 96,
                (false, true) => 160,
                (false, false) => 240,
            };
            data.push(value);
        }
    }
    Grid::from_u8(size, size, &data).unwrap()
}

/// Smooth diagonal gradient, values in 0..=252.
fn gradient(size: usize) -> Grid {
    let data: Vec<f32> = (0..size * size)
        .map(|i| ((i / size + i % size) * 126 / (size - 1)) as f32)
        .collect();
    Grid::new(size, size, data).unwrap()
}

#[test]
fn test_compression_ratio_reference_case() {
    let ratio = compression_ratio(256, 256, 8, 64, false).unwrap();

    let original = 256.0 * 256.0 * 8.0;
    let compressed = 1024.0 * 6.0 + 64.0 * 64.0 * 8.0;
    assert!((ratio - original / compressed).abs() < 1e-9);
}

#[test]
fn test_quadrants_reconstruct_closely() {
    // 2×2 windows on a 64×64 grid rarely straddle a quadrant edge, and spare
    // codes absorb the ones that do
    let grid = quadrants(64);
    let codec = BlockCodec::new(CodecConfig {
        block_size: 2,
        num_codes: 16,
        num_samples: 400,
        learning_rate: 0.05,
        seed: Some(12),
        max_steps: Some(2_000),
        ..Default::default()
    });

    let mut steps_seen = 0;
    let result = codec.compress_with(&grid, |_| steps_seen += 1).unwrap();

    assert_eq!(steps_seen, result.training.steps);
    assert_eq!(result.encoded.blocks.len(), 32 * 32);
    assert_eq!(result.reconstructed.height(), 64);
    assert_eq!(result.reconstructed.width(), 64);
    assert!(result.compression.ratio() > 1.0);
    assert!(
        result.quality.psnr > 25.0,
        "PSNR {:.2} dB (MSE {:.2})",
        result.quality.psnr,
        result.quality.mse
    );

    // Identical flat tiles always pick the same code
    let per_row = result.encoded.blocks_per_row();
    let top_left = result.encoded.blocks[0].index;
    assert_eq!(result.encoded.blocks[per_row + 1].index, top_left);
}

#[test]
fn test_normalized_pipeline_keeps_scales() {
    let grid = gradient(16);
    let codec = BlockCodec::new(CodecConfig {
        block_size: 4,
        num_codes: 3,
        num_samples: 100,
        learning_rate: 0.05,
        normalize: true,
        seed: Some(31),
        max_steps: Some(500),
        ..Default::default()
    });

    let result = codec.compress(&grid).unwrap();

    assert!(result.encoded.normalized);
    assert!(result.encoded.blocks.iter().all(|b| b.scale.is_some()));
    assert_eq!(result.compression.scale_bits, 16 * 8);

    let report = QualityReport::compute(&grid, &result.reconstructed).unwrap();
    assert_eq!(report, result.quality);
}

#[test]
fn test_decode_from_serialized_artifacts() {
    let grid = quadrants(32);
    let codec = BlockCodec::new(CodecConfig {
        block_size: 8,
        num_codes: 2,
        num_samples: 200,
        learning_rate: 0.1,
        seed: Some(77),
        max_steps: Some(1_000),
        ..Default::default()
    });
    let result = codec.compress(&grid).unwrap();

    let codebook = Codebook::from_bytes(&result.codebook.to_bytes().unwrap()).unwrap();
    let encoded = EncodedGrid::from_bytes(&result.encoded.to_bytes().unwrap()).unwrap();
    let decoded = BlockDecoder::new().decode(&encoded, &codebook).unwrap();

    assert_eq!(decoded, result.reconstructed);
}

#[test]
fn test_clipped_output_is_displayable() {
    let grid = gradient(8);
    let codec = BlockCodec::new(CodecConfig {
        block_size: 2,
        num_codes: 8,
        num_samples: 64,
        learning_rate: 0.1,
        seed: Some(4),
        max_steps: Some(300),
        ..Default::default()
    });

    let result = codec.compress(&grid).unwrap();
    let pixels = result.reconstructed.to_u8_clipped();

    assert_eq!(pixels.len(), 64);
    for (&pixel, &value) in pixels.iter().zip(result.reconstructed.as_slice()) {
        assert_eq!(pixel, value.round().clamp(0.0, 255.0) as u8, "value {}", value);
    }
}

#[test]
fn test_scaled_reconstruction_is_clipped_to_byte_range() {
    // One unit code scaled past 255 and one scaled to zero
    let codebook = Codebook::from_vectors(1, 4, vec![0.5; 4]).unwrap();
    let encoded = EncodedGrid {
        height: 2,
        width: 4,
        block_size: 2,
        normalized: true,
        blocks: vec![
            EncodedBlock { index: 0, scale: Some(600.0) },
            EncodedBlock { index: 0, scale: Some(3.0) },
        ],
    };

    let decoded = BlockDecoder::new().decode(&encoded, &codebook).unwrap();
    assert_eq!(decoded.as_slice()[0], 300.0);
    assert_eq!(decoded.to_u8_clipped(), vec![255, 255, 2, 2, 255, 255, 2, 2]);
}

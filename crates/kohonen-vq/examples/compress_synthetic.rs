//! Compress a synthetic grid and print distortion and compression figures.
//!
//! Usage: cargo run -p kohonen-vq --example compress_synthetic [config.json]
//!
//! The optional JSON file holds a `CodecConfig`; omitted fields use defaults.

use kohonen_vq::{BlockCodec, CodecConfig, Grid};
use tracing::info;
use tracing_subscriber::EnvFilter;

const SIZE: usize = 128;

/// Concentric rings over a horizontal ramp, 8-bit range.
fn synthetic_grid() -> Grid {
    let center = SIZE as f32 / 2.0;
    let pixels: Vec<u8> = (0..SIZE * SIZE)
        .map(|i| {
            let (r, c) = ((i / SIZE) as f32, (i % SIZE) as f32);
            let dist = ((r - center).powi(2) + (c - center).powi(2)).sqrt();
            let rings = (dist * 0.3).sin() * 60.0;
            let ramp = c / SIZE as f32 * 120.0;
            (rings + ramp + 60.0).clamp(0.0, 255.0) as u8
        })
        .collect();

    Grid::from_u8(SIZE, SIZE, &pixels).expect("grid dimensions are consistent")
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG=kohonen_vq=debug adds per-step engine logs
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => CodecConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => CodecConfig {
            block_size: 4,
            num_codes: 32,
            num_samples: 2_000,
            learning_rate: 0.01,
            seed: Some(42),
            max_steps: Some(5_000),
            ..Default::default()
        },
    };
    info!(?config, "Starting compression");

    let grid = synthetic_grid();
    let codec = BlockCodec::new(config);
    let result = codec.compress_with(&grid, |stats| {
        if stats.step % 50 == 0 {
            info!(
                step = stats.step,
                dead = stats.losers,
                max_winner_step = stats.max_winner_step,
                "Training"
            );
        }
    })?;

    println!("Steps:             {}", result.training.steps);
    println!("Converged:         {}", result.training.converged);
    println!("Compression ratio: {:.3}", result.compression.ratio());
    println!("{}", result.quality);

    Ok(())
}

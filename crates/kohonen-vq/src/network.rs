//! Competitive (winner-take-all) learning engine

use crate::sample::normalize_in_place;
use crate::{Codebook, Result, SampleSet, Similarity, VqError};
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Configuration for a competitive network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Number of code vectors (N)
    pub num_codes: usize,

    /// Train and match on unit-norm vectors with dot-product similarity
    #[serde(default)]
    pub normalize: bool,

    /// Winner movement below this fraction of the sample value range counts as settled
    #[serde(default = "default_stop_tolerance")]
    pub stop_tolerance: f32,

    /// Seed for reproducibility
    #[serde(default)]
    pub seed: Option<u64>,
}

impl NetworkConfig {
    /// Config for `num_codes` code vectors with default settings
    pub fn new(num_codes: usize) -> Self {
        Self {
            num_codes,
            ..Default::default()
        }
    }

    /// Enable or disable normalized (cosine) mode
    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Fix the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Override the convergence tolerance
    pub fn with_stop_tolerance(mut self, stop_tolerance: f32) -> Self {
        self.stop_tolerance = stop_tolerance;
        self
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            num_codes: 64,
            normalize: false,
            stop_tolerance: default_stop_tolerance(),
            seed: None,
        }
    }
}

fn default_stop_tolerance() -> f32 {
    1e-5
}

/// Statistics from one training step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepStats {
    /// 1-based index of this step
    pub step: usize,
    /// Code vectors that won no sample this step
    pub losers: usize,
    /// Code vectors that won at least one sample
    pub winners: usize,
    /// Largest absolute component change of any winning code vector
    pub max_winner_step: f32,
    /// Samples won by each code vector
    pub assignments: Vec<usize>,
}

/// The codebook engine: a fixed set of code vectors trained by competitive learning.
///
/// Each step assigns every sample to its winning code, pulls that code toward
/// the sample, and redraws any code that won nothing so no code is left dead.
#[derive(Debug)]
pub struct CompetitiveNetwork {
    config: NetworkConfig,
    similarity: Similarity,
    samples: SampleSet,
    value_range: (f32, f32),
    codebook: Codebook,
    rng: StdRng,
    last_step: Option<StepStats>,
}

impl CompetitiveNetwork {
    /// Create a network, seeding its generator from `config.seed`.
    pub fn new(config: NetworkConfig, samples: SampleSet) -> Result<Self> {
        let rng = match config.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, samples, rng)
    }

    /// Create a network drawing all of its randomness from `rng`.
    pub fn with_rng(config: NetworkConfig, mut samples: SampleSet, mut rng: StdRng) -> Result<Self> {
        if config.num_codes == 0 {
            return Err(VqError::InvalidConfig(
                "code vector count must be positive".into(),
            ));
        }
        if !config.stop_tolerance.is_finite() || config.stop_tolerance < 0.0 {
            return Err(VqError::InvalidConfig(format!(
                "stop tolerance must be a non-negative number, got {}",
                config.stop_tolerance
            )));
        }

        if config.normalize {
            samples.normalize();
        }

        let value_range = samples.value_range();
        let mut codebook = Codebook::random(config.num_codes, samples.dim(), value_range, &mut rng)?;
        if config.normalize {
            codebook.rows_mut().for_each(|code| {
                normalize_in_place(code);
            });
        }

        info!(
            num_codes = config.num_codes,
            dim = samples.dim(),
            samples = samples.len(),
            normalize = config.normalize,
            "Initialized competitive network"
        );

        Ok(Self {
            similarity: Similarity::for_normalized(config.normalize),
            config,
            samples,
            value_range,
            codebook,
            rng,
            last_step: None,
        })
    }

    /// Run one competitive update over the whole sample set.
    ///
    /// Winners are chosen against the codebook as it stood when the step
    /// began; updates are then applied one sample at a time, in sample order.
    pub fn train_step(&mut self, learning_rate: f32) -> Result<StepStats> {
        if !(learning_rate.is_finite() && learning_rate > 0.0 && learning_rate <= 1.0) {
            return Err(VqError::InvalidConfig(format!(
                "learning rate must be in (0, 1], got {}",
                learning_rate
            )));
        }

        let winners = self
            .codebook
            .assign(self.samples.as_slice(), self.similarity)?;
        let start = self.codebook.clone();
        let mut assignments = vec![0usize; self.codebook.num_codes()];

        for (sample, &w) in self.samples.rows().zip(winners.iter()) {
            assignments[w] += 1;
            for (c, &x) in self.codebook.get_mut(w).iter_mut().zip(sample) {
                *c += learning_rate * (x - *c);
            }
        }

        // Redraw dead codes from the same distribution used at construction
        let (lo, hi) = self.value_range;
        for (i, _) in assignments.iter().enumerate().filter(|(_, n)| **n == 0) {
            for c in self.codebook.get_mut(i) {
                *c = self.rng.gen_range(lo..=hi);
            }
        }

        if self.config.normalize {
            self.codebook.rows_mut().for_each(|code| {
                normalize_in_place(code);
            });
        }

        let max_winner_step = assignments
            .iter()
            .enumerate()
            .filter(|(_, n)| **n > 0)
            .filter_map(|(i, _)| Some(max_abs_diff(start.get(i)?, self.codebook.get(i)?)))
            .fold(0.0f32, f32::max);

        let losers = assignments.iter().filter(|&&n| n == 0).count();
        let stats = StepStats {
            step: self.steps() + 1,
            losers,
            winners: assignments.len() - losers,
            max_winner_step,
            assignments,
        };

        debug!(
            step = stats.step,
            losers = stats.losers,
            max_winner_step = stats.max_winner_step,
            "Training step"
        );

        self.last_step = Some(stats.clone());
        Ok(stats)
    }

    /// Whether training has settled: no losers and winner movement within tolerance.
    ///
    /// Only meaningful once a step has run; calling it earlier is an error.
    pub fn should_stop(&self) -> Result<bool> {
        let stats = self.last_step.as_ref().ok_or_else(|| {
            VqError::Precondition("should_stop called before the first training step".into())
        })?;

        Ok(stats.losers == 0 && stats.max_winner_step <= self.stop_threshold())
    }

    /// Winning code index for every row of a row-major query matrix.
    pub fn winner(&self, queries: &[f32]) -> Result<Vec<usize>> {
        self.ensure_trained("winner")?;
        self.codebook.assign(queries, self.similarity)
    }

    /// Winning code index for a single query vector.
    pub fn winner_one(&self, query: &[f32]) -> Result<usize> {
        self.ensure_trained("winner_one")?;
        self.codebook.nearest(query, self.similarity)
    }

    fn ensure_trained(&self, op: &str) -> Result<()> {
        if self.last_step.is_none() {
            return Err(VqError::Precondition(format!(
                "{} called before the first training step",
                op
            )));
        }
        Ok(())
    }

    /// Absolute movement bound used by [`should_stop`](Self::should_stop)
    pub fn stop_threshold(&self) -> f32 {
        let (lo, hi) = self.value_range;
        self.config.stop_tolerance * (hi - lo)
    }

    /// Current codebook
    pub fn codebook(&self) -> &Codebook {
        &self.codebook
    }

    /// Consume the network, keeping only its codebook
    pub fn into_codebook(self) -> Codebook {
        self.codebook
    }

    /// Working sample set (normalized when the network is)
    pub fn samples(&self) -> &SampleSet {
        &self.samples
    }

    /// Statistics of the most recent step
    pub fn last_step(&self) -> Option<&StepStats> {
        self.last_step.as_ref()
    }

    /// Number of steps run so far
    pub fn steps(&self) -> usize {
        self.last_step.as_ref().map(|s| s.step).unwrap_or(0)
    }

    /// Similarity metric in use
    pub fn similarity(&self) -> Similarity {
        self.similarity
    }

    /// Minimum and maximum sample value the codes are drawn from
    pub fn value_range(&self) -> (f32, f32) {
        self.value_range
    }

    /// Network configuration
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }
}

fn max_abs_diff(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0f32, f32::max)
}

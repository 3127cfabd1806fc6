//! Training drive loop

use crate::{CompetitiveNetwork, Result, StepStats, VqError};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Configuration for the training loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Learning rate for competitive updates
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f32,
    /// Stop after this many steps even if not converged; `None` runs until convergence
    #[serde(default)]
    pub max_steps: Option<usize>,
    /// Log progress every N steps
    #[serde(default = "default_log_interval")]
    pub log_interval: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            learning_rate: default_learning_rate(),
            max_steps: None,
            log_interval: default_log_interval(),
        }
    }
}

fn default_learning_rate() -> f32 {
    0.01
}

fn default_log_interval() -> usize {
    100
}

/// Outcome of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Steps run in this call
    pub steps: usize,
    /// Whether the network reached its stopping condition
    pub converged: bool,
    /// Statistics of the final step
    pub last: StepStats,
}

/// Drives a [`CompetitiveNetwork`] until it converges.
///
/// With `max_steps` unset there is no bound: a sample set that never
/// settles keeps the loop running. Set `max_steps` to cap it.
#[derive(Debug, Clone)]
pub struct Trainer {
    config: TrainingConfig,
}

impl Trainer {
    /// Create a new trainer
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    /// Train until convergence (or the step cap)
    pub fn train(&self, network: &mut CompetitiveNetwork) -> Result<TrainingReport> {
        self.train_with(network, |_| {})
    }

    /// Train until convergence, handing every step's statistics to `on_step`
    pub fn train_with<F>(&self, network: &mut CompetitiveNetwork, mut on_step: F) -> Result<TrainingReport>
    where
        F: FnMut(&StepStats),
    {
        if self.config.max_steps == Some(0) {
            return Err(VqError::InvalidConfig("max_steps must be positive".into()));
        }

        let mut steps = 0;
        loop {
            let stats = network.train_step(self.config.learning_rate)?;
            steps += 1;
            on_step(&stats);

            if network.should_stop()? {
                info!(
                    steps,
                    max_winner_step = stats.max_winner_step,
                    "Codebook converged"
                );
                return Ok(TrainingReport {
                    steps,
                    converged: true,
                    last: stats,
                });
            }

            if self.config.log_interval > 0 && steps % self.config.log_interval == 0 {
                info!(
                    steps,
                    losers = stats.losers,
                    max_winner_step = stats.max_winner_step,
                    threshold = network.stop_threshold(),
                    "Training progress"
                );
            }

            if self.config.max_steps.is_some_and(|max| steps >= max) {
                warn!(
                    steps,
                    losers = stats.losers,
                    max_winner_step = stats.max_winner_step,
                    "Step limit reached before convergence"
                );
                return Ok(TrainingReport {
                    steps,
                    converged: false,
                    last: stats,
                });
            }
        }
    }

    /// Get trainer configuration
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }
}

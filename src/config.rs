//! Simulation parameters, loadable from a JSON file.

use crate::error::{SimError, SimResult};
use crate::global_variables::{
    DEFAULT_ALPHA, DEFAULT_EPSILON, DEFAULT_GAMMA, DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH,
    DEFAULT_MAX_TICKS_PER_TRIAL, DEFAULT_NUM_DUMMIES, DEFAULT_N_TRIALS, MAX_GRID_DIMENSION,
    MIN_START_DESTINATION_DISTANCE,
};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Parameters of the epsilon-greedy Q-learning policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningParams {
    /// Probability of taking a uniformly random action.
    pub epsilon: f64,
    /// Learning rate.
    pub alpha: f64,
    /// Weight of the best next-state value.
    pub gamma: f64,
}

impl Default for LearningParams {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            alpha: DEFAULT_ALPHA,
            gamma: DEFAULT_GAMMA,
        }
    }
}

/// Where the run driver writes its per-trial report, if anywhere.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub csv_path: Option<String>,
    pub chart_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of intersection columns.
    pub grid_width: i32,
    /// Number of intersection rows.
    pub grid_height: i32,
    /// Background traffic agents created with the environment.
    pub num_dummies: usize,
    pub n_trials: usize,
    pub enforce_deadline: bool,
    /// Seed for every random draw in the run. `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Step budget per trial, the only stop condition when deadlines are not enforced.
    pub max_ticks_per_trial: u32,
    pub learning: LearningParams,
    pub report: ReportConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            grid_width: DEFAULT_GRID_WIDTH,
            grid_height: DEFAULT_GRID_HEIGHT,
            num_dummies: DEFAULT_NUM_DUMMIES,
            n_trials: DEFAULT_N_TRIALS,
            enforce_deadline: true,
            seed: None,
            max_ticks_per_trial: DEFAULT_MAX_TICKS_PER_TRIAL,
            learning: LearningParams::default(),
            report: ReportConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Reads a JSON config. Missing fields fall back to their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> SimResult<Self> {
        let file = File::open(path)?;
        let config: SimulationConfig = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> SimResult<()> {
        check_grid_size(self.grid_width, self.grid_height)?;
        let LearningParams {
            epsilon,
            alpha,
            gamma,
        } = self.learning;
        for (name, value) in [("epsilon", epsilon), ("alpha", alpha), ("gamma", gamma)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SimError::InvalidConfig(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if self.max_ticks_per_trial == 0 {
            return Err(SimError::InvalidConfig(
                "max_ticks_per_trial must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Rejects grids outside `1..=MAX_GRID_DIMENSION` on either axis and grids
/// with no intersection pair at the minimum start/destination distance.
pub(crate) fn check_grid_size(width: i32, height: i32) -> SimResult<()> {
    let in_range = 1..=MAX_GRID_DIMENSION;
    if !in_range.contains(&width) || !in_range.contains(&height) {
        return Err(SimError::InvalidConfig(format!(
            "grid must be between 1x1 and {MAX_GRID_DIMENSION}x{MAX_GRID_DIMENSION}, got {width}x{height}"
        )));
    }
    // The farthest pair of intersections sits at opposite corners.
    if (width - 1) + (height - 1) < MIN_START_DESTINATION_DISTANCE {
        return Err(SimError::UnsatisfiableEpisodeSetup {
            width,
            height,
            min_distance: MIN_START_DESTINATION_DISTANCE,
        });
    }
    Ok(())
}

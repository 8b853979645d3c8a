//! Tunable parameters shared by the world and the systems.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest number of cells a grid may hold.
pub const MAX_GRID_CELLS: u64 = 1 << 20;

/// Complete configuration of a simulation run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed feeding every random draw made during the run.
    pub seed: u64,
    /// Grid dimensions, hazard density and base layout.
    pub grid: GridConfig,
    /// Progress ratios that trigger spawn origins and waves.
    pub thresholds: ThresholdConfig,
    /// Wave sizing and difficulty scaling.
    pub waves: WaveConfig,
}

impl SimulationConfig {
    /// Checks every section and reports the first inconsistency found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grid.validate()?;
        self.thresholds.validate()?;
        self.waves.validate()
    }
}

/// Grid layout parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Number of columns.
    pub width: u32,
    /// Number of rows.
    pub height: u32,
    /// Fraction of all cells that should hide a hazard.
    pub hazard_ratio: f32,
    /// Side length of the centred square opened for free at start.
    pub safe_zone_size: u32,
    /// Side length of the centred square protected from spawn origins.
    pub base_size: u32,
    /// Minimum Manhattan distance between a spawn origin and the base.
    pub min_origin_distance: u32,
    /// Hit points of the base.
    pub base_health: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 20,
            height: 20,
            hazard_ratio: 0.12,
            safe_zone_size: 4,
            base_size: 2,
            min_origin_distance: 9,
            base_health: 20,
        }
    }
}

impl GridConfig {
    /// Checks dimensions and hazard ratio.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyGrid {
                width: self.width,
                height: self.height,
            });
        }

        if u64::from(self.width) * u64::from(self.height) > MAX_GRID_CELLS {
            return Err(ConfigError::GridTooLarge {
                width: self.width,
                height: self.height,
            });
        }

        if !(0.0..=1.0).contains(&self.hazard_ratio) {
            return Err(ConfigError::HazardRatio(self.hazard_ratio));
        }

        Ok(())
    }
}

/// Ascending progress ratios at which events fire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Ratios that each request one new spawn origin.
    pub origins: Vec<f32>,
    /// Ratios that each request one wave.
    pub waves: Vec<f32>,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            origins: vec![0.20, 0.40, 0.60],
            waves: vec![0.15, 0.30, 0.45, 0.60, 0.75, 0.90],
        }
    }
}

impl ThresholdConfig {
    /// Checks that both lists are ascending fractions of one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_thresholds(&self.origins)?;
        validate_thresholds(&self.waves)
    }
}

fn validate_thresholds(values: &[f32]) -> Result<(), ConfigError> {
    for &value in values {
        if !(0.0..=1.0).contains(&value) {
            return Err(ConfigError::ThresholdOutOfRange(value));
        }
    }

    if values.windows(2).any(|pair| pair[0] > pair[1]) {
        return Err(ConfigError::ThresholdsUnsorted);
    }

    Ok(())
}

/// Wave sizing and scaling parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    /// Enemies in a wave before the bonus is added.
    pub base_count: u32,
    /// Number of spawned enemies that adds one enemy to every later wave.
    pub bonus_every: u32,
    /// Health multiplier growth per enemy ever spawned.
    pub growth_factor: f32,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            base_count: 3,
            bonus_every: 3,
            growth_factor: 1.1,
        }
    }
}

impl WaveConfig {
    /// Checks the bonus interval and growth factor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bonus_every == 0 {
            return Err(ConfigError::ZeroBonusInterval);
        }

        if !(self.growth_factor > 0.0) || !self.growth_factor.is_finite() {
            return Err(ConfigError::GrowthFactor(self.growth_factor));
        }

        Ok(())
    }
}

/// Reasons a configuration is rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// One of the grid dimensions is zero.
    #[error("grid must have at least one cell, got {width}x{height}")]
    EmptyGrid {
        /// Configured width.
        width: u32,
        /// Configured height.
        height: u32,
    },
    /// The grid holds more than [`MAX_GRID_CELLS`] cells.
    #[error("grid of {width}x{height} exceeds {} cells", MAX_GRID_CELLS)]
    GridTooLarge {
        /// Configured width.
        width: u32,
        /// Configured height.
        height: u32,
    },
    /// Hazard ratio outside `0.0..=1.0`.
    #[error("hazard ratio {0} is outside 0.0..=1.0")]
    HazardRatio(f32),
    /// Threshold outside `0.0..=1.0`.
    #[error("threshold {0} is outside 0.0..=1.0")]
    ThresholdOutOfRange(f32),
    /// Threshold list is not ascending.
    #[error("thresholds must be listed in ascending order")]
    ThresholdsUnsorted,
    /// `bonus_every` is zero.
    #[error("wave bonus interval must be at least one")]
    ZeroBonusInterval,
    /// Growth factor is not a positive finite number.
    #[error("growth factor {0} must be positive and finite")]
    GrowthFactor(f32),
}

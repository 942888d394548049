//! Simulation tunables.
//!
//! Every field has a serde default so scenario files only need to name the
//! values they change.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Scales every caller-supplied time delta.
    #[serde(default = "default_speed_multiplier")]
    pub speed_multiplier: f64,
    #[serde(default = "default_mortality_base_rate")]
    pub mortality_base_rate: f64,
    #[serde(default = "default_global_capacity_multiplier")]
    pub global_capacity_multiplier: f64,
    /// Fraction of carrying capacity above which density stress applies.
    #[serde(default = "default_density_threshold")]
    pub density_threshold: f64,
    #[serde(default = "default_density_mortality_rate")]
    pub density_mortality_rate: f64,
    #[serde(default = "default_max_density_multiplier")]
    pub max_density_multiplier: f64,
    /// Fraction of the ceiling above which a population is in outbreak.
    #[serde(default = "default_outbreak_threshold")]
    pub outbreak_threshold: f64,
    /// Fraction of the ceiling above which reports carry a warning.
    #[serde(default = "default_warning_threshold")]
    pub warning_threshold: f64,
    #[serde(default = "default_extinction_risk_threshold")]
    pub extinction_risk_threshold: u64,
    #[serde(default = "default_season_cycle_length")]
    pub season_cycle_length: f64,
    /// Half-width of the uniform noise added to sampled temperature; humidity
    /// noise is scaled by 1/100. Zero disables sampling noise.
    #[serde(default)]
    pub environment_jitter: f64,
    #[serde(default)]
    pub severity_bands: SeverityBands,
}

/// Lower edges of the outbreak tiers as fractions of the ceiling; anything
/// in outbreak below `moderate_at` is Minor. Moderate is empty by default and
/// only appears when `moderate_at < major_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityBands {
    #[serde(default = "default_moderate_at")]
    pub moderate_at: f64,
    #[serde(default = "default_major_at")]
    pub major_at: f64,
    #[serde(default = "default_critical_at")]
    pub critical_at: f64,
}

fn default_seed() -> u64 {
    7
}

fn default_speed_multiplier() -> f64 {
    1.0
}

fn default_mortality_base_rate() -> f64 {
    0.05
}

fn default_global_capacity_multiplier() -> f64 {
    1.0
}

fn default_density_threshold() -> f64 {
    0.8
}

fn default_density_mortality_rate() -> f64 {
    0.1
}

fn default_max_density_multiplier() -> f64 {
    2.0
}

fn default_outbreak_threshold() -> f64 {
    0.7
}

fn default_warning_threshold() -> f64 {
    0.7
}

fn default_extinction_risk_threshold() -> u64 {
    10
}

fn default_season_cycle_length() -> f64 {
    120.0
}

fn default_moderate_at() -> f64 {
    0.85
}

fn default_major_at() -> f64 {
    0.85
}

fn default_critical_at() -> f64 {
    0.95
}

impl Default for SeverityBands {
    fn default() -> Self {
        Self {
            moderate_at: default_moderate_at(),
            major_at: default_major_at(),
            critical_at: default_critical_at(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            speed_multiplier: default_speed_multiplier(),
            mortality_base_rate: default_mortality_base_rate(),
            global_capacity_multiplier: default_global_capacity_multiplier(),
            density_threshold: default_density_threshold(),
            density_mortality_rate: default_density_mortality_rate(),
            max_density_multiplier: default_max_density_multiplier(),
            outbreak_threshold: default_outbreak_threshold(),
            warning_threshold: default_warning_threshold(),
            extinction_risk_threshold: default_extinction_risk_threshold(),
            season_cycle_length: default_season_cycle_length(),
            environment_jitter: 0.0,
            severity_bands: SeverityBands::default(),
        }
    }
}

impl SimulationConfig {
    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_yaml::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

//! Per-species lifecycle parameters and the catalog that owns them.
//!
//! Profiles are data: the built-in table lives in `data/species.yaml` and
//! scenarios may register more. Once a [`ProfileCatalog`] is handed to a
//! simulation it is only read.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::ids::SpeciesId;
use crate::stage::LifecycleStage;
use crate::zone::EnvironmentalConditions;

const BUILTIN_SPECIES: &str = include_str!("../data/species.yaml");

/// Deviation ratio used when a tolerance is zero or negative.
const ZERO_TOLERANCE_RATIO: f64 = 2.0;
const MIN_ENVIRONMENTAL_EFFECT: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleProfile {
    pub species_id: SpeciesId,
    #[serde(default)]
    pub display_name: String,
    /// Ordered stage sequence; the last entry has no successor.
    pub stages: Vec<LifecycleStage>,
    pub stage_durations: BTreeMap<LifecycleStage, f64>,
    pub stage_survival_rates: BTreeMap<LifecycleStage, f64>,
    pub reproduction_rate: f64,
    pub optimal_temperature: f64,
    pub temperature_tolerance: f64,
    pub optimal_humidity: f64,
    pub humidity_tolerance: f64,
    pub base_capacity: f64,
    #[serde(default)]
    pub migration_rate: f64,
}

/// How a profile reacts to one set of conditions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvironmentResponse {
    pub temperature_effect: f64,
    pub humidity_effect: f64,
    pub stress: f64,
}

impl EnvironmentResponse {
    pub fn development_multiplier(&self) -> f64 {
        self.temperature_effect * self.humidity_effect
    }

    pub fn mean_effect(&self) -> f64 {
        (self.temperature_effect + self.humidity_effect) * 0.5
    }
}

impl LifecycleProfile {
    /// Profile used for species the catalog does not know: a generic
    /// Egg → Larva → Pupa → Adult insect comfortable at 24 °C / 60 % RH.
    pub fn fallback(species_id: SpeciesId) -> Self {
        use LifecycleStage::*;
        Self {
            species_id,
            display_name: "Generic pest".to_string(),
            stages: vec![Egg, Larva, Pupa, Adult],
            stage_durations: BTreeMap::from([(Egg, 3.0), (Larva, 5.0), (Pupa, 4.0), (Adult, 15.0)]),
            stage_survival_rates: BTreeMap::from([
                (Egg, 0.8),
                (Larva, 0.7),
                (Pupa, 0.85),
                (Adult, 0.9),
            ]),
            reproduction_rate: 1.0,
            optimal_temperature: 24.0,
            temperature_tolerance: 6.0,
            optimal_humidity: 0.6,
            humidity_tolerance: 0.2,
            base_capacity: 5_000.0,
            migration_rate: 0.01,
        }
    }

    pub fn next_stage(&self, stage: LifecycleStage) -> Option<LifecycleStage> {
        let index = self.stages.iter().position(|s| *s == stage)?;
        self.stages.get(index + 1).copied()
    }

    pub fn has_stage(&self, stage: LifecycleStage) -> bool {
        self.stages.contains(&stage)
    }

    pub fn stage_duration(&self, stage: LifecycleStage) -> Option<f64> {
        self.stage_durations.get(&stage).copied()
    }

    /// Stages without a declared rate survive promotion intact.
    pub fn survival_rate(&self, stage: LifecycleStage) -> f64 {
        self.stage_survival_rates
            .get(&stage)
            .copied()
            .unwrap_or(1.0)
            .clamp(0.0, 1.0)
    }

    pub fn respond_to(&self, conditions: &EnvironmentalConditions) -> EnvironmentResponse {
        let temperature_ratio = deviation_ratio(
            (conditions.temperature - self.optimal_temperature).abs(),
            self.temperature_tolerance,
        );
        let humidity_ratio = deviation_ratio(
            (conditions.humidity - self.optimal_humidity).abs(),
            self.humidity_tolerance,
        );
        EnvironmentResponse {
            temperature_effect: effect_from_ratio(temperature_ratio),
            humidity_effect: effect_from_ratio(humidity_ratio),
            stress: ((temperature_ratio + humidity_ratio) * 0.5 - 1.0).max(0.0),
        }
    }

    fn validate(mut self) -> Result<Self> {
        if self.stages.is_empty() {
            return Err(SimError::InvalidProfile {
                species: self.species_id,
                reason: "stage sequence is empty".into(),
            });
        }
        for (index, stage) in self.stages.iter().enumerate() {
            if self.stages[..index].contains(stage) {
                return Err(SimError::InvalidProfile {
                    species: self.species_id.clone(),
                    reason: format!("stage {stage} listed more than once"),
                });
            }
        }
        for rate in self.stage_survival_rates.values_mut() {
            *rate = rate.clamp(0.0, 1.0);
        }
        self.reproduction_rate = self.reproduction_rate.max(0.0);
        self.migration_rate = self.migration_rate.max(0.0);
        self.base_capacity = self.base_capacity.max(0.0);
        Ok(self)
    }
}

/// `deviation / tolerance`, with non-positive tolerance counted as outside the band.
fn deviation_ratio(deviation: f64, tolerance: f64) -> f64 {
    if tolerance > 0.0 && deviation.is_finite() {
        deviation / tolerance
    } else {
        ZERO_TOLERANCE_RATIO.max(1.0 + deviation.abs())
    }
}

fn effect_from_ratio(ratio: f64) -> f64 {
    if ratio <= 1.0 {
        1.0
    } else {
        (2.0 - ratio).max(MIN_ENVIRONMENTAL_EFFECT)
    }
}

#[derive(Debug, Clone)]
pub struct ProfileCatalog {
    profiles: HashMap<SpeciesId, Arc<LifecycleProfile>>,
    fallback: Arc<LifecycleProfile>,
}

impl ProfileCatalog {
    pub fn empty() -> Self {
        Self {
            profiles: HashMap::new(),
            fallback: Arc::new(LifecycleProfile::fallback(SpeciesId::from("unknown"))),
        }
    }

    pub fn builtin() -> Result<Self> {
        Self::from_yaml_str(BUILTIN_SPECIES)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let profiles: Vec<LifecycleProfile> = serde_yaml::from_str(text)?;
        let mut catalog = Self::empty();
        for profile in profiles {
            catalog.register(profile)?;
        }
        Ok(catalog)
    }

    /// Adds or replaces a profile. Only meaningful before the catalog is
    /// shared with a simulation.
    pub fn register(&mut self, profile: LifecycleProfile) -> Result<()> {
        let profile = profile.validate()?;
        self.profiles
            .insert(profile.species_id.clone(), Arc::new(profile));
        Ok(())
    }

    pub fn contains(&self, species: &SpeciesId) -> bool {
        self.profiles.contains_key(species)
    }

    pub fn get_profile(&self, species: &SpeciesId) -> Arc<LifecycleProfile> {
        self.profiles
            .get(species)
            .cloned()
            .unwrap_or_else(|| Arc::clone(&self.fallback))
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

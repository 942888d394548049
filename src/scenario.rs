use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::{
    config::SimulationConfig,
    ids::{SpeciesId, ZoneId},
    interaction::{InteractionType, SpeciesInteraction},
    profile::{LifecycleProfile, ProfileCatalog},
    simulation::Simulation,
    stage::LifecycleStage,
    zone::{EnvironmentalConditions, EnvironmentalTreatment},
};

fn default_dt() -> f64 {
    1.0
}

fn default_report_interval_ticks() -> u64 {
    10
}

fn default_capacity_multiplier() -> f64 {
    1.0
}

fn default_stage() -> LifecycleStage {
    LifecycleStage::Adult
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub config: SimulationConfig,
    #[serde(default = "default_dt")]
    pub dt: f64,
    #[serde(default)]
    pub ticks: Option<u64>,
    #[serde(default = "default_report_interval_ticks")]
    pub report_interval_ticks: u64,
    /// Profiles added to (or replacing entries of) the built-in catalog.
    #[serde(default)]
    pub species: Vec<LifecycleProfile>,
    pub zones: Vec<ScenarioZone>,
    #[serde(default)]
    pub interactions: Vec<ScenarioInteraction>,
    #[serde(default)]
    pub introductions: Vec<ScenarioIntroduction>,
    #[serde(default)]
    pub treatments: Vec<ScheduledTreatment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioZone {
    pub id: ZoneId,
    #[serde(flatten)]
    pub conditions: EnvironmentalConditions,
    #[serde(default = "default_capacity_multiplier")]
    pub capacity_multiplier: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioInteraction {
    pub source: SpeciesId,
    #[serde(rename = "type")]
    pub interaction_type: InteractionType,
    pub target: SpeciesId,
    pub strength: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioIntroduction {
    pub species: SpeciesId,
    pub zone: ZoneId,
    pub count: u64,
    #[serde(default = "default_stage")]
    pub stage: LifecycleStage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduledTreatment {
    /// Applied just before this tick runs.
    pub at_tick: u64,
    pub zone: ZoneId,
    #[serde(flatten)]
    pub treatment: EnvironmentalTreatment,
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(scenario)
    }
}

impl Scenario {
    pub fn build_simulation(&self) -> Result<Simulation> {
        let mut catalog = ProfileCatalog::builtin()?;
        for profile in &self.species {
            catalog
                .register(profile.clone())
                .with_context(|| format!("Invalid species profile {}", profile.species_id))?;
        }

        let mut simulation = Simulation::with_catalog(catalog, self.config.clone());
        for zone in &self.zones {
            simulation.register_zone(
                zone.id.clone(),
                zone.conditions.clone(),
                zone.capacity_multiplier,
            );
        }
        for interaction in &self.interactions {
            simulation.declare_interaction(
                interaction.source.clone(),
                SpeciesInteraction::new(
                    interaction.interaction_type,
                    interaction.target.clone(),
                    interaction.strength,
                ),
            );
        }
        for intro in &self.introductions {
            simulation
                .introduce_species(&intro.species, &intro.zone, intro.count, intro.stage)
                .with_context(|| {
                    format!("Failed to introduce {} into {}", intro.species, intro.zone)
                })?;
        }
        Ok(simulation)
    }

    pub fn ticks(&self, override_ticks: Option<u64>) -> u64 {
        override_ticks.or(self.ticks).unwrap_or(60)
    }

    pub fn treatments_due(&self, tick: u64) -> impl Iterator<Item = &ScheduledTreatment> {
        self.treatments.iter().filter(move |t| t.at_tick == tick)
    }
}

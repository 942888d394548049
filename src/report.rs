use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::clock::Season;
use crate::event::OutbreakSeverity;
use crate::ids::{PopulationId, SpeciesId, ZoneId};
use crate::stage::LifecycleStage;
use crate::world::World;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutbreakWarning {
    pub population_id: PopulationId,
    pub species_id: SpeciesId,
    pub zone_id: ZoneId,
    pub total: u64,
    pub ceiling: f64,
    pub ratio: f64,
    pub severity: OutbreakSeverity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtinctionRisk {
    pub population_id: PopulationId,
    pub species_id: SpeciesId,
    pub zone_id: ZoneId,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DegradedStage {
    pub population_id: PopulationId,
    pub stage: LifecycleStage,
}

/// Read-only aggregate of the simulation at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub tick: u64,
    pub simulation_time: f64,
    pub season: Season,
    pub total_population: u64,
    pub active_populations: usize,
    pub active_species: usize,
    pub species_totals: BTreeMap<SpeciesId, u64>,
    pub zone_totals: BTreeMap<ZoneId, u64>,
    pub stage_distribution: BTreeMap<LifecycleStage, u64>,
    pub outbreak_warnings: Vec<OutbreakWarning>,
    pub extinction_risks: Vec<ExtinctionRisk>,
    pub degraded_stages: Vec<DegradedStage>,
    pub total_extinctions: u64,
    pub total_emigrants: u64,
}

fn add_to<K: Ord>(totals: &mut BTreeMap<K, u64>, key: K, amount: u64) {
    let slot = totals.entry(key).or_insert(0);
    *slot = slot.saturating_add(amount);
}

impl SimulationReport {
    pub fn from_world(world: &World) -> Self {
        let config = world.config();
        let mut species_totals = BTreeMap::new();
        let mut zone_totals = BTreeMap::new();
        let mut stage_distribution = BTreeMap::new();
        let mut species = BTreeSet::new();
        let mut outbreak_warnings = Vec::new();
        let mut extinction_risks = Vec::new();

        for population in world.populations() {
            let total = population.total();
            species.insert(population.species_id.clone());
            add_to(&mut species_totals, population.species_id.clone(), total);
            add_to(&mut zone_totals, population.zone_id.clone(), total);
            for data in population.stages() {
                add_to(&mut stage_distribution, data.stage, data.population_count);
            }

            let ceiling = world.carrying_capacity(population);
            let ratio = if ceiling > 0.0 {
                total as f64 / ceiling
            } else if total > 0 {
                f64::INFINITY
            } else {
                0.0
            };
            if ratio > config.warning_threshold {
                outbreak_warnings.push(OutbreakWarning {
                    population_id: population.population_id.clone(),
                    species_id: population.species_id.clone(),
                    zone_id: population.zone_id.clone(),
                    total,
                    ceiling,
                    ratio,
                    severity: OutbreakSeverity::classify(ratio, &config.severity_bands),
                });
            }
            if total < config.extinction_risk_threshold {
                extinction_risks.push(ExtinctionRisk {
                    population_id: population.population_id.clone(),
                    species_id: population.species_id.clone(),
                    zone_id: population.zone_id.clone(),
                    total,
                });
            }
        }

        let stats = world.stats();
        Self {
            tick: world.clock().tick(),
            simulation_time: world.clock().simulation_time(),
            season: world.clock().season(),
            total_population: world.total_population(),
            active_populations: world.populations().count(),
            active_species: species.len(),
            species_totals,
            zone_totals,
            stage_distribution,
            outbreak_warnings,
            extinction_risks,
            degraded_stages: world
                .degraded_stages()
                .map(|(population_id, stage)| DegradedStage {
                    population_id: population_id.clone(),
                    stage: *stage,
                })
                .collect(),
            total_extinctions: stats.extinctions,
            total_emigrants: stats.emigrants,
        }
    }
}

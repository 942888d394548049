use std::collections::{BTreeMap, BTreeSet};

use crate::clock::SimulationClock;
use crate::config::SimulationConfig;
use crate::event::SimulationEvent;
use crate::ids::{PopulationId, SpeciesId, ZoneId};
use crate::interaction::InteractionTable;
use crate::population::PestPopulation;
use crate::profile::ProfileCatalog;
use crate::stage::LifecycleStage;
use crate::zone::{EnvironmentalConditions, ZoneRegistry};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorldStats {
    pub extinctions: u64,
    pub emigrants: u64,
}

/// Everything the systems read and mutate during a tick.
pub struct World {
    pub(crate) config: SimulationConfig,
    pub(crate) catalog: ProfileCatalog,
    pub(crate) zones: ZoneRegistry,
    pub(crate) interactions: InteractionTable,
    pub(crate) populations: BTreeMap<PopulationId, PestPopulation>,
    pub(crate) clock: SimulationClock,
    /// Conditions the current tick sees, per zone.
    pub(crate) sampled: BTreeMap<ZoneId, EnvironmentalConditions>,
    pub(crate) degraded: BTreeSet<(PopulationId, LifecycleStage)>,
    pub(crate) pending_events: Vec<SimulationEvent>,
    pub(crate) stats: WorldStats,
}

impl World {
    pub fn new(catalog: ProfileCatalog, config: SimulationConfig) -> Self {
        Self {
            clock: SimulationClock::new(config.season_cycle_length),
            config,
            catalog,
            zones: ZoneRegistry::new(),
            interactions: InteractionTable::new(),
            populations: BTreeMap::new(),
            sampled: BTreeMap::new(),
            degraded: BTreeSet::new(),
            pending_events: Vec::new(),
            stats: WorldStats::default(),
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn stats(&self) -> WorldStats {
        self.stats
    }

    pub fn population_for(&self, species: &SpeciesId, zone: &ZoneId) -> Option<&PestPopulation> {
        self.populations.get(&PopulationId::for_pair(zone, species))
    }

    pub fn populations(&self) -> impl Iterator<Item = &PestPopulation> {
        self.populations.values()
    }

    pub fn total_population(&self) -> u64 {
        self.populations
            .values()
            .fold(0u64, |acc, p| acc.saturating_add(p.total()))
    }

    pub(crate) fn population_ids(&self) -> Vec<PopulationId> {
        self.populations.keys().cloned().collect()
    }

    /// Sampled conditions for this tick, or the zone's own conditions
    /// before the first sample.
    pub fn conditions_for(&self, zone: &ZoneId) -> Option<&EnvironmentalConditions> {
        self.sampled
            .get(zone)
            .or_else(|| self.zones.get_zone(zone).ok().map(|z| &z.conditions))
    }

    /// Carrying capacity of a population in its zone; also its outbreak ceiling.
    pub fn carrying_capacity(&self, population: &PestPopulation) -> f64 {
        let zone_multiplier = self
            .zones
            .get_zone(&population.zone_id)
            .map(|z| z.carrying_capacity_multiplier)
            .unwrap_or(1.0);
        population.profile().base_capacity
            * zone_multiplier
            * self.config.global_capacity_multiplier.max(0.0)
    }

    /// Records a stage the profile cannot develop. Returns `true` the first time.
    pub(crate) fn mark_degraded(&mut self, id: &PopulationId, stage: LifecycleStage) -> bool {
        self.degraded.insert((id.clone(), stage))
    }

    pub fn degraded_stages(&self) -> impl Iterator<Item = &(PopulationId, LifecycleStage)> {
        self.degraded.iter()
    }
}

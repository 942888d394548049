//! The single owning entry point for hosts.
//!
//! A [`Simulation`] owns the catalog, the zone registry, the interaction
//! table and every population. Hosts introduce species, apply treatments,
//! advance time and read reports through it and nothing else.

use tracing::info;

use crate::config::SimulationConfig;
use crate::engine::{Engine, EngineBuilder, TickSummary};
use crate::error::{Result, SimError};
use crate::event::EventSink;
use crate::ids::{PopulationId, SpeciesId, ZoneId};
use crate::interaction::SpeciesInteraction;
use crate::population::PestPopulation;
use crate::profile::ProfileCatalog;
use crate::report::SimulationReport;
use crate::stage::LifecycleStage;
use crate::world::World;
use crate::zone::{
    EnvironmentalConditions, EnvironmentalTreatment, EnvironmentalZone, TreatmentType,
};

pub struct Simulation {
    world: World,
    engine: Engine,
}

impl Simulation {
    /// A simulation over the built-in species catalog.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        Ok(Self::with_catalog(ProfileCatalog::builtin()?, config))
    }

    pub fn with_catalog(catalog: ProfileCatalog, config: SimulationConfig) -> Self {
        let engine = EngineBuilder::standard(config.seed).build();
        Self {
            world: World::new(catalog, config),
            engine,
        }
    }

    pub fn register_zone(
        &mut self,
        zone_id: impl Into<ZoneId>,
        conditions: EnvironmentalConditions,
        carrying_capacity_multiplier: f64,
    ) {
        self.world
            .zones
            .register_zone(zone_id.into(), conditions, carrying_capacity_multiplier);
    }

    pub fn zone(&self, zone_id: &ZoneId) -> Result<&EnvironmentalZone> {
        self.world.zones.get_zone(zone_id)
    }

    pub fn declare_interaction(
        &mut self,
        source: impl Into<SpeciesId>,
        interaction: SpeciesInteraction,
    ) {
        self.world.interactions.declare(source.into(), interaction);
    }

    pub fn add_event_sink(&mut self, sink: impl EventSink + 'static) {
        self.engine.add_sink(sink);
    }

    /// Adds `count` individuals at `stage`, merging into the active
    /// population of that species in that zone if there is one.
    ///
    /// A zero count validates the identifiers and changes nothing.
    pub fn introduce_species(
        &mut self,
        species_id: &SpeciesId,
        zone_id: &ZoneId,
        count: u64,
        stage: LifecycleStage,
    ) -> Result<PopulationId> {
        if !self.world.zones.contains(zone_id) {
            return Err(SimError::ZoneNotFound(zone_id.clone()));
        }
        if !self.world.catalog.contains(species_id) {
            return Err(SimError::SpeciesNotFound(species_id.clone()));
        }
        let id = PopulationId::for_pair(zone_id, species_id);
        if count == 0 {
            return Ok(id);
        }

        let now = self.world.clock.simulation_time();
        let profile = self.world.catalog.get_profile(species_id);
        let population = self
            .world
            .populations
            .entry(id.clone())
            .or_insert_with(|| {
                PestPopulation::new(zone_id.clone(), species_id.clone(), profile, now)
            });
        population.add(stage, count);
        info!(population = %id, count, %stage, total = population.total(), "species introduced");
        Ok(id)
    }

    pub fn introduce_adults(
        &mut self,
        species_id: &SpeciesId,
        zone_id: &ZoneId,
        count: u64,
    ) -> Result<PopulationId> {
        self.introduce_species(species_id, zone_id, count, LifecycleStage::Adult)
    }

    pub fn population(&self, species_id: &SpeciesId, zone_id: &ZoneId) -> Option<&PestPopulation> {
        self.world.population_for(species_id, zone_id)
    }

    pub fn active_populations(&self) -> Vec<&PestPopulation> {
        self.world.populations().filter(|p| p.is_active()).collect()
    }

    /// Shifts the zone's conditions and immediately thins every population
    /// in it: all stages for an environmental adjustment, larvae only for
    /// biological control.
    pub fn apply_environmental_treatment(
        &mut self,
        zone_id: &ZoneId,
        treatment: &EnvironmentalTreatment,
    ) -> Result<()> {
        let now = self.world.clock.simulation_time();
        self.world.zones.apply_treatment(zone_id, treatment, now)?;

        let effectiveness = treatment.effectiveness.clamp(0.0, 1.0);
        let mut removed: u64 = 0;
        for population in self
            .world
            .populations
            .values_mut()
            .filter(|p| &p.zone_id == zone_id)
        {
            let thinned = match treatment.treatment_type {
                TreatmentType::EnvironmentalAdjustment => {
                    population.remove_fraction(effectiveness, |_| true)
                }
                TreatmentType::BiologicalControl => population
                    .remove_fraction(effectiveness, |stage| stage == LifecycleStage::Larva),
            };
            removed = removed.saturating_add(thinned);
        }
        info!(zone = %zone_id, treatment = ?treatment.treatment_type, removed, "treatment applied");
        Ok(())
    }

    pub fn tick(&mut self, dt: f64) -> TickSummary {
        self.engine.tick(&mut self.world, dt)
    }

    pub fn simulation_report(&self) -> SimulationReport {
        SimulationReport::from_world(&self.world)
    }
}

use tracing::warn;

use crate::{
    engine::{System, SystemContext},
    event::SimulationEvent,
    population::round_count,
    rng::SystemRng,
    stage::LifecycleStage,
    world::World,
};

/// Advances development progress and promotes matured cohorts.
pub struct DevelopmentSystem;

impl DevelopmentSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DevelopmentSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for DevelopmentSystem {
    fn name(&self) -> &str {
        "development"
    }

    fn run(&mut self, ctx: &SystemContext, world: &mut World, _rng: &mut SystemRng<'_>) {
        for id in world.population_ids() {
            let Some((response, _)) = super::local_state(world, &id) else {
                continue;
            };
            let Some(population) = world.populations.get_mut(&id) else {
                continue;
            };
            let profile = population.shared_profile();
            let progress = response.development_multiplier() * ctx.dt;

            let mut degraded: Vec<LifecycleStage> = Vec::new();
            for stage in population.occupied_stages() {
                match profile.stage_duration(stage) {
                    Some(_) if profile.has_stage(stage) => {
                        if let Some(data) = population.stage_mut(stage) {
                            data.development_progress += progress;
                        }
                    }
                    _ => degraded.push(stage),
                }
            }

            // Last stage first, so a cohort moves at most one stage per tick.
            let mut events = Vec::new();
            for &stage in profile.stages.iter().rev() {
                let (Some(next), Some(duration)) =
                    (profile.next_stage(stage), profile.stage_duration(stage))
                else {
                    continue;
                };
                let Some(data) = population.stage_mut(stage) else {
                    continue;
                };
                if data.is_empty() || data.development_progress < duration {
                    continue;
                }
                let survivors = data.population_count as f64 * profile.survival_rate(stage);
                let promoted = round_count(survivors);
                data.reset();
                population.add(next, promoted);
                events.push(SimulationEvent::StageAdvanced {
                    population_id: id.clone(),
                    from: stage,
                    to: next,
                    promoted,
                    time: ctx.time,
                });
            }

            world.pending_events.extend(events);
            for stage in degraded {
                if world.mark_degraded(&id, stage) {
                    warn!(
                        population = %id,
                        %stage,
                        "stage has no development duration in its profile; skipping"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Season;
    use crate::config::SimulationConfig;
    use crate::ids::{SpeciesId, ZoneId};
    use crate::population::PestPopulation;
    use crate::profile::ProfileCatalog;
    use crate::rng::RngManager;
    use crate::zone::EnvironmentalConditions;

    fn world_with(stage: LifecycleStage, count: u64, progress: f64) -> World {
        let catalog = ProfileCatalog::builtin().unwrap();
        let mut world = World::new(catalog, SimulationConfig::default());
        let zone = ZoneId::from("veg");
        world.zones.register_zone(zone.clone(), EnvironmentalConditions::default(), 1.0);
        let species = SpeciesId::from("aphids");
        let mut population =
            PestPopulation::new(zone, species.clone(), world.catalog.get_profile(&species), 0.0);
        population.add(stage, count);
        if let Some(data) = population.stage_mut(stage) {
            data.development_progress = progress;
        }
        world.populations.insert(population.population_id.clone(), population);
        world
    }

    fn ctx(dt: f64) -> SystemContext {
        SystemContext {
            tick: 1,
            dt,
            time: dt,
            season: Season::Spring,
        }
    }

    #[test]
    fn progress_accumulates_below_threshold() {
        let mut world = world_with(LifecycleStage::Egg, 50, 0.0);
        let mut rng = RngManager::new(1);
        DevelopmentSystem::new().run(&ctx(1.0), &mut world, &mut rng.stream("development"));
        let pop = world.populations.values().next().unwrap();
        let egg = pop.stage(LifecycleStage::Egg).unwrap();
        assert_eq!(egg.population_count, 50);
        assert!((egg.development_progress - 1.0).abs() < 1e-9);
        assert!(world.pending_events.is_empty());
    }

    #[test]
    fn matured_cohort_moves_to_declared_next_stage() {
        // Aphids skip larva: egg -> nymph.
        let mut world = world_with(LifecycleStage::Egg, 50, 3.9);
        let mut rng = RngManager::new(1);
        DevelopmentSystem::new().run(&ctx(1.0), &mut world, &mut rng.stream("development"));
        let pop = world.populations.values().next().unwrap();
        assert_eq!(pop.stage_count(LifecycleStage::Egg), 0);
        assert_eq!(pop.stage_count(LifecycleStage::Larva), 0);
        assert_eq!(pop.stage_count(LifecycleStage::Nymph), 40);
        assert_eq!(world.pending_events.len(), 1);
    }

    #[test]
    fn zero_duration_stage_completes_immediately() {
        let mut catalog = ProfileCatalog::builtin().unwrap();
        let species = SpeciesId::from("aphids");
        let mut profile = (*catalog.get_profile(&species)).clone();
        profile.stage_durations.insert(LifecycleStage::Egg, 0.0);
        catalog.register(profile).unwrap();

        let mut world = World::new(catalog, SimulationConfig::default());
        let zone = ZoneId::from("veg");
        world.zones.register_zone(zone.clone(), EnvironmentalConditions::default(), 1.0);
        let mut population =
            PestPopulation::new(zone, species.clone(), world.catalog.get_profile(&species), 0.0);
        population.add(LifecycleStage::Egg, 50);
        world.populations.insert(population.population_id.clone(), population);

        let mut rng = RngManager::new(1);
        DevelopmentSystem::new().run(&ctx(0.5), &mut world, &mut rng.stream("development"));
        let pop = world.populations.values().next().unwrap();
        assert_eq!(pop.stage_count(LifecycleStage::Egg), 0);
        assert_eq!(pop.stage_count(LifecycleStage::Nymph), 40);
        assert!(world.degraded_stages().next().is_none());
    }

    #[test]
    fn stage_outside_profile_is_reported_not_developed() {
        let mut world = world_with(LifecycleStage::Pupa, 20, 0.0);
        let mut rng = RngManager::new(1);
        DevelopmentSystem::new().run(&ctx(1.0), &mut world, &mut rng.stream("development"));
        let pop = world.populations.values().next().unwrap();
        assert_eq!(pop.stage(LifecycleStage::Pupa).unwrap().development_progress, 0.0);
        assert_eq!(world.degraded_stages().count(), 1);
    }
}

use crate::{
    engine::{System, SystemContext},
    population::round_count,
    rng::SystemRng,
    world::World,
};

/// Stress-adjusted background mortality followed by density-dependent loss.
pub struct MortalitySystem;

impl MortalitySystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MortalitySystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for MortalitySystem {
    fn name(&self) -> &str {
        "mortality"
    }

    fn run(&mut self, ctx: &SystemContext, world: &mut World, _rng: &mut SystemRng<'_>) {
        let base_rate = world.config.mortality_base_rate.max(0.0);
        let density_threshold = world.config.density_threshold;
        let density_rate = world.config.density_mortality_rate.max(0.0);
        let max_multiplier = world.config.max_density_multiplier;

        for id in world.population_ids() {
            let Some((response, capacity)) = super::local_state(world, &id) else {
                continue;
            };
            let Some(population) = world.populations.get_mut(&id) else {
                continue;
            };
            let profile = population.shared_profile();

            for stage in population.occupied_stages() {
                let Some(data) = population.stage_mut(stage) else {
                    continue;
                };
                let deaths = round_count(
                    data.population_count as f64
                        * base_rate
                        * (1.0 - profile.survival_rate(stage))
                        * (1.0 + response.stress)
                        * ctx.dt,
                );
                data.remove(deaths);
            }

            let total = population.total() as f64;
            if total > 0.0 && total > density_threshold * capacity {
                let multiplier = if capacity > 0.0 {
                    (total / capacity).min(max_multiplier)
                } else {
                    max_multiplier
                };
                population.remove_fraction(density_rate * multiplier * ctx.dt, |_| true);
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
    use crate::stage::LifecycleStage;
    use crate::zone::EnvironmentalConditions;

    fn world(config: SimulationConfig, temperature: f64, adults: u64) -> World {
        let mut world = World::new(ProfileCatalog::builtin().unwrap(), config);
        let zone = ZoneId::from("veg");
        world.zones.register_zone(
            zone.clone(),
            EnvironmentalConditions {
                temperature,
                humidity: 0.6,
                ..EnvironmentalConditions::default()
            },
            1.0,
        );
        let species = SpeciesId::from("aphids");
        let profile = world.catalog.get_profile(&species);
        let mut pop = PestPopulation::new(zone, species, profile, 0.0);
        pop.add(LifecycleStage::Adult, adults);
        world.populations.insert(pop.population_id.clone(), pop);
        world
    }

    fn run(world: &mut World) -> u64 {
        let ctx = SystemContext {
            tick: 1,
            dt: 1.0,
            time: 1.0,
            season: Season::Spring,
        };
        let mut rng = RngManager::new(0);
        MortalitySystem::new().run(&ctx, world, &mut rng.stream("mortality"));
        world.total_population()
    }

    #[test]
    fn stress_raises_mortality() {
        let config = SimulationConfig {
            mortality_base_rate: 0.5,
            ..SimulationConfig::default()
        };
        let mut comfortable = world(config.clone(), 22.0, 1_000);
        let mut hot = world(config, 40.0, 1_000);
        // 1000 * 0.5 * 0.08 = 40 deaths at the optimum.
        assert_eq!(run(&mut comfortable), 960);
        assert!(run(&mut hot) < 960);
    }

    #[test]
    fn crowding_triggers_density_loss() {
        let config = SimulationConfig {
            mortality_base_rate: 0.0,
            ..SimulationConfig::default()
        };
        // Aphid capacity is 15 000; 14 000 is above 80 %.
        let mut crowded = world(config.clone(), 22.0, 14_000);
        let mut sparse = world(config, 22.0, 1_000);
        assert!(run(&mut crowded) < 14_000);
        assert_eq!(run(&mut sparse), 1_000);
    }

    #[test]
    fn density_multiplier_is_capped() {
        let config = SimulationConfig {
            mortality_base_rate: 0.0,
            ..SimulationConfig::default()
        };
        // 60 000 / 15 000 = 4, capped at 2: loses 0.1 * 2 = 20 %.
        let mut packed = world(config, 22.0, 60_000);
        assert_eq!(run(&mut packed), 48_000);
    }
}

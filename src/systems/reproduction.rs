use crate::{
    engine::{System, SystemContext},
    population::round_count,
    rng::SystemRng,
    stage::LifecycleStage,
    world::World,
};

/// Share of adults that reproduce in a tick.
const ACTIVE_ADULT_FRACTION: f64 = 0.5;

/// Adult reproduction into the egg stage, then emigration of surplus adults.
pub struct ReproductionSystem;

impl ReproductionSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ReproductionSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for ReproductionSystem {
    fn name(&self) -> &str {
        "reproduction"
    }

    fn run(&mut self, ctx: &SystemContext, world: &mut World, _rng: &mut SystemRng<'_>) {
        let mut emigrants: u64 = 0;
        for id in world.population_ids() {
            let Some((response, capacity)) = super::local_state(world, &id) else {
                continue;
            };
            let Some(population) = world.populations.get_mut(&id) else {
                continue;
            };
            let reproduction_rate = population.profile().reproduction_rate;
            let migration_rate = population.profile().migration_rate;

            let adults = population.stage_count(LifecycleStage::Adult);
            if adults > 0 && reproduction_rate > 0.0 {
                let effective_rate = reproduction_rate * response.mean_effect() * ctx.dt;
                let offspring = round_count(adults as f64 * ACTIVE_ADULT_FRACTION * effective_rate);
                if offspring > 0 {
                    population.add(LifecycleStage::Egg, offspring);
                }
            }

            // Migrants leave the simulation; no destination zone is modeled.
            let total = population.total();
            if total as f64 > capacity && migration_rate > 0.0 {
                let migrants = round_count(total as f64 * migration_rate * ctx.dt);
                let left = population.remove_from_stage(LifecycleStage::Adult, migrants);
                emigrants = emigrants.saturating_add(left);
            }
        }
        world.stats.emigrants = world.stats.emigrants.saturating_add(emigrants);
    }
}

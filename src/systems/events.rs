use tracing::info;

use crate::{
    engine::{System, SystemContext},
    event::{OutbreakSeverity, SimulationEvent},
    rng::SystemRng,
    world::World,
};

/// Post-tick pass: retires extinct populations and flags outbreaks.
///
/// An outbreak event fires when a population first crosses the outbreak
/// threshold or its severity tier rises; staying in the same tier is silent.
pub struct EventSystem;

impl EventSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EventSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for EventSystem {
    fn name(&self) -> &str {
        "events"
    }

    fn run(&mut self, ctx: &SystemContext, world: &mut World, _rng: &mut SystemRng<'_>) {
        let threshold = world.config.outbreak_threshold;
        let bands = world.config.severity_bands.clone();

        for id in world.population_ids() {
            let Some(capacity) = world
                .populations
                .get(&id)
                .map(|p| world.carrying_capacity(p))
            else {
                continue;
            };
            let Some(population) = world.populations.get_mut(&id) else {
                continue;
            };
            population.last_update_time = ctx.time;
            let total = population.total();

            if total == 0 {
                if let Some(mut extinct) = world.populations.remove(&id) {
                    if extinct.deactivate() {
                        info!(population = %id, time = ctx.time, "population extinct");
                        world.stats.extinctions += 1;
                        world.pending_events.push(SimulationEvent::Extinction {
                            population_id: id.clone(),
                            species_id: extinct.species_id,
                            zone_id: extinct.zone_id,
                            time: ctx.time,
                        });
                    }
                }
                world.degraded.retain(|(degraded_id, _)| degraded_id != &id);
                continue;
            }

            let ratio = if capacity > 0.0 {
                total as f64 / capacity
            } else {
                f64::INFINITY
            };
            if ratio <= threshold {
                population.outbreak = None;
                continue;
            }
            let severity = OutbreakSeverity::classify(ratio, &bands);
            let escalated = population.outbreak.map_or(true, |previous| severity > previous);
            population.outbreak = Some(severity);
            if escalated {
                info!(population = %id, ?severity, total, capacity, "outbreak");
                world.pending_events.push(SimulationEvent::Outbreak {
                    population_id: id.clone(),
                    species_id: population.species_id.clone(),
                    zone_id: population.zone_id.clone(),
                    severity,
                    total,
                    ceiling: capacity,
                    time: ctx.time,
                });
            }
        }
    }
}

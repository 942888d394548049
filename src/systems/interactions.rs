use std::collections::BTreeMap;

use crate::{
    engine::{System, SystemContext},
    ids::PopulationId,
    interaction::InteractionType,
    population::round_count,
    rng::SystemRng,
    stage::LifecycleStage,
    world::World,
};

const COMPETITION_SCALE: f64 = 0.05;
const PREDATION_SCALE: f64 = 0.1;
const PREY_PER_PREDATOR: f64 = 2.0;
const MUTUALISM_SCALE: f64 = 0.02;
const PARASITISM_SCALE: f64 = 0.05;

#[derive(Debug, Clone, Copy)]
struct Census {
    total: u64,
    adults: u64,
}

/// Applies declared pairwise interactions between co-located populations.
///
/// Every interaction reads the totals captured when this system starts, so
/// the outcome does not depend on which population is visited first.
pub struct InteractionSystem;

impl InteractionSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for InteractionSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for InteractionSystem {
    fn name(&self) -> &str {
        "interactions"
    }

    fn run(&mut self, ctx: &SystemContext, world: &mut World, rng: &mut SystemRng<'_>) {
        if world.interactions.is_empty() {
            return;
        }
        let census: BTreeMap<PopulationId, Census> = world
            .populations
            .iter()
            .map(|(id, pop)| {
                (
                    id.clone(),
                    Census {
                        total: pop.total(),
                        adults: pop.stage_count(LifecycleStage::Adult),
                    },
                )
            })
            .collect();

        for (source_id, source) in &census {
            if source.total == 0 {
                continue;
            }
            let Some(population) = world.populations.get(source_id) else {
                continue;
            };
            let zone = population.zone_id.clone();
            let declared = world.interactions.for_source(&population.species_id).to_vec();

            for interaction in declared {
                let target_id = PopulationId::for_pair(&zone, &interaction.target_species);
                if &target_id == source_id {
                    continue;
                }
                let Some(target) = census.get(&target_id).filter(|t| t.total > 0) else {
                    continue;
                };
                let strength = interaction.effect_strength;
                let source_total = source.total as f64;
                let target_total = target.total as f64;

                match interaction.interaction_type {
                    InteractionType::Competition => {
                        let loss = round_count(
                            source_total * (target_total / (source_total + target_total))
                                * strength
                                * ctx.dt
                                * COMPETITION_SCALE,
                        );
                        if let Some(pop) = world.populations.get_mut(source_id) {
                            pop.remove_proportional(loss);
                        }
                    }
                    InteractionType::Predation => {
                        let killed = round_count(
                            (target_total * strength * ctx.dt * PREDATION_SCALE)
                                .min(source_total * PREY_PER_PREDATOR),
                        );
                        if let Some(prey) = world.populations.get_mut(&target_id) {
                            let occupied = prey.occupied_stages();
                            if let Some(&stage) = rng.pick(&occupied) {
                                prey.remove_from_stage(stage, killed);
                            }
                        }
                    }
                    InteractionType::Mutualism => {
                        let gain = round_count(
                            source.adults as f64 * strength * ctx.dt * MUTUALISM_SCALE,
                        );
                        if gain > 0 {
                            if let Some(pop) = world.populations.get_mut(source_id) {
                                pop.add(LifecycleStage::Egg, gain);
                            }
                        }
                    }
                    InteractionType::Parasitism => {
                        let loss = round_count(
                            (target_total * strength * ctx.dt * PARASITISM_SCALE).min(source_total),
                        );
                        if let Some(host) = world.populations.get_mut(&target_id) {
                            host.remove_proportional(loss);
                        }
                    }
                }
            }
        }
    }
}

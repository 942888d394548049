mod development;
mod environment;
mod events;
mod interactions;
mod mortality;
mod reproduction;

pub use development::DevelopmentSystem;
pub use environment::EnvironmentSystem;
pub use events::EventSystem;
pub use interactions::InteractionSystem;
pub use mortality::MortalitySystem;
pub use reproduction::ReproductionSystem;

use crate::{ids::PopulationId, profile::EnvironmentResponse, world::World};

/// Environmental response and carrying capacity of one population for the
/// current tick. `None` when the population or its zone is gone.
fn local_state(world: &World, id: &PopulationId) -> Option<(EnvironmentResponse, f64)> {
    let population = world.populations.get(id)?;
    let conditions = world.conditions_for(&population.zone_id)?;
    Some((
        population.profile().respond_to(conditions),
        world.carrying_capacity(population),
    ))
}

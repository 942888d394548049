use tracing::debug;

use crate::{
    clock::Season,
    engine::{System, SystemContext},
    rng::SystemRng,
    world::World,
};

/// Tracks the season, retires expired treatments and samples the conditions
/// every zone exposes for the rest of the tick.
pub struct EnvironmentSystem {
    season: Option<Season>,
}

impl EnvironmentSystem {
    pub fn new() -> Self {
        Self { season: None }
    }
}

impl Default for EnvironmentSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for EnvironmentSystem {
    fn name(&self) -> &str {
        "environment"
    }

    fn run(&mut self, ctx: &SystemContext, world: &mut World, rng: &mut SystemRng<'_>) {
        if self.season != Some(ctx.season) {
            debug!(season = %ctx.season, time = ctx.time, "season changed");
            self.season = Some(ctx.season);
        }

        let reverted = world.zones.expire_treatments(ctx.time);
        if reverted > 0 {
            debug!(reverted, time = ctx.time, "transient treatments expired");
        }

        let jitter = world.config.environment_jitter;
        world.sampled.clear();
        for zone in world.zones.zones() {
            let mut conditions = zone.conditions.clone();
            conditions.temperature += rng.jitter(jitter);
            conditions.humidity =
                (conditions.humidity + rng.jitter(jitter / 100.0)).clamp(0.0, 1.0);
            world.sampled.insert(zone.zone_id.clone(), conditions);
        }
    }
}

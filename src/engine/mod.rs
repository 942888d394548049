use std::time::Instant;

use tracing::{debug, warn};

use crate::{
    clock::Season,
    event::{EventSink, SimulationEvent},
    rng::{RngManager, SystemRng},
    systems::{
        DevelopmentSystem, EnvironmentSystem, EventSystem, InteractionSystem, MortalitySystem,
        ReproductionSystem,
    },
    world::World,
};

pub struct EngineBuilder {
    seed: u64,
    systems: Vec<Box<dyn System>>,
    sinks: Vec<Box<dyn EventSink>>,
}

impl EngineBuilder {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            systems: Vec::new(),
            sinks: Vec::new(),
        }
    }

    /// The full tick pipeline in its required order.
    pub fn standard(seed: u64) -> Self {
        Self::new(seed)
            .with_system(EnvironmentSystem::new())
            .with_system(DevelopmentSystem::new())
            .with_system(MortalitySystem::new())
            .with_system(ReproductionSystem::new())
            .with_system(InteractionSystem::new())
            .with_system(EventSystem::new())
    }

    pub fn with_system(mut self, system: impl System + 'static) -> Self {
        self.systems.push(Box::new(system));
        self
    }

    pub fn build(self) -> Engine {
        Engine {
            rng: RngManager::new(self.seed),
            systems: self.systems,
            sinks: self.sinks,
        }
    }
}

pub struct Engine {
    rng: RngManager,
    systems: Vec<Box<dyn System>>,
    sinks: Vec<Box<dyn EventSink>>,
}

impl Engine {
    pub fn add_sink(&mut self, sink: impl EventSink + 'static) {
        self.sinks.push(Box::new(sink));
    }

    /// Runs every system once over `world`. `dt` is scaled by the configured
    /// speed multiplier; a tick with a non-positive delta does nothing.
    pub fn tick(&mut self, world: &mut World, dt: f64) -> TickSummary {
        let dt = dt * world.config.speed_multiplier;
        if !world.clock.advance(dt) {
            warn!(dt, "ignoring tick with non-positive time delta");
            return TickSummary {
                tick: world.clock.tick(),
                simulation_time: world.clock.simulation_time(),
                dt: 0.0,
                season: world.clock.season(),
                events: Vec::new(),
                system_reports: Vec::new(),
            };
        }

        let ctx = SystemContext {
            tick: world.clock.tick(),
            dt,
            time: world.clock.simulation_time(),
            season: world.clock.season(),
        };
        let mut system_reports = Vec::with_capacity(self.systems.len());
        for system in &mut self.systems {
            let mut rng_stream = self.rng.stream(system.name());
            let start = Instant::now();
            system.run(&ctx, world, &mut rng_stream);
            system_reports.push(SystemRunReport {
                name: system.name().to_string(),
                duration_ms: start.elapsed().as_secs_f64() * 1_000.0,
            });
        }

        let events = std::mem::take(&mut world.pending_events);
        for event in &events {
            for sink in &mut self.sinks {
                sink.on_event(event);
            }
        }
        debug!(
            tick = ctx.tick,
            time = ctx.time,
            populations = world.populations.len(),
            total = world.total_population(),
            events = events.len(),
            "tick complete"
        );

        TickSummary {
            tick: ctx.tick,
            simulation_time: ctx.time,
            dt,
            season: ctx.season,
            events,
            system_reports,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SystemRunReport {
    pub name: String,
    pub duration_ms: f64,
}

#[derive(Clone, Debug)]
pub struct TickSummary {
    pub tick: u64,
    pub simulation_time: f64,
    /// Effective delta after the speed multiplier; zero for an ignored tick.
    pub dt: f64,
    pub season: Season,
    pub events: Vec<SimulationEvent>,
    pub system_reports: Vec<SystemRunReport>,
}

pub struct SystemContext {
    pub tick: u64,
    pub dt: f64,
    /// Simulation time at the end of this tick.
    pub time: f64,
    pub season: Season,
}

/// One ordered step of the tick. Systems never fail: a population a system
/// cannot process is skipped and recorded on the world instead.
pub trait System: Send {
    fn name(&self) -> &str;
    fn run(&mut self, ctx: &SystemContext, world: &mut World, rng: &mut SystemRng<'_>);
}

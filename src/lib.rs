pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod ids;
pub mod interaction;
pub mod population;
pub mod profile;
pub mod report;
pub mod rng;
pub mod scenario;
pub mod shared;
pub mod simulation;
pub mod snapshot;
pub mod stage;
pub mod systems;
pub mod world;
pub mod zone;

pub use config::SimulationConfig;
pub use engine::{Engine, EngineBuilder, TickSummary};
pub use error::SimError;
pub use ids::{PopulationId, SpeciesId, ZoneId};
pub use report::SimulationReport;
pub use shared::SharedSimulation;
pub use simulation::Simulation;
pub use stage::LifecycleStage;

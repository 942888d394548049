use std::sync::{Arc, Mutex, MutexGuard};

use crate::engine::TickSummary;
use crate::error::{Result, SimError};
use crate::report::SimulationReport;
use crate::simulation::Simulation;

/// A simulation behind one lock, for multi-threaded hosts. Each tick,
/// treatment or introduction holds the lock for its whole duration, so no
/// caller ever sees a half-applied update.
#[derive(Clone)]
pub struct SharedSimulation {
    inner: Arc<Mutex<Simulation>>,
}

impl SharedSimulation {
    pub fn new(simulation: Simulation) -> Self {
        Self {
            inner: Arc::new(Mutex::new(simulation)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Simulation>> {
        self.inner.lock().map_err(|_| SimError::Poisoned)
    }

    pub fn tick(&self, dt: f64) -> Result<TickSummary> {
        Ok(self.lock()?.tick(dt))
    }

    pub fn report(&self) -> Result<SimulationReport> {
        Ok(self.lock()?.simulation_report())
    }

    /// Runs `f` with exclusive access to the simulation.
    pub fn with<R>(&self, f: impl FnOnce(&mut Simulation) -> R) -> Result<R> {
        let mut guard = self.lock()?;
        Ok(f(&mut guard))
    }
}

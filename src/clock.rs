use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    /// `phase` is the position within the cycle in [0, 1).
    pub fn from_phase(phase: f64) -> Self {
        if phase < 0.25 {
            Season::Spring
        } else if phase < 0.5 {
            Season::Summer
        } else if phase < 0.75 {
            Season::Autumn
        } else {
            Season::Winter
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
            Season::Winter => "winter",
        };
        f.write_str(name)
    }
}

/// Simulated time. Only moves forward.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationClock {
    simulation_time: f64,
    tick: u64,
    cycle_length: f64,
}

impl SimulationClock {
    pub fn new(cycle_length: f64) -> Self {
        Self {
            simulation_time: 0.0,
            tick: 0,
            cycle_length,
        }
    }

    pub fn simulation_time(&self) -> f64 {
        self.simulation_time
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Advances by `dt`; non-positive or non-finite deltas are ignored.
    pub fn advance(&mut self, dt: f64) -> bool {
        if !(dt.is_finite() && dt > 0.0) {
            return false;
        }
        self.simulation_time += dt;
        self.tick += 1;
        true
    }

    pub fn phase(&self) -> f64 {
        if self.cycle_length > 0.0 {
            self.simulation_time.rem_euclid(self.cycle_length) / self.cycle_length
        } else {
            0.0
        }
    }

    pub fn season(&self) -> Season {
        Season::from_phase(self.phase())
    }
}

use serde::{Deserialize, Serialize};

use crate::config::SeverityBands;
use crate::ids::{PopulationId, SpeciesId, ZoneId};
use crate::stage::LifecycleStage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutbreakSeverity {
    Minor,
    Moderate,
    Major,
    Critical,
}

impl OutbreakSeverity {
    /// Maps a total / ceiling ratio onto a severity tier.
    pub fn classify(ratio: f64, bands: &SeverityBands) -> Self {
        if ratio >= bands.critical_at {
            OutbreakSeverity::Critical
        } else if ratio >= bands.major_at {
            OutbreakSeverity::Major
        } else if ratio >= bands.moderate_at {
            OutbreakSeverity::Moderate
        } else {
            OutbreakSeverity::Minor
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SimulationEvent {
    StageAdvanced {
        population_id: PopulationId,
        from: LifecycleStage,
        to: LifecycleStage,
        promoted: u64,
        time: f64,
    },
    Outbreak {
        population_id: PopulationId,
        species_id: SpeciesId,
        zone_id: ZoneId,
        severity: OutbreakSeverity,
        total: u64,
        ceiling: f64,
        time: f64,
    },
    Extinction {
        population_id: PopulationId,
        species_id: SpeciesId,
        zone_id: ZoneId,
        time: f64,
    },
}

/// Receives events synchronously during event detection.
pub trait EventSink: Send {
    fn on_event(&mut self, event: &SimulationEvent);
}

impl<F> EventSink for F
where
    F: FnMut(&SimulationEvent) + Send,
{
    fn on_event(&mut self, event: &SimulationEvent) {
        self(event)
    }
}

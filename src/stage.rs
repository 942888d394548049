use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStage {
    Egg,
    Larva,
    Nymph,
    Pupa,
    Adult,
}

impl LifecycleStage {
    pub fn name(self) -> &'static str {
        match self {
            LifecycleStage::Egg => "egg",
            LifecycleStage::Larva => "larva",
            LifecycleStage::Nymph => "nymph",
            LifecycleStage::Pupa => "pupa",
            LifecycleStage::Adult => "adult",
        }
    }
}

impl fmt::Display for LifecycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The cohort occupying one stage of a population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageData {
    pub stage: LifecycleStage,
    pub population_count: u64,
    pub development_progress: f64,
}

impl StageData {
    pub fn new(stage: LifecycleStage, population_count: u64) -> Self {
        Self {
            stage,
            population_count,
            development_progress: 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.population_count == 0
    }

    pub fn reset(&mut self) {
        self.population_count = 0;
        self.development_progress = 0.0;
    }

    /// Removes up to `amount` individuals and returns how many were removed.
    pub fn remove(&mut self, amount: u64) -> u64 {
        let removed = amount.min(self.population_count);
        self.population_count -= removed;
        if self.population_count == 0 {
            self.development_progress = 0.0;
        }
        removed
    }
}

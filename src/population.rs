use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::event::OutbreakSeverity;
use crate::ids::{PopulationId, SpeciesId, ZoneId};
use crate::profile::LifecycleProfile;
use crate::stage::{LifecycleStage, StageData};

/// Aggregate stage counts of one species in one zone.
///
/// The total is always derived from the stage buckets, so every mutation
/// goes through methods that touch the buckets directly.
#[derive(Debug, Clone, Serialize)]
pub struct PestPopulation {
    pub population_id: PopulationId,
    pub species_id: SpeciesId,
    pub zone_id: ZoneId,
    #[serde(skip)]
    profile: Arc<LifecycleProfile>,
    stages: BTreeMap<LifecycleStage, StageData>,
    pub establishment_date: f64,
    pub last_update_time: f64,
    is_active: bool,
    #[serde(skip)]
    pub(crate) outbreak: Option<OutbreakSeverity>,
}

impl PestPopulation {
    pub fn new(
        zone_id: ZoneId,
        species_id: SpeciesId,
        profile: Arc<LifecycleProfile>,
        now: f64,
    ) -> Self {
        Self {
            population_id: PopulationId::for_pair(&zone_id, &species_id),
            species_id,
            zone_id,
            profile,
            stages: BTreeMap::new(),
            establishment_date: now,
            last_update_time: now,
            is_active: true,
            outbreak: None,
        }
    }

    pub fn profile(&self) -> &LifecycleProfile {
        &self.profile
    }

    pub(crate) fn shared_profile(&self) -> Arc<LifecycleProfile> {
        Arc::clone(&self.profile)
    }

    /// Saturates at `u64::MAX` rather than overflowing.
    pub fn total(&self) -> u64 {
        self.stages
            .values()
            .fold(0u64, |acc, s| acc.saturating_add(s.population_count))
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn stage(&self, stage: LifecycleStage) -> Option<&StageData> {
        self.stages.get(&stage)
    }

    pub fn stage_count(&self, stage: LifecycleStage) -> u64 {
        self.stages
            .get(&stage)
            .map(|s| s.population_count)
            .unwrap_or(0)
    }

    pub fn stages(&self) -> impl Iterator<Item = &StageData> {
        self.stages.values()
    }

    pub fn occupied_stages(&self) -> Vec<LifecycleStage> {
        self.stages
            .values()
            .filter(|s| !s.is_empty())
            .map(|s| s.stage)
            .collect()
    }

    pub fn current_outbreak(&self) -> Option<OutbreakSeverity> {
        self.outbreak
    }

    /// Adds individuals to a stage bucket, creating it if absent.
    pub fn add(&mut self, stage: LifecycleStage, count: u64) {
        let bucket = self
            .stages
            .entry(stage)
            .or_insert_with(|| StageData::new(stage, 0));
        bucket.population_count = bucket.population_count.saturating_add(count);
    }

    pub fn remove_from_stage(&mut self, stage: LifecycleStage, amount: u64) -> u64 {
        self.stages
            .get_mut(&stage)
            .map(|s| s.remove(amount))
            .unwrap_or(0)
    }

    /// Removes `amount` individuals spread across stages in proportion to
    /// their counts. Never removes more than the total.
    pub fn remove_proportional(&mut self, amount: u64) -> u64 {
        let total = self.total();
        let amount = amount.min(total);
        if amount == 0 {
            return 0;
        }
        let mut removed: u64 = 0;
        for data in self.stages.values_mut() {
            let share = (u128::from(data.population_count) * u128::from(amount)
                / u128::from(total)) as u64;
            removed = removed.saturating_add(data.remove(share));
        }
        // Flooring leaves fewer than one individual per stage behind.
        while removed < amount {
            let Some(data) = self.stages.values_mut().max_by_key(|d| d.population_count) else {
                break;
            };
            if data.is_empty() {
                break;
            }
            removed += data.remove(1);
        }
        removed
    }

    /// Removes `round(count * fraction)` from every stage accepted by `filter`.
    pub fn remove_fraction(
        &mut self,
        fraction: f64,
        mut filter: impl FnMut(LifecycleStage) -> bool,
    ) -> u64 {
        let fraction = fraction.clamp(0.0, 1.0);
        let mut removed: u64 = 0;
        for data in self.stages.values_mut() {
            if filter(data.stage) {
                let amount = round_count(data.population_count as f64 * fraction);
                removed = removed.saturating_add(data.remove(amount));
            }
        }
        removed
    }

    pub(crate) fn stage_mut(&mut self, stage: LifecycleStage) -> Option<&mut StageData> {
        self.stages.get_mut(&stage)
    }

    /// Marks the population extinct. Returns `false` if it already was.
    pub(crate) fn deactivate(&mut self) -> bool {
        std::mem::replace(&mut self.is_active, false)
    }
}

/// Rounds a non-negative real count to an integer count; NaN and negatives
/// become zero.
pub fn round_count(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}

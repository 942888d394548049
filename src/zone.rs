use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::ids::ZoneId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalConditions {
    pub temperature: f64,
    pub humidity: f64,
    #[serde(default)]
    pub light_intensity: f64,
    #[serde(default)]
    pub co2_level: f64,
    #[serde(default)]
    pub air_flow: f64,
}

impl Default for EnvironmentalConditions {
    fn default() -> Self {
        Self {
            temperature: 22.0,
            humidity: 0.6,
            light_intensity: 600.0,
            co2_level: 400.0,
            air_flow: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EnvironmentalZone {
    pub zone_id: ZoneId,
    pub conditions: EnvironmentalConditions,
    pub carrying_capacity_multiplier: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreatmentType {
    /// Climate intervention; thins every stage.
    EnvironmentalAdjustment,
    /// Released control agent; thins the larval stage only.
    BiologicalControl,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalTreatment {
    pub treatment_type: TreatmentType,
    #[serde(default)]
    pub temperature_change: f64,
    #[serde(default)]
    pub humidity_change: f64,
    /// Simulated time the condition deltas last; `<= 0` keeps them.
    #[serde(default)]
    pub duration: f64,
    pub effectiveness: f64,
}

#[derive(Debug, Clone)]
struct ActiveTreatment {
    zone_id: ZoneId,
    temperature_delta: f64,
    humidity_delta: f64,
    expires_at: f64,
}

#[derive(Debug, Clone, Default)]
pub struct ZoneRegistry {
    zones: BTreeMap<ZoneId, EnvironmentalZone>,
    active: Vec<ActiveTreatment>,
}

impl ZoneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a zone, replacing (and returning) any zone with the same id.
    pub fn register_zone(
        &mut self,
        zone_id: ZoneId,
        conditions: EnvironmentalConditions,
        carrying_capacity_multiplier: f64,
    ) -> Option<EnvironmentalZone> {
        self.active.retain(|t| t.zone_id != zone_id);
        self.zones.insert(
            zone_id.clone(),
            EnvironmentalZone {
                zone_id,
                conditions,
                carrying_capacity_multiplier: carrying_capacity_multiplier.max(0.0),
            },
        )
    }

    pub fn get_zone(&self, zone_id: &ZoneId) -> Result<&EnvironmentalZone> {
        self.zones
            .get(zone_id)
            .ok_or_else(|| SimError::ZoneNotFound(zone_id.clone()))
    }

    pub fn contains(&self, zone_id: &ZoneId) -> bool {
        self.zones.contains_key(zone_id)
    }

    pub fn zones(&self) -> impl Iterator<Item = &EnvironmentalZone> {
        self.zones.values()
    }

    /// Shifts a zone's conditions by the treatment deltas. Repeated calls
    /// compound. Humidity stays within [0, 1].
    pub fn apply_treatment(
        &mut self,
        zone_id: &ZoneId,
        treatment: &EnvironmentalTreatment,
        now: f64,
    ) -> Result<()> {
        let zone = self
            .zones
            .get_mut(zone_id)
            .ok_or_else(|| SimError::ZoneNotFound(zone_id.clone()))?;
        let conditions = &mut zone.conditions;
        let before_humidity = conditions.humidity;
        conditions.temperature += treatment.temperature_change;
        conditions.humidity = (conditions.humidity + treatment.humidity_change).clamp(0.0, 1.0);

        if treatment.duration > 0.0 {
            self.active.push(ActiveTreatment {
                zone_id: zone_id.clone(),
                temperature_delta: treatment.temperature_change,
                humidity_delta: conditions.humidity - before_humidity,
                expires_at: now + treatment.duration,
            });
        }
        Ok(())
    }

    /// Reverts the deltas of transient treatments whose window ended at or
    /// before `now`. Returns how many were reverted.
    pub fn expire_treatments(&mut self, now: f64) -> usize {
        let (expired, active): (Vec<_>, Vec<_>) = std::mem::take(&mut self.active)
            .into_iter()
            .partition(|t| t.expires_at <= now);
        self.active = active;
        for treatment in &expired {
            if let Some(zone) = self.zones.get_mut(&treatment.zone_id) {
                zone.conditions.temperature -= treatment.temperature_delta;
                zone.conditions.humidity =
                    (zone.conditions.humidity - treatment.humidity_delta).clamp(0.0, 1.0);
            }
        }
        expired.len()
    }

    pub fn active_treatments(&self) -> usize {
        self.active.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adjustment(
        temperature_change: f64,
        humidity_change: f64,
        duration: f64,
    ) -> EnvironmentalTreatment {
        EnvironmentalTreatment {
            treatment_type: TreatmentType::EnvironmentalAdjustment,
            temperature_change,
            humidity_change,
            duration,
            effectiveness: 0.0,
        }
    }

    #[test]
    fn unknown_zone_is_not_found() {
        let registry = ZoneRegistry::new();
        let err = registry.get_zone(&ZoneId::from("attic")).unwrap_err();
        assert!(matches!(err, SimError::ZoneNotFound(id) if id.as_str() == "attic"));
    }

    #[test]
    fn repeated_treatments_compound() {
        let mut registry = ZoneRegistry::new();
        let id = ZoneId::from("flower_room");
        registry.register_zone(id.clone(), EnvironmentalConditions::default(), 1.0);
        let treatment = adjustment(-2.0, 0.05, 0.0);
        registry.apply_treatment(&id, &treatment, 0.0).unwrap();
        registry.apply_treatment(&id, &treatment, 0.0).unwrap();
        let zone = registry.get_zone(&id).unwrap();
        assert!((zone.conditions.temperature - 18.0).abs() < 1e-9);
        assert!((zone.conditions.humidity - 0.7).abs() < 1e-9);
        assert_eq!(registry.active_treatments(), 0);
    }

    #[test]
    fn transient_treatment_reverts_after_duration() {
        let mut registry = ZoneRegistry::new();
        let id = ZoneId::from("flower_room");
        registry.register_zone(id.clone(), EnvironmentalConditions::default(), 1.0);
        registry
            .apply_treatment(&id, &adjustment(4.0, 0.6, 3.0), 1.0)
            .unwrap();
        assert_eq!(registry.get_zone(&id).unwrap().conditions.humidity, 1.0);

        assert_eq!(registry.expire_treatments(3.5), 0);
        assert_eq!(registry.expire_treatments(4.0), 1);
        let zone = registry.get_zone(&id).unwrap();
        assert!((zone.conditions.temperature - 22.0).abs() < 1e-9);
        assert!((zone.conditions.humidity - 0.6).abs() < 1e-9);
    }
}

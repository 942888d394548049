use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ids::SpeciesId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionType {
    Competition,
    Predation,
    Mutualism,
    Parasitism,
}

/// An effect the declaring (source) species has in relation to `target_species`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesInteraction {
    pub interaction_type: InteractionType,
    pub target_species: SpeciesId,
    pub effect_strength: f64,
}

impl SpeciesInteraction {
    pub fn new(
        interaction_type: InteractionType,
        target_species: SpeciesId,
        effect_strength: f64,
    ) -> Self {
        Self {
            interaction_type,
            target_species,
            effect_strength: effect_strength.clamp(0.0, 1.0),
        }
    }
}

/// Interactions keyed by source species. Declaring A → B says nothing
/// about B → A.
#[derive(Debug, Clone, Default)]
pub struct InteractionTable {
    by_source: BTreeMap<SpeciesId, Vec<SpeciesInteraction>>,
}

impl InteractionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares an interaction, replacing an earlier one of the same type
    /// against the same target.
    pub fn declare(&mut self, source: SpeciesId, interaction: SpeciesInteraction) {
        let entries = self.by_source.entry(source).or_default();
        entries.retain(|existing| {
            existing.interaction_type != interaction.interaction_type
                || existing.target_species != interaction.target_species
        });
        entries.push(interaction);
    }

    pub fn for_source(&self, source: &SpeciesId) -> &[SpeciesInteraction] {
        self.by_source
            .get(source)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.by_source.values().all(Vec::is_empty)
    }
}

use crate::ids::{SpeciesId, ZoneId};

pub type Result<T, E = SimError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("zone not found: {0}")]
    ZoneNotFound(ZoneId),

    #[error("species not registered: {0}")]
    SpeciesNotFound(SpeciesId),

    #[error("invalid profile for {species}: {reason}")]
    InvalidProfile { species: SpeciesId, reason: String },

    #[error("species catalog parse error: {0}")]
    Catalog(#[from] serde_yaml::Error),

    #[error("simulation lock poisoned")]
    Poisoned,
}

use crate::model::FacilityId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Embedding provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Vector index has not been built")]
    IndexNotBuilt,

    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("Facility not found: {0}")]
    FacilityNotFound(FacilityId),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Errors that mean the semantic path cannot serve this process.
    /// Callers substitute the fallback scorer instead of surfacing them.
    pub fn is_recoverable_by_fallback(&self) -> bool {
        matches!(self, Error::ProviderUnavailable(_) | Error::IndexNotBuilt)
    }
}

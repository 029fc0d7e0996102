use hyurim_similarity::{ScoringError, WeightsError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid preference '{field}': {reason}")]
    InvalidPreference { field: &'static str, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Core(#[from] hyurim_core::Error),

    #[error(transparent)]
    Scoring(#[from] ScoringError),
}

impl EngineError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        EngineError::InvalidPreference {
            field,
            reason: reason.into(),
        }
    }

    /// The offending request field, for validation errors
    pub fn field(&self) -> Option<&'static str> {
        match self {
            EngineError::InvalidPreference { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl From<WeightsError> for EngineError {
    fn from(e: WeightsError) -> Self {
        EngineError::InvalidConfig(e.to_string())
    }
}

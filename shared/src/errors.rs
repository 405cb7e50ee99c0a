//! Error types for the Technotes application

use thiserror::Error;

/// Request validation failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0}")]
    MissingFields(String),

    #[error("Invalid id: {0}")]
    InvalidId(String),
}

//! Error types for assembly and solving.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SolverError>;

#[derive(Error, Debug)]
pub enum SolverError {
    #[error(transparent)]
    Element(#[from] fdm_core::ElementError),

    #[error("unknown virtual-value strategy: {0}")]
    UnknownStrategy(String),

    #[error("solver backend failure: {0}")]
    SolverFailure(String),
}

impl From<crate::backend::BackendError> for SolverError {
    fn from(err: crate::backend::BackendError) -> Self {
        SolverError::SolverFailure(err.0)
    }
}

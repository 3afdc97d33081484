//! Error types for identification.

use thiserror::Error;

/// Errors that can occur while identifying a process model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IdentError {
    #[error("Invalid input: {what}")]
    InvalidInput { what: String },

    #[error("Invalid search bounds: {what}")]
    InvalidBounds { what: String },

    /// The search ran out of generations before the population converged.
    #[error("Identification did not converge: {message}")]
    NotConverged { message: String },

    /// The search was stopped by the caller or by its time budget.
    #[error("Identification aborted: {message}")]
    Aborted { message: String },

    #[error("Invalid trace: {0}")]
    Core(#[from] lf_core::CoreError),
}

pub type IdentResult<T> = Result<T, IdentError>;

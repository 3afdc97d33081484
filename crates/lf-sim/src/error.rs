//! Error types for simulation operations.

use thiserror::Error;

/// Errors encountered during closed-loop simulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Invalid parameter: {0}")]
    Core(#[from] lf_core::CoreError),

    #[error("Controller error: {0}")]
    Control(#[from] lf_controls::ControlError),
}

pub type SimResult<T> = Result<T, SimError>;

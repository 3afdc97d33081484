//! Error types for the lf-app service layer.

use std::path::PathBuf;

/// Application error type that wraps errors from the backend crates.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Project error: {0}")]
    Project(String),

    #[error("Failed to write {path}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Scenario validation failed: {0}")]
    Validation(String),

    #[error("Invalid scenario: {0}")]
    Compile(String),

    #[error("Simulation error: {0}")]
    Simulation(String),

    #[error("Identification error: {0}")]
    Identification(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for lf-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<lf_project::ProjectError> for AppError {
    fn from(err: lf_project::ProjectError) -> Self {
        match err {
            lf_project::ProjectError::Validation(e) => AppError::Validation(e.to_string()),
            other => AppError::Project(other.to_string()),
        }
    }
}

impl From<lf_project::ValidationError> for AppError {
    fn from(err: lf_project::ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<lf_core::CoreError> for AppError {
    fn from(err: lf_core::CoreError) -> Self {
        AppError::Compile(err.to_string())
    }
}

impl From<lf_controls::ControlError> for AppError {
    fn from(err: lf_controls::ControlError) -> Self {
        AppError::Compile(err.to_string())
    }
}

impl From<lf_sim::SimError> for AppError {
    fn from(err: lf_sim::SimError) -> Self {
        AppError::Simulation(err.to_string())
    }
}

impl From<lf_ident::IdentError> for AppError {
    fn from(err: lf_ident::IdentError) -> Self {
        AppError::Identification(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

//! Shared application service layer for loopfit.
//!
//! Wires the numerical crates together for one scenario: compile the
//! scenario into a plant, controller and schedule, run the closed loop,
//! identify a model from the recorded trace and derive tuning tables.
//! Front ends only render what this crate returns.

pub mod error;
pub mod export;
pub mod progress;
pub mod project_service;
pub mod run_service;
pub mod scenario_compile;

pub use error::{AppError, AppResult};
pub use progress::{IdentificationProgress, RunProgressEvent, RunStage, SimulationProgress};
pub use project_service::{init_scenario, load_scenario, save_scenario, validate_scenario};
pub use run_service::{
    IdentificationOutcome, RunOptions, RunReport, RunTimingSummary, run_scenario,
    run_scenario_with_progress,
};
pub use scenario_compile::{CompiledScenario, compile_scenario};

//! Scenario schema definitions.

use serde::{Deserialize, Serialize};

/// One simulated loop plus optional identification settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    pub version: u32,
    pub name: String,
    pub plant: PlantDef,
    pub controller: ControllerDef,
    pub setpoints: Vec<SetpointDef>,
    pub simulation: SimulationDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identification: Option<IdentificationDef>,
}

/// FOPDT plant driven in the simulation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PlantDef {
    pub kp: f64,
    pub tau_s: f64,
    pub theta_s: f64,
}

/// Parallel-form PID gains.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ControllerDef {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SetpointDef {
    pub time_s: f64,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SimulationDef {
    pub duration_s: f64,
    pub dt_s: f64,
}

/// Overrides for the identification search. Absent fields keep the
/// library defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct IdentificationDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<BoundsDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub population_multiplier: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_generations: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recombination: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutation: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_s: Option<f64>,
}

/// Search box, one `[lower, upper]` pair per parameter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BoundsDef {
    pub kp: [f64; 2],
    pub tau_s: [f64; 2],
    pub theta_s: [f64; 2],
}

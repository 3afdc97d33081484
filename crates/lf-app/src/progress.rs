use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunStage {
    CompilingScenario,
    Simulating,
    Identifying,
    Tuning,
    Completed,
}

impl RunStage {
    pub fn label(self) -> &'static str {
        match self {
            RunStage::CompilingScenario => "compile",
            RunStage::Simulating => "simulate",
            RunStage::Identifying => "identify",
            RunStage::Tuning => "tune",
            RunStage::Completed => "done",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SimulationProgress {
    pub sim_time_s: f64,
    pub t_end_s: f64,
    pub fraction_complete: f64,
    pub step: usize,
}

#[derive(Debug, Clone, Default)]
pub struct IdentificationProgress {
    pub generation: usize,
    pub max_generations: usize,
    pub best_cost: f64,
    pub spread_ratio: f64,
    pub evaluations: usize,
}

#[derive(Debug, Clone)]
pub struct RunProgressEvent {
    pub stage: RunStage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
    pub simulation: Option<SimulationProgress>,
    pub identification: Option<IdentificationProgress>,
}

impl RunProgressEvent {
    pub fn stage(stage: RunStage, elapsed_wall_s: f64, message: Option<String>) -> Self {
        Self {
            stage,
            elapsed_wall_s,
            message,
            simulation: None,
            identification: None,
        }
    }
}

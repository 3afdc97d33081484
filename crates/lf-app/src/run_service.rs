//! Scenario execution: simulate, identify, tune.

use std::ops::ControlFlow;
use std::time::Instant;

use lf_ident::{GenerationReport, IdentError, IdentifiedModel, identify_with_progress};
use lf_project::Scenario;
use lf_sim::{
    LoopMetrics, SegmentResponse, SimProgress, SimTrace, run_closed_loop_with_progress,
    segment_responses,
};
use lf_tuning::TuningTable;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::AppResult;
use crate::progress::{IdentificationProgress, RunProgressEvent, RunStage, SimulationProgress};
use crate::scenario_compile::compile_scenario;

/// Options for running a scenario.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Fit a model to the simulated trace and derive tuning tables.
    pub identify: bool,
    /// Overrides the scenario's identification seed.
    pub seed: Option<u64>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            identify: true,
            seed: None,
        }
    }
}

/// Wall-clock breakdown of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunTimingSummary {
    pub compile_time_s: f64,
    pub simulate_time_s: f64,
    pub identify_time_s: f64,
    pub tune_time_s: f64,
    pub total_time_s: f64,
    pub sim_steps: usize,
    pub generations: usize,
    pub evaluations: usize,
}

/// Result of the identification stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IdentificationOutcome {
    Identified(IdentifiedModel),
    /// The search ran but produced no usable model.
    Failed { message: String },
    Skipped,
}

impl IdentificationOutcome {
    pub fn model(&self) -> Option<&IdentifiedModel> {
        match self {
            IdentificationOutcome::Identified(model) => Some(model),
            _ => None,
        }
    }
}

/// Everything a front end needs to present a finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub scenario_name: String,
    pub trace: SimTrace,
    pub metrics: LoopMetrics,
    pub segments: Vec<SegmentResponse>,
    pub identification: IdentificationOutcome,
    /// Present only when identification succeeded.
    pub tuning: Option<TuningTable>,
    pub timing: RunTimingSummary,
}

fn emit_progress(
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    event: RunProgressEvent,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(event);
    }
}

fn emit_stage(
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    stage: RunStage,
    started: Instant,
    message: &str,
) {
    emit_progress(
        progress_cb,
        RunProgressEvent::stage(
            stage,
            started.elapsed().as_secs_f64(),
            Some(message.to_string()),
        ),
    );
}

/// Run a scenario end to end.
pub fn run_scenario(scenario: &Scenario, options: &RunOptions) -> AppResult<RunReport> {
    run_scenario_with_progress(scenario, options, None)
}

/// Run a scenario end to end and stream progress events.
pub fn run_scenario_with_progress(
    scenario: &Scenario,
    options: &RunOptions,
    mut progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<RunReport> {
    let started = Instant::now();
    let mut timing = RunTimingSummary::default();

    info!(scenario = %scenario.name, "running scenario");
    emit_stage(
        &mut progress_cb,
        RunStage::CompilingScenario,
        started,
        "Compiling scenario",
    );
    let compile_start = Instant::now();
    let mut compiled = compile_scenario(scenario)?;
    if options.seed.is_some() {
        compiled.identify.search.seed = options.seed;
    }
    timing.compile_time_s = compile_start.elapsed().as_secs_f64();

    emit_stage(
        &mut progress_cb,
        RunStage::Simulating,
        started,
        "Simulating closed loop",
    );
    let sim_start = Instant::now();
    let t_end_s = compiled.sim.duration;
    let output = {
        let mut on_step = |p: SimProgress| {
            emit_progress(
                &mut progress_cb,
                RunProgressEvent {
                    stage: RunStage::Simulating,
                    elapsed_wall_s: started.elapsed().as_secs_f64(),
                    message: None,
                    simulation: Some(SimulationProgress {
                        sim_time_s: p.sim_time,
                        t_end_s,
                        fraction_complete: p.fraction_complete,
                        step: p.step,
                    }),
                    identification: None,
                },
            );
        };
        run_closed_loop_with_progress(
            &mut compiled.plant,
            &mut compiled.controller,
            &compiled.schedule,
            &compiled.sim,
            Some(&mut on_step),
        )?
    };
    timing.simulate_time_s = sim_start.elapsed().as_secs_f64();
    timing.sim_steps = output.trace.len();
    let segments = segment_responses(&output.trace);

    let identification = if options.identify {
        emit_stage(
            &mut progress_cb,
            RunStage::Identifying,
            started,
            "Identifying FOPDT model",
        );
        let ident_start = Instant::now();
        let result = {
            let mut observer = |report: &GenerationReport| {
                emit_progress(
                    &mut progress_cb,
                    RunProgressEvent {
                        stage: RunStage::Identifying,
                        elapsed_wall_s: started.elapsed().as_secs_f64(),
                        message: None,
                        simulation: None,
                        identification: Some(IdentificationProgress {
                            generation: report.generation,
                            max_generations: report.max_generations,
                            best_cost: report.best_cost,
                            spread_ratio: report.spread_ratio,
                            evaluations: report.evaluations,
                        }),
                    },
                );
                ControlFlow::Continue(())
            };
            identify_with_progress(
                &output.trace.time,
                &output.trace.measured,
                &output.trace.control,
                &compiled.identify,
                Some(&mut observer),
            )
        };
        timing.identify_time_s = ident_start.elapsed().as_secs_f64();
        outcome_from(result)?
    } else {
        IdentificationOutcome::Skipped
    };

    let tuning = match identification.model() {
        Some(model) => {
            emit_stage(
                &mut progress_cb,
                RunStage::Tuning,
                started,
                "Computing tuning tables",
            );
            timing.generations = model.generations;
            timing.evaluations = model.evaluations;
            let tune_start = Instant::now();
            let table = TuningTable::from_params(&model.params);
            timing.tune_time_s = tune_start.elapsed().as_secs_f64();
            table
        }
        None => None,
    };

    timing.total_time_s = started.elapsed().as_secs_f64();
    emit_stage(&mut progress_cb, RunStage::Completed, started, "Done");
    info!(
        scenario = %scenario.name,
        iae = output.metrics.iae,
        identified = identification.model().is_some(),
        total_time_s = timing.total_time_s,
        "scenario finished"
    );

    Ok(RunReport {
        scenario_name: scenario.name.clone(),
        trace: output.trace,
        metrics: output.metrics,
        segments,
        identification,
        tuning,
        timing,
    })
}

/// Search failures become a reported outcome; bad inputs stay errors.
fn outcome_from(result: Result<IdentifiedModel, IdentError>) -> AppResult<IdentificationOutcome> {
    match result {
        Ok(model) => Ok(IdentificationOutcome::Identified(model)),
        Err(IdentError::NotConverged { message } | IdentError::Aborted { message }) => {
            warn!(%message, "identification failed");
            Ok(IdentificationOutcome::Failed { message })
        }
        Err(other) => Err(other.into()),
    }
}

//! Closed-loop simulation runner and trace recording.

use lf_controls::{Controller, SetpointSchedule};
use lf_core::TimeGrid;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SimResult;
use crate::metrics::{LoopMetrics, MetricsAccumulator};
use crate::model::Process;

/// Options for simulation runs.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimOptions {
    /// Simulated span (seconds); the grid covers `[0, duration)`.
    pub duration: f64,
    /// Fixed time step (seconds).
    pub dt: f64,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            duration: 400.0,
            dt: 0.1,
        }
    }
}

/// Column-oriented record of a run, one entry per grid point.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SimTrace {
    pub time: Vec<f64>,
    pub setpoint: Vec<f64>,
    pub measured: Vec<f64>,
    pub control: Vec<f64>,
}

/// One row of a [`SimTrace`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TraceRecord {
    pub time: f64,
    pub setpoint: f64,
    pub measured: f64,
    pub control: f64,
}

impl SimTrace {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            time: Vec::with_capacity(n),
            setpoint: Vec::with_capacity(n),
            measured: Vec::with_capacity(n),
            control: Vec::with_capacity(n),
        }
    }

    pub fn push(&mut self, rec: TraceRecord) {
        self.time.push(rec.time);
        self.setpoint.push(rec.setpoint);
        self.measured.push(rec.measured);
        self.control.push(rec.control);
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn record(&self, i: usize) -> Option<TraceRecord> {
        Some(TraceRecord {
            time: *self.time.get(i)?,
            setpoint: *self.setpoint.get(i)?,
            measured: *self.measured.get(i)?,
            control: *self.control.get(i)?,
        })
    }

    pub fn records(&self) -> impl Iterator<Item = TraceRecord> + '_ {
        (0..self.len()).filter_map(|i| self.record(i))
    }

    pub fn last(&self) -> Option<TraceRecord> {
        self.len().checked_sub(1).and_then(|i| self.record(i))
    }
}

/// Trace and metrics of a finished run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimOutput {
    pub trace: SimTrace,
    pub metrics: LoopMetrics,
}

/// Progress snapshot emitted while a run is in flight.
#[derive(Clone, Copy, Debug)]
pub struct SimProgress {
    pub step: usize,
    pub total_steps: usize,
    pub sim_time: f64,
    pub fraction_complete: f64,
}

/// Run the loop over the full grid.
pub fn run_closed_loop<P, C>(
    plant: &mut P,
    controller: &mut C,
    schedule: &SetpointSchedule,
    opts: &SimOptions,
) -> SimResult<SimOutput>
where
    P: Process,
    C: Controller,
{
    run_closed_loop_with_progress(plant, controller, schedule, opts, None)
}

/// Run the loop over the full grid, reporting progress roughly every 1 %.
pub fn run_closed_loop_with_progress<P, C>(
    plant: &mut P,
    controller: &mut C,
    schedule: &SetpointSchedule,
    opts: &SimOptions,
    mut progress_cb: Option<&mut dyn FnMut(SimProgress)>,
) -> SimResult<SimOutput>
where
    P: Process,
    C: Controller,
{
    let grid = TimeGrid::new(opts.duration, opts.dt)?;
    let dt = grid.dt();
    let total_steps = grid.len();
    let report_every = (total_steps / 100).max(1);

    let mut trace = SimTrace::with_capacity(total_steps);
    let mut metrics = MetricsAccumulator::new(dt);

    for (step, t) in grid.iter().enumerate() {
        let setpoint = schedule.value_at(t);
        let control = controller.advance(setpoint, plant.output(), dt)?;
        let measured = plant.advance(control, dt)?;

        trace.push(TraceRecord {
            time: t,
            setpoint,
            measured,
            control,
        });
        metrics.record(t, setpoint, measured, control);

        if let Some(cb) = progress_cb.as_deref_mut() {
            if (step + 1) % report_every == 0 || step + 1 == total_steps {
                cb(SimProgress {
                    step: step + 1,
                    total_steps,
                    sim_time: t,
                    fraction_complete: (step + 1) as f64 / total_steps as f64,
                });
            }
        }
    }

    let metrics = metrics.finish();
    debug!(
        steps = total_steps,
        iae = metrics.iae,
        coi = metrics.coi,
        oscillation_index = metrics.oscillation_index,
        "closed-loop run finished"
    );

    Ok(SimOutput { trace, metrics })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;
    use crate::plant::FopdtPlant;
    use lf_controls::PidController;
    use lf_core::FopdtParams;

    #[test]
    fn sim_options_defaults() {
        let opts = SimOptions::default();
        assert_eq!(opts.duration, 400.0);
        assert_eq!(opts.dt, 0.1);
    }

    #[test]
    fn sim_options_invalid() {
        let mut plant = FopdtPlant::new(FopdtParams::new(1.0, 1.0, 0.0), 0.1).unwrap();
        let mut pid = PidController::new(1.0, 0.0, 0.0);
        let schedule = SetpointSchedule::constant(1.0);
        let opts = SimOptions {
            duration: 1.0,
            dt: 0.0,
        };
        assert!(run_closed_loop(&mut plant, &mut pid, &schedule, &opts).is_err());
    }

    #[test]
    fn plant_built_for_other_step_is_rejected() {
        let mut plant = FopdtPlant::new(FopdtParams::new(2.0, 10.0, 2.0), 0.1).unwrap();
        let mut pid = PidController::new(1.0, 0.1, 0.0);
        let schedule = SetpointSchedule::constant(1.0);
        let opts = SimOptions {
            duration: 10.0,
            dt: 0.5,
        };
        let err = run_closed_loop(&mut plant, &mut pid, &schedule, &opts).unwrap_err();
        assert!(matches!(err, SimError::InvalidArg { .. }));
        assert_eq!(plant.delay_len(), 20);
    }

    #[test]
    fn trace_has_one_row_per_grid_point() {
        let opts = SimOptions {
            duration: 5.0,
            dt: 0.1,
        };
        let mut plant = FopdtPlant::new(FopdtParams::new(1.0, 2.0, 0.5), opts.dt).unwrap();
        let mut pid = PidController::new(1.0, 0.2, 0.0);
        let schedule = SetpointSchedule::new([(0.0, 1.0), (2.0, 2.0)]).unwrap();

        let out = run_closed_loop(&mut plant, &mut pid, &schedule, &opts).unwrap();
        assert_eq!(out.trace.len(), 50);
        assert_eq!(out.trace.setpoint[19], 1.0);
        assert_eq!(out.trace.setpoint[20], 2.0);
        assert_eq!(out.trace.last().unwrap().measured, plant.pv());
    }

    #[test]
    fn progress_reaches_completion() {
        let opts = SimOptions {
            duration: 10.0,
            dt: 0.1,
        };
        let mut plant = FopdtPlant::new(FopdtParams::new(1.0, 2.0, 0.0), opts.dt).unwrap();
        let mut pid = PidController::new(1.0, 0.0, 0.0);
        let schedule = SetpointSchedule::constant(1.0);

        let mut last = None;
        run_closed_loop_with_progress(
            &mut plant,
            &mut pid,
            &schedule,
            &opts,
            Some(&mut |p: SimProgress| last = Some(p)),
        )
        .unwrap();
        let last = last.unwrap();
        assert_eq!(last.step, last.total_steps);
        assert_eq!(last.fraction_complete, 1.0);
    }
}

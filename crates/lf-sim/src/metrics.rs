//! Closed-loop performance metrics.
//!
//! - **IAE**: integral of absolute tracking error, `Σ |sp - pv| * dt`
//! - **COI**: cumulative control movement, `Σ |u[n] - u[n-1]| * dt` for `t > 0`
//! - **Oscillation index**: number of sign changes of the tracking error
//!   between consecutive samples for `t > 0`

use serde::{Deserialize, Serialize};

use crate::sim::SimTrace;

/// Scalar loop performance summary.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LoopMetrics {
    /// Integral of absolute error.
    pub iae: f64,
    /// Cumulative control output increment.
    pub coi: f64,
    /// Tracking-error zero crossings.
    pub oscillation_index: usize,
}

impl LoopMetrics {
    /// Recompute metrics from a finished trace.
    pub fn from_trace(trace: &SimTrace, dt: f64) -> Self {
        let mut acc = MetricsAccumulator::new(dt);
        for rec in trace.records() {
            acc.record(rec.time, rec.setpoint, rec.measured, rec.control);
        }
        acc.finish()
    }
}

/// Incremental metric accumulator fed once per simulated step.
#[derive(Debug, Clone)]
pub struct MetricsAccumulator {
    dt: f64,
    metrics: LoopMetrics,
    previous_control: f64,
    previous_error: f64,
}

impl MetricsAccumulator {
    pub fn new(dt: f64) -> Self {
        Self {
            dt,
            metrics: LoopMetrics::default(),
            previous_control: 0.0,
            previous_error: 0.0,
        }
    }

    /// Fold in one sample.
    pub fn record(&mut self, t: f64, setpoint: f64, measured: f64, control: f64) {
        let error = setpoint - measured;
        self.metrics.iae += error.abs() * self.dt;

        if t > 0.0 {
            self.metrics.coi += (control - self.previous_control).abs() * self.dt;
            if error * self.previous_error < 0.0 {
                self.metrics.oscillation_index += 1;
            }
        }

        self.previous_control = control;
        self.previous_error = error;
    }

    pub fn current(&self) -> LoopMetrics {
        self.metrics
    }

    pub fn finish(self) -> LoopMetrics {
        self.metrics
    }
}

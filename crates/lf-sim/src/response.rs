//! Step-response summary per setpoint segment.
//!
//! A trace driven by a multi-step schedule is split at every setpoint change.
//! For each segment the response to that step is summarized with overshoot,
//! settling time and the error left at the end of the segment.

use serde::{Deserialize, Serialize};

use crate::sim::SimTrace;

/// Settling band as a fraction of the step size.
const SETTLING_BAND: f64 = 0.02;

/// Steps smaller than this are treated as no step at all.
const MIN_STEP: f64 = 1e-9;

/// Response to one setpoint step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentResponse {
    /// Time the segment's setpoint became active (seconds).
    pub start_time: f64,
    /// Segment length (seconds).
    pub duration: f64,
    /// Setpoint held through the segment.
    pub setpoint: f64,
    /// Step size relative to the output at the start of the segment.
    pub step: f64,
    /// Peak excursion past the setpoint in percent of the step, if any.
    pub overshoot_pct: Option<f64>,
    /// Time from segment start until the output stays inside the 2 % band.
    /// `None` when the output never settles within the segment.
    pub settling_time: Option<f64>,
    /// `setpoint - measured` at the last sample of the segment.
    pub final_error: f64,
}

/// Split `trace` at setpoint changes and summarize each segment.
pub fn segment_responses(trace: &SimTrace) -> Vec<SegmentResponse> {
    let n = trace.len();
    if n == 0 {
        return Vec::new();
    }

    let mut starts: Vec<usize> = vec![0];
    starts.extend((1..n).filter(|&i| trace.setpoint[i] != trace.setpoint[i - 1]));

    starts
        .iter()
        .enumerate()
        .map(|(k, &a)| {
            let b = starts.get(k + 1).copied().unwrap_or(n);
            summarize(trace, a, b)
        })
        .collect()
}

fn summarize(trace: &SimTrace, a: usize, b: usize) -> SegmentResponse {
    let setpoint = trace.setpoint[a];
    let initial = if a > 0 { trace.measured[a - 1] } else { 0.0 };
    let step = setpoint - initial;
    let start_time = trace.time[a];
    let end_time = trace.time.get(b).copied().unwrap_or_else(|| {
        // Last segment runs to one step past the final sample
        let dt = if b >= 2 {
            trace.time[b - 1] - trace.time[b - 2]
        } else {
            0.0
        };
        trace.time[b - 1] + dt
    });
    let measured = &trace.measured[a..b];
    let final_error = setpoint - measured[measured.len() - 1];

    if step.abs() < MIN_STEP {
        return SegmentResponse {
            start_time,
            duration: end_time - start_time,
            setpoint,
            step,
            overshoot_pct: None,
            settling_time: None,
            final_error,
        };
    }

    let direction = step.signum();
    let peak_excursion = measured
        .iter()
        .map(|pv| (pv - setpoint) * direction)
        .fold(f64::NEG_INFINITY, f64::max);
    let overshoot_pct = (peak_excursion > 0.0).then(|| 100.0 * peak_excursion / step.abs());

    let band = SETTLING_BAND * step.abs();
    let settling_time = match measured.iter().rposition(|pv| (pv - setpoint).abs() > band) {
        None => Some(0.0),
        Some(last_out) if last_out + 1 < measured.len() => {
            Some(trace.time[a + last_out + 1] - start_time)
        }
        Some(_) => None,
    };

    SegmentResponse {
        start_time,
        duration: end_time - start_time,
        setpoint,
        step,
        overshoot_pct,
        settling_time,
        final_error,
    }
}

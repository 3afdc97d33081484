//! Identification cost function.

use lf_core::{FopdtParams, TimeGrid};
use lf_sim::simulate_open_loop;
use serde::{Deserialize, Serialize};

use crate::error::{IdentError, IdentResult};

/// Cost returned for candidates outside the physical domain.
///
/// Finite so optimizers that require finite energies stay well defined.
pub const INFEASIBLE_PENALTY: f64 = 1e9;

/// Goodness-of-fit statistics for a candidate model.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FitStats {
    /// Sum of squared residuals.
    pub sse: f64,
    /// Root-mean-square residual.
    pub rmse: f64,
    /// Coefficient of determination; `None` for a constant recorded output.
    pub r_squared: Option<f64>,
}

/// Sum-of-squares fit of an open-loop FOPDT response to a recorded trace.
///
/// Borrows the trace; every evaluation owns its own simulation scratch, so a
/// single objective can be shared across worker threads.
#[derive(Clone, Copy, Debug)]
pub struct FitObjective<'a> {
    dt: f64,
    measured: &'a [f64],
    control: &'a [f64],
}

impl<'a> FitObjective<'a> {
    /// Bind the objective to a recorded trace.
    ///
    /// `time`, `measured` and `control` must have the same length, describe a
    /// uniform grid of at least two samples and contain only finite values.
    pub fn new(time: &[f64], measured: &'a [f64], control: &'a [f64]) -> IdentResult<Self> {
        if measured.len() != time.len() || control.len() != time.len() {
            return Err(IdentError::InvalidInput {
                what: format!(
                    "trace columns differ in length (time={}, measured={}, control={})",
                    time.len(),
                    measured.len(),
                    control.len()
                ),
            });
        }
        let grid = TimeGrid::from_samples(time)?;
        if measured.iter().chain(control).any(|v| !v.is_finite()) {
            return Err(IdentError::InvalidInput {
                what: "trace contains non-finite values".to_string(),
            });
        }
        Ok(Self {
            dt: grid.dt(),
            measured,
            control,
        })
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn len(&self) -> usize {
        self.measured.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measured.is_empty()
    }

    /// Sum of squared residuals, or [`INFEASIBLE_PENALTY`] when
    /// `kp <= 0`, `tau <= 0` or `theta < 0`.
    pub fn cost(&self, params: &FopdtParams) -> f64 {
        if params.kp <= 0.0 || params.tau <= 0.0 || params.theta < 0.0 {
            return INFEASIBLE_PENALTY;
        }
        let simulated = simulate_open_loop(params, self.dt, self.control);
        self.measured
            .iter()
            .zip(&simulated)
            .map(|(m, s)| (m - s).powi(2))
            .sum()
    }

    /// Cost for a raw `[kp, tau, theta]` vector.
    pub fn cost_slice(&self, x: &[f64]) -> f64 {
        match FopdtParams::from_slice(x) {
            Some(params) => self.cost(&params),
            None => INFEASIBLE_PENALTY,
        }
    }

    pub fn fit_stats(&self, params: &FopdtParams) -> FitStats {
        let sse = self.cost(params);
        let n = self.measured.len().max(1) as f64;
        let mean = self.measured.iter().sum::<f64>() / n;
        let sst: f64 = self.measured.iter().map(|m| (m - mean).powi(2)).sum();
        FitStats {
            sse,
            rmse: (sse / n).sqrt(),
            r_squared: (sst > 0.0).then(|| 1.0 - sse / sst),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn synthetic(params: FopdtParams, dt: f64, n: usize) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let time: Vec<f64> = (0..n).map(|i| i as f64 * dt).collect();
        let control: Vec<f64> = (0..n)
            .map(|i| if (i / 50) % 2 == 0 { 1.0 } else { 3.0 })
            .collect();
        let measured = simulate_open_loop(&params, dt, &control);
        (time, measured, control)
    }

    #[test]
    fn true_parameters_have_zero_cost() {
        let params = FopdtParams::new(2.0, 10.0, 2.0);
        let (time, measured, control) = synthetic(params, 0.1, 400);
        let objective = FitObjective::new(&time, &measured, &control).unwrap();
        assert_eq!(objective.cost(&params), 0.0);

        let stats = objective.fit_stats(&params);
        assert_eq!(stats.rmse, 0.0);
        assert_eq!(stats.r_squared, Some(1.0));
    }

    #[test]
    fn wrong_parameters_cost_more() {
        let params = FopdtParams::new(2.0, 10.0, 2.0);
        let (time, measured, control) = synthetic(params, 0.1, 400);
        let objective = FitObjective::new(&time, &measured, &control).unwrap();
        assert!(objective.cost(&FopdtParams::new(1.5, 10.0, 2.0)) > 0.0);
        assert!(objective.cost(&FopdtParams::new(2.0, 5.0, 2.0)) > 0.0);
        assert!(objective.cost(&FopdtParams::new(2.0, 10.0, 4.0)) > 0.0);
    }

    #[test]
    fn infeasible_candidates_get_penalty() {
        let (time, measured, control) = synthetic(FopdtParams::new(1.0, 1.0, 0.0), 0.1, 20);
        let objective = FitObjective::new(&time, &measured, &control).unwrap();
        for bad in [
            FopdtParams::new(0.0, 1.0, 0.0),
            FopdtParams::new(-1.0, 1.0, 0.0),
            FopdtParams::new(1.0, 0.0, 0.0),
            FopdtParams::new(1.0, 1.0, -0.5),
        ] {
            assert_eq!(objective.cost(&bad), INFEASIBLE_PENALTY);
        }
        assert_eq!(objective.cost_slice(&[1.0, 1.0]), INFEASIBLE_PENALTY);
    }

    #[test]
    fn rejects_malformed_traces() {
        let time = [0.0, 0.1, 0.2];
        assert!(FitObjective::new(&time, &[0.0, 0.0], &[0.0, 0.0, 0.0]).is_err());
        assert!(FitObjective::new(&time, &[0.0, f64::NAN, 0.0], &[0.0; 3]).is_err());
        assert!(FitObjective::new(&[0.0], &[0.0], &[0.0]).is_err());
        assert!(FitObjective::new(&[0.0, 0.1, 0.5], &[0.0; 3], &[0.0; 3]).is_err());
    }

    #[test]
    fn constant_output_has_no_r_squared() {
        let time = [0.0, 1.0, 2.0];
        let measured = [0.0; 3];
        let control = [0.0; 3];
        let objective = FitObjective::new(&time, &measured, &control).unwrap();
        let stats = objective.fit_stats(&FopdtParams::new(1.0, 1.0, 0.0));
        assert_eq!(stats.r_squared, None);
    }

    proptest! {
        #[test]
        fn generating_parameters_fit_exactly(
            kp in 0.1f64..5.0,
            tau in 1.0f64..20.0,
            theta in 0.0f64..5.0,
            other_kp in 0.1f64..5.0,
        ) {
            let params = FopdtParams::new(kp, tau, theta);
            let (time, measured, control) = synthetic(params, 0.1, 200);
            let objective = FitObjective::new(&time, &measured, &control).unwrap();
            prop_assert_eq!(objective.cost(&params), 0.0);
            prop_assert!(objective.cost(&FopdtParams::new(other_kp, tau, theta)) >= 0.0);
        }
    }
}

//! First-order-plus-dead-time plant.
//!
//! Dynamics: `tau * dpv/dt = kp * u(t - theta) - pv`, integrated with
//! forward Euler on the simulation grid. Dead time is a whole number of
//! samples, `round(theta / dt)`.

use std::collections::VecDeque;

use lf_core::{FopdtParams, delay_samples};

use crate::error::{SimError, SimResult};
use crate::model::Process;

/// Relative tolerance between the construction step and the stepping step.
const DT_REL_TOL: f64 = 1e-9;

/// One forward-Euler step of the first-order lag.
///
/// Shared by the incremental and batch forms so both produce identical bits.
#[inline]
fn euler_step(params: &FopdtParams, pv: f64, delayed_input: f64, dt: f64) -> f64 {
    let d_pv = (params.kp * delayed_input - pv) / params.tau;
    pv + d_pv * dt
}

/// Stateful FOPDT plant advanced one sample at a time.
#[derive(Clone, Debug)]
pub struct FopdtPlant {
    params: FopdtParams,
    dt: f64,
    pv: f64,
    /// Past inputs, oldest at the front. Length is fixed at construction.
    delay_line: VecDeque<f64>,
    last_delayed_input: f64,
}

impl FopdtPlant {
    /// Create a plant at rest (`pv = 0`, delay line filled with zeros).
    ///
    /// `dt` fixes the delay line length; [`FopdtPlant::advance`] rejects any
    /// other step.
    pub fn new(params: FopdtParams, dt: f64) -> SimResult<Self> {
        params.validate()?;
        if dt <= 0.0 || !dt.is_finite() {
            return Err(SimError::InvalidArg {
                what: "dt must be positive",
            });
        }
        let delay_len = delay_samples(params.theta, dt);
        Ok(Self {
            params,
            dt,
            pv: 0.0,
            delay_line: VecDeque::from(vec![0.0; delay_len]),
            last_delayed_input: 0.0,
        })
    }

    pub fn params(&self) -> &FopdtParams {
        &self.params
    }

    /// Step the delay line was sized for.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn pv(&self) -> f64 {
        self.pv
    }

    /// Number of samples of transport delay.
    pub fn delay_len(&self) -> usize {
        self.delay_line.len()
    }

    /// Input that drove the most recent step.
    pub fn last_delayed_input(&self) -> f64 {
        self.last_delayed_input
    }

    /// Advance one step with `control_input` and return the new output.
    pub fn advance(&mut self, control_input: f64, dt: f64) -> SimResult<f64> {
        if dt <= 0.0 || !dt.is_finite() {
            return Err(SimError::InvalidArg {
                what: "dt must be positive",
            });
        }
        if (dt - self.dt).abs() > DT_REL_TOL * self.dt {
            return Err(SimError::InvalidArg {
                what: "dt differs from the step the plant was built for",
            });
        }

        let delayed = match self.delay_line.pop_front() {
            Some(oldest) => {
                self.delay_line.push_back(control_input);
                oldest
            }
            None => control_input,
        };

        self.last_delayed_input = delayed;
        self.pv = euler_step(&self.params, self.pv, delayed, dt);
        Ok(self.pv)
    }

    pub fn reset(&mut self) {
        self.pv = 0.0;
        self.last_delayed_input = 0.0;
        self.delay_line.iter_mut().for_each(|u| *u = 0.0);
    }
}

impl Process for FopdtPlant {
    fn output(&self) -> f64 {
        self.pv
    }

    fn advance(&mut self, input: f64, dt: f64) -> SimResult<f64> {
        FopdtPlant::advance(self, input, dt)
    }

    fn reset(&mut self) {
        FopdtPlant::reset(self)
    }
}

/// Input sequence shifted by `delay` samples with zeros in front.
///
/// A delay of zero, or one that reaches the sequence length, leaves the
/// input unshifted.
fn shifted_input(cv: &[f64], delay: usize) -> Vec<f64> {
    if delay == 0 || delay >= cv.len() {
        return cv.to_vec();
    }
    let mut delayed = vec![0.0; cv.len()];
    delayed[delay..].copy_from_slice(&cv[..cv.len() - delay]);
    delayed
}

/// Open-loop response of a plant at rest driven by the whole sequence `cv`.
///
/// Equivalent to advancing a fresh [`FopdtPlant`] through `cv` as long as
/// the delay is shorter than the sequence. Parameters are not validated;
/// callers screen infeasible candidates first.
pub fn simulate_open_loop(params: &FopdtParams, dt: f64, cv: &[f64]) -> Vec<f64> {
    let delayed = shifted_input(cv, delay_samples(params.theta, dt));
    let mut pv = 0.0;
    delayed
        .iter()
        .map(|&u| {
            pv = euler_step(params, pv, u, dt);
            pv
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn run_incremental(params: FopdtParams, dt: f64, cv: &[f64]) -> Vec<f64> {
        let mut plant = FopdtPlant::new(params, dt).unwrap();
        cv.iter().map(|&u| plant.advance(u, dt).unwrap()).collect()
    }

    #[test]
    fn zero_dead_time_passes_input_through() {
        let dt = 0.1;
        let mut plant = FopdtPlant::new(FopdtParams::new(2.0, 5.0, 0.0), dt).unwrap();
        assert_eq!(plant.delay_len(), 0);
        for u in [1.0, -3.0, 0.5, 7.25] {
            plant.advance(u, dt).unwrap();
            assert_eq!(plant.last_delayed_input(), u);
        }
    }

    #[test]
    fn sub_half_step_dead_time_rounds_to_zero() {
        let plant = FopdtPlant::new(FopdtParams::new(1.0, 1.0, 0.049), 0.1).unwrap();
        assert_eq!(plant.delay_len(), 0);
    }

    #[test]
    fn dead_time_holds_output_at_zero() {
        let dt = 0.1;
        let mut plant = FopdtPlant::new(FopdtParams::new(2.0, 10.0, 2.0), dt).unwrap();
        assert_eq!(plant.delay_len(), 20);
        for _ in 0..20 {
            assert_eq!(plant.advance(1.0, dt).unwrap(), 0.0);
        }
        assert!(plant.advance(1.0, dt).unwrap() > 0.0);
    }

    #[test]
    fn step_response_reaches_steady_state_gain() {
        let params = FopdtParams::new(2.0, 10.0, 2.0);
        let dt = 0.1;
        let u = 3.0;
        let mut plant = FopdtPlant::new(params, dt).unwrap();
        let steps = ((params.theta + 10.0 * params.tau) / dt).round() as usize;
        let mut pv = 0.0;
        for _ in 0..steps {
            pv = plant.advance(u, dt).unwrap();
        }
        // e^-10 of the step remains
        assert!((pv - params.kp * u).abs() < 1e-3 * params.kp * u);
    }

    #[test]
    fn rejects_invalid_parameters() {
        assert!(FopdtPlant::new(FopdtParams::new(1.0, 0.0, 1.0), 0.1).is_err());
        assert!(FopdtPlant::new(FopdtParams::new(1.0, -2.0, 1.0), 0.1).is_err());
        assert!(FopdtPlant::new(FopdtParams::new(1.0, 1.0, -1.0), 0.1).is_err());
        assert!(FopdtPlant::new(FopdtParams::new(1.0, 1.0, 1.0), 0.0).is_err());

        let mut plant = FopdtPlant::new(FopdtParams::new(1.0, 1.0, 1.0), 0.1).unwrap();
        assert!(plant.advance(1.0, 0.0).is_err());
    }

    #[test]
    fn rejects_step_other_than_construction_step() {
        let mut plant = FopdtPlant::new(FopdtParams::new(2.0, 10.0, 2.0), 0.1).unwrap();
        assert_eq!(plant.dt(), 0.1);
        assert!(plant.advance(1.0, 0.5).is_err());
        assert_eq!(plant.pv(), 0.0);
        assert!(plant.advance(1.0, 0.1 + 1e-12).is_ok());
    }

    #[test]
    fn reset_restores_rest_state() {
        let dt = 0.5;
        let params = FopdtParams::new(1.5, 2.0, 1.0);
        let mut plant = FopdtPlant::new(params, dt).unwrap();
        let first: Vec<f64> = (0..6).map(|_| plant.advance(1.0, dt).unwrap()).collect();
        plant.reset();
        let second: Vec<f64> = (0..6).map(|_| plant.advance(1.0, dt).unwrap()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn batch_with_oversized_delay_ignores_delay() {
        let params = FopdtParams::new(1.0, 2.0, 5.0);
        let cv = vec![1.0; 10];
        let delayed = simulate_open_loop(&params, 0.1, &cv);
        let undelayed = simulate_open_loop(&FopdtParams::new(1.0, 2.0, 0.0), 0.1, &cv);
        assert_eq!(delayed, undelayed);
    }

    #[test]
    fn shifted_input_pads_front() {
        assert_eq!(shifted_input(&[1.0, 2.0, 3.0, 4.0], 2), vec![0.0, 0.0, 1.0, 2.0]);
        assert_eq!(shifted_input(&[1.0, 2.0], 0), vec![1.0, 2.0]);
        assert_eq!(shifted_input(&[1.0, 2.0], 2), vec![1.0, 2.0]);
    }

    proptest! {
        #[test]
        fn batch_matches_incremental(
            kp in 0.1_f64..5.0,
            tau in 0.5_f64..20.0,
            theta in 0.0_f64..3.0,
            dt in prop::sample::select(vec![0.05_f64, 0.1, 0.25]),
            cv in prop::collection::vec(-50.0_f64..50.0, 70..200),
        ) {
            let params = FopdtParams::new(kp, tau, theta);
            // theta <= 3 and dt >= 0.05 keep the delay under 61 samples
            prop_assume!(delay_samples(theta, dt) < cv.len());
            let batch = simulate_open_loop(&params, dt, &cv);
            let incremental = run_incremental(params, dt, &cv);
            prop_assert_eq!(batch, incremental);
        }
    }
}

//! Discrete PID controller.
//!
//! Parallel form with rectangular integration and a backward-difference
//! derivative on the tracking error:
//!
//! ```text
//! e[n]  = sp - pv
//! I[n]  = I[n-1] + e[n] * dt
//! D[n]  = (e[n] - e[n-1]) / dt
//! u[n]  = kp*e[n] + ki*I[n] + kd*D[n]
//! ```
//!
//! There is no output clamping and no anti-windup; the integral may grow
//! without bound.

use lf_core::PidGains;
use serde::{Deserialize, Serialize};

use crate::Controller;
use crate::error::{ControlError, ControlResult};

/// PID controller gains together with the running accumulators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PidController {
    /// Proportional gain.
    pub kp: f64,
    /// Integral gain (per second).
    pub ki: f64,
    /// Derivative gain (seconds).
    pub kd: f64,
    /// Integral of the tracking error.
    integral: f64,
    /// Tracking error from the previous step.
    previous_error: f64,
}

impl PidController {
    /// Create a controller with zeroed accumulators.
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self {
            kp,
            ki,
            kd,
            integral: 0.0,
            previous_error: 0.0,
        }
    }

    pub fn from_gains(gains: PidGains) -> Self {
        Self::new(gains.kp, gains.ki, gains.kd)
    }

    pub fn gains(&self) -> PidGains {
        PidGains::new(self.kp, self.ki, self.kd)
    }

    pub fn integral(&self) -> f64 {
        self.integral
    }

    pub fn previous_error(&self) -> f64 {
        self.previous_error
    }

    /// Advance one sample and return the control output.
    ///
    /// # Arguments
    ///
    /// * `setpoint` - Desired value
    /// * `measured` - Process variable
    /// * `dt` - Sample period (seconds), must be positive
    pub fn advance(&mut self, setpoint: f64, measured: f64, dt: f64) -> ControlResult<f64> {
        if dt <= 0.0 || !dt.is_finite() {
            return Err(ControlError::InvalidArg {
                what: "dt must be positive",
            });
        }

        // Positive error means PV is below setpoint
        let error = setpoint - measured;
        self.integral += error * dt;
        let derivative = (error - self.previous_error) / dt;
        self.previous_error = error;

        Ok(self.kp * error + self.ki * self.integral + self.kd * derivative)
    }

    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.previous_error = 0.0;
    }
}

impl Controller for PidController {
    fn advance(&mut self, setpoint: f64, measured: f64, dt: f64) -> ControlResult<f64> {
        PidController::advance(self, setpoint, measured, dt)
    }

    fn reset(&mut self) {
        PidController::reset(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proportional_only() {
        let mut pid = PidController::new(2.0, 0.0, 0.0);
        let out = pid.advance(1.0, 0.5, 0.1).unwrap();
        assert!((out - 1.0).abs() < 1e-12);
    }

    #[test]
    fn first_step_matches_hand_calculation() {
        let mut pid = PidController::new(2.0, 0.5, 1.0);
        // e = 21, I = 2.1, D = 21 / 0.1 = 210
        let out = pid.advance(21.0, 0.0, 0.1).unwrap();
        let expected = 2.0 * 21.0 + 0.5 * 2.1 + 1.0 * 210.0;
        assert!((out - expected).abs() < 1e-9);
        assert!((pid.integral() - 2.1).abs() < 1e-12);
        assert_eq!(pid.previous_error(), 21.0);
    }

    #[test]
    fn integral_accumulates_without_limit() {
        let mut pid = PidController::new(0.0, 1.0, 0.0);
        let out = (0..10_000)
            .map(|_| pid.advance(1.0, 0.0, 0.1).unwrap())
            .last()
            .unwrap();
        // No windup protection: I = 10_000 * 0.1
        assert!((pid.integral() - 1000.0).abs() < 1e-6);
        assert!((out - 1000.0).abs() < 1e-6);
    }

    #[test]
    fn derivative_uses_backward_difference() {
        let mut pid = PidController::new(0.0, 0.0, 1.0);
        pid.advance(1.0, 0.0, 0.5).unwrap();
        let out = pid.advance(1.0, 0.25, 0.5).unwrap();
        // (0.75 - 1.0) / 0.5
        assert!((out + 0.5).abs() < 1e-12);
    }

    #[test]
    fn rejects_non_positive_dt() {
        let mut pid = PidController::new(1.0, 1.0, 1.0);
        assert!(pid.advance(1.0, 0.0, 0.0).is_err());
        assert!(pid.advance(1.0, 0.0, -0.1).is_err());
        // Failed calls leave the state untouched
        assert_eq!(pid.integral(), 0.0);
    }

    #[test]
    fn reset_clears_accumulators() {
        let mut pid = PidController::new(1.0, 1.0, 1.0);
        pid.advance(5.0, 0.0, 0.1).unwrap();
        pid.reset();
        assert_eq!(pid.integral(), 0.0);
        assert_eq!(pid.previous_error(), 0.0);
    }
}

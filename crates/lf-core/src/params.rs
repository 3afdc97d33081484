//! Parameter records shared between simulation, identification and tuning.

use crate::error::{CoreError, CoreResult};
use crate::numeric::{Real, ensure_finite};

/// First-order-plus-dead-time process parameters.
///
/// Transfer function `kp / (tau*s + 1) * exp(-theta*s)`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FopdtParams {
    /// Steady-state process gain.
    pub kp: Real,
    /// Time constant (seconds).
    pub tau: Real,
    /// Dead time (seconds).
    pub theta: Real,
}

impl FopdtParams {
    pub fn new(kp: Real, tau: Real, theta: Real) -> Self {
        Self { kp, tau, theta }
    }

    /// Check the simulation preconditions: finite values, `tau > 0`, `theta >= 0`.
    pub fn validate(&self) -> CoreResult<()> {
        ensure_finite(self.kp, "kp")?;
        ensure_finite(self.tau, "tau")?;
        ensure_finite(self.theta, "theta")?;
        if self.tau <= 0.0 {
            return Err(CoreError::InvalidArg {
                what: "tau must be positive",
            });
        }
        if self.theta < 0.0 {
            return Err(CoreError::InvalidArg {
                what: "theta must be non-negative",
            });
        }
        Ok(())
    }

    pub fn as_array(&self) -> [Real; 3] {
        [self.kp, self.tau, self.theta]
    }

    pub fn from_slice(values: &[Real]) -> Option<Self> {
        match values {
            [kp, tau, theta] => Some(Self::new(*kp, *tau, *theta)),
            _ => None,
        }
    }
}

/// Parallel-form PID gain triple.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PidGains {
    pub kp: Real,
    pub ki: Real,
    pub kd: Real,
}

impl PidGains {
    pub fn new(kp: Real, ki: Real, kd: Real) -> Self {
        Self { kp, ki, kd }
    }

    /// Convert ideal (time-constant) form `Kc, Ti, Td` into parallel gains.
    pub fn from_time_constants(kc: Real, ti: Real, td: Real) -> Self {
        Self {
            kp: kc,
            ki: kc / ti,
            kd: kc * td,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fopdt_validation() {
        assert!(FopdtParams::new(2.0, 10.0, 2.0).validate().is_ok());
        assert!(FopdtParams::new(2.0, 10.0, 0.0).validate().is_ok());
        assert!(FopdtParams::new(2.0, 0.0, 2.0).validate().is_err());
        assert!(FopdtParams::new(2.0, 10.0, -0.1).validate().is_err());
        assert!(FopdtParams::new(Real::INFINITY, 10.0, 1.0).validate().is_err());
    }

    #[test]
    fn fopdt_slice_conversion() {
        let p = FopdtParams::from_slice(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(p.as_array(), [1.0, 2.0, 3.0]);
        assert!(FopdtParams::from_slice(&[1.0, 2.0]).is_none());
    }

    #[test]
    fn gains_from_time_constants() {
        let g = PidGains::from_time_constants(3.0, 4.0, 1.0);
        assert_eq!(g, PidGains::new(3.0, 0.75, 3.0));
    }
}

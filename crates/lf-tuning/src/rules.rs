//! Individual tuning rules.

use std::fmt;

use lf_core::{FopdtParams, PidGains};
use serde::{Deserialize, Serialize};

/// A tuning rule family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleFamily {
    ZieglerNichols,
    CohenCoon,
    ImcLambda,
}

impl RuleFamily {
    pub const ALL: [RuleFamily; 3] = [
        RuleFamily::ZieglerNichols,
        RuleFamily::CohenCoon,
        RuleFamily::ImcLambda,
    ];

    /// Display name used in reports.
    pub fn name(self) -> &'static str {
        match self {
            RuleFamily::ZieglerNichols => "Ziegler-Nichols",
            RuleFamily::CohenCoon => "Cohen-Coon",
            RuleFamily::ImcLambda => "IMC (Lambda)",
        }
    }

    /// Gains for `params`. Requires `kp != 0`, `tau > 0` and `theta > 0`.
    pub fn gains(self, params: &FopdtParams) -> PidGains {
        let (kc, ti, td) = match self {
            RuleFamily::ZieglerNichols => ziegler_nichols(params),
            RuleFamily::CohenCoon => cohen_coon(params),
            RuleFamily::ImcLambda => imc_lambda(params, params.tau),
        };
        PidGains::from_time_constants(kc, ti, td)
    }
}

impl fmt::Display for RuleFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

fn ziegler_nichols(p: &FopdtParams) -> (f64, f64, f64) {
    let kc = 1.2 * p.tau / (p.kp * p.theta);
    (kc, 2.0 * p.theta, 0.5 * p.theta)
}

fn cohen_coon(p: &FopdtParams) -> (f64, f64, f64) {
    let r = p.theta / p.tau;
    let kc = (p.tau / (p.kp * p.theta)) * (4.0 / 3.0 + r / 4.0);
    let ti = p.theta * (32.0 + 6.0 * r) / (13.0 + 8.0 * r);
    let td = p.theta * 4.0 / (11.0 + 2.0 * r);
    (kc, ti, td)
}

/// IMC PID for an FOPDT plant with closed-loop time constant `lambda`.
fn imc_lambda(p: &FopdtParams, lambda: f64) -> (f64, f64, f64) {
    let kc = (p.tau + 0.5 * p.theta) / (p.kp * (lambda + 0.5 * p.theta));
    let ti = p.tau + 0.5 * p.theta;
    let td = p.tau * p.theta / (2.0 * p.tau + p.theta);
    (kc, ti, td)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_gains(actual: PidGains, expected: (f64, f64, f64)) {
        let close = |a: f64, b: f64| (a - b).abs() <= 1e-12 * b.abs().max(1.0);
        assert!(
            close(actual.kp, expected.0) && close(actual.ki, expected.1) && close(actual.kd, expected.2),
            "{actual:?} != {expected:?}"
        );
    }

    #[test]
    fn ziegler_nichols_reference() {
        let p = FopdtParams::new(2.0, 10.0, 2.0);
        assert_gains(RuleFamily::ZieglerNichols.gains(&p), (3.0, 0.75, 3.0));
    }

    #[test]
    fn cohen_coon_reference() {
        let p = FopdtParams::new(2.0, 10.0, 2.0);
        assert_gains(
            RuleFamily::CohenCoon.gains(&p),
            (3.458333333333333, 0.7604166666666665, 2.4269005847953213),
        );
    }

    #[test]
    fn imc_lambda_reference() {
        let p = FopdtParams::new(2.0, 10.0, 2.0);
        // lambda = tau makes Kc = 1 / Kp
        assert_gains(
            RuleFamily::ImcLambda.gains(&p),
            (0.5, 0.045454545454545456, 0.45454545454545453),
        );
    }

    #[test]
    fn display_names() {
        let names: Vec<String> = RuleFamily::ALL.iter().map(|r| r.to_string()).collect();
        assert_eq!(names, ["Ziegler-Nichols", "Cohen-Coon", "IMC (Lambda)"]);
    }
}

//! Fixed-shape table of recommended gains.

use lf_core::{FopdtParams, PidGains};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::rules::RuleFamily;

/// Gains recommended by every rule family for one model.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TuningTable {
    pub ziegler_nichols: PidGains,
    pub cohen_coon: PidGains,
    pub imc_lambda: PidGains,
}

impl TuningTable {
    /// Evaluate all rules. `None` unless every parameter is finite, `tau` and
    /// `theta` are positive and `kp` is non-zero.
    pub fn from_params(params: &FopdtParams) -> Option<Self> {
        if params.validate().is_err() || params.theta <= 0.0 || params.kp == 0.0 {
            debug!(
                kp = params.kp,
                tau = params.tau,
                theta = params.theta,
                "model outside the range of the tuning rules"
            );
            return None;
        }
        let table = Self {
            ziegler_nichols: RuleFamily::ZieglerNichols.gains(params),
            cohen_coon: RuleFamily::CohenCoon.gains(params),
            imc_lambda: RuleFamily::ImcLambda.gains(params),
        };
        debug!(kp = params.kp, tau = params.tau, theta = params.theta, "computed tuning table");
        Some(table)
    }

    pub fn get(&self, family: RuleFamily) -> PidGains {
        match family {
            RuleFamily::ZieglerNichols => self.ziegler_nichols,
            RuleFamily::CohenCoon => self.cohen_coon,
            RuleFamily::ImcLambda => self.imc_lambda,
        }
    }

    /// Rows in report order.
    pub fn iter(&self) -> impl Iterator<Item = (RuleFamily, PidGains)> + '_ {
        RuleFamily::ALL.into_iter().map(|family| (family, self.get(family)))
    }
}

/// Tuning for possibly missing identification results.
///
/// Returns `None` if any parameter is absent or the model is outside the
/// range [`TuningTable::from_params`] accepts.
pub fn tune(kp: Option<f64>, tau: Option<f64>, theta: Option<f64>) -> Option<TuningTable> {
    let params = FopdtParams::new(kp?, tau?, theta?);
    TuningTable::from_params(&params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_inputs_give_none() {
        assert!(tune(None, Some(10.0), Some(2.0)).is_none());
        assert!(tune(Some(2.0), None, Some(2.0)).is_none());
        assert!(tune(Some(2.0), Some(10.0), None).is_none());
    }

    #[test]
    fn zero_dead_time_gives_none() {
        assert!(tune(Some(2.0), Some(10.0), Some(0.0)).is_none());
    }

    #[test]
    fn degenerate_models_give_none() {
        assert!(tune(Some(2.0), Some(0.0), Some(2.0)).is_none());
        assert!(tune(Some(2.0), Some(-10.0), Some(2.0)).is_none());
        assert!(tune(Some(2.0), Some(f64::NAN), Some(2.0)).is_none());
        assert!(tune(Some(2.0), Some(10.0), Some(-2.0)).is_none());
        assert!(tune(Some(f64::INFINITY), Some(10.0), Some(2.0)).is_none());
        assert!(tune(Some(0.0), Some(10.0), Some(2.0)).is_none());
    }

    #[test]
    fn table_rows_follow_family_order() {
        let table = tune(Some(2.0), Some(10.0), Some(2.0)).unwrap();
        let rows: Vec<_> = table.iter().collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], (RuleFamily::ZieglerNichols, table.ziegler_nichols));
        assert_eq!(rows[1], (RuleFamily::CohenCoon, table.cohen_coon));
        assert_eq!(rows[2], (RuleFamily::ImcLambda, table.imc_lambda));
        assert_eq!(table.ziegler_nichols, PidGains::new(3.0, 0.75, 3.0));
    }
}

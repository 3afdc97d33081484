//! FOPDT identification from a recorded closed-loop trace.

use lf_core::FopdtParams;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::de::{DeConfig, DifferentialEvolution};
use crate::error::{IdentError, IdentResult};
use crate::objective::FitObjective;
use crate::optimizer::{Bounds, GlobalOptimizer, Observer, OptimizeStatus};

/// Search box for `(kp, tau, theta)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParamBounds {
    pub kp: (f64, f64),
    pub tau: (f64, f64),
    pub theta: (f64, f64),
}

impl Default for ParamBounds {
    fn default() -> Self {
        Self {
            kp: (0.1, 5.0),
            tau: (1.0, 20.0),
            theta: (0.5, 5.0),
        }
    }
}

impl ParamBounds {
    pub fn to_bounds(&self) -> IdentResult<Bounds> {
        Bounds::new(vec![self.kp, self.tau, self.theta])
    }
}

/// Identification settings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentifyOptions {
    #[serde(default)]
    pub bounds: ParamBounds,
    #[serde(default)]
    pub search: DeConfig,
}

impl IdentifyOptions {
    /// Default settings with a fixed RNG seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            search: DeConfig {
                seed: Some(seed),
                ..DeConfig::default()
            },
            ..Self::default()
        }
    }
}

/// Best-fit model and fit diagnostics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IdentifiedModel {
    pub params: FopdtParams,
    /// Sum of squared residuals at `params`.
    pub cost: f64,
    pub rmse: f64,
    pub r_squared: Option<f64>,
    pub generations: usize,
    pub evaluations: usize,
}

/// Identify with the default differential evolution search.
pub fn identify(
    time: &[f64],
    measured: &[f64],
    control: &[f64],
    opts: &IdentifyOptions,
) -> IdentResult<IdentifiedModel> {
    identify_with_progress(time, measured, control, opts, None)
}

/// Identify with differential evolution, reporting every generation.
///
/// The observer may stop the search early by returning `Break`, in which
/// case the call fails with [`IdentError::Aborted`].
pub fn identify_with_progress(
    time: &[f64],
    measured: &[f64],
    control: &[f64],
    opts: &IdentifyOptions,
    observer: Option<Observer<'_>>,
) -> IdentResult<IdentifiedModel> {
    let optimizer = DifferentialEvolution::new(opts.search.clone());
    identify_with(&optimizer, time, measured, control, &opts.bounds, observer)
}

/// Identify with any global optimizer.
pub fn identify_with(
    optimizer: &dyn GlobalOptimizer,
    time: &[f64],
    measured: &[f64],
    control: &[f64],
    bounds: &ParamBounds,
    observer: Option<Observer<'_>>,
) -> IdentResult<IdentifiedModel> {
    let objective = FitObjective::new(time, measured, control)?;
    let bounds = bounds.to_bounds()?;

    info!(
        samples = objective.len(),
        dt = objective.dt(),
        "identifying FOPDT model"
    );

    let cost = |x: &[f64]| objective.cost_slice(x);
    let result = optimizer.minimize(&cost, &bounds, observer)?;

    match result.status {
        OptimizeStatus::Converged => {}
        OptimizeStatus::MaxGenerations => {
            warn!(generations = result.generations, "identification did not converge");
            return Err(IdentError::NotConverged {
                message: result.message,
            });
        }
        OptimizeStatus::Aborted | OptimizeStatus::TimedOut => {
            warn!(generations = result.generations, "identification aborted");
            return Err(IdentError::Aborted {
                message: result.message,
            });
        }
    }

    let params = FopdtParams::from_slice(&result.x).ok_or_else(|| IdentError::InvalidInput {
        what: format!("optimizer returned {} values, expected 3", result.x.len()),
    })?;
    let stats = objective.fit_stats(&params);

    info!(
        kp = params.kp,
        tau = params.tau,
        theta = params.theta,
        sse = stats.sse,
        generations = result.generations,
        "identified FOPDT model"
    );

    Ok(IdentifiedModel {
        params,
        cost: stats.sse,
        rmse: stats.rmse,
        r_squared: stats.r_squared,
        generations: result.generations,
        evaluations: result.evaluations,
    })
}

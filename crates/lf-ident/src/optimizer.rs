//! Pluggable box-constrained global optimizer.

use std::ops::ControlFlow;

use serde::{Deserialize, Serialize};

use crate::error::{IdentError, IdentResult};

/// Per-generation callback. Returning `ControlFlow::Break(())` stops the
/// search, which then reports [`OptimizeStatus::Aborted`].
pub type Observer<'a> = &'a mut dyn FnMut(&GenerationReport) -> ControlFlow<()>;

/// Box constraints, one `(lower, upper)` pair per dimension.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    limits: Vec<(f64, f64)>,
}

impl Bounds {
    /// Validate that every pair is finite with `lower < upper`.
    pub fn new(limits: Vec<(f64, f64)>) -> IdentResult<Self> {
        if limits.is_empty() {
            return Err(IdentError::InvalidBounds {
                what: "at least one dimension is required".to_string(),
            });
        }
        for (i, &(lo, hi)) in limits.iter().enumerate() {
            if !lo.is_finite() || !hi.is_finite() || lo >= hi {
                return Err(IdentError::InvalidBounds {
                    what: format!("dimension {i}: [{lo}, {hi}] is not a finite, non-empty interval"),
                });
            }
        }
        Ok(Self { limits })
    }

    pub fn dim(&self) -> usize {
        self.limits.len()
    }

    pub fn lower(&self) -> impl Iterator<Item = f64> + '_ {
        self.limits.iter().map(|(lo, _)| *lo)
    }

    pub fn upper(&self) -> impl Iterator<Item = f64> + '_ {
        self.limits.iter().map(|(_, hi)| *hi)
    }

    pub fn limits(&self) -> &[(f64, f64)] {
        &self.limits
    }

    pub fn contains(&self, x: &[f64]) -> bool {
        x.len() == self.dim()
            && x
                .iter()
                .zip(&self.limits)
                .all(|(v, (lo, hi))| (*lo..=*hi).contains(v))
    }
}

/// Snapshot handed to the observer after every generation.
#[derive(Clone, Debug)]
pub struct GenerationReport {
    pub generation: usize,
    pub max_generations: usize,
    pub best_cost: f64,
    pub best_x: Vec<f64>,
    /// Population energy spread relative to the convergence threshold;
    /// the search converges once this drops to 1 or below.
    pub spread_ratio: f64,
    pub evaluations: usize,
}

/// How a search ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptimizeStatus {
    Converged,
    MaxGenerations,
    Aborted,
    TimedOut,
}

/// Best candidate found and search diagnostics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptimizeResult {
    pub x: Vec<f64>,
    pub cost: f64,
    pub generations: usize,
    pub evaluations: usize,
    pub status: OptimizeStatus,
    pub message: String,
}

impl OptimizeResult {
    pub fn converged(&self) -> bool {
        self.status == OptimizeStatus::Converged
    }
}

/// Global minimizer over a box.
///
/// Implementations must explore with a population (or equivalent global
/// strategy) and report whether they converged within their budget.
pub trait GlobalOptimizer {
    fn minimize(
        &self,
        objective: &(dyn Fn(&[f64]) -> f64 + Sync),
        bounds: &Bounds,
        observer: Option<Observer<'_>>,
    ) -> IdentResult<OptimizeResult>;
}

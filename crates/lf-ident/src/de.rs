//! Differential evolution (`best/1/bin`).
//!
//! Population lives in the unit hypercube and is mapped onto the bounds for
//! evaluation. Each generation:
//! 1. draws one mutation factor `F` from the dither range,
//! 2. builds a trial per member: `best + F * (x_r0 - x_r1)` mixed with the
//!    member by binomial crossover (at least one mutated coordinate),
//! 3. re-samples trial coordinates that leave the unit cube,
//! 4. evaluates all trials in parallel, then keeps each trial that is no
//!    worse than the member it challenges.
//!
//! The search converges when `std(E) <= atol + tol * |mean(E)|` over the
//! population energies `E`. Trials are drawn sequentially from one RNG and
//! evaluation results are gathered in order, so a fixed seed gives the same
//! answer regardless of thread count.

use std::time::{Duration, Instant};

use lf_core::mean_std;
use nalgebra::DVector;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{IdentError, IdentResult};
use crate::optimizer::{
    Bounds, GenerationReport, GlobalOptimizer, Observer, OptimizeResult, OptimizeStatus,
};

/// Smallest population able to pick a member plus two distinct donors.
const MIN_POPULATION: usize = 4;

/// Differential evolution settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeConfig {
    /// Population size is this multiple of the problem dimension.
    pub population_multiplier: usize,
    /// Generation budget.
    pub max_generations: usize,
    /// Relative convergence tolerance on the energy spread.
    pub tol: f64,
    /// Absolute convergence tolerance on the energy spread.
    pub atol: f64,
    /// Crossover probability.
    pub recombination: f64,
    /// Mutation factor range; `F` is redrawn uniformly each generation.
    pub mutation: (f64, f64),
    /// RNG seed; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Wall-clock budget checked between generations.
    pub timeout: Option<Duration>,
}

impl Default for DeConfig {
    fn default() -> Self {
        Self {
            population_multiplier: 30,
            max_generations: 1000,
            tol: 0.01,
            atol: 0.0,
            recombination: 0.7,
            mutation: (0.5, 1.0),
            seed: None,
            timeout: None,
        }
    }
}

impl DeConfig {
    pub fn validate(&self) -> IdentResult<()> {
        let invalid = |what: &str| {
            Err(IdentError::InvalidInput {
                what: what.to_string(),
            })
        };
        if self.population_multiplier == 0 {
            return invalid("population_multiplier must be positive");
        }
        if self.max_generations == 0 {
            return invalid("max_generations must be positive");
        }
        if !(self.tol >= 0.0 && self.atol >= 0.0) {
            return invalid("tolerances must be non-negative");
        }
        if !(0.0..=1.0).contains(&self.recombination) {
            return invalid("recombination must lie in [0, 1]");
        }
        let (f_lo, f_hi) = self.mutation;
        if !(0.0 <= f_lo && f_lo <= f_hi && f_hi <= 2.0) {
            return invalid("mutation range must satisfy 0 <= min <= max <= 2");
        }
        Ok(())
    }
}

/// Differential evolution optimizer.
#[derive(Clone, Debug, Default)]
pub struct DifferentialEvolution {
    pub config: DeConfig,
}

impl DifferentialEvolution {
    pub fn new(config: DeConfig) -> Self {
        Self { config }
    }

    fn population_size(&self, dim: usize) -> usize {
        (self.config.population_multiplier * dim).max(MIN_POPULATION)
    }

    fn mutation_factor(&self, rng: &mut StdRng) -> f64 {
        let (lo, hi) = self.config.mutation;
        if lo < hi { rng.gen_range(lo..hi) } else { lo }
    }
}

/// Stratified initial population: each coordinate gets one sample per
/// equal-width stratum, strata shuffled independently per dimension.
fn latin_hypercube(n: usize, dim: usize, rng: &mut StdRng) -> Vec<DVector<f64>> {
    let mut population = vec![DVector::zeros(dim); n];
    let mut column: Vec<f64> = Vec::with_capacity(n);
    for j in 0..dim {
        column.clear();
        column.extend((0..n).map(|k| (k as f64 + rng.gen_range(0.0..1.0)) / n as f64));
        column.shuffle(rng);
        for (member, &u) in population.iter_mut().zip(&column) {
            member[j] = u;
        }
    }
    population
}

fn to_bounds(u: &DVector<f64>, lower: &DVector<f64>, span: &DVector<f64>) -> Vec<f64> {
    (lower + u.component_mul(span)).as_slice().to_vec()
}

fn evaluate(
    objective: &(dyn Fn(&[f64]) -> f64 + Sync),
    members: &[DVector<f64>],
    lower: &DVector<f64>,
    span: &DVector<f64>,
) -> Vec<f64> {
    members
        .par_iter()
        .map(|u| {
            let energy = objective(to_bounds(u, lower, span).as_slice());
            if energy.is_nan() { f64::INFINITY } else { energy }
        })
        .collect()
}

fn argmin(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Two distinct population indices, both different from `exclude`.
fn pick_donors(rng: &mut StdRng, n: usize, exclude: usize) -> (usize, usize) {
    let picks = rand::seq::index::sample(rng, n - 1, 2);
    let skip = |k: usize| if k >= exclude { k + 1 } else { k };
    (skip(picks.index(0)), skip(picks.index(1)))
}

impl GlobalOptimizer for DifferentialEvolution {
    fn minimize(
        &self,
        objective: &(dyn Fn(&[f64]) -> f64 + Sync),
        bounds: &Bounds,
        mut observer: Option<Observer<'_>>,
    ) -> IdentResult<OptimizeResult> {
        self.config.validate()?;

        let started = Instant::now();
        let dim = bounds.dim();
        let np = self.population_size(dim);
        let lower = DVector::from_iterator(dim, bounds.lower());
        let span = DVector::from_iterator(dim, bounds.upper()) - &lower;

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut population = latin_hypercube(np, dim, &mut rng);
        let mut energies = evaluate(objective, &population, &lower, &span);
        let mut evaluations = np;

        let finish = |population: &[DVector<f64>],
                      energies: &[f64],
                      generations: usize,
                      evaluations: usize,
                      status: OptimizeStatus,
                      message: String| {
            let best = argmin(energies);
            debug!(
                ?status,
                generations,
                evaluations,
                best_cost = energies[best],
                "differential evolution finished"
            );
            OptimizeResult {
                x: to_bounds(&population[best], &lower, &span),
                cost: energies[best],
                generations,
                evaluations,
                status,
                message,
            }
        };

        let max_generations = self.config.max_generations;
        for generation in 1..=max_generations {
            if let Some(limit) = self.config.timeout {
                if started.elapsed() >= limit {
                    return Ok(finish(
                        &population,
                        &energies,
                        generation - 1,
                        evaluations,
                        OptimizeStatus::TimedOut,
                        format!("Time budget of {:.3}s exhausted.", limit.as_secs_f64()),
                    ));
                }
            }

            let f = self.mutation_factor(&mut rng);
            let best = population[argmin(&energies)].clone();

            let trials: Vec<DVector<f64>> = (0..np)
                .map(|i| {
                    let (r0, r1) = pick_donors(&mut rng, np, i);
                    let fill_point = rng.gen_range(0..dim);
                    let mut trial = population[i].clone();
                    for j in 0..dim {
                        if j == fill_point || rng.gen_range(0.0..1.0) < self.config.recombination
                        {
                            trial[j] = best[j] + f * (population[r0][j] - population[r1][j]);
                        }
                        if !(0.0..=1.0).contains(&trial[j]) {
                            trial[j] = rng.gen_range(0.0..1.0);
                        }
                    }
                    trial
                })
                .collect();

            let trial_energies = evaluate(objective, &trials, &lower, &span);
            evaluations += np;

            for (i, (trial, energy)) in trials.into_iter().zip(trial_energies).enumerate() {
                if energy <= energies[i] {
                    population[i] = trial;
                    energies[i] = energy;
                }
            }

            let (mean, std) = mean_std(&energies);
            let threshold = self.config.atol + self.config.tol * mean.abs();
            let spread_ratio = if threshold > 0.0 {
                std / threshold
            } else if std == 0.0 {
                0.0
            } else {
                f64::INFINITY
            };

            let best_idx = argmin(&energies);
            trace!(
                generation,
                best_cost = energies[best_idx],
                spread_ratio,
                "generation complete"
            );

            if let Some(cb) = observer.as_deref_mut() {
                let report = GenerationReport {
                    generation,
                    max_generations,
                    best_cost: energies[best_idx],
                    best_x: to_bounds(&population[best_idx], &lower, &span),
                    spread_ratio,
                    evaluations,
                };
                if cb(&report).is_break() {
                    return Ok(finish(
                        &population,
                        &energies,
                        generation,
                        evaluations,
                        OptimizeStatus::Aborted,
                        "Search stopped by caller.".to_string(),
                    ));
                }
            }

            if std <= threshold {
                return Ok(finish(
                    &population,
                    &energies,
                    generation,
                    evaluations,
                    OptimizeStatus::Converged,
                    "Optimization terminated successfully.".to_string(),
                ));
            }
        }

        Ok(finish(
            &population,
            &energies,
            max_generations,
            evaluations,
            OptimizeStatus::MaxGenerations,
            "Maximum number of iterations has been exceeded.".to_string(),
        ))
    }
}

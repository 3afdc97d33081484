//! Uniform simulation time grid.

use crate::error::{CoreError, CoreResult};
use crate::numeric::{Real, ensure_finite};

/// Relative step tolerance accepted by [`TimeGrid::from_samples`].
const UNIFORM_REL_TOL: Real = 1e-6;

/// Fixed-step time grid `t_i = i * dt` starting at zero.
///
/// Built once per run and never mutated afterwards.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeGrid {
    dt: Real,
    times: Vec<Real>,
}

impl TimeGrid {
    /// Grid covering `[0, duration)` with step `dt`.
    ///
    /// The number of points is `ceil(duration / dt)`, so the end point itself
    /// is excluded.
    pub fn new(duration: Real, dt: Real) -> CoreResult<Self> {
        ensure_finite(duration, "duration")?;
        ensure_finite(dt, "dt")?;
        if dt <= 0.0 {
            return Err(CoreError::InvalidArg {
                what: "dt must be positive",
            });
        }
        if duration <= 0.0 {
            return Err(CoreError::InvalidArg {
                what: "duration must be positive",
            });
        }

        let len = (duration / dt).ceil() as usize;
        let times = (0..len).map(|i| i as Real * dt).collect();
        Ok(Self { dt, times })
    }

    /// Rebuild a grid from a recorded time column.
    ///
    /// Requires at least two strictly increasing, uniformly spaced samples.
    /// The step is taken from the first two samples.
    pub fn from_samples(samples: &[Real]) -> CoreResult<Self> {
        if samples.len() < 2 {
            return Err(CoreError::InvalidArg {
                what: "time grid needs at least two samples",
            });
        }
        for &t in samples {
            ensure_finite(t, "time sample")?;
        }

        let dt = samples[1] - samples[0];
        if dt <= 0.0 {
            return Err(CoreError::InvalidArg {
                what: "time samples must be strictly increasing",
            });
        }

        for (index, pair) in samples.windows(2).enumerate() {
            let step = pair[1] - pair[0];
            if (step - dt).abs() > UNIFORM_REL_TOL * dt {
                return Err(CoreError::NonUniformGrid {
                    index: index + 1,
                    step,
                    expected: dt,
                });
            }
        }

        Ok(Self {
            dt,
            times: samples.to_vec(),
        })
    }

    pub fn dt(&self) -> Real {
        self.dt
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn times(&self) -> &[Real] {
        &self.times
    }

    pub fn iter(&self) -> impl Iterator<Item = Real> + '_ {
        self.times.iter().copied()
    }

    /// Last time point on the grid.
    pub fn end(&self) -> Real {
        self.times.last().copied().unwrap_or(0.0)
    }
}

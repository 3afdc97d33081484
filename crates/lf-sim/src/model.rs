use crate::error::SimResult;

/// A single-input/single-output process advanced on a fixed grid.
pub trait Process {
    /// Current measured output.
    fn output(&self) -> f64;

    /// Apply `input` for one step of length `dt` and return the new output.
    fn advance(&mut self, input: f64, dt: f64) -> SimResult<f64>;

    /// Return to the initial (zero) state.
    fn reset(&mut self);
}

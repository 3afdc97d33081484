//! Controller and setpoint primitives for loopfit.
//!
//! The control side of the loop consists of:
//! - a discrete PID controller advanced once per time step
//! - a piecewise-constant setpoint schedule resolved at each grid time
//!
//! Controllers are exposed through the [`Controller`] capability so the
//! closed-loop simulator does not depend on one concrete law.

pub mod error;
pub mod pid;
pub mod schedule;

pub use error::{ControlError, ControlResult};
pub use pid::PidController;
pub use schedule::{SetpointChange, SetpointSchedule};

/// A discrete feedback law advanced once per sample.
pub trait Controller {
    /// Compute the control output for one step of length `dt`.
    fn advance(&mut self, setpoint: f64, measured: f64, dt: f64) -> ControlResult<f64>;

    /// Return the controller to its initial state.
    fn reset(&mut self);
}

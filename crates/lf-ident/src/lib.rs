//! Offline FOPDT system identification.
//!
//! Recovers `(kp, tau, theta)` from a recorded time/output/input trace by
//! minimizing the squared residual between the recorded output and an
//! open-loop re-simulation of the plant. The cost surface is multi-modal
//! (dead time is quantized to whole samples and trades off against the
//! time constant), so the search is global and population based.
//!
//! The optimizer sits behind [`GlobalOptimizer`]; [`DifferentialEvolution`]
//! is the shipped implementation.

pub mod de;
pub mod error;
pub mod identify;
pub mod objective;
pub mod optimizer;

pub use de::{DeConfig, DifferentialEvolution};
pub use error::{IdentError, IdentResult};
pub use identify::{
    IdentifiedModel, IdentifyOptions, ParamBounds, identify, identify_with,
    identify_with_progress,
};
pub use objective::{FitObjective, FitStats, INFEASIBLE_PENALTY};
pub use optimizer::{
    Bounds, GenerationReport, GlobalOptimizer, OptimizeResult, OptimizeStatus, Observer,
};

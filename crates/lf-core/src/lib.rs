//! lf-core: shared foundation for loopfit.
//!
//! Contains:
//! - numeric (Real + float helpers for delays and population statistics)
//! - grid (uniform simulation time grid)
//! - params (FOPDT process parameters, PID gain triples)
//! - error (shared error types)

pub mod error;
pub mod grid;
pub mod numeric;
pub mod params;

pub use error::{CoreError, CoreResult};
pub use grid::TimeGrid;
pub use numeric::*;
pub use params::{FopdtParams, PidGains};

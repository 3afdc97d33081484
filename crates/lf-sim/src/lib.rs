//! Closed-loop time-domain simulation for loopfit.
//!
//! Provides:
//! - First-order-plus-dead-time plant with a FIFO delay line
//! - Batch open-loop re-simulation of the same plant for identification
//! - Fixed-grid closed-loop runner with incremental performance metrics
//! - Per-setpoint-step response summary derived from a trace

pub mod error;
pub mod metrics;
pub mod model;
pub mod plant;
pub mod response;
pub mod sim;

pub use error::{SimError, SimResult};
pub use metrics::{LoopMetrics, MetricsAccumulator};
pub use model::Process;
pub use plant::{FopdtPlant, simulate_open_loop};
pub use response::{SegmentResponse, segment_responses};
pub use sim::{
    SimOptions, SimOutput, SimProgress, SimTrace, TraceRecord, run_closed_loop,
    run_closed_loop_with_progress,
};

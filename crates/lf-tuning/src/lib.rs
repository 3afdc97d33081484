//! Closed-form PID tuning from an identified FOPDT model.
//!
//! Three rule families are evaluated side by side:
//! - Ziegler-Nichols (open-loop reaction curve)
//! - Cohen-Coon
//! - IMC with the closed-loop time constant set to the process time constant
//!
//! Every rule produces ideal-form `Kc, Ti, Td`, converted to parallel gains
//! with `ki = Kc / Ti` and `kd = Kc * Td`.

pub mod rules;
pub mod table;

pub use rules::RuleFamily;
pub use table::{TuningTable, tune};

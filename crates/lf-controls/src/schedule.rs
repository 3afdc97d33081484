//! Piecewise-constant setpoint schedule.
//!
//! A schedule is an ordered list of `(time, value)` changes. At time `t` the
//! active setpoint is the value of the last change whose time is `<= t`.
//! Before the first change the first value is held.

use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};

/// A single setpoint change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SetpointChange {
    /// Time at which the change takes effect (seconds).
    pub time: f64,
    /// New setpoint value.
    pub value: f64,
}

impl SetpointChange {
    pub fn new(time: f64, value: f64) -> Self {
        Self { time, value }
    }
}

impl From<(f64, f64)> for SetpointChange {
    fn from((time, value): (f64, f64)) -> Self {
        Self { time, value }
    }
}

/// Validated, time-ordered setpoint schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<SetpointChange>", into = "Vec<SetpointChange>")]
pub struct SetpointSchedule {
    changes: Vec<SetpointChange>,
}

impl SetpointSchedule {
    /// Build a schedule from changes sorted by non-decreasing time.
    ///
    /// Entries sharing a time are kept in order; the later one wins.
    pub fn new<I, C>(changes: I) -> ControlResult<Self>
    where
        I: IntoIterator<Item = C>,
        C: Into<SetpointChange>,
    {
        let changes: Vec<SetpointChange> = changes.into_iter().map(Into::into).collect();
        if changes.is_empty() {
            return Err(ControlError::InvalidSchedule {
                what: "schedule must contain at least one entry".to_string(),
            });
        }
        for (i, change) in changes.iter().enumerate() {
            if !change.time.is_finite() || !change.value.is_finite() {
                return Err(ControlError::InvalidSchedule {
                    what: format!("entry {i} is not finite"),
                });
            }
        }
        if let Some(i) = changes.windows(2).position(|w| w[1].time < w[0].time) {
            return Err(ControlError::InvalidSchedule {
                what: format!("entry {} is earlier than entry {}", i + 1, i),
            });
        }
        Ok(Self { changes })
    }

    /// Schedule holding one value from time zero.
    pub fn constant(value: f64) -> Self {
        Self {
            changes: vec![SetpointChange::new(0.0, value)],
        }
    }

    /// Active setpoint at time `t`.
    pub fn value_at(&self, t: f64) -> f64 {
        // partition_point gives the count of entries with time <= t; ties
        // therefore resolve to the last matching entry.
        let idx = self.changes.partition_point(|c| c.time <= t);
        if idx == 0 {
            self.changes[0].value
        } else {
            self.changes[idx - 1].value
        }
    }

    pub fn changes(&self) -> &[SetpointChange] {
        &self.changes
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

impl TryFrom<Vec<SetpointChange>> for SetpointSchedule {
    type Error = ControlError;

    fn try_from(changes: Vec<SetpointChange>) -> Result<Self, Self::Error> {
        Self::new(changes)
    }
}

impl From<SetpointSchedule> for Vec<SetpointChange> {
    fn from(schedule: SetpointSchedule) -> Self {
        schedule.changes
    }
}

//! Scenario validation logic.

use crate::schema::{BoundsDef, IdentificationDef, Scenario};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Empty {field}")]
    Empty { field: String },

    #[error("Setpoints out of order: entry {index} at {time_s} s precedes the previous entry")]
    UnsortedSetpoints { index: usize, time_s: f64 },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn finite(field: &str, v: f64) -> Result<f64, ValidationError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(invalid(field, v, "must be finite"))
    }
}

fn positive(field: &str, v: f64) -> Result<f64, ValidationError> {
    if finite(field, v)? > 0.0 {
        Ok(v)
    } else {
        Err(invalid(field, v, "must be positive"))
    }
}

fn non_negative(field: &str, v: f64) -> Result<f64, ValidationError> {
    if finite(field, v)? >= 0.0 {
        Ok(v)
    } else {
        Err(invalid(field, v, "must be non-negative"))
    }
}

pub fn validate_scenario(scenario: &Scenario) -> Result<(), ValidationError> {
    if scenario.version == 0 || scenario.version > crate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: scenario.version,
        });
    }
    if scenario.name.trim().is_empty() {
        return Err(ValidationError::Empty {
            field: "name".to_string(),
        });
    }

    let plant = &scenario.plant;
    finite("plant.kp", plant.kp)?;
    positive("plant.tau_s", plant.tau_s)?;
    non_negative("plant.theta_s", plant.theta_s)?;

    let ctrl = &scenario.controller;
    finite("controller.kp", ctrl.kp)?;
    finite("controller.ki", ctrl.ki)?;
    finite("controller.kd", ctrl.kd)?;

    if scenario.setpoints.is_empty() {
        return Err(ValidationError::Empty {
            field: "setpoints".to_string(),
        });
    }
    for (i, sp) in scenario.setpoints.iter().enumerate() {
        finite(&format!("setpoints[{i}].time_s"), sp.time_s)?;
        finite(&format!("setpoints[{i}].value"), sp.value)?;
        if i > 0 && sp.time_s < scenario.setpoints[i - 1].time_s {
            return Err(ValidationError::UnsortedSetpoints {
                index: i,
                time_s: sp.time_s,
            });
        }
    }
    let first = scenario.setpoints[0].time_s;
    if first > 0.0 {
        return Err(invalid(
            "setpoints[0].time_s",
            first,
            "first setpoint must apply from t = 0",
        ));
    }

    let sim = &scenario.simulation;
    let duration = positive("simulation.duration_s", sim.duration_s)?;
    let dt = positive("simulation.dt_s", sim.dt_s)?;
    if dt >= duration {
        return Err(invalid(
            "simulation.dt_s",
            dt,
            "must be smaller than the duration",
        ));
    }

    if let Some(ident) = &scenario.identification {
        validate_identification(ident)?;
    }
    Ok(())
}

fn validate_identification(ident: &IdentificationDef) -> Result<(), ValidationError> {
    if let Some(bounds) = &ident.bounds {
        validate_bounds(bounds)?;
    }
    if ident.population_multiplier == Some(0) {
        return Err(invalid(
            "identification.population_multiplier",
            0,
            "must be positive",
        ));
    }
    if ident.max_generations == Some(0) {
        return Err(invalid(
            "identification.max_generations",
            0,
            "must be positive",
        ));
    }
    if let Some(tol) = ident.tolerance {
        non_negative("identification.tolerance", tol)?;
    }
    if let Some(cr) = ident.recombination {
        if !(0.0..=1.0).contains(&cr) {
            return Err(invalid(
                "identification.recombination",
                cr,
                "must lie in [0, 1]",
            ));
        }
    }
    if let Some([lo, hi]) = ident.mutation {
        if !(0.0 <= lo && lo <= hi && hi <= 2.0) {
            return Err(invalid(
                "identification.mutation",
                format!("[{lo}, {hi}]"),
                "must satisfy 0 <= min <= max <= 2",
            ));
        }
    }
    if let Some(timeout) = ident.timeout_s {
        positive("identification.timeout_s", timeout)?;
    }
    Ok(())
}

fn validate_bounds(bounds: &BoundsDef) -> Result<(), ValidationError> {
    let pairs = [
        ("identification.bounds.kp", bounds.kp, true),
        ("identification.bounds.tau_s", bounds.tau_s, true),
        ("identification.bounds.theta_s", bounds.theta_s, false),
    ];
    for (field, [lo, hi], strictly_positive) in pairs {
        finite(field, lo)?;
        finite(field, hi)?;
        if lo >= hi {
            return Err(invalid(
                field,
                format!("[{lo}, {hi}]"),
                "lower bound must be below upper bound",
            ));
        }
        if strictly_positive && lo <= 0.0 {
            return Err(invalid(field, lo, "lower bound must be positive"));
        }
        if lo < 0.0 {
            return Err(invalid(field, lo, "lower bound must be non-negative"));
        }
    }
    Ok(())
}

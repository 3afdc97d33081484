//! Built-in reference scenario.

use crate::LATEST_VERSION;
use crate::schema::{ControllerDef, PlantDef, Scenario, SetpointDef, SimulationDef};

const REFERENCE_SETPOINTS: [(f64, f64); 16] = [
    (0.0, 21.0),
    (50.0, 80.0),
    (75.0, 40.0),
    (100.0, 100.0),
    (120.0, 60.0),
    (150.0, 10.0),
    (175.0, 50.0),
    (200.0, 100.0),
    (220.0, 83.0),
    (250.0, 40.0),
    (275.0, 50.0),
    (300.0, 10.0),
    (320.0, 43.0),
    (350.0, 28.0),
    (375.0, 87.0),
    (400.0, 100.0),
];

/// 400 s run of plant `(2, 10, 2)` under PID `(2, 0.5, 1)` through a
/// sixteen-step setpoint sequence.
pub fn default_scenario() -> Scenario {
    Scenario {
        version: LATEST_VERSION,
        name: "Reference loop".to_string(),
        plant: PlantDef {
            kp: 2.0,
            tau_s: 10.0,
            theta_s: 2.0,
        },
        controller: ControllerDef {
            kp: 2.0,
            ki: 0.5,
            kd: 1.0,
        },
        setpoints: REFERENCE_SETPOINTS
            .iter()
            .map(|&(time_s, value)| SetpointDef { time_s, value })
            .collect(),
        simulation: SimulationDef {
            duration_s: 400.0,
            dt_s: 0.1,
        },
        identification: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate_scenario;

    #[test]
    fn default_scenario_is_valid() {
        let scenario = default_scenario();
        validate_scenario(&scenario).unwrap();
        assert_eq!(scenario.setpoints.len(), 16);
        assert_eq!(scenario.setpoints[0].value, 21.0);
    }
}

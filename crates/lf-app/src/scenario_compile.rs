//! Scenario compilation: turn a validated scenario file into runtime objects.

use std::time::Duration;

use lf_controls::{PidController, SetpointChange, SetpointSchedule};
use lf_core::{FopdtParams, PidGains};
use lf_ident::{DeConfig, IdentifyOptions, ParamBounds};
use lf_project::schema::{IdentificationDef, Scenario};
use lf_sim::{FopdtPlant, SimOptions};

use crate::error::AppResult;

/// Everything needed to run one scenario.
#[derive(Debug, Clone)]
pub struct CompiledScenario {
    pub plant: FopdtPlant,
    pub controller: PidController,
    pub schedule: SetpointSchedule,
    pub sim: SimOptions,
    pub identify: IdentifyOptions,
}

pub fn compile_scenario(scenario: &Scenario) -> AppResult<CompiledScenario> {
    lf_project::validate_scenario(scenario)?;

    let sim = SimOptions {
        duration: scenario.simulation.duration_s,
        dt: scenario.simulation.dt_s,
    };
    let params = FopdtParams::new(
        scenario.plant.kp,
        scenario.plant.tau_s,
        scenario.plant.theta_s,
    );
    let plant = FopdtPlant::new(params, sim.dt)?;

    let ctrl = &scenario.controller;
    let controller = PidController::from_gains(PidGains::new(ctrl.kp, ctrl.ki, ctrl.kd));

    let schedule = SetpointSchedule::new(
        scenario
            .setpoints
            .iter()
            .map(|sp| SetpointChange::new(sp.time_s, sp.value)),
    )?;

    let identify = match &scenario.identification {
        Some(def) => identify_options(def),
        None => IdentifyOptions::default(),
    };

    Ok(CompiledScenario {
        plant,
        controller,
        schedule,
        sim,
        identify,
    })
}

fn identify_options(def: &IdentificationDef) -> IdentifyOptions {
    let defaults = DeConfig::default();
    let bounds = def
        .bounds
        .map(|b| ParamBounds {
            kp: (b.kp[0], b.kp[1]),
            tau: (b.tau_s[0], b.tau_s[1]),
            theta: (b.theta_s[0], b.theta_s[1]),
        })
        .unwrap_or_default();

    IdentifyOptions {
        bounds,
        search: DeConfig {
            population_multiplier: def
                .population_multiplier
                .unwrap_or(defaults.population_multiplier),
            max_generations: def.max_generations.unwrap_or(defaults.max_generations),
            tol: def.tolerance.unwrap_or(defaults.tol),
            recombination: def.recombination.unwrap_or(defaults.recombination),
            mutation: def.mutation.map(|[lo, hi]| (lo, hi)).unwrap_or(defaults.mutation),
            seed: def.seed,
            timeout: def.timeout_s.map(Duration::from_secs_f64),
            ..defaults
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lf_project::default_scenario;
    use lf_project::schema::BoundsDef;

    #[test]
    fn compiles_default_scenario() {
        let compiled = compile_scenario(&default_scenario()).unwrap();
        assert_eq!(compiled.plant.delay_len(), 20);
        assert_eq!(compiled.schedule.len(), 16);
        assert_eq!(compiled.controller.gains(), PidGains::new(2.0, 0.5, 1.0));
        assert_eq!(compiled.sim.duration, 400.0);
        assert_eq!(compiled.identify, IdentifyOptions::default());
    }

    #[test]
    fn applies_identification_overrides() {
        let mut scenario = default_scenario();
        scenario.identification = Some(IdentificationDef {
            bounds: Some(BoundsDef {
                kp: [0.5, 3.0],
                tau_s: [2.0, 12.0],
                theta_s: [0.5, 3.0],
            }),
            max_generations: Some(50),
            seed: Some(9),
            timeout_s: Some(1.5),
            ..IdentificationDef::default()
        });
        let compiled = compile_scenario(&scenario).unwrap();
        let opts = compiled.identify;
        assert_eq!(opts.bounds.tau, (2.0, 12.0));
        assert_eq!(opts.search.max_generations, 50);
        assert_eq!(opts.search.seed, Some(9));
        assert_eq!(opts.search.timeout, Some(Duration::from_millis(1500)));
        assert_eq!(opts.search.population_multiplier, 30);
    }

    #[test]
    fn invalid_scenario_does_not_compile() {
        let mut scenario = default_scenario();
        scenario.plant.tau_s = -1.0;
        assert!(compile_scenario(&scenario).is_err());
    }
}

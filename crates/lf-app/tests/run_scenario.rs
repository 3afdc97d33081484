//! End-to-end scenario runs through the service layer.

use lf_app::{
    IdentificationOutcome, RunOptions, RunProgressEvent, RunReport, RunStage, export,
    init_scenario, load_scenario, run_scenario, run_scenario_with_progress,
};
use lf_project::{IdentificationDef, Scenario, SetpointDef, SimulationDef, default_scenario};

/// Reference loop shortened to 30 s with two setpoint steps.
fn short_scenario() -> Scenario {
    let mut scenario = default_scenario();
    scenario.name = "Short loop".to_string();
    scenario.setpoints = vec![
        SetpointDef {
            time_s: 0.0,
            value: 21.0,
        },
        SetpointDef {
            time_s: 15.0,
            value: 40.0,
        },
    ];
    scenario.simulation = SimulationDef {
        duration_s: 30.0,
        dt_s: 0.1,
    };
    scenario
}

fn seeded() -> RunOptions {
    RunOptions {
        identify: true,
        seed: Some(21),
    }
}

#[test]
fn identifies_plant_and_recommends_gains() {
    let report = run_scenario(&short_scenario(), &seeded()).unwrap();

    assert_eq!(report.trace.len(), 300);
    assert_eq!(report.segments.len(), 2);

    let model = report.identification.model().expect("identified");
    assert!((model.params.kp - 2.0).abs() < 1e-3);
    assert!((model.params.tau - 10.0).abs() < 1e-2);
    assert!((model.params.theta - 2.0).abs() <= 0.05 + 1e-9);

    let tuning = report.tuning.expect("tuning follows identification");
    let p = model.params;
    let zn_kc = 1.2 * p.tau / (p.kp * p.theta);
    assert!((tuning.ziegler_nichols.kp - zn_kc).abs() < 1e-12);
    assert_eq!(report.timing.sim_steps, 300);
    assert_eq!(report.timing.generations, model.generations);
}

#[test]
fn skipped_identification_has_no_tuning() {
    let opts = RunOptions {
        identify: false,
        seed: None,
    };
    let report = run_scenario(&short_scenario(), &opts).unwrap();
    assert_eq!(report.identification, IdentificationOutcome::Skipped);
    assert!(report.tuning.is_none());
    assert!(report.metrics.iae > 0.0);
}

#[test]
fn failed_identification_has_no_tuning() {
    let mut scenario = short_scenario();
    scenario.identification = Some(IdentificationDef {
        max_generations: Some(1),
        ..IdentificationDef::default()
    });
    let report = run_scenario(&scenario, &seeded()).unwrap();
    match &report.identification {
        IdentificationOutcome::Failed { message } => assert!(!message.is_empty()),
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(report.tuning.is_none());
}

#[test]
fn progress_stages_are_reported_in_order() {
    let mut events: Vec<RunProgressEvent> = Vec::new();
    let mut cb = |event: RunProgressEvent| events.push(event);
    run_scenario_with_progress(&short_scenario(), &seeded(), Some(&mut cb)).unwrap();

    let mut stages: Vec<RunStage> = events.iter().map(|e| e.stage).collect();
    stages.dedup();
    assert_eq!(
        stages,
        vec![
            RunStage::CompilingScenario,
            RunStage::Simulating,
            RunStage::Identifying,
            RunStage::Tuning,
            RunStage::Completed,
        ]
    );
    assert!(events.iter().any(|e| e.simulation.is_some()));
    assert!(
        events
            .iter()
            .filter_map(|e| e.identification.as_ref())
            .any(|p| p.generation == 1)
    );
}

#[test]
fn fixed_seed_reproduces_report() {
    let a = run_scenario(&short_scenario(), &seeded()).unwrap();
    let b = run_scenario(&short_scenario(), &seeded()).unwrap();
    assert_eq!(a.identification, b.identification);
    assert_eq!(a.tuning, b.tuning);
}

#[test]
fn report_and_trace_export() {
    let report = run_scenario(
        &short_scenario(),
        &RunOptions {
            identify: false,
            seed: None,
        },
    )
    .unwrap();
    let dir = std::env::temp_dir();

    let json_path = dir.join("lf_app_report.json");
    export::write_report_json(&json_path, &report).unwrap();
    let loaded: RunReport =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(loaded.scenario_name, "Short loop");
    assert_eq!(loaded.trace.len(), report.trace.len());

    let csv_path = dir.join("lf_app_trace.csv");
    export::write_trace_csv(&csv_path, &report.trace).unwrap();
    let csv = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(csv.lines().count(), report.trace.len() + 1);
}

#[test]
fn init_writes_loadable_default() {
    let path = std::env::temp_dir().join("lf_app_init.yaml");
    let _ = std::fs::remove_file(&path);

    let written = init_scenario(&path, false).unwrap();
    assert_eq!(load_scenario(&path).unwrap(), written);
    assert!(init_scenario(&path, false).is_err());
    assert!(init_scenario(&path, true).is_ok());
}

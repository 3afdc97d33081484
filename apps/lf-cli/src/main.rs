use clap::{Parser, Subcommand};
use lf_app::{
    AppResult, IdentificationOutcome, RunOptions, RunProgressEvent, RunReport, export,
    project_service, run_service,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "loopfit")]
#[command(about = "loopfit - PID loop simulation, FOPDT identification and tuning", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a scenario file
    Validate {
        /// Path to the scenario YAML or JSON file
        scenario_path: PathBuf,
    },
    /// Write the reference scenario to a new file
    Init {
        /// Destination path (.yaml or .json)
        scenario_path: PathBuf,
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
    /// Simulate a scenario, identify the plant and print tuning tables
    Run {
        /// Path to the scenario YAML or JSON file
        scenario_path: PathBuf,
        /// Seed for the identification search
        #[arg(long)]
        seed: Option<u64>,
        /// Only simulate; no identification or tuning
        #[arg(long)]
        skip_identify: bool,
        /// Write the full report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
        /// Write the simulated trace as CSV
        #[arg(long)]
        trace_csv: Option<PathBuf>,
    },
}

fn main() -> AppResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { scenario_path } => cmd_validate(&scenario_path),
        Commands::Init {
            scenario_path,
            force,
        } => cmd_init(&scenario_path, force),
        Commands::Run {
            scenario_path,
            seed,
            skip_identify,
            report,
            trace_csv,
        } => cmd_run(
            &scenario_path,
            RunOptions {
                identify: !skip_identify,
                seed,
            },
            report.as_deref(),
            trace_csv.as_deref(),
        ),
    }
}

fn cmd_validate(scenario_path: &Path) -> AppResult<()> {
    let scenario = project_service::validate_scenario(scenario_path)?;
    println!("✓ Scenario is valid: {}", scenario.name);
    println!("  Setpoint changes: {}", scenario.setpoints.len());
    println!(
        "  Grid: {:.3} s over {:.1} s",
        scenario.simulation.dt_s, scenario.simulation.duration_s
    );
    Ok(())
}

fn cmd_init(scenario_path: &Path, force: bool) -> AppResult<()> {
    let scenario = project_service::init_scenario(scenario_path, force)?;
    println!(
        "✓ Wrote scenario '{}' to {}",
        scenario.name,
        scenario_path.display()
    );
    Ok(())
}

fn cmd_run(
    scenario_path: &Path,
    options: RunOptions,
    report_path: Option<&Path>,
    trace_path: Option<&Path>,
) -> AppResult<()> {
    let scenario = project_service::load_scenario(scenario_path)?;
    debug!(path = %scenario_path.display(), "loaded scenario");
    println!("Running scenario: {}", scenario.name);

    let mut last_emit = Instant::now();
    let mut last_stage = None;
    let report = run_service::run_scenario_with_progress(
        &scenario,
        &options,
        Some(&mut |event| {
            let emit_now =
                last_stage != Some(event.stage) || last_emit.elapsed().as_millis() >= 100;
            if emit_now {
                render_cli_progress(&event);
                last_stage = Some(event.stage);
                last_emit = Instant::now();
            }
        }),
    )?;
    clear_progress_line();

    println!("✓ Run completed");
    print_loop_summary(&report);
    print_identification(&report);
    print_timing_summary(&report.timing);

    if let Some(path) = report_path {
        export::write_report_json(path, &report)?;
        println!("  Report written to {}", path.display());
    }
    if let Some(path) = trace_path {
        export::write_trace_csv(path, &report.trace)?;
        println!("  Trace written to {}", path.display());
    }
    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(120));
    let _ = io::stdout().flush();
}

fn progress_bar(fraction: f64) -> String {
    let width = 28usize;
    let filled = ((fraction * width as f64).round() as usize).min(width);
    format!(
        "{}{}",
        "#".repeat(filled),
        "-".repeat(width.saturating_sub(filled))
    )
}

fn render_cli_progress(event: &RunProgressEvent) {
    match (&event.simulation, &event.identification) {
        (Some(s), _) => {
            print!(
                "\r[{}] {:>6.2}%  phase={}  t={:.1}/{:.1}s  step={}  elapsed={:.1}s",
                progress_bar(s.fraction_complete),
                s.fraction_complete * 100.0,
                event.stage.label(),
                s.sim_time_s,
                s.t_end_s,
                s.step,
                event.elapsed_wall_s
            );
        }
        (None, Some(p)) => {
            let fraction = p.generation as f64 / p.max_generations.max(1) as f64;
            print!(
                "\r[{}] gen={}/{}  phase={}  best={:.4e}  spread={:.2}  elapsed={:.1}s",
                progress_bar(fraction),
                p.generation,
                p.max_generations,
                event.stage.label(),
                p.best_cost,
                p.spread_ratio,
                event.elapsed_wall_s
            );
        }
        (None, None) => {
            let spinner = ['|', '/', '-', '\\'];
            let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
            let mut line = format!(
                "\r{} {}  elapsed={:.2}s",
                spinner[spin_idx],
                event.stage.label(),
                event.elapsed_wall_s
            );
            if let Some(msg) = &event.message {
                line.push_str(&format!("  {}", msg));
            }
            print!("{}", line);
        }
    }
    let _ = io::stdout().flush();
}

fn print_loop_summary(report: &RunReport) {
    let m = &report.metrics;
    println!("\nLoop performance:");
    println!("  Samples:           {}", report.trace.len());
    println!("  IAE:               {:.3}", m.iae);
    println!("  COI:               {:.3}", m.coi);
    println!("  Oscillation index: {}", m.oscillation_index);

    if !report.segments.is_empty() {
        println!("\nSetpoint steps:");
        println!(
            "  {:>8}  {:>8}  {:>9}  {:>10}  {:>9}",
            "start_s", "setpoint", "overshoot", "settling_s", "final_err"
        );
        for seg in &report.segments {
            let overshoot = seg
                .overshoot_pct
                .map(|v| format!("{v:.1}%"))
                .unwrap_or_else(|| "-".to_string());
            let settling = seg
                .settling_time
                .map(|v| format!("{v:.1}"))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  {:>8.1}  {:>8.2}  {:>9}  {:>10}  {:>9.3}",
                seg.start_time, seg.setpoint, overshoot, settling, seg.final_error
            );
        }
    }
}

fn print_identification(report: &RunReport) {
    match &report.identification {
        IdentificationOutcome::Skipped => {
            println!("\nIdentification: skipped");
        }
        IdentificationOutcome::Failed { message } => {
            println!("\nIdentification failed: {}", message);
            println!("  No tuning recommendations.");
        }
        IdentificationOutcome::Identified(model) => {
            let p = &model.params;
            println!("\nIdentified FOPDT model:");
            println!("  Kp    = {:.4}", p.kp);
            println!("  tau   = {:.4} s", p.tau);
            println!("  theta = {:.4} s", p.theta);
            print!("  SSE = {:.4e}, RMSE = {:.4e}", model.cost, model.rmse);
            if let Some(r2) = model.r_squared {
                print!(", R² = {:.5}", r2);
            }
            println!();

            match &report.tuning {
                Some(table) => {
                    println!("\nTuning recommendations:");
                    println!("  {:<16}  {:>10}  {:>10}  {:>10}", "rule", "Kp", "Ki", "Kd");
                    for (family, gains) in table.iter() {
                        println!(
                            "  {:<16}  {:>10.4}  {:>10.4}  {:>10.4}",
                            family, gains.kp, gains.ki, gains.kd
                        );
                    }
                }
                None => println!("\nTuning unavailable: identified model is outside the rules' range."),
            }
        }
    }
}

fn print_timing_summary(timing: &run_service::RunTimingSummary) {
    let total = timing.total_time_s.max(1.0e-12);
    println!("\nTiming summary:");
    println!(
        "  Compile:  {:.3}s ({:.1}%)",
        timing.compile_time_s,
        100.0 * timing.compile_time_s / total
    );
    println!(
        "  Simulate: {:.3}s ({:.1}%)",
        timing.simulate_time_s,
        100.0 * timing.simulate_time_s / total
    );
    if timing.identify_time_s > 0.0 {
        println!(
            "  Identify: {:.3}s ({:.1}%)",
            timing.identify_time_s,
            100.0 * timing.identify_time_s / total
        );
        println!(
            "  Generations: {}  Evaluations: {}",
            timing.generations, timing.evaluations
        );
    }
    println!("  Total:    {:.3}s", timing.total_time_s);
}

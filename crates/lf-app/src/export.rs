//! Report and trace export.

use std::path::Path;

use lf_sim::SimTrace;

use crate::error::{AppError, AppResult};
use crate::run_service::RunReport;

/// Trace as CSV with a `time_s,setpoint,measured,control` header.
pub fn trace_csv(trace: &SimTrace) -> String {
    let mut csv = String::from("time_s,setpoint,measured,control\n");
    for rec in trace.records() {
        csv.push_str(&format!(
            "{},{},{},{}\n",
            rec.time, rec.setpoint, rec.measured, rec.control
        ));
    }
    csv
}

pub fn write_trace_csv(path: &Path, trace: &SimTrace) -> AppResult<()> {
    write(path, trace_csv(trace))
}

pub fn report_json(report: &RunReport) -> AppResult<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

pub fn write_report_json(path: &Path, report: &RunReport) -> AppResult<()> {
    write(path, report_json(report)?)
}

fn write(path: &Path, content: String) -> AppResult<()> {
    std::fs::write(path, content).map_err(|e| AppError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

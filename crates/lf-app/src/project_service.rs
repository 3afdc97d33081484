//! Scenario loading, saving and validation.

use std::path::Path;

use lf_project::Scenario;

use crate::error::{AppError, AppResult};

/// Load a scenario file (YAML, or JSON by extension). The result is validated.
pub fn load_scenario(path: &Path) -> AppResult<Scenario> {
    Ok(lf_project::load(path)?)
}

pub fn save_scenario(path: &Path, scenario: &Scenario) -> AppResult<()> {
    Ok(lf_project::save(path, scenario)?)
}

/// Load and validate without running anything.
pub fn validate_scenario(path: &Path) -> AppResult<Scenario> {
    let scenario = load_scenario(path)?;
    crate::scenario_compile::compile_scenario(&scenario)?;
    Ok(scenario)
}

/// Write the built-in reference scenario to `path`.
///
/// Refuses to replace an existing file unless `overwrite` is set.
pub fn init_scenario(path: &Path, overwrite: bool) -> AppResult<Scenario> {
    if path.exists() && !overwrite {
        return Err(AppError::FileWrite {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::AlreadyExists, "file already exists"),
        });
    }
    let scenario = lf_project::default_scenario();
    save_scenario(path, &scenario)?;
    Ok(scenario)
}

//! Writing rendered plans to disk.

use crate::config::ExportConfig;
use crate::error::{AdvisorError, AdvisorResult};
use crate::render::DietPlan;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// File name for a plan generated at `generated_at`: `<prefix>_YYYYmmddHHMMSS.txt`.
#[must_use]
pub fn export_file_name(prefix: &str, generated_at: DateTime<Utc>) -> String {
    format!("{prefix}_{}.txt", generated_at.format("%Y%m%d%H%M%S"))
}

/// Write the plan text into `directory`, creating it if needed.
///
/// Returns the path written.
pub fn export_plan(plan: &DietPlan, directory: &Path, prefix: &str) -> AdvisorResult<PathBuf> {
    std::fs::create_dir_all(directory).map_err(|source| AdvisorError::Export {
        path: directory.to_path_buf(),
        source,
    })?;

    let path = directory.join(export_file_name(prefix, plan.generated_at));
    std::fs::write(&path, &plan.text).map_err(|source| AdvisorError::Export {
        path: path.clone(),
        source,
    })?;

    tracing::info!("Exported plan to {}", path.display());
    Ok(path)
}

/// [`export_plan`] using the configured directory, or `override_dir` when given.
pub fn export_with_config(
    plan: &DietPlan,
    config: &ExportConfig,
    override_dir: Option<&Path>,
) -> AdvisorResult<PathBuf> {
    let directory = override_dir.unwrap_or(config.directory.as_path());
    export_plan(plan, directory, &config.file_prefix)
}

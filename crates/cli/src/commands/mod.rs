//! Command implementations.

mod info;
mod run;
mod validate;

pub use info::run_info;
pub use run::run_batch;
pub use validate::run_validate;

use std::path::Path;

use anyhow::{Context, Result};
use contracts::AnalysisConfig;

use crate::error::CliError;

/// Load a configuration file, failing early on a missing path
fn load_config(path: &Path) -> Result<AnalysisConfig> {
    if !path.exists() {
        return Err(CliError::config_not_found(path).into());
    }
    config_loader::ConfigLoader::load_from_path(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}

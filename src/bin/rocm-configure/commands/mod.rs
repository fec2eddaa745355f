//! Command implementations

pub mod completions;
pub mod configure;
pub mod probe;

use std::path::PathBuf;

use anyhow::{Context, Result};

use rocm_configure::util::config::{global_config_path, load_config, project_config_path};
use rocm_configure::util::Config;

/// Working directory and the configuration that applies to it.
pub fn load_project_config() -> Result<(PathBuf, Config)> {
    let cwd = std::env::current_dir().context("failed to get current directory")?;
    let config = load_config(global_config_path().as_deref(), &project_config_path(&cwd));
    Ok((cwd, config))
}

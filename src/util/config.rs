//! Configuration file support.
//!
//! Two optional locations are consulted:
//! - Global: `~/.rocm-configure/config.toml` - user-wide defaults
//! - Project: `.rocm-configure/config.toml` - project-specific overrides
//!
//! Project config takes precedence over global config. Environment
//! variables and CLI flags take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::fs::read_to_string;

/// Default ROCm install root.
pub const DEFAULT_ROCM_PATH: &str = "/opt/rocm";

/// Default host compiler name, searched on PATH.
pub const DEFAULT_HOST_COMPILER: &str = "gcc";

/// Default linker binary prefix.
pub const DEFAULT_HOST_COMPILER_PREFIX: &str = "/usr/bin";

/// Default discovery helper program.
pub const DEFAULT_DISCOVERY_HELPER: &str = "find_rocm_config";

/// rocm-configure configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Probe settings
    pub probe: ProbeConfig,

    /// Output settings
    pub output: OutputConfig,
}

/// Settings for the toolchain prober.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Discovery helper argv (e.g. `["python3", "find_rocm_config.py"]`)
    pub discovery_helper: Vec<String>,

    /// ROCm root used when ROCM_PATH is unset
    pub default_rocm_path: Option<PathBuf>,

    /// Compiler used when GCC_HOST_COMPILER_PATH is unset
    pub default_host_compiler: Option<String>,
}

/// Settings for generated output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output root for generated files
    pub dir: Option<PathBuf>,

    /// Make the generated compiler wrapper echo every command it runs
    #[serde(default)]
    pub verbose_wrapper: bool,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = read_to_string(path)?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if !other.probe.discovery_helper.is_empty() {
            self.probe.discovery_helper = other.probe.discovery_helper;
        }
        if other.probe.default_rocm_path.is_some() {
            self.probe.default_rocm_path = other.probe.default_rocm_path;
        }
        if other.probe.default_host_compiler.is_some() {
            self.probe.default_host_compiler = other.probe.default_host_compiler;
        }

        if other.output.dir.is_some() {
            self.output.dir = other.output.dir;
        }
        if other.output.verbose_wrapper {
            self.output.verbose_wrapper = true;
        }
    }

    /// Discovery helper argv, falling back to the default program.
    pub fn discovery_helper(&self) -> Vec<String> {
        if self.probe.discovery_helper.is_empty() {
            vec![DEFAULT_DISCOVERY_HELPER.to_string()]
        } else {
            self.probe.discovery_helper.clone()
        }
    }

    /// ROCm root used when ROCM_PATH is unset.
    pub fn default_rocm_path(&self) -> PathBuf {
        self.probe
            .default_rocm_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ROCM_PATH))
    }

    /// Compiler used when GCC_HOST_COMPILER_PATH is unset.
    pub fn default_host_compiler(&self) -> String {
        self.probe
            .default_host_compiler
            .clone()
            .unwrap_or_else(|| DEFAULT_HOST_COMPILER.to_string())
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.rocm-configure/config.toml)
/// 2. Global config (~/.rocm-configure/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global) = global_path {
        config.merge(Config::load_or_default(global));
    }

    config.merge(Config::load_or_default(project_path));

    config
}

/// Get the global config directory (~/.rocm-configure).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".rocm-configure"))
}

/// Get the global config path (~/.rocm-configure/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.rocm-configure/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".rocm-configure").join("config.toml")
}

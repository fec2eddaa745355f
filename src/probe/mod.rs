//! Toolchain probing.
//!
//! Turns the host environment into a [`ToolchainFacts`] or fails on the
//! first problem. Steps run strictly in order:
//!
//! 1. locate the host compiler and its builtin include directories
//! 2. run the discovery helper for the toolkit root and versions
//! 3. enumerate AMDGPU targets
//! 4. resolve the required libraries

pub mod compiler;
pub mod discovery;
pub mod env;
pub mod facts;
pub mod libraries;
pub mod targets;

use std::path::{Path, PathBuf};

use crate::errors::{ConfigResult, ConfigurationError};
use crate::util::config::{Config, DEFAULT_HOST_COMPILER_PREFIX};
use crate::util::host::Host;
use crate::util::process::{ProcessBuilder, ProcessOutput};

pub use facts::{ToolchainFacts, VersionInfo};
pub use libraries::{resolve_first_existing, ResolvedLibrary};
pub use targets::GpuTarget;

/// Knobs for a probe run that do not come from the environment.
#[derive(Debug, Clone)]
pub struct ProbeOptions {
    /// Discovery helper argv.
    pub discovery_helper: Vec<String>,
    /// ROCm root used when `ROCM_PATH` is unset.
    pub default_rocm_path: PathBuf,
    /// Compiler used when `GCC_HOST_COMPILER_PATH` is unset.
    pub default_host_compiler: String,
    /// CPU architecture for `lib/<arch>-linux-gnu` lookups.
    pub host_arch: String,
}

impl ProbeOptions {
    /// Options from merged configuration files.
    pub fn from_config(config: &Config) -> Self {
        ProbeOptions {
            discovery_helper: config.discovery_helper(),
            default_rocm_path: config.default_rocm_path(),
            default_host_compiler: config.default_host_compiler(),
            host_arch: std::env::consts::ARCH.to_string(),
        }
    }
}

impl Default for ProbeOptions {
    fn default() -> Self {
        ProbeOptions::from_config(&Config::default())
    }
}

/// Run a command and require exit status 0.
///
/// Failures carry the diagnostic stream chosen by
/// [`ProcessOutput::diagnostic`].
pub(crate) fn run_checked(host: &dyn Host, cmd: &ProcessBuilder) -> ConfigResult<ProcessOutput> {
    let output = host
        .execute(cmd)
        .map_err(|e| ConfigurationError::CommandSpawn {
            command: cmd.display_command(),
            message: format!("{:#}", e),
        })?;

    if !output.is_success() {
        return Err(ConfigurationError::CommandFailed {
            command: cmd.display_command(),
            code: output.code,
            output: output.diagnostic().trim_end().to_string(),
        });
    }

    Ok(output)
}

/// ROCm include directories that exist under `toolkit_path`.
fn toolkit_include_dirs(host: &dyn Host, toolkit_path: &Path) -> Vec<PathBuf> {
    let candidates = vec![
        toolkit_path.join("include"),
        toolkit_path.join("hip").join("include"),
        toolkit_path.join("llvm").join("include"),
    ];
    let exists = host.exists_all(&candidates);
    candidates
        .into_iter()
        .zip(exists)
        .filter_map(|(dir, exists)| exists.then_some(dir))
        .collect()
}

/// Probe the host and describe its ROCm toolchain.
pub fn probe_toolchain(host: &dyn Host, opts: &ProbeOptions) -> ConfigResult<ToolchainFacts> {
    let host_compiler = compiler::find_host_compiler(host, &opts.default_host_compiler)?;
    let compiler_include_dirs = compiler::discover_include_dirs(host, &host_compiler);
    tracing::debug!(
        "{} builtin include dirs from {}",
        compiler_include_dirs.len(),
        host_compiler.display()
    );

    let host_compiler_prefix = env::non_empty_var(host, env::GCC_HOST_COMPILER_PREFIX)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_HOST_COMPILER_PREFIX));

    let requested = env::requested_rocm_path(host, &opts.default_rocm_path);
    let discovered = discovery::run_discovery_helper(host, &opts.discovery_helper, &requested)?;
    let toolkit_path = discovered.toolkit_path;

    let gpu_targets = targets::enumerate_gpu_targets(host, &toolkit_path)?;
    tracing::info!(
        "AMDGPU targets: {}",
        gpu_targets
            .iter()
            .map(GpuTarget::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    );

    let requests = libraries::required_libraries(&discovered.versions.rocm);
    let resolved_libraries =
        libraries::resolve_libraries(host, &toolkit_path, &requests, &opts.host_arch)?;

    let toolkit_include_dirs = toolkit_include_dirs(host, &toolkit_path);

    Ok(ToolchainFacts {
        toolkit_path,
        gpu_targets,
        version_info: discovered.versions,
        resolved_libraries,
        compiler_include_dirs,
        toolkit_include_dirs,
        host_compiler,
        host_compiler_prefix,
    })
}

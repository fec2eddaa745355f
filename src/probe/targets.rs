//! AMDGPU target enumeration and validation.

use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::errors::{ConfigResult, ConfigurationError};
use crate::util::host::Host;
use crate::util::process::ProcessBuilder;

use super::env::{non_empty_var, TF_ROCM_AMDGPU_TARGETS};
use super::run_checked;

/// Every AMDGPU target identifier starts with this.
pub const GPU_TARGET_PREFIX: &str = "gfx";

/// What `rocm_agent_enumerator` prints for the CPU agent / no GPU.
pub const NO_GPU_PLACEHOLDER: &str = "gfx000";

/// A validated AMDGPU target such as `gfx90a`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct GpuTarget(String);

impl GpuTarget {
    /// Validate a target identifier.
    pub fn parse(s: &str) -> ConfigResult<Self> {
        if s.starts_with(GPU_TARGET_PREFIX) {
            Ok(GpuTarget(s.to_string()))
        } else {
            Err(ConfigurationError::InvalidGpuTarget {
                target: s.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compiler flag selecting this target.
    pub fn offload_arch_flag(&self) -> String {
        format!("--offload-arch={}", self.0)
    }
}

impl fmt::Display for GpuTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Split `raw` on `sep`, trimming and dropping empty pieces.
fn split_targets(raw: &str, sep: char) -> impl Iterator<Item = &str> {
    raw.split(sep).map(str::trim).filter(|s| !s.is_empty())
}

/// Validate in order, failing on the first bad entry.
///
/// Repeats are dropped (the enumerator lists one line per device).
pub fn validate_targets<'a>(
    candidates: impl IntoIterator<Item = &'a str>,
) -> ConfigResult<Vec<GpuTarget>> {
    let mut targets: Vec<GpuTarget> = Vec::new();
    for candidate in candidates {
        let target = GpuTarget::parse(candidate)?;
        if !targets.contains(&target) {
            targets.push(target);
        }
    }

    if targets.is_empty() {
        return Err(ConfigurationError::NoGpuTargets);
    }
    Ok(targets)
}

/// Path of the enumeration helper inside a ROCm install.
pub fn enumerator_path(toolkit_path: &Path) -> std::path::PathBuf {
    toolkit_path.join("bin").join("rocm_agent_enumerator")
}

/// Determine the AMDGPU targets to build for.
///
/// `TF_ROCM_AMDGPU_TARGETS` takes precedence and runs nothing; otherwise
/// `rocm_agent_enumerator` from the toolkit is asked.
pub fn enumerate_gpu_targets(host: &dyn Host, toolkit_path: &Path) -> ConfigResult<Vec<GpuTarget>> {
    if let Some(list) = non_empty_var(host, TF_ROCM_AMDGPU_TARGETS) {
        tracing::debug!("AMDGPU targets from {}: {}", TF_ROCM_AMDGPU_TARGETS, list);
        return validate_targets(split_targets(&list, ','));
    }

    let cmd = ProcessBuilder::new(enumerator_path(toolkit_path));
    let output = run_checked(host, &cmd)?;

    validate_targets(
        split_targets(&output.stdout, '\n').filter(|t| *t != NO_GPU_PLACEHOLDER),
    )
}

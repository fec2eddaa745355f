//! Environment variables read by the prober.

use std::path::PathBuf;

use crate::util::host::Host;

/// Gates the whole run; must be `1`.
pub const TF_NEED_ROCM: &str = "TF_NEED_ROCM";

/// Host compiler override (path or bare name).
pub const GCC_HOST_COMPILER_PATH: &str = "GCC_HOST_COMPILER_PATH";

/// Linker binary prefix embedded in the toolchain description.
pub const GCC_HOST_COMPILER_PREFIX: &str = "GCC_HOST_COMPILER_PREFIX";

/// ROCm install root handed to the discovery helper.
pub const ROCM_PATH: &str = "ROCM_PATH";

/// Comma-separated AMDGPU targets overriding enumeration.
pub const TF_ROCM_AMDGPU_TARGETS: &str = "TF_ROCM_AMDGPU_TARGETS";

/// Read a variable, treating blank values as unset.
pub fn non_empty_var(host: &dyn Host, key: &str) -> Option<String> {
    host.env_var(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Whether ROCm configuration is requested.
pub fn rocm_enabled(host: &dyn Host) -> bool {
    host.env_var(TF_NEED_ROCM)
        .is_some_and(|v| v.trim() == "1")
}

/// ROCm root to probe: `ROCM_PATH` or the configured default.
pub fn requested_rocm_path(host: &dyn Host, default: &PathBuf) -> PathBuf {
    non_empty_var(host, ROCM_PATH)
        .map(PathBuf::from)
        .unwrap_or_else(|| default.clone())
}

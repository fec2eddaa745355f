//! The probed description of a ROCm toolchain.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use super::libraries::ResolvedLibrary;
use super::targets::GpuTarget;

/// Version numbers reported by the discovery helper, in its encoding
/// (`60200` for ROCm 6.2.0).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionInfo {
    /// Toolkit version
    pub rocm: String,
    /// MIOpen (math library) version
    pub miopen: String,
    /// HIP runtime version
    pub hipruntime: String,
}

impl VersionInfo {
    /// Component name to version, in a fixed order.
    pub fn entries(&self) -> [(&'static str, &str); 3] {
        [
            ("rocm", self.rocm.as_str()),
            ("miopen", self.miopen.as_str()),
            ("hipruntime", self.hipruntime.as_str()),
        ]
    }
}

/// Everything learned about the host toolchain in one configuration run.
///
/// Built once by [`probe_toolchain`](super::probe_toolchain) and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolchainFacts {
    pub toolkit_path: PathBuf,
    pub gpu_targets: Vec<GpuTarget>,
    pub version_info: VersionInfo,
    pub resolved_libraries: BTreeMap<String, ResolvedLibrary>,
    /// Host compiler builtin include dirs, C++ first.
    pub compiler_include_dirs: Vec<PathBuf>,
    /// ROCm include dirs present in this install.
    pub toolkit_include_dirs: Vec<PathBuf>,
    pub host_compiler: PathBuf,
    pub host_compiler_prefix: PathBuf,
}

impl ToolchainFacts {
    /// Targets as a comma-separated list.
    pub fn gpu_target_list(&self) -> String {
        self.gpu_targets
            .iter()
            .map(GpuTarget::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Every directory the toolchain treats as a builtin include path.
    pub fn builtin_include_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = self.compiler_include_dirs.clone();
        for dir in &self.toolkit_include_dirs {
            if !dirs.contains(dir) {
                dirs.push(dir.clone());
            }
        }
        dirs
    }

    /// `hipcc` inside the toolkit.
    pub fn hipcc_path(&self) -> PathBuf {
        self.toolkit_path.join("bin").join("hipcc")
    }
}

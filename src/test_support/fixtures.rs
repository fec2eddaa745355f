//! Test fixtures for common test scenarios.
//!
//! [`RocmFixture`] describes a complete ROCm 6.2 install with a GCC host
//! compiler and two GPUs, and turns it into a scripted [`MockHost`].

use std::path::PathBuf;

use crate::probe::env::TF_NEED_ROCM;
use crate::probe::libraries::REQUIRED_LIBRARIES;
use crate::probe::{probe_toolchain, ProbeOptions, ToolchainFacts};
use crate::util::process::ProcessOutput;

use super::MockHost;

/// Where the fixture's ROCm install lives.
pub const FIXTURE_TOOLKIT: &str = "/opt/rocm-6.2.0";

const CXX_SEARCH_LIST: &str = "\
Using built-in specs.
#include \"...\" search starts here:
#include <...> search starts here:
 /usr/include/c++/11
 /usr/lib/gcc/x86_64-linux-gnu/11/include
 /usr/include
End of search list.
";

const C_SEARCH_LIST: &str = "\
Using built-in specs.
#include <...> search starts here:
 /usr/lib/gcc/x86_64-linux-gnu/11/include
 /usr/include
End of search list.
";

/// Fixture for a ROCm installation.
#[derive(Debug, Clone)]
pub struct RocmFixture {
    /// Whether TF_NEED_ROCM=1 is set.
    pub enabled: bool,
    /// Libraries present under `<toolkit>/lib`.
    pub libraries: Vec<String>,
    /// Raw `rocm_agent_enumerator` output.
    pub enumerator_output: String,
}

impl Default for RocmFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl RocmFixture {
    /// A complete, enabled install.
    pub fn new() -> Self {
        RocmFixture {
            enabled: true,
            libraries: REQUIRED_LIBRARIES.iter().map(|s| s.to_string()).collect(),
            enumerator_output: "gfx000\ngfx90a\ngfx1100\n".to_string(),
        }
    }

    /// Leave TF_NEED_ROCM unset.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Remove one library from the install.
    pub fn without_library(mut self, name: &str) -> Self {
        self.libraries.retain(|l| l != name);
        self
    }

    /// Replace the enumerator output.
    pub fn with_enumerator_output(mut self, output: impl Into<String>) -> Self {
        self.enumerator_output = output.into();
        self
    }

    /// Probe options matching the scripted host.
    pub fn probe_options(&self) -> ProbeOptions {
        ProbeOptions {
            discovery_helper: vec!["find_rocm_config".to_string()],
            default_rocm_path: PathBuf::from("/opt/rocm"),
            default_host_compiler: "gcc".to_string(),
            host_arch: "x86_64".to_string(),
        }
    }

    /// Build the scripted host.
    pub fn host(&self) -> MockHost {
        let toolkit = PathBuf::from(FIXTURE_TOOLKIT);

        let mut host = MockHost::new()
            .with_program("gcc", "/usr/bin/gcc")
            .with_symlink("/opt/rocm", FIXTURE_TOOLKIT)
            .with_file(toolkit.join("include").join("hip").join("hip_runtime.h"))
            .with_file(toolkit.join("bin").join("hipcc"))
            .with_file(toolkit.join("bin").join("rocm_agent_enumerator"))
            .with_file(toolkit.join("llvm").join("bin").join("clang-offload-bundler"));

        if self.enabled {
            host = host.with_env(TF_NEED_ROCM, "1");
        }

        for name in &self.libraries {
            let lib = toolkit.join("lib");
            if name == "amdhip64" {
                host = host.with_symlink(
                    lib.join("libamdhip64.so"),
                    lib.join("libamdhip64.so.6.2.41134"),
                );
            } else {
                host = host.with_file(lib.join(format!("lib{}.so", name)));
            }
        }

        host.expect(
            "/usr/bin/gcc -x c++ -E -v -",
            ProcessOutput::with_output(0, "", CXX_SEARCH_LIST),
        );
        host.expect(
            "/usr/bin/gcc -x c -E -v -",
            ProcessOutput::with_output(0, "", C_SEARCH_LIST),
        );
        host.expect(
            "find_rocm_config",
            ProcessOutput::success(format!(
                "rocm_toolkit_path: {}\n\
                 rocm_version_number: 60200\n\
                 miopen_version_number: 30200\n\
                 hipruntime_version_number: 60241134\n",
                FIXTURE_TOOLKIT
            )),
        );
        host.expect(
            &format!("{}/bin/rocm_agent_enumerator", FIXTURE_TOOLKIT),
            ProcessOutput::success(self.enumerator_output.clone()),
        );

        host
    }

    /// Facts probed from a fresh scripted host.
    pub fn facts(&self) -> ToolchainFacts {
        probe_toolchain(&self.host(), &self.probe_options()).expect("fixture probe")
    }
}

//! rocm-configure - ROCm toolchain discovery for Bazel
//!
//! This crate probes a host for a ROCm installation (host compiler,
//! toolkit root and versions, AMDGPU targets, required libraries) and
//! renders the files of a Bazel repository that builds against it.

pub mod errors;
pub mod ops;
pub mod probe;
pub mod render;
pub mod util;

/// Test utilities and mocks for rocm-configure unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a scripted [`Host`](util::host::Host)
/// implementation and a complete ROCm fixture.
#[cfg(test)]
pub mod test_support;

pub use errors::{ConfigResult, ConfigurationError};
pub use ops::{configure, ConfigureOptions, ConfigureOutcome};
pub use probe::{probe_toolchain, ProbeOptions, ToolchainFacts};
pub use render::{render_all, write_outputs, RenderOptions, RenderOutput};
pub use util::host::{Host, SystemHost};

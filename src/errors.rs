//! Configuration error types and diagnostics.

use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::util::diagnostic::Diagnostic;

/// Result alias for the probing and rendering pipeline.
pub type ConfigResult<T> = std::result::Result<T, ConfigurationError>;

/// Any failure that aborts a configuration run.
///
/// Every variant is fatal; the only lenient path (compiler include-dir
/// parsing) never produces one of these.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum ConfigurationError {
    #[error("cannot find host compiler `{name}`")]
    #[diagnostic(
        code(rocm_configure::probe::compiler_not_found),
        help("Set GCC_HOST_COMPILER_PATH to the C/C++ compiler to use")
    )]
    CompilerNotFound { name: String },

    #[error("failed to run `{command}`: {message}")]
    #[diagnostic(code(rocm_configure::process::spawn))]
    CommandSpawn { command: String, message: String },

    #[error("`{command}` failed with exit code {code:?}\n{output}")]
    #[diagnostic(code(rocm_configure::process::failed))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        output: String,
    },

    #[error("ROCm discovery helper did not report `{key}`")]
    #[diagnostic(code(rocm_configure::probe::helper_output))]
    MissingHelperKey { key: String, reported: Vec<String> },

    #[error("ROCm discovery helper reported malformed `{key}`: `{value}`")]
    #[diagnostic(code(rocm_configure::probe::helper_value))]
    MalformedHelperValue { key: String, value: String },

    #[error("failed to render `{template}`: {message}")]
    #[diagnostic(code(rocm_configure::render::fragment))]
    Render { template: String, message: String },

    #[error("invalid AMDGPU target `{target}`")]
    #[diagnostic(
        code(rocm_configure::probe::invalid_target),
        help("AMDGPU targets look like `gfx906` or `gfx90a`")
    )]
    InvalidGpuTarget { target: String },

    #[error("no AMDGPU targets detected")]
    #[diagnostic(
        code(rocm_configure::probe::no_targets),
        help("Set TF_ROCM_AMDGPU_TARGETS, e.g. TF_ROCM_AMDGPU_TARGETS=gfx906,gfx90a")
    )]
    NoGpuTargets,

    #[error("cannot find ROCm library `{name}`")]
    #[diagnostic(code(rocm_configure::probe::missing_library))]
    MissingLibrary { name: String, searched: Vec<PathBuf> },

    #[error("cannot resolve real path of `{}`: {message}", path.display())]
    #[diagnostic(code(rocm_configure::probe::realpath))]
    Realpath { path: PathBuf, message: String },

    #[error(
        "template `{template}` is missing substitutions for: {}",
        missing.join(", ")
    )]
    #[diagnostic(code(rocm_configure::render::missing_placeholders))]
    MissingPlaceholders {
        template: String,
        missing: Vec<String>,
        supplied: Vec<String>,
    },

    #[error("failed to write `{}`: {message}", path.display())]
    #[diagnostic(code(rocm_configure::render::write))]
    Write { path: PathBuf, message: String },
}

impl ConfigurationError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ConfigurationError::CompilerNotFound { name } => {
                Diagnostic::error(format!("cannot find host compiler `{}`", name))
                    .with_context("searched GCC_HOST_COMPILER_PATH and PATH")
                    .with_suggestion("Set GCC_HOST_COMPILER_PATH to an absolute compiler path")
                    .with_suggestion("Install gcc or add it to PATH")
            }

            ConfigurationError::CommandSpawn { command, message } => {
                Diagnostic::error(format!("failed to run `{}`", command)).with_context(message)
            }

            ConfigurationError::CommandFailed {
                command,
                code,
                output,
            } => {
                let mut diag = Diagnostic::error(format!(
                    "`{}` failed with exit code {}",
                    command,
                    code.map_or_else(|| "none".to_string(), |c| c.to_string())
                ));
                for line in output.lines().filter(|l| !l.trim().is_empty()) {
                    diag = diag.with_context(line);
                }
                diag
            }

            ConfigurationError::MissingHelperKey { key, reported } => {
                let mut diag = Diagnostic::error(format!(
                    "ROCm discovery helper did not report `{}`",
                    key
                ));
                if !reported.is_empty() {
                    diag = diag.with_context(format!("reported keys: {}", reported.join(", ")));
                }
                diag.with_suggestion("Check that ROCM_PATH points at a complete ROCm install")
            }

            ConfigurationError::MalformedHelperValue { key, value } => {
                let detail = if value.is_empty() {
                    format!("`{}` was reported with an empty value", key)
                } else {
                    format!("`{}` was reported as `{}`", key, value)
                };
                Diagnostic::error(format!(
                    "ROCm discovery helper reported malformed `{}`",
                    key
                ))
                .with_context(detail)
                .with_context("paths must be non-empty; version numbers are decimal digits (60200 for 6.2.0)")
                .with_suggestion("Check that ROCM_PATH points at a complete ROCm install")
            }

            ConfigurationError::Render { template, message } => {
                Diagnostic::error(format!("failed to render `{}`", template)).with_context(message)
            }

            ConfigurationError::InvalidGpuTarget { target } => {
                Diagnostic::error(format!("invalid AMDGPU target `{}`", target))
                    .with_context("every target must start with `gfx`")
                    .with_suggestion("Fix TF_ROCM_AMDGPU_TARGETS, e.g. `gfx906,gfx90a`")
            }

            ConfigurationError::NoGpuTargets => Diagnostic::error("no AMDGPU targets detected")
                .with_context("rocm_agent_enumerator reported no GPU")
                .with_suggestion("Set TF_ROCM_AMDGPU_TARGETS to the architectures to build for"),

            ConfigurationError::MissingLibrary { name, searched } => {
                let mut diag = Diagnostic::error(format!("cannot find ROCm library `{}`", name));
                for path in searched {
                    diag = diag.with_context(format!("not found: {}", path.display()));
                }
                diag.with_suggestion("Install the ROCm package providing this library")
                    .with_suggestion("Set ROCM_PATH if ROCm lives outside /opt/rocm")
            }

            ConfigurationError::Realpath { path, message } => {
                Diagnostic::error(format!("cannot resolve real path of `{}`", path.display()))
                    .with_context(message)
            }

            ConfigurationError::MissingPlaceholders {
                template,
                missing,
                supplied,
            } => Diagnostic::error(format!(
                "template `{}` is missing substitutions",
                template
            ))
            .with_context(format!("missing: {}", missing.join(", ")))
            .with_context(format!("supplied: {}", supplied.join(", "))),

            ConfigurationError::Write { path, message } => {
                Diagnostic::error(format!("failed to write `{}`", path.display()))
                    .with_location(path)
                    .with_context(message)
                    .with_context("files written earlier in this run were removed")
            }
        }
    }
}

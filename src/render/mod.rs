//! Rendering of the generated Bazel repository.
//!
//! [`render_all`] is pure: it turns [`ToolchainFacts`] into file contents
//! and copy declarations. [`write_outputs`] is the only step that touches
//! the host.

pub mod copy_rules;
mod fragments;
pub mod substitutions;
pub mod template;

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::errors::{ConfigResult, ConfigurationError};
use crate::probe::ToolchainFacts;
use crate::util::host::Host;

pub use copy_rules::{CopyKind, CopyRule};
pub use template::{Substitutions, Template};

pub const CROSSTOOL_BUILD: &str = "crosstool/BUILD";
pub const CROSSTOOL_WRAPPER: &str = "crosstool/clang/bin/crosstool_wrapper_driver_rocm";
pub const ROCM_CONFIG_HEADER: &str = "rocm/rocm/rocm_config.h";
pub const ROCM_BUILD: &str = "rocm/BUILD";
pub const BUILD_DEFS: &str = "rocm/build_defs.bzl";
pub const BAZELRC: &str = ".rocm.bazelrc";

pub const CROSSTOOL_BUILD_TEMPLATE: Template =
    Template::new(CROSSTOOL_BUILD, include_str!("templates/crosstool_BUILD.tpl"));
pub const CROSSTOOL_WRAPPER_TEMPLATE: Template = Template::new(
    CROSSTOOL_WRAPPER,
    include_str!("templates/crosstool_wrapper_driver_rocm.tpl"),
);
pub const ROCM_CONFIG_HEADER_TEMPLATE: Template =
    Template::new(ROCM_CONFIG_HEADER, include_str!("templates/rocm_config.h.tpl"));
pub const ROCM_BUILD_TEMPLATE: Template =
    Template::new(ROCM_BUILD, include_str!("templates/rocm_BUILD.tpl"));
pub const BUILD_DEFS_TEMPLATE: Template =
    Template::new(BUILD_DEFS, include_str!("templates/build_defs.bzl.tpl"));
pub const BAZELRC_TEMPLATE: Template =
    Template::new(BAZELRC, include_str!("templates/rocm.bazelrc.tpl"));

/// Rendering knobs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Make the compiler wrapper echo every command.
    pub verbose_wrapper: bool,
}

/// A file ready to write, with a path relative to the output root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedFile {
    pub path: &'static str,
    #[serde(skip)]
    pub contents: String,
    pub executable: bool,
}

/// Everything one configuration run produces.
#[derive(Debug, Clone, Serialize)]
pub struct RenderOutput {
    pub files: Vec<GeneratedFile>,
    pub copy_rules: Vec<CopyRule>,
}

/// Render every output file.
///
/// Each template is checked against its substitutions before anything is
/// returned, so a missing placeholder fails the run with nothing written.
pub fn render_all(facts: &ToolchainFacts, opts: &RenderOptions) -> ConfigResult<RenderOutput> {
    let copy_rules = copy_rules::copy_rules(facts);

    let plan = [
        (
            CROSSTOOL_BUILD_TEMPLATE,
            substitutions::crosstool_build(facts),
            false,
        ),
        (
            CROSSTOOL_WRAPPER_TEMPLATE,
            substitutions::crosstool_wrapper(facts, opts.verbose_wrapper),
            true,
        ),
        (
            ROCM_CONFIG_HEADER_TEMPLATE,
            substitutions::rocm_config_header(facts),
            false,
        ),
        (
            ROCM_BUILD_TEMPLATE,
            substitutions::rocm_build(facts, &copy_rules)?,
            false,
        ),
        (BUILD_DEFS_TEMPLATE, substitutions::build_defs(facts), false),
        (BAZELRC_TEMPLATE, substitutions::bazelrc(facts), false),
    ];

    let mut files = Vec::with_capacity(plan.len());
    for (template, subs, executable) in &plan {
        let contents = template.render(subs)?;
        tracing::debug!("rendered {}", template.name);
        files.push(GeneratedFile {
            path: template.name,
            contents,
            executable: *executable,
        });
    }

    Ok(RenderOutput { files, copy_rules })
}

/// Write rendered files under `root`. Returns the absolute paths written.
///
/// If any write fails, files already written by this call are removed
/// before the error is returned. Directories created along the way stay.
pub fn write_outputs(
    host: &dyn Host,
    root: &Path,
    output: &RenderOutput,
) -> ConfigResult<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(output.files.len());

    for file in &output.files {
        let path = root.join(file.path);
        if let Err(e) = host.write_file(&path, &file.contents, file.executable) {
            remove_written(host, &written);
            return Err(ConfigurationError::Write {
                path,
                message: format!("{:#}", e),
            });
        }
        tracing::debug!("wrote {}", path.display());
        written.push(path);
    }

    Ok(written)
}

fn remove_written(host: &dyn Host, written: &[PathBuf]) {
    for path in written.iter().rev() {
        match host.remove_file(path) {
            Ok(()) => tracing::debug!("removed {}", path.display()),
            Err(e) => tracing::warn!("could not remove {}: {:#}", path.display(), e),
        }
    }
}

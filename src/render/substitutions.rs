//! Substitution maps for each generated file.

use std::path::Path;

use serde::Serialize;

use crate::errors::ConfigResult;
use crate::probe::ToolchainFacts;

use super::copy_rules::{render_copy_rules, CopyRule};
use super::fragments::{escape_starlark_string, render_fragment, ROCM_LIBRARIES_FRAGMENT};
use super::template::Substitutions;

/// Quote `s` as a Starlark string literal.
pub fn starlark_string(s: &str) -> String {
    format!("\"{}\"", escape_starlark_string(s))
}

/// Starlark list literal of strings, on one line.
pub fn starlark_list<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let items: Vec<String> = items
        .into_iter()
        .map(|s| starlark_string(s.as_ref()))
        .collect();
    format!("[{}]", items.join(", "))
}

/// Body of a single-quoted shell word.
pub fn shell_single_quoted(s: &str) -> String {
    s.replace('\'', r"'\''")
}

/// Body of a C string literal.
fn c_string_body(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn path_str(path: &Path) -> String {
    path.display().to_string()
}

fn subs<const N: usize>(pairs: [(&str, String); N]) -> Substitutions {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

/// Bazel target name for a library.
pub fn library_target_name(name: &str) -> String {
    name.to_ascii_lowercase()
}

/// `crosstool/BUILD`.
pub fn crosstool_build(facts: &ToolchainFacts) -> Substitutions {
    let include_dirs = facts
        .builtin_include_dirs()
        .iter()
        .map(|dir| format!("        {},", starlark_string(&path_str(dir))))
        .collect::<Vec<_>>()
        .join("\n");

    let prefix = path_str(&facts.host_compiler_prefix);

    subs([
        ("rocm_version_number", facts.version_info.rocm.clone()),
        ("rocm_toolkit_path", path_str(&facts.toolkit_path)),
        ("cxx_builtin_include_directories", include_dirs),
        ("host_compiler_prefix", prefix.trim_end_matches('/').to_string()),
    ])
}

/// `crosstool/clang/bin/crosstool_wrapper_driver_rocm`.
pub fn crosstool_wrapper(facts: &ToolchainFacts, verbose: bool) -> Substitutions {
    let amdgpu_flags = facts
        .gpu_targets
        .iter()
        .map(|t| t.offload_arch_flag())
        .collect::<Vec<_>>()
        .join(" ");

    subs([
        ("amdgpu_targets", facts.gpu_target_list()),
        (
            "cpu_compiler",
            shell_single_quoted(&path_str(&facts.host_compiler)),
        ),
        ("hipcc_path", shell_single_quoted(&path_str(&facts.hipcc_path()))),
        ("amdgpu_flags", amdgpu_flags),
        ("crosstool_verbose", u8::from(verbose).to_string()),
        (
            "rocm_toolkit_path",
            shell_single_quoted(&path_str(&facts.toolkit_path)),
        ),
    ])
}

/// `rocm/rocm/rocm_config.h`.
pub fn rocm_config_header(facts: &ToolchainFacts) -> Substitutions {
    subs([
        (
            "rocm_toolkit_path",
            c_string_body(&path_str(&facts.toolkit_path)),
        ),
        ("rocm_version_number", facts.version_info.rocm.clone()),
        ("miopen_version_number", facts.version_info.miopen.clone()),
        (
            "hipruntime_version_number",
            facts.version_info.hipruntime.clone(),
        ),
        ("amdgpu_targets", facts.gpu_target_list()),
    ])
}

#[derive(Serialize)]
struct LibraryBlock {
    name: String,
    staged: String,
}

#[derive(Serialize)]
struct LibraryBlocks {
    libraries: Vec<LibraryBlock>,
}

/// `rocm/BUILD`.
pub fn rocm_build(facts: &ToolchainFacts, copy_rules: &[CopyRule]) -> ConfigResult<Substitutions> {
    let libraries: Vec<LibraryBlock> = facts
        .resolved_libraries
        .iter()
        .map(|(name, lib)| LibraryBlock {
            name: library_target_name(name),
            staged: format!("rocm/lib/{}", lib.file_name),
        })
        .collect();

    let deps = libraries
        .iter()
        .map(|lib| format!("        {},", starlark_string(&format!(":{}", lib.name))))
        .collect::<Vec<_>>()
        .join("\n");

    Ok(subs([
        ("rocm_toolkit_path", path_str(&facts.toolkit_path)),
        (
            "rocm_libraries",
            render_fragment(ROCM_LIBRARIES_FRAGMENT, &LibraryBlocks { libraries })?,
        ),
        ("rocm_library_deps", deps),
        ("copy_rules", render_copy_rules(copy_rules)?),
    ]))
}

/// `rocm/build_defs.bzl`.
pub fn build_defs(facts: &ToolchainFacts) -> Substitutions {
    subs([
        (
            "rocm_gpu_architecture_flags",
            starlark_list(facts.gpu_targets.iter().map(|t| t.offload_arch_flag())),
        ),
        (
            "rocm_gpu_architectures",
            starlark_list(facts.gpu_targets.iter().map(|t| t.as_str())),
        ),
        ("rocm_version_number", facts.version_info.rocm.clone()),
    ])
}

/// `.rocm.bazelrc`.
pub fn bazelrc(facts: &ToolchainFacts) -> Substitutions {
    subs([
        ("rocm_toolkit_path", path_str(&facts.toolkit_path)),
        ("amdgpu_targets", facts.gpu_target_list()),
    ])
}

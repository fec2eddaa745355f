//! Host compiler discovery.

use std::path::{Path, PathBuf};

use crate::errors::{ConfigResult, ConfigurationError};
use crate::util::host::Host;
use crate::util::process::ProcessBuilder;

use super::env::{non_empty_var, GCC_HOST_COMPILER_PATH};

/// Line that opens the system include list in `-E -v` output.
pub const INCLUDE_MARKER: &str = "#include <...> search starts here:";

/// Annotation clang appends to macOS framework directories.
const FRAMEWORK_SUFFIX: &str = "(framework directory)";

/// Source dialect for an include-dir probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    C,
    Cxx,
}

impl Dialect {
    /// Argument for `-x`.
    pub fn as_flag_value(&self) -> &'static str {
        match self {
            Dialect::C => "c",
            Dialect::Cxx => "c++",
        }
    }
}

/// Locate the host compiler.
///
/// `GCC_HOST_COMPILER_PATH` wins over `default_name`. A value containing a
/// path separator is taken as a path and must exist; a bare name is looked
/// up on `PATH`.
pub fn find_host_compiler(host: &dyn Host, default_name: &str) -> ConfigResult<PathBuf> {
    let name =
        non_empty_var(host, GCC_HOST_COMPILER_PATH).unwrap_or_else(|| default_name.to_string());

    let found = if name.contains(std::path::MAIN_SEPARATOR) || name.contains('/') {
        let path = PathBuf::from(&name);
        host.exists(&path).then_some(path)
    } else {
        host.which(&name)
    };

    match found {
        Some(path) => {
            tracing::debug!("host compiler: {}", path.display());
            Ok(path)
        }
        None => Err(ConfigurationError::CompilerNotFound { name }),
    }
}

/// Extract include directories from `-E -v` diagnostics.
///
/// Returns `None` when the marker line is absent.
pub fn parse_include_dirs(output: &str) -> Option<Vec<PathBuf>> {
    let mut lines = output.lines();
    lines.find(|line| line.trim_end() == INCLUDE_MARKER)?;

    let dirs = lines
        .take_while(|line| line.starts_with(' ') || line.starts_with('\t'))
        .map(str::trim)
        .take_while(|line| !line.is_empty())
        .map(|line| {
            line.strip_suffix(FRAMEWORK_SUFFIX)
                .map(str::trim_end)
                .unwrap_or(line)
        })
        .map(PathBuf::from)
        .collect();

    Some(dirs)
}

/// Run the compiler for one dialect and parse its include list.
///
/// Failures here are logged and produce an empty list: compilers whose
/// diagnostic format differs must not abort configuration.
pub fn compiler_include_dirs(host: &dyn Host, compiler: &Path, dialect: Dialect) -> Vec<PathBuf> {
    let cmd = ProcessBuilder::new(compiler)
        .args(["-x", dialect.as_flag_value(), "-E", "-v", "-"])
        .stdin(Vec::new());

    let output = match host.execute(&cmd) {
        Ok(output) => output,
        Err(e) => {
            tracing::warn!("failed to run `{}`: {:#}", cmd.display_command(), e);
            return Vec::new();
        }
    };

    match parse_include_dirs(output.diagnostic()) {
        Some(dirs) => dirs,
        None => {
            tracing::warn!(
                "no include search list in output of `{}`; continuing without builtin include dirs",
                cmd.display_command()
            );
            Vec::new()
        }
    }
}

/// Merge include lists, keeping the first occurrence of each directory.
pub fn merge_include_dirs(cxx: Vec<PathBuf>, c: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut merged: Vec<PathBuf> = Vec::with_capacity(cxx.len() + c.len());
    for dir in cxx.into_iter().chain(c) {
        if !merged.contains(&dir) {
            merged.push(dir);
        }
    }
    merged
}

/// Discover the compiler's builtin include directories, C++ first.
pub fn discover_include_dirs(host: &dyn Host, compiler: &Path) -> Vec<PathBuf> {
    let cxx = compiler_include_dirs(host, compiler, Dialect::Cxx);
    let c = compiler_include_dirs(host, compiler, Dialect::C);
    merge_include_dirs(cxx, c)
}

//! Access to the machine being configured.
//!
//! Everything the prober and renderer learn about or change on the host
//! goes through [`Host`]: environment lookups, executable search,
//! subprocesses, path probes and output writes. [`SystemHost`] talks to the
//! real machine; tests substitute an in-memory implementation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::fs::{remove_file, write_string};
use super::process::{find_executable, ProcessBuilder, ProcessOutput};

/// Host context passed into every probe and render step.
pub trait Host {
    /// Look up an environment variable. Unset and non-UTF-8 values are `None`.
    fn env_var(&self, key: &str) -> Option<String>;

    /// Search `PATH` for an executable.
    fn which(&self, program: &str) -> Option<PathBuf>;

    /// Run a command to completion and capture its output.
    ///
    /// An `Err` means the process could not be started at all; a non-zero
    /// exit is reported through [`ProcessOutput::code`].
    fn execute(&self, cmd: &ProcessBuilder) -> Result<ProcessOutput>;

    /// Check whether a path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Check existence of many paths in one round-trip.
    ///
    /// The result is index-aligned with `paths`.
    fn exists_all(&self, paths: &[PathBuf]) -> Vec<bool> {
        paths.iter().map(|p| self.exists(p)).collect()
    }

    /// Canonicalize a path, resolving symlinks.
    fn realpath(&self, path: &Path) -> Result<PathBuf>;

    /// Write a generated file, creating parent directories.
    fn write_file(&self, path: &Path, contents: &str, executable: bool) -> Result<()>;

    /// Remove a file written earlier.
    fn remove_file(&self, path: &Path) -> Result<()>;
}

/// [`Host`] backed by the running process's environment and filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHost;

impl SystemHost {
    pub fn new() -> Self {
        SystemHost
    }
}

impl Host for SystemHost {
    fn env_var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn which(&self, program: &str) -> Option<PathBuf> {
        find_executable(program)
    }

    fn execute(&self, cmd: &ProcessBuilder) -> Result<ProcessOutput> {
        tracing::debug!("running `{}`", cmd.display_command());
        cmd.exec().map(ProcessOutput::from)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn realpath(&self, path: &Path) -> Result<PathBuf> {
        path.canonicalize()
            .with_context(|| format!("failed to canonicalize {}", path.display()))
    }

    fn write_file(&self, path: &Path, contents: &str, executable: bool) -> Result<()> {
        write_string(path, contents)?;
        if executable {
            set_executable(path)?;
        }
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        remove_file(path)
    }
}

#[cfg(unix)]
fn set_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = std::fs::metadata(path)
        .with_context(|| format!("failed to stat {}", path.display()))?
        .permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms)
        .with_context(|| format!("failed to chmod {}", path.display()))
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> Result<()> {
    Ok(())
}

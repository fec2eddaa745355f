//! Test utilities and mocks for rocm-configure unit tests.
//!
//! This module provides [`MockHost`], an in-memory [`Host`] with scripted
//! environment variables, `PATH` lookups, command outputs and filesystem
//! state, plus fixtures that describe a complete ROCm installation.
//!
//! # Example
//!
//! ```rust,ignore
//! use rocm_configure::test_support::MockHost;
//! use rocm_configure::util::ProcessOutput;
//!
//! #[test]
//! fn test_example() {
//!     let host = MockHost::new()
//!         .with_env("TF_NEED_ROCM", "1")
//!         .with_file("/opt/rocm/lib/librocblas.so");
//!     host.expect_prefix("/usr/bin/gcc -x c++", ProcessOutput::success(""));
//!
//!     // Run probes against `host`...
//! }
//! ```

pub mod fixtures;

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::util::host::Host;
use crate::util::process::{ProcessBuilder, ProcessOutput};

pub use fixtures::*;

/// Mock filesystem for testing without real I/O.
///
/// Tracks which paths exist, symlinks for `realpath`, and every file the
/// code under test writes.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    paths: BTreeSet<PathBuf>,
    symlinks: HashMap<PathBuf, PathBuf>,
    written: BTreeMap<PathBuf, WrittenFile>,
    unwritable: BTreeSet<PathBuf>,
}

/// A file written through [`Host::write_file`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub contents: String,
    pub executable: bool,
}

impl MockFileSystem {
    /// Create a new empty mock filesystem.
    pub fn new() -> Self {
        MockFileSystem::default()
    }

    /// Add a path (file or directory) and all its ancestors.
    pub fn add_path(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            self.paths.insert(ancestor.to_path_buf());
        }
    }

    /// Add a symlink; both the link and its target exist afterwards.
    pub fn add_symlink(&mut self, link: impl AsRef<Path>, target: impl AsRef<Path>) {
        self.add_path(link.as_ref());
        self.add_path(target.as_ref());
        self.symlinks
            .insert(link.as_ref().to_path_buf(), target.as_ref().to_path_buf());
    }

    /// Check if a path exists.
    pub fn exists(&self, path: &Path) -> bool {
        self.paths.contains(path) || self.written.contains_key(path)
    }

    /// Resolve symlinks, failing for paths that do not exist.
    pub fn realpath(&self, path: &Path) -> Result<PathBuf> {
        if !self.exists(path) {
            bail!("no such file or directory: {}", path.display());
        }
        let mut current = path.to_path_buf();
        // Bounded so a cyclic fixture cannot hang a test.
        for _ in 0..32 {
            match self.symlinks.get(&current) {
                Some(target) => current = target.clone(),
                None => return Ok(current),
            }
        }
        bail!("too many levels of symbolic links: {}", path.display())
    }

    /// Make writes to `path` fail.
    pub fn add_unwritable(&mut self, path: impl AsRef<Path>) {
        self.unwritable.insert(path.as_ref().to_path_buf());
    }

    /// Record a write.
    pub fn write(&mut self, path: &Path, contents: &str, executable: bool) -> Result<()> {
        if self.unwritable.contains(path) {
            bail!("permission denied: {}", path.display());
        }
        self.written.insert(
            path.to_path_buf(),
            WrittenFile {
                contents: contents.to_string(),
                executable,
            },
        );
        Ok(())
    }

    /// Remove a written file.
    pub fn remove(&mut self, path: &Path) -> Result<()> {
        match self.written.remove(path) {
            Some(_) => Ok(()),
            None => bail!("no such file or directory: {}", path.display()),
        }
    }

    /// Get all written files.
    pub fn written(&self) -> &BTreeMap<PathBuf, WrittenFile> {
        &self.written
    }
}

/// Pattern for matching commands in [`MockExecutor`].
#[derive(Debug, Clone)]
pub enum CommandPattern {
    /// Exact match on full command string.
    Exact(String),
    /// Match if command starts with prefix.
    StartsWith(String),
    /// Match using a regex pattern.
    Regex(String),
}

impl CommandPattern {
    /// Check if this pattern matches the given command.
    pub fn matches(&self, cmd: &str) -> bool {
        match self {
            CommandPattern::Exact(s) => cmd == s,
            CommandPattern::StartsWith(s) => cmd.starts_with(s),
            CommandPattern::Regex(pattern) => regex::Regex::new(pattern)
                .map(|re| re.is_match(cmd))
                .unwrap_or(false),
        }
    }
}

/// Expectation for a command execution.
#[derive(Debug, Clone)]
pub struct CommandExpectation {
    /// Pattern to match against commands.
    pub pattern: CommandPattern,
    /// Output to return when matched.
    pub output: ProcessOutput,
}

/// Mock process executor.
///
/// Returns scripted outputs for matching commands (first match wins) and
/// records every command it was asked to run.
#[derive(Debug, Default)]
pub struct MockExecutor {
    expectations: Vec<CommandExpectation>,
    calls: Vec<ProcessBuilder>,
}

impl MockExecutor {
    /// Create a new mock executor.
    pub fn new() -> Self {
        MockExecutor::default()
    }

    /// Add an expectation.
    pub fn expect(&mut self, pattern: CommandPattern, output: ProcessOutput) {
        self.expectations
            .push(CommandExpectation { pattern, output });
    }

    /// Execute a command and return the mock output.
    pub fn run(&mut self, cmd: &ProcessBuilder) -> Result<ProcessOutput> {
        let full_cmd = cmd.display_command();
        self.calls.push(cmd.clone());

        for exp in &self.expectations {
            if exp.pattern.matches(&full_cmd) {
                return Ok(exp.output.clone());
            }
        }

        bail!("unexpected command: {}", full_cmd)
    }

    /// Get all commands that were run.
    pub fn calls(&self) -> &[ProcessBuilder] {
        &self.calls
    }
}

/// In-memory [`Host`] for unit tests.
#[derive(Debug, Default)]
pub struct MockHost {
    env: HashMap<String, String>,
    programs: HashMap<String, PathBuf>,
    fs: RefCell<MockFileSystem>,
    exec: RefCell<MockExecutor>,
    exists_batches: RefCell<usize>,
}

impl MockHost {
    /// Create a host with an empty environment and filesystem.
    pub fn new() -> Self {
        MockHost::default()
    }

    /// Set an environment variable.
    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    /// Put an executable on `PATH` under `name`.
    pub fn with_program(mut self, name: &str, path: impl AsRef<Path>) -> Self {
        self.fs.get_mut().add_path(path.as_ref());
        self.programs
            .insert(name.to_string(), path.as_ref().to_path_buf());
        self
    }

    /// Add an existing file or directory.
    pub fn with_file(self, path: impl AsRef<Path>) -> Self {
        self.fs.borrow_mut().add_path(path);
        self
    }

    /// Make writes to `path` fail.
    pub fn with_unwritable(self, path: impl AsRef<Path>) -> Self {
        self.fs.borrow_mut().add_unwritable(path);
        self
    }

    /// Add a symlink resolved by `realpath`.
    pub fn with_symlink(self, link: impl AsRef<Path>, target: impl AsRef<Path>) -> Self {
        self.fs.borrow_mut().add_symlink(link, target);
        self
    }

    /// Script the output of commands matching exactly.
    pub fn expect(&self, cmd: &str, output: ProcessOutput) -> &Self {
        self.exec
            .borrow_mut()
            .expect(CommandPattern::Exact(cmd.to_string()), output);
        self
    }

    /// Script the output of commands starting with `prefix`.
    pub fn expect_prefix(&self, prefix: &str, output: ProcessOutput) -> &Self {
        self.exec
            .borrow_mut()
            .expect(CommandPattern::StartsWith(prefix.to_string()), output);
        self
    }

    /// Command lines run so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.exec
            .borrow()
            .calls()
            .iter()
            .map(ProcessBuilder::display_command)
            .collect()
    }

    /// Full command descriptions run so far, in order.
    pub fn commands(&self) -> Vec<ProcessBuilder> {
        self.exec.borrow().calls().to_vec()
    }

    /// Number of batched existence queries made.
    pub fn exists_batches(&self) -> usize {
        *self.exists_batches.borrow()
    }

    /// Contents of a written file.
    pub fn written(&self, path: impl AsRef<Path>) -> Option<String> {
        self.fs
            .borrow()
            .written()
            .get(path.as_ref())
            .map(|f| f.contents.clone())
    }

    /// Whether a written file was marked executable.
    pub fn written_executable(&self, path: impl AsRef<Path>) -> bool {
        self.fs
            .borrow()
            .written()
            .get(path.as_ref())
            .is_some_and(|f| f.executable)
    }

    /// All written paths, sorted.
    pub fn written_paths(&self) -> Vec<PathBuf> {
        self.fs.borrow().written().keys().cloned().collect()
    }
}

impl Host for MockHost {
    fn env_var(&self, key: &str) -> Option<String> {
        self.env.get(key).cloned()
    }

    fn which(&self, program: &str) -> Option<PathBuf> {
        self.programs.get(program).cloned()
    }

    fn execute(&self, cmd: &ProcessBuilder) -> Result<ProcessOutput> {
        self.exec.borrow_mut().run(cmd)
    }

    fn exists(&self, path: &Path) -> bool {
        self.fs.borrow().exists(path)
    }

    fn exists_all(&self, paths: &[PathBuf]) -> Vec<bool> {
        *self.exists_batches.borrow_mut() += 1;
        let fs = self.fs.borrow();
        paths.iter().map(|p| fs.exists(p)).collect()
    }

    fn realpath(&self, path: &Path) -> Result<PathBuf> {
        self.fs.borrow().realpath(path)
    }

    fn write_file(&self, path: &Path, contents: &str, executable: bool) -> Result<()> {
        self.fs.borrow_mut().write(path, contents, executable)
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        self.fs.borrow_mut().remove(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_fs_ancestors_exist() {
        let mut fs = MockFileSystem::new();
        fs.add_path("/opt/rocm/lib/librocblas.so");

        assert!(fs.exists(Path::new("/opt/rocm/lib")));
        assert!(fs.exists(Path::new("/opt/rocm")));
        assert!(!fs.exists(Path::new("/opt/rocm/lib64")));
    }

    #[test]
    fn test_mock_fs_realpath_follows_chain() {
        let mut fs = MockFileSystem::new();
        fs.add_symlink("/opt/rocm", "/opt/rocm-6.2.0");
        fs.add_symlink("/opt/rocm-6.2.0/lib/libx.so", "/opt/rocm-6.2.0/lib/libx.so.6");
        fs.add_symlink("/opt/rocm-6.2.0/lib/libx.so.6", "/opt/rocm-6.2.0/lib/libx.so.6.2");

        assert_eq!(
            fs.realpath(Path::new("/opt/rocm-6.2.0/lib/libx.so")).unwrap(),
            PathBuf::from("/opt/rocm-6.2.0/lib/libx.so.6.2")
        );
        assert!(fs.realpath(Path::new("/nope")).is_err());
    }

    #[test]
    fn test_mock_executor_records_and_matches() {
        let host = MockHost::new();
        host.expect_prefix("gcc", ProcessOutput::success("ok"));

        let out = host
            .execute(&ProcessBuilder::new("gcc").arg("--version"))
            .unwrap();
        assert_eq!(out.stdout, "ok");
        assert!(host.execute(&ProcessBuilder::new("clang")).is_err());
        assert_eq!(host.calls(), vec!["gcc --version", "clang"]);
    }

    #[test]
    fn test_regex_pattern() {
        let pattern = CommandPattern::Regex(r"^\S*gcc -x c(\+\+)? ".to_string());
        assert!(pattern.matches("/usr/bin/gcc -x c++ -E -v -"));
        assert!(pattern.matches("gcc -x c -E -v -"));
        assert!(!pattern.matches("clang -x c -E -v -"));
    }
}

//! ROCm toolkit path and version discovery via the external helper.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::errors::{ConfigResult, ConfigurationError};
use crate::util::host::Host;
use crate::util::process::ProcessBuilder;

use super::env::ROCM_PATH;
use super::facts::VersionInfo;
use super::run_checked;

/// Keys the helper must report.
pub const TOOLKIT_PATH_KEY: &str = "rocm_toolkit_path";
pub const ROCM_VERSION_KEY: &str = "rocm_version_number";
pub const MIOPEN_VERSION_KEY: &str = "miopen_version_number";
pub const HIPRUNTIME_VERSION_KEY: &str = "hipruntime_version_number";

/// What the discovery helper reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredConfig {
    pub toolkit_path: PathBuf,
    pub versions: VersionInfo,
}

/// Parse `key: value` lines.
///
/// Splits on the first `:` so values may contain colons. Lines without a
/// colon are ignored; a repeated key keeps its last value.
pub fn parse_helper_output(stdout: &str) -> BTreeMap<String, String> {
    stdout
        .lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .filter(|(key, _)| !key.is_empty())
        .collect()
}

/// A reported key with a non-blank value.
fn require<'a>(raw: &'a BTreeMap<String, String>, key: &str) -> ConfigResult<&'a str> {
    let value = raw
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| ConfigurationError::MissingHelperKey {
            key: key.to_string(),
            reported: raw.keys().cloned().collect(),
        })?;

    if value.is_empty() {
        return Err(ConfigurationError::MalformedHelperValue {
            key: key.to_string(),
            value: String::new(),
        });
    }
    Ok(value)
}

/// A reported version number; the encoding is decimal digits only.
fn require_version(raw: &BTreeMap<String, String>, key: &str) -> ConfigResult<String> {
    let value = require(raw, key)?;
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ConfigurationError::MalformedHelperValue {
            key: key.to_string(),
            value: value.to_string(),
        });
    }
    Ok(value.to_string())
}

/// Run the discovery helper against `rocm_path`.
///
/// `helper` is the full argv; the requested root is passed in `ROCM_PATH`.
pub fn run_discovery_helper(
    host: &dyn Host,
    helper: &[String],
    rocm_path: &Path,
) -> ConfigResult<DiscoveredConfig> {
    let (program, args) = helper
        .split_first()
        .ok_or_else(|| ConfigurationError::CommandSpawn {
            command: String::new(),
            message: "no discovery helper configured".to_string(),
        })?;

    let cmd = ProcessBuilder::new(program)
        .args(args)
        .env(ROCM_PATH, rocm_path.to_string_lossy());

    let output = run_checked(host, &cmd)?;
    let raw = parse_helper_output(&output.stdout);

    let toolkit_path = PathBuf::from(require(&raw, TOOLKIT_PATH_KEY)?);
    let versions = VersionInfo {
        rocm: require_version(&raw, ROCM_VERSION_KEY)?,
        miopen: require_version(&raw, MIOPEN_VERSION_KEY)?,
        hipruntime: require_version(&raw, HIPRUNTIME_VERSION_KEY)?,
    };

    tracing::info!(
        "ROCm {} at {}",
        versions.rocm,
        toolkit_path.display()
    );

    Ok(DiscoveredConfig {
        toolkit_path,
        versions,
    })
}

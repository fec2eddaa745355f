//! The `configure` operation.
//!
//! Gate on `TF_NEED_ROCM`, probe the toolchain, render every output and
//! write it under the output directory. A disabled run touches nothing.

use std::path::PathBuf;

use anyhow::Result;

use crate::probe::{self, env, ProbeOptions, ToolchainFacts};
use crate::render::{self, CopyRule, RenderOptions};
use crate::util::config::Config;
use crate::util::host::Host;

/// Options for a configuration run.
#[derive(Debug, Clone)]
pub struct ConfigureOptions {
    /// Root of the generated repository.
    pub output_dir: PathBuf,
    pub probe: ProbeOptions,
    pub render: RenderOptions,
}

impl ConfigureOptions {
    /// Options from merged configuration, writing to `output_dir`.
    pub fn from_config(config: &Config, output_dir: PathBuf) -> Self {
        ConfigureOptions {
            output_dir,
            probe: ProbeOptions::from_config(config),
            render: RenderOptions {
                verbose_wrapper: config.output.verbose_wrapper,
            },
        }
    }
}

/// What a configuration run did.
#[derive(Debug, Clone)]
pub enum ConfigureOutcome {
    /// ROCm support not requested.
    Skipped,
    Configured {
        facts: ToolchainFacts,
        written: Vec<PathBuf>,
        copy_rules: Vec<CopyRule>,
    },
}

impl ConfigureOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, ConfigureOutcome::Skipped)
    }
}

/// Run a full configuration against `host`.
pub fn configure(host: &dyn Host, opts: &ConfigureOptions) -> Result<ConfigureOutcome> {
    if !env::rocm_enabled(host) {
        tracing::info!("{} is not set to 1, skipping ROCm configuration", env::TF_NEED_ROCM);
        return Ok(ConfigureOutcome::Skipped);
    }

    let facts = probe::probe_toolchain(host, &opts.probe)?;
    let output = render::render_all(&facts, &opts.render)?;
    let written = render::write_outputs(host, &opts.output_dir, &output)?;

    tracing::info!(
        "configured ROCm {} with {} files in {}",
        facts.version_info.rocm,
        written.len(),
        opts.output_dir.display()
    );

    Ok(ConfigureOutcome::Configured {
        facts,
        written,
        copy_rules: output.copy_rules,
    })
}

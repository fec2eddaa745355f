//! `rocm-configure configure` command

use std::path::PathBuf;

use anyhow::Result;
use serde_json::json;

use crate::cli::{ConfigureArgs, MessageFormat};
use rocm_configure::ops::{configure, ConfigureOptions, ConfigureOutcome};
use rocm_configure::util::diagnostic::suggestions;
use rocm_configure::SystemHost;

/// Output root when neither the CLI nor configuration names one.
const DEFAULT_OUTPUT_DIR: &str = "local_config_rocm";

pub fn execute(args: ConfigureArgs) -> Result<()> {
    let (cwd, config) = super::load_project_config()?;

    // Output dir: CLI > config > default, relative to the working directory
    let output_dir = args
        .output_dir
        .or_else(|| config.output.dir.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
    let output_dir = cwd.join(output_dir);

    let mut options = ConfigureOptions::from_config(&config, output_dir);
    if !args.helper.is_empty() {
        options.probe.discovery_helper = args.helper;
    }

    let outcome = configure(&SystemHost::new(), &options)?;

    match args.message_format {
        MessageFormat::Json => {
            let value = match &outcome {
                ConfigureOutcome::Skipped => json!({ "status": "skipped" }),
                ConfigureOutcome::Configured {
                    facts,
                    written,
                    copy_rules,
                } => json!({
                    "status": "configured",
                    "facts": facts,
                    "written": written,
                    "copy_rules": copy_rules,
                }),
            };
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        MessageFormat::Human => match &outcome {
            ConfigureOutcome::Skipped => {
                eprintln!("     Skipped ROCm configuration");
                eprintln!("{}", suggestions::ENABLE_ROCM);
            }
            ConfigureOutcome::Configured {
                facts,
                written,
                copy_rules,
            } => {
                for path in written {
                    let shown = path.strip_prefix(&cwd).unwrap_or(path);
                    eprintln!("   Generated {}", shown.display());
                }
                eprintln!(
                    "    Finished ROCm {} for {} ({} copy rules)",
                    facts.version_info.rocm,
                    facts.gpu_target_list(),
                    copy_rules.len()
                );
            }
        },
    }

    Ok(())
}

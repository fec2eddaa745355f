//! `rocm-configure probe` command
//!
//! Runs the prober regardless of TF_NEED_ROCM and prints the facts.

use anyhow::Result;

use crate::cli::{MessageFormat, ProbeArgs};
use rocm_configure::probe::{probe_toolchain, ProbeOptions, ToolchainFacts};
use rocm_configure::SystemHost;

pub fn execute(args: ProbeArgs) -> Result<()> {
    let (_, config) = super::load_project_config()?;

    let mut options = ProbeOptions::from_config(&config);
    if !args.helper.is_empty() {
        options.discovery_helper = args.helper;
    }

    let facts = probe_toolchain(&SystemHost::new(), &options)?;

    match args.message_format {
        MessageFormat::Json => println!("{}", serde_json::to_string_pretty(&facts)?),
        MessageFormat::Human => print!("{}", format_facts(&facts)),
    }

    Ok(())
}

fn format_facts(facts: &ToolchainFacts) -> String {
    let mut out = String::new();

    out.push_str(&format!("toolkit:        {}\n", facts.toolkit_path.display()));
    for (component, version) in facts.version_info.entries() {
        out.push_str(&format!("{:<16}{}\n", format!("{}:", component), version));
    }
    out.push_str(&format!("targets:        {}\n", facts.gpu_target_list()));
    out.push_str(&format!("host compiler:  {}\n", facts.host_compiler.display()));
    out.push_str(&format!(
        "tool prefix:    {}\n",
        facts.host_compiler_prefix.display()
    ));

    out.push_str("libraries:\n");
    for (name, lib) in &facts.resolved_libraries {
        out.push_str(&format!("  {:<14}{}\n", name, lib.path.display()));
    }

    out.push_str("include dirs:\n");
    for dir in facts.builtin_include_dirs() {
        out.push_str(&format!("  {}\n", dir.display()));
    }

    out
}

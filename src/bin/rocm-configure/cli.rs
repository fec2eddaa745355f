//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// rocm-configure - Generate a Bazel toolchain for a local ROCm install
#[derive(Parser)]
#[command(name = "rocm-configure")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Probe the toolchain and write the generated repository
    Configure(ConfigureArgs),

    /// Probe the toolchain and print what was found
    Probe(ProbeArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// How results are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum MessageFormat {
    #[default]
    Human,
    Json,
}

#[derive(Args)]
pub struct ConfigureArgs {
    /// Directory to write generated files into (defaults to local_config_rocm)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Discovery helper command, one argument per flag
    #[arg(long = "helper", value_name = "ARG")]
    pub helper: Vec<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    pub message_format: MessageFormat,
}

#[derive(Args)]
pub struct ProbeArgs {
    /// Discovery helper command, one argument per flag
    #[arg(long = "helper", value_name = "ARG")]
    pub helper: Vec<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    pub message_format: MessageFormat,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

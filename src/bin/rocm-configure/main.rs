//! rocm-configure CLI - ROCm toolchain discovery for Bazel

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use rocm_configure::util::diagnostic;
use rocm_configure::ConfigurationError;

/// Overrides the default log filter.
const LOG_ENV: &str = "ROCM_CONFIGURE_LOG";

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color;
    let verbose = cli.verbose;

    if let Err(e) = run(cli) {
        match e.downcast_ref::<ConfigurationError>() {
            Some(err) => {
                diagnostic::emit(&err.to_diagnostic(), color);
                if !verbose {
                    eprintln!("{}", diagnostic::suggestions::PROBE_VERBOSE);
                }
            }
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("rocm_configure=debug")
        } else {
            EnvFilter::new("rocm_configure=info")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_ansi(!cli.no_color)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Configure(args) => commands::configure::execute(args),
        Commands::Probe(args) => commands::probe::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

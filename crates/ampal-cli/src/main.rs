mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod utils;

use crate::cli::{Cli, Commands};
use crate::config::{Overrides, PartialConfig};
use crate::error::Result;
use clap::Parser;
use tracing::{debug, error, info};

fn main() {
    if let Err(e) = run_app() {
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.clone())?;

    info!("🚀 AMPAL CLI v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let mut overrides = Overrides {
        ignore_end: cli.ignore_end,
        labels: cli.labels.clone(),
        ..Overrides::default()
    };
    if let Commands::Convert(args) = &cli.command {
        overrides.write = args.write;
    }
    let config = PartialConfig::load(cli.config.as_deref())?.resolve(&overrides)?;
    debug!("Resolved configuration: {:?}", &config);

    let command_result = match cli.command {
        Commands::Info(args) => {
            info!("Dispatching to 'info' command.");
            commands::info::run(args, &config)
        }
        Commands::Convert(args) => {
            info!("Dispatching to 'convert' command.");
            commands::convert::run(args, &config)
        }
        Commands::Check(args) => {
            info!("Dispatching to 'check' command.");
            commands::check::run(args, &config, cli.quiet)
        }
        Commands::Labels(args) => {
            info!("Dispatching to 'labels' command.");
            commands::labels::run(args, &config, cli.quiet)
        }
    };

    match &command_result {
        Ok(_) => info!("✅ Command completed successfully."),
        Err(e) => error!("❌ Command failed: {}", e),
    }
    command_result
}

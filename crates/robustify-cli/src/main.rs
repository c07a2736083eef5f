//! robustify Command Line Interface
//!
//! This crate contains the robustify CLI that can be used to compute the
//! environment perturbations a controller tolerates, to check a controlled
//! environment against a safety property, and to translate or visualize
//! automata given in the `.lts` format.

use clap::Parser;
#[cfg(feature = "dot")]
use cli::visualize_lts;
use cli::{Cli, initialize_logger, parse_lts_file, run_check, run_tolerance, translate_lts};
use human_panic::setup_panic;
use log::{debug, info};

mod cli;
mod robustify_config;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_panic!();

    // parse the cli arguments
    let cli = Cli::parse();
    initialize_logger(cli.log_config)?;
    info!("Welcome to robustify!");
    match cli.command {
        cli::Commands::Tolerance(args) => {
            debug!("Running tolerance analysis with {args:?}");
            run_tolerance(args)?;
            info!("Finished tolerance analysis. Goodbye!");
            Ok(())
        }
        cli::Commands::Check { input } => {
            run_check(input)?;
            Ok(())
        }
        #[cfg(feature = "dot")]
        cli::Commands::Visualize { input_file, output } => {
            let lts = parse_lts_file(&input_file)?;
            visualize_lts(&lts, output)?;
            Ok(())
        }
        cli::Commands::Translate { input_file, output } => {
            let lts = parse_lts_file(&input_file)?;
            translate_lts(&lts, output)?;
            Ok(())
        }
    }
}

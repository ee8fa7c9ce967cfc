//! gdflash - GD32F4xx flash sector map and image tool
//!
//! Resolves addresses of the 3 MiB dual-bank GD32F4xx flash to their erase
//! sectors and edits raw flash images with the same erase and program
//! driver the firmware uses, running against an emulated controller.

mod cli;
mod commands;
mod error;
mod image;

use clap::Parser;
use cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // -v/-vv raise the default filter, RUST_LOG still wins
    let default_filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli.command {
        Commands::Map => commands::run_map(),
        Commands::Resolve { address } => commands::run_resolve(address),
        Commands::Erase { image, address } => commands::run_erase(&image, address)?,
        Commands::Write {
            image,
            input,
            no_verify,
            address,
        } => commands::run_write(&image, &input, address, !no_verify)?,
        Commands::Read {
            image,
            output,
            length,
            address,
        } => commands::run_read(&image, &output, address, length)?,
    }

    Ok(())
}

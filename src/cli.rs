//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse a string as a hex or decimal u32
fn parse_hex_u32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(&hex.replace('_', ""), 16)
            .map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u32>().map_err(|e| format!("Invalid number: {}", e))
    }
}

#[derive(Parser)]
#[command(name = "gdflash")]
#[command(author, version, about = "GD32F4xx flash sector map and image tool", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the sector map of both banks
    Map,

    /// Show the sector containing an address
    Resolve {
        /// Address (hex, e.g. 0x08020000, or decimal)
        #[arg(value_parser = parse_hex_u32)]
        address: u32,
    },

    /// Erase the sector containing an address
    Erase {
        /// Flash image file (created erased if missing)
        #[arg(short, long)]
        image: PathBuf,

        /// Any address inside the sector to erase
        #[arg(value_parser = parse_hex_u32)]
        address: u32,
    },

    /// Program bytes from a file into the image
    Write {
        /// Flash image file (created erased if missing)
        #[arg(short, long)]
        image: PathBuf,

        /// Input file with the bytes to program
        #[arg(short = 'f', long)]
        input: PathBuf,

        /// Skip reading back the programmed bytes
        #[arg(long)]
        no_verify: bool,

        /// Start address
        #[arg(value_parser = parse_hex_u32)]
        address: u32,
    },

    /// Read bytes from the image into a file
    Read {
        /// Flash image file
        #[arg(short, long)]
        image: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Number of bytes to read (hex or decimal)
        #[arg(short, long, value_parser = parse_hex_u32)]
        length: u32,

        /// Start address
        #[arg(value_parser = parse_hex_u32)]
        address: u32,
    },
}

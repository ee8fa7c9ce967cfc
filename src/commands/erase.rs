//! Erase command implementation

use std::path::Path;

use gdflash_core::flash;

use super::format_size;
use crate::error::Result;
use crate::image;

/// Erase the sector containing `address` in the image at `path`
pub fn run_erase(path: &Path, address: u32) -> Result<()> {
    let mut fmc = image::load(path)?;

    let sector = flash::erase_by_address(&mut fmc, address).unwrap_or_else(|f| f.halt());

    println!(
        "Erased sector 0x{:02X} ({}) at 0x{:08X}-0x{:08X}",
        sector.sector_name,
        format_size(sector.sector_size),
        sector.sector_start_addr,
        sector.sector_end_addr
    );

    image::save(&fmc, path)
}

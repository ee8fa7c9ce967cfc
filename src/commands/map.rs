//! Sector map and address resolution commands

use gdflash_core::geometry::{self, SectorInfo};

use super::format_size;

/// Print every sector of both banks
pub fn run_map() {
    println!(
        "{:<6} {:<6} {:>6} {:>9} {:<23}",
        "Bank", "Name", "SN", "Size", "Range"
    );
    println!("{}", "-".repeat(54));

    for sector in geometry::sectors() {
        print_sector_row(&sector);
    }
}

fn print_sector_row(sector: &SectorInfo) {
    let bank = sector
        .bank()
        .map(|b| b.to_string())
        .unwrap_or_else(|| "-".into());
    println!(
        "{:<6} 0x{:02X}   0x{:02X} {:>9} 0x{:08X}-0x{:08X}",
        bank,
        sector.sector_name,
        sector.sector_number,
        format_size(sector.sector_size),
        sector.sector_start_addr,
        sector.sector_end_addr
    );
}

/// Print the sector containing `address`
pub fn run_resolve(address: u32) {
    let sector = geometry::resolve_sector(address);
    if !sector.is_valid() {
        log::warn!("0x{:08X} is outside the flash region", address);
        println!("0x{:08X}: {}", address, sector);
        return;
    }

    println!("0x{:08X}: {}", address, sector);
    if let Some(bank) = sector.bank() {
        println!("  bank:   {}", bank);
    }
    println!(
        "  offset: 0x{:X} into the sector",
        address - sector.sector_start_addr
    );
}

//! GD32F4xx dual-bank flash sector geometry
//!
//! The 3 MiB array is split into two banks with non-uniform sectors:
//!
//! ```text
//! bank0  0x0800_0000  4 x 16K | 1 x 64K | 7 x 128K             names 0x00..=0x0B
//! bank1  0x0810_0000  4 x 16K | 1 x 64K | 7 x 128K | 4 x 256K  names 0x0C..=0x1B
//! ```
//!
//! Each sector has a logical *name* (its position in address order) and a
//! controller *number*, the `CTL_SN` encoding written to `FMC_CTL` to select
//! it for erase. Bank1's sectors are numbered from index 16 onwards; indices
//! 12..=15 are given to the four 256K sectors at the end of bank1.

use core::fmt;

use crate::error::{Fatal, Result};

/// First address of the flash region
pub const FMC_START_ADDRESS: u32 = 0x0800_0000;
/// Last address of the flash region (inclusive)
pub const FMC_END_ADDRESS: u32 = 0x082F_FFFF;
/// First address of bank0
pub const FMC_BANK0_START_ADDRESS: u32 = 0x0800_0000;
/// First address of bank1
pub const FMC_BANK1_START_ADDRESS: u32 = 0x0810_0000;

/// 16 KiB sector size
pub const SIZE_16KB: u32 = 0x0000_4000;
/// 64 KiB sector size
pub const SIZE_64KB: u32 = 0x0001_0000;
/// 128 KiB sector size
pub const SIZE_128KB: u32 = 0x0002_0000;
/// 256 KiB sector size
pub const SIZE_256KB: u32 = 0x0004_0000;

/// Sentinel sector name for addresses outside the flash region
pub const WRONG_SECTOR_NAME: u32 = 0xFFFF_FFFF;
/// Sentinel sector number for addresses outside the flash region
pub const WRONG_SECTOR_NUM: u32 = 0xFFFF_FFFF;
/// Sentinel sector size for addresses outside the flash region
pub const INVALID_SIZE: u32 = 0xFFFF_FFFF;
/// Sentinel address for addresses outside the flash region
pub const INVALID_ADDR: u32 = 0xFFFF_FFFF;

/// Highest valid sector name
pub const MAX_SECTOR_NAME: u32 = 0x1B;

// Fixed 64K windows above the four 16K sectors of each bank.
const BANK0_64KB_START: u32 = 0x0801_0000;
const BANK0_64KB_END: u32 = 0x0801_FFFF;
const BANK1_64KB_START: u32 = 0x0811_0000;
const BANK1_64KB_END: u32 = 0x0811_FFFF;

/// Encode a controller sector index into the `FMC_CTL` SN field (bits 3..=7)
pub const fn ctl_sn(index: u32) -> u32 {
    (index << 3) & 0xF8
}

/// Decode an `FMC_CTL` SN field value back into the controller sector index
pub const fn ctl_sn_index(number: u32) -> u32 {
    (number & 0xF8) >> 3
}

/// Flash bank
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bank {
    /// `0x0800_0000..0x0810_0000`
    Bank0,
    /// `0x0810_0000..=0x082F_FFFF`
    Bank1,
}

impl fmt::Display for Bank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bank0 => write!(f, "bank0"),
            Self::Bank1 => write!(f, "bank1"),
        }
    }
}

/// Location and controller encoding of one erase sector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectorInfo {
    /// Logical sector name, `0..=0x1B`
    pub sector_name: u32,
    /// `CTL_SN` encoding used to select the sector for erase
    pub sector_number: u32,
    /// Sector size in bytes
    pub sector_size: u32,
    /// First address of the sector
    pub sector_start_addr: u32,
    /// Last address of the sector (inclusive)
    pub sector_end_addr: u32,
}

impl SectorInfo {
    /// Record returned for addresses outside the flash region
    pub const INVALID: Self = Self {
        sector_name: WRONG_SECTOR_NAME,
        sector_number: WRONG_SECTOR_NUM,
        sector_size: INVALID_SIZE,
        sector_start_addr: INVALID_ADDR,
        sector_end_addr: INVALID_ADDR,
    };

    const fn new(sector_name: u32, sector_index: u32, sector_size: u32, start: u32) -> Self {
        Self {
            sector_name,
            sector_number: ctl_sn(sector_index),
            sector_size,
            sector_start_addr: start,
            sector_end_addr: start + sector_size - 1,
        }
    }

    /// Whether this describes a real sector
    pub fn is_valid(&self) -> bool {
        self.sector_name != WRONG_SECTOR_NAME
    }

    /// Check if `address` lies inside this sector
    pub fn contains(&self, address: u32) -> bool {
        self.is_valid() && self.sector_start_addr <= address && address <= self.sector_end_addr
    }

    /// Bank holding this sector
    pub fn bank(&self) -> Option<Bank> {
        if !self.is_valid() {
            None
        } else if self.sector_start_addr < FMC_BANK1_START_ADDRESS {
            Some(Bank::Bank0)
        } else {
            Some(Bank::Bank1)
        }
    }
}

impl fmt::Display for SectorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_valid() {
            return write!(f, "invalid sector");
        }
        write!(
            f,
            "sector 0x{:02X} (SN 0x{:02X}, {} KiB) 0x{:08X}-0x{:08X}",
            self.sector_name,
            self.sector_number,
            self.sector_size / 1024,
            self.sector_start_addr,
            self.sector_end_addr
        )
    }
}

/// Find the sector containing `address`
///
/// Any `u32` is accepted. Addresses outside
/// `FMC_START_ADDRESS..=FMC_END_ADDRESS` give [`SectorInfo::INVALID`].
pub fn resolve_sector(address: u32) -> SectorInfo {
    if !(FMC_START_ADDRESS..=FMC_END_ADDRESS).contains(&address) {
        return SectorInfo::INVALID;
    }

    if address < FMC_BANK1_START_ADDRESS {
        resolve_bank0(address)
    } else {
        resolve_bank1(address)
    }
}

fn resolve_bank0(address: u32) -> SectorInfo {
    let offset = address - FMC_BANK0_START_ADDRESS;
    let quarter = offset / SIZE_16KB;

    if quarter < 4 {
        SectorInfo::new(
            quarter,
            quarter,
            SIZE_16KB,
            FMC_BANK0_START_ADDRESS + SIZE_16KB * quarter,
        )
    } else if quarter < 8 {
        SectorInfo {
            sector_name: 0x4,
            sector_number: ctl_sn(0x4),
            sector_size: SIZE_64KB,
            sector_start_addr: BANK0_64KB_START,
            sector_end_addr: BANK0_64KB_END,
        }
    } else {
        // offset >= 128K here, so block starts at 1 and the first name is 5
        let block = offset / SIZE_128KB;
        SectorInfo::new(
            block + 0x4,
            block + 0x4,
            SIZE_128KB,
            FMC_BANK0_START_ADDRESS + SIZE_128KB * block,
        )
    }
}

fn resolve_bank1(address: u32) -> SectorInfo {
    let offset = address - FMC_BANK1_START_ADDRESS;
    let quarter = offset / SIZE_16KB;

    if quarter < 4 {
        SectorInfo::new(
            quarter + 0xC,
            quarter + 0x10,
            SIZE_16KB,
            FMC_BANK1_START_ADDRESS + SIZE_16KB * quarter,
        )
    } else if quarter < 8 {
        SectorInfo {
            sector_name: 0x10,
            sector_number: ctl_sn(0x14),
            sector_size: SIZE_64KB,
            sector_start_addr: BANK1_64KB_START,
            sector_end_addr: BANK1_64KB_END,
        }
    } else if quarter < 64 {
        let block = offset / SIZE_128KB;
        SectorInfo::new(
            block + 0x10,
            block + 0x14,
            SIZE_128KB,
            FMC_BANK1_START_ADDRESS + SIZE_128KB * block,
        )
    } else {
        // the 256K run starts 1 MiB into bank1, so block is 4..=7
        let block = offset / SIZE_256KB;
        SectorInfo::new(
            block + 0x14,
            block + 0x8,
            SIZE_256KB,
            FMC_BANK1_START_ADDRESS + SIZE_256KB * block,
        )
    }
}

/// Convert a sector name into its `CTL_SN` controller encoding
///
/// Names `0x0C..=0x17` sit four indices higher in the controller's
/// numbering, names `0x18..=0x1B` reuse indices `12..=15`. Any name above
/// `0x1B` is a fatal fault.
pub fn sector_name_to_number(sector_name: u32) -> Result<u32> {
    match sector_name {
        0x00..=0x0B => Ok(ctl_sn(sector_name)),
        0x0C..=0x17 => Ok(ctl_sn(sector_name + 0x4)),
        0x18..=0x1B => Ok(ctl_sn(sector_name - 0xC)),
        _ => {
            log::error!("sector name 0x{:X} out of range", sector_name);
            Err(Fatal::InvalidSectorName { name: sector_name })
        }
    }
}

/// Find a sector by its `CTL_SN` encoding
pub fn sector_by_number(sector_number: u32) -> Option<SectorInfo> {
    sectors().find(|s| s.sector_number == sector_number)
}

/// Iterate over every sector in address order
pub fn sectors() -> Sectors {
    Sectors {
        next: Some(FMC_START_ADDRESS),
    }
}

/// Iterator over all flash sectors, see [`sectors`]
#[derive(Debug, Clone)]
pub struct Sectors {
    next: Option<u32>,
}

impl Iterator for Sectors {
    type Item = SectorInfo;

    fn next(&mut self) -> Option<SectorInfo> {
        let sector = resolve_sector(self.next?);
        if !sector.is_valid() {
            self.next = None;
            return None;
        }
        self.next = sector.sector_end_addr.checked_add(1);
        Some(sector)
    }
}

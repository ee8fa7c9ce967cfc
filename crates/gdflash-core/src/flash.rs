//! Erase, program and read operations
//!
//! Erase and program bracket every controller sequence with `unlock()` and
//! `lock()`. A fault returns [`Fatal`] straight away and deliberately skips
//! the `lock()`: the caller is expected to halt, not to carry on against a
//! controller in an unknown state.

use crate::error::{Fatal, Result};
use crate::fmc::{FlashMemory, FmcController, FmcFlags};
use crate::geometry::{resolve_sector, SectorInfo};

/// Erase the sector containing `address`
///
/// Returns the sector that was erased. An address outside the flash region
/// is a fatal fault here, unlike in [`resolve_sector`].
pub fn erase_by_address<C: FmcController + ?Sized>(fmc: &mut C, address: u32) -> Result<SectorInfo> {
    let sector = resolve_sector(address);
    if !sector.is_valid() {
        log::error!("erase: address 0x{:08X} is outside the flash region", address);
        return Err(Fatal::InvalidAddress { address });
    }

    log::debug!("erase: 0x{:08X} -> {}", address, sector);

    fmc.unlock();
    fmc.clear_flags(FmcFlags::PENDING);

    let state = fmc.erase(sector.sector_number);
    if !state.is_ready() {
        log::error!(
            "erase: sector 0x{:02X} failed with {}",
            sector.sector_name,
            state
        );
        return Err(Fatal::EraseFailed {
            sector: sector.sector_number,
            state,
        });
    }

    fmc.lock();
    Ok(sector)
}

/// Program `data` byte by byte starting at `address`
///
/// The target bytes must already be erased. On a fault, bytes programmed
/// before the failing one stay programmed.
pub fn write_bytes<C: FmcController + ?Sized>(fmc: &mut C, address: u32, data: &[u8]) -> Result<()> {
    log::debug!("write: {} bytes at 0x{:08X}", data.len(), address);

    fmc.unlock();
    fmc.clear_flags(FmcFlags::PENDING);

    let mut current_addr = address;
    for &byte in data {
        let state = fmc.program_byte(current_addr, byte);
        if !state.is_ready() {
            log::error!("write: program at 0x{:08X} failed with {}", current_addr, state);
            return Err(Fatal::ProgramFailed {
                address: current_addr,
                state,
            });
        }
        current_addr = current_addr.wrapping_add(1);
    }

    fmc.lock();
    Ok(())
}

/// Read `buf.len()` bytes of mapped flash starting at `address`
///
/// No controller handshake and no range check: the caller must keep the
/// range inside the flash region.
pub fn read_bytes<M: FlashMemory + ?Sized>(mem: &M, address: u32, buf: &mut [u8]) {
    log::trace!("read: {} bytes at 0x{:08X}", buf.len(), address);

    let mut current_addr = address;
    for byte in buf.iter_mut() {
        *byte = mem.read_byte(current_addr);
        current_addr = current_addr.wrapping_add(1);
    }
}

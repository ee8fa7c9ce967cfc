//! gdflash-dummy - In-memory flash controller emulator for testing
//!
//! This crate provides a dummy flash memory controller that emulates the
//! 3 MiB GD32F4xx flash array in memory. It's useful for testing and for
//! host-side tooling that edits flash images without real hardware.

use std::collections::HashMap;

use gdflash_core::fmc::{FlashMemory, FmcController, FmcFlags, FmcState};
use gdflash_core::geometry::{sector_by_number, FMC_END_ADDRESS, FMC_START_ADDRESS};

/// Size of the emulated flash region in bytes
pub const FLASH_SIZE: usize = (FMC_END_ADDRESS - FMC_START_ADDRESS + 1) as usize;

/// Value of an erased byte
pub const ERASED_VALUE: u8 = 0xFF;

/// One call made against the emulated controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FmcOp {
    /// `unlock()`
    Unlock,
    /// `lock()`
    Lock,
    /// `clear_flags(flags)`
    ClearFlags(FmcFlags),
    /// `erase(sector_number)`
    Erase(u32),
    /// `program_byte(address, value)`
    Program(u32, u8),
}

/// Dummy flash memory controller
///
/// Emulates the flash array, the `FMC_CTL` lock and the `FMC_STAT` flags.
/// Programming follows NOR semantics: bits can only go from 1 to 0.
pub struct DummyFmc {
    data: Vec<u8>,
    locked: bool,
    flags: FmcFlags,
    ops: Vec<FmcOp>,
    erase_faults: HashMap<u32, FmcState>,
    program_faults: HashMap<u32, FmcState>,
}

impl DummyFmc {
    /// Create a fully erased, locked controller
    pub fn new() -> Self {
        Self {
            data: vec![ERASED_VALUE; FLASH_SIZE],
            locked: true,
            flags: FmcFlags::empty(),
            ops: Vec::new(),
            erase_faults: HashMap::new(),
            program_faults: HashMap::new(),
        }
    }

    /// Create a controller with pre-filled flash contents
    ///
    /// `image` is placed at `FMC_START_ADDRESS`; anything beyond the flash
    /// size is ignored and a short image leaves the rest erased.
    pub fn with_image(image: &[u8]) -> Self {
        let mut fmc = Self::new();
        let len = core::cmp::min(image.len(), fmc.data.len());
        fmc.data[..len].copy_from_slice(&image[..len]);
        fmc
    }

    /// Get a reference to the flash contents
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Whether `FMC_CTL` is currently locked
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Current `FMC_STAT` flags
    pub fn flags(&self) -> FmcFlags {
        self.flags
    }

    /// Every controller call made so far, in order
    pub fn ops(&self) -> &[FmcOp] {
        &self.ops
    }

    /// Make every erase of `sector_number` report `state`
    pub fn fail_erase(&mut self, sector_number: u32, state: FmcState) {
        self.erase_faults.insert(sector_number, state);
    }

    /// Make every program of the byte at `address` report `state`
    pub fn fail_program_at(&mut self, address: u32, state: FmcState) {
        self.program_faults.insert(address, state);
    }

    fn offset(address: u32) -> Option<usize> {
        if (FMC_START_ADDRESS..=FMC_END_ADDRESS).contains(&address) {
            Some((address - FMC_START_ADDRESS) as usize)
        } else {
            None
        }
    }

    fn finish(&mut self, state: FmcState) -> FmcState {
        self.flags |= state.flag();
        if state.is_ready() {
            self.flags |= FmcFlags::END;
        }
        state
    }

    fn handle_erase(&mut self, sector_number: u32) -> FmcState {
        if self.locked {
            return FmcState::ProgramSequenceError;
        }
        if let Some(&state) = self.erase_faults.get(&sector_number) {
            return state;
        }

        let Some(sector) = sector_by_number(sector_number) else {
            log::warn!("dummy: erase of unknown sector number 0x{:02X}", sector_number);
            return FmcState::OperationError;
        };

        let start = (sector.sector_start_addr - FMC_START_ADDRESS) as usize;
        let end = start + sector.sector_size as usize;
        log::trace!("dummy: erasing {}", sector);
        for byte in &mut self.data[start..end] {
            *byte = ERASED_VALUE;
        }
        FmcState::Ready
    }

    fn handle_program(&mut self, address: u32, value: u8) -> FmcState {
        if self.locked {
            return FmcState::ProgramSequenceError;
        }
        if let Some(&state) = self.program_faults.get(&address) {
            return state;
        }

        match Self::offset(address) {
            Some(offset) => {
                self.data[offset] &= value;
                FmcState::Ready
            }
            None => FmcState::ProgramError,
        }
    }
}

impl Default for DummyFmc {
    fn default() -> Self {
        Self::new()
    }
}

impl FmcController for DummyFmc {
    fn unlock(&mut self) {
        self.ops.push(FmcOp::Unlock);
        self.locked = false;
    }

    fn lock(&mut self) {
        self.ops.push(FmcOp::Lock);
        self.locked = true;
    }

    fn clear_flags(&mut self, flags: FmcFlags) {
        self.ops.push(FmcOp::ClearFlags(flags));
        self.flags.remove(flags);
    }

    fn erase(&mut self, sector_number: u32) -> FmcState {
        self.ops.push(FmcOp::Erase(sector_number));
        let state = self.handle_erase(sector_number);
        self.finish(state)
    }

    fn program_byte(&mut self, address: u32, value: u8) -> FmcState {
        self.ops.push(FmcOp::Program(address, value));
        let state = self.handle_program(address, value);
        self.finish(state)
    }
}

impl FlashMemory for DummyFmc {
    fn read_byte(&self, address: u32) -> u8 {
        Self::offset(address)
            .map(|offset| self.data[offset])
            .unwrap_or(ERASED_VALUE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gdflash_core::geometry::{ctl_sn, resolve_sector, sectors, FMC_BANK1_START_ADDRESS};
    use gdflash_core::{erase_by_address, read_bytes, write_bytes, Fatal};

    fn offset_of(address: u32) -> usize {
        (address - FMC_START_ADDRESS) as usize
    }

    #[test]
    fn test_starts_erased_and_locked() {
        let fmc = DummyFmc::new();
        assert_eq!(fmc.data().len(), 3 * 1024 * 1024);
        assert!(fmc.data().iter().all(|&b| b == ERASED_VALUE));
        assert!(fmc.is_locked());
    }

    #[test]
    fn test_write_then_read() {
        let mut fmc = DummyFmc::new();
        let data = [0x12, 0x34, 0x56, 0x78];
        write_bytes(&mut fmc, 0x0800_1000, &data).unwrap();

        let mut buf = [0u8; 4];
        read_bytes(&fmc, 0x0800_1000, &mut buf);
        assert_eq!(buf, data);
        assert!(fmc.is_locked());
    }

    #[test]
    fn test_write_sequence() {
        let mut fmc = DummyFmc::new();
        write_bytes(&mut fmc, 0x0810_0000, &[0xA5, 0x5A]).unwrap();
        assert_eq!(
            fmc.ops(),
            &[
                FmcOp::Unlock,
                FmcOp::ClearFlags(FmcFlags::PENDING),
                FmcOp::Program(0x0810_0000, 0xA5),
                FmcOp::Program(0x0810_0001, 0x5A),
                FmcOp::Lock,
            ]
        );
    }

    #[test]
    fn test_empty_write_unlocks_and_locks() {
        let mut fmc = DummyFmc::new();
        write_bytes(&mut fmc, 0x0800_0000, &[]).unwrap();
        assert_eq!(
            fmc.ops(),
            &[
                FmcOp::Unlock,
                FmcOp::ClearFlags(FmcFlags::PENDING),
                FmcOp::Lock,
            ]
        );
        assert!(fmc.is_locked());
    }

    #[test]
    fn test_program_only_clears_bits() {
        let mut fmc = DummyFmc::new();
        write_bytes(&mut fmc, 0x0800_0000, &[0xF0]).unwrap();
        write_bytes(&mut fmc, 0x0800_0000, &[0x3C]).unwrap();
        assert_eq!(fmc.data()[0], 0x30);
    }

    #[test]
    fn test_program_while_locked_is_rejected() {
        let mut fmc = DummyFmc::new();
        assert_eq!(
            fmc.program_byte(0x0800_0000, 0x00),
            FmcState::ProgramSequenceError
        );
        assert!(fmc.flags().contains(FmcFlags::PGSERR));
        assert_eq!(fmc.data()[0], ERASED_VALUE);
    }

    #[test]
    fn test_erase_clears_only_its_sector() {
        let mut fmc = DummyFmc::with_image(&vec![0x00; FLASH_SIZE]);
        let sector = erase_by_address(&mut fmc, 0x0801_2345).unwrap();
        assert_eq!(sector.sector_name, 4);

        let data = fmc.data();
        let start = offset_of(0x0801_0000);
        let end = offset_of(0x0801_FFFF);
        assert!(data[start..=end].iter().all(|&b| b == ERASED_VALUE));
        assert_eq!(data[start - 1], 0x00);
        assert_eq!(data[end + 1], 0x00);
        assert_eq!(
            fmc.ops(),
            &[
                FmcOp::Unlock,
                FmcOp::ClearFlags(FmcFlags::PENDING),
                FmcOp::Erase(ctl_sn(4)),
                FmcOp::Lock,
            ]
        );
    }

    #[test]
    fn test_erase_every_sector_by_address() {
        for sector in sectors() {
            let mut fmc = DummyFmc::with_image(&vec![0x00; FLASH_SIZE]);
            let erased = erase_by_address(&mut fmc, sector.sector_end_addr).unwrap();
            assert_eq!(erased, sector);

            let erased_bytes = fmc.data().iter().filter(|&&b| b == ERASED_VALUE).count();
            assert_eq!(erased_bytes, sector.sector_size as usize);
            assert_eq!(fmc.data()[offset_of(sector.sector_start_addr)], ERASED_VALUE);
        }
    }

    #[test]
    fn test_erase_bank1_small_sector_leaves_bank0() {
        let mut fmc = DummyFmc::with_image(&vec![0x00; FLASH_SIZE]);
        erase_by_address(&mut fmc, FMC_BANK1_START_ADDRESS).unwrap();
        assert_eq!(fmc.data()[0], 0x00);
        assert_eq!(fmc.data()[offset_of(FMC_BANK1_START_ADDRESS)], ERASED_VALUE);
    }

    #[test]
    fn test_erase_past_end_is_fatal() {
        let mut fmc = DummyFmc::new();
        let address = FMC_END_ADDRESS + 1;
        assert_eq!(resolve_sector(address), gdflash_core::SectorInfo::INVALID);
        assert_eq!(
            erase_by_address(&mut fmc, address),
            Err(Fatal::InvalidAddress { address })
        );
        assert!(fmc.ops().is_empty());
    }

    #[test]
    fn test_erase_failure_leaves_unlocked() {
        let mut fmc = DummyFmc::new();
        fmc.fail_erase(ctl_sn(0x15), FmcState::WriteProtectError);
        assert_eq!(
            erase_by_address(&mut fmc, 0x0812_0000),
            Err(Fatal::EraseFailed {
                sector: ctl_sn(0x15),
                state: FmcState::WriteProtectError,
            })
        );
        assert!(!fmc.is_locked());
        assert!(fmc.flags().contains(FmcFlags::WPERR));
        assert_eq!(fmc.ops().last(), Some(&FmcOp::Erase(ctl_sn(0x15))));
    }

    #[test]
    fn test_injected_erase_fault_persists() {
        let mut fmc = DummyFmc::with_image(&[0x00; 16]);
        fmc.fail_erase(ctl_sn(0), FmcState::OperationError);
        for _ in 0..2 {
            assert!(erase_by_address(&mut fmc, FMC_START_ADDRESS).is_err());
        }
        assert_eq!(&fmc.data()[..16], &[0x00; 16]);
    }

    #[test]
    fn test_program_failure_keeps_earlier_bytes() {
        let mut fmc = DummyFmc::new();
        fmc.fail_program_at(0x0800_0002, FmcState::ProgramError);
        assert_eq!(
            write_bytes(&mut fmc, 0x0800_0000, &[0x01, 0x02, 0x03, 0x04]),
            Err(Fatal::ProgramFailed {
                address: 0x0800_0002,
                state: FmcState::ProgramError,
            })
        );
        assert_eq!(&fmc.data()[..4], &[0x01, 0x02, ERASED_VALUE, ERASED_VALUE]);
        assert!(!fmc.is_locked());
        assert!(!fmc.ops().contains(&FmcOp::Program(0x0800_0003, 0x04)));
    }

    #[test]
    fn test_clear_flags_before_next_operation() {
        let mut fmc = DummyFmc::new();
        fmc.fail_program_at(0x0800_0000, FmcState::ProgramError);
        assert!(write_bytes(&mut fmc, 0x0800_0000, &[0x00]).is_err());
        assert!(fmc.flags().contains(FmcFlags::PGMERR));

        erase_by_address(&mut fmc, 0x0800_4000).unwrap();
        assert!(!fmc.flags().contains(FmcFlags::PGMERR));
        assert!(fmc.flags().contains(FmcFlags::END));
    }

    #[test]
    fn test_erase_then_rewrite() {
        let mut fmc = DummyFmc::new();
        write_bytes(&mut fmc, 0x0820_0010, &[0x00; 16]).unwrap();
        erase_by_address(&mut fmc, 0x0820_0010).unwrap();
        write_bytes(&mut fmc, 0x0820_0010, b"gd32").unwrap();

        let mut buf = [0u8; 6];
        read_bytes(&fmc, 0x0820_0010, &mut buf);
        assert_eq!(&buf, b"gd32\xFF\xFF");
    }

    #[test]
    fn test_read_does_not_touch_controller() {
        let fmc = DummyFmc::with_image(&[0xDE, 0xAD]);
        let mut buf = [0u8; 3];
        read_bytes(&fmc, FMC_START_ADDRESS, &mut buf);
        assert_eq!(buf, [0xDE, 0xAD, ERASED_VALUE]);
        assert!(fmc.ops().is_empty());
    }

    #[test]
    fn test_read_outside_region_returns_erased() {
        let fmc = DummyFmc::new();
        assert_eq!(fmc.read_byte(FMC_END_ADDRESS + 1), ERASED_VALUE);
    }
}

//! Flash memory controller (FMC) capability traits
//!
//! The driver in [`crate::flash`] talks to the hardware only through these
//! traits. A register-level implementation lives in the board support code;
//! `gdflash-dummy` provides an in-memory one for tests and host tooling.

use core::fmt;

use bitflags::bitflags;

bitflags! {
    /// `FMC_STAT` status flags
    ///
    /// Bit positions match the GD32F4xx `FMC_STAT` register so a hardware
    /// implementation can write `bits()` straight into the register.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FmcFlags: u32 {
        /// End of operation
        const END    = 1 << 0;
        /// Operation error
        const OPERR  = 1 << 1;
        /// Erase/program protection error
        const WPERR  = 1 << 4;
        /// Program size not matching error
        const PGMERR = 1 << 5;
        /// Program sequence error
        const PGSERR = 1 << 6;
        /// Read D-bus protection error
        const RDDERR = 1 << 7;
        /// Operation in progress
        const BUSY   = 1 << 16;

        /// Flags cleared before every erase or program sequence
        const PENDING = Self::END.bits()
            | Self::OPERR.bits()
            | Self::WPERR.bits()
            | Self::PGMERR.bits()
            | Self::PGSERR.bits();
    }
}

impl Default for FmcFlags {
    fn default() -> Self {
        FmcFlags::empty()
    }
}

/// Terminal state reported by a blocking controller operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FmcState {
    /// Operation completed
    Ready,
    /// Controller still busy
    Busy,
    /// Read D-bus protection error
    ReadError,
    /// Program sequence error
    ProgramSequenceError,
    /// Program size error
    ProgramError,
    /// Erase/program protection error
    WriteProtectError,
    /// Operation error
    OperationError,
    /// Timeout error (`FMC_TOERR` in the vendor SDK)
    ///
    /// Only register-level implementations that bound their busy-wait
    /// report this. The driver treats it like any other failure.
    Timeout,
}

impl FmcState {
    /// Map the error flags of `FMC_STAT` to the state the controller reports.
    ///
    /// Checked in the same order the hardware driver polls them.
    pub fn from_flags(flags: FmcFlags) -> Self {
        if flags.contains(FmcFlags::BUSY) {
            Self::Busy
        } else if flags.contains(FmcFlags::RDDERR) {
            Self::ReadError
        } else if flags.contains(FmcFlags::PGSERR) {
            Self::ProgramSequenceError
        } else if flags.contains(FmcFlags::PGMERR) {
            Self::ProgramError
        } else if flags.contains(FmcFlags::WPERR) {
            Self::WriteProtectError
        } else if flags.contains(FmcFlags::OPERR) {
            Self::OperationError
        } else {
            Self::Ready
        }
    }

    /// The flag the controller raises for this state, if any
    pub fn flag(self) -> FmcFlags {
        match self {
            Self::Ready | Self::Timeout => FmcFlags::empty(),
            Self::Busy => FmcFlags::BUSY,
            Self::ReadError => FmcFlags::RDDERR,
            Self::ProgramSequenceError => FmcFlags::PGSERR,
            Self::ProgramError => FmcFlags::PGMERR,
            Self::WriteProtectError => FmcFlags::WPERR,
            Self::OperationError => FmcFlags::OPERR,
        }
    }

    /// Whether the operation completed successfully
    pub fn is_ready(self) -> bool {
        self == Self::Ready
    }
}

impl fmt::Display for FmcState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready => write!(f, "ready"),
            Self::Busy => write!(f, "busy"),
            Self::ReadError => write!(f, "read protection error"),
            Self::ProgramSequenceError => write!(f, "program sequence error"),
            Self::ProgramError => write!(f, "program size error"),
            Self::WriteProtectError => write!(f, "write protection error"),
            Self::OperationError => write!(f, "operation error"),
            Self::Timeout => write!(f, "timeout"),
        }
    }
}

/// Flash memory controller
///
/// Every method blocks until the controller reports a terminal state.
/// There is no timeout at this layer.
pub trait FmcController {
    /// Unlock `FMC_CTL` for erase and program
    fn unlock(&mut self);

    /// Lock `FMC_CTL` again
    fn lock(&mut self);

    /// Clear the given `FMC_STAT` flags
    fn clear_flags(&mut self, flags: FmcFlags);

    /// Erase one sector
    ///
    /// `sector_number` is the `CTL_SN` encoding, see
    /// [`ctl_sn`](crate::geometry::ctl_sn).
    fn erase(&mut self, sector_number: u32) -> FmcState;

    /// Program one byte
    fn program_byte(&mut self, address: u32, value: u8) -> FmcState;
}

/// Direct read access to memory-mapped flash
///
/// Reading needs no controller handshake, so this is kept apart from
/// [`FmcController`].
pub trait FlashMemory {
    /// Read the byte mapped at `address`
    fn read_byte(&self, address: u32) -> u8;
}

/// Flash read through volatile pointer access
///
/// On target the flash is mapped at its bus address and `base` is
/// [`FMC_START_ADDRESS`](crate::geometry::FMC_START_ADDRESS). Hosted code
/// can point `base` at any buffer that mirrors the flash region.
#[derive(Debug)]
pub struct MappedFlash {
    base: usize,
}

impl MappedFlash {
    /// Create a reader for flash mapped at `base`
    ///
    /// # Safety
    ///
    /// Every address later passed to [`FlashMemory::read_byte`] must map to
    /// readable memory, i.e. `base + (address - FMC_START_ADDRESS)` must be
    /// valid for a one-byte read for as long as this value is used.
    pub const unsafe fn new(base: usize) -> Self {
        Self { base }
    }

    /// Reader for the on-chip flash at its bus address
    ///
    /// # Safety
    ///
    /// Only valid when running on the target, where the flash region is
    /// mapped at [`FMC_START_ADDRESS`](crate::geometry::FMC_START_ADDRESS).
    ///
    /// # Example
    ///
    /// ```ignore
    /// use gdflash_core::{flash, fmc::MappedFlash};
    ///
    /// let mem = unsafe { MappedFlash::on_chip() };
    /// let mut header = [0u8; 8];
    /// flash::read_bytes(&mem, 0x0800_0000, &mut header);
    /// ```
    pub const unsafe fn on_chip() -> Self {
        Self {
            base: crate::geometry::FMC_START_ADDRESS as usize,
        }
    }
}

impl FlashMemory for MappedFlash {
    fn read_byte(&self, address: u32) -> u8 {
        let offset = address.wrapping_sub(crate::geometry::FMC_START_ADDRESS) as usize;
        let ptr = self.base.wrapping_add(offset) as *const u8;
        // SAFETY: guaranteed by the contract of `MappedFlash::new`.
        unsafe { core::ptr::read_volatile(ptr) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_mask() {
        assert_eq!(FmcFlags::PENDING.bits(), 0x73);
        assert!(!FmcFlags::PENDING.contains(FmcFlags::BUSY));
        assert!(!FmcFlags::PENDING.contains(FmcFlags::RDDERR));
    }

    #[test]
    fn test_state_from_flags() {
        assert_eq!(FmcState::from_flags(FmcFlags::empty()), FmcState::Ready);
        assert_eq!(FmcState::from_flags(FmcFlags::END), FmcState::Ready);
        assert_eq!(
            FmcState::from_flags(FmcFlags::BUSY | FmcFlags::WPERR),
            FmcState::Busy
        );
        assert_eq!(
            FmcState::from_flags(FmcFlags::WPERR | FmcFlags::OPERR),
            FmcState::WriteProtectError
        );
        assert_eq!(
            FmcState::from_flags(FmcFlags::PGSERR),
            FmcState::ProgramSequenceError
        );
    }

    #[test]
    fn test_state_flag_matches_from_flags() {
        for state in [
            FmcState::Busy,
            FmcState::ReadError,
            FmcState::ProgramSequenceError,
            FmcState::ProgramError,
            FmcState::WriteProtectError,
            FmcState::OperationError,
        ] {
            assert_eq!(FmcState::from_flags(state.flag()), state);
        }
    }

    #[test]
    fn test_mapped_flash_reads_relative_to_base() {
        let image = [0x11u8, 0x22, 0x33, 0x44];
        let mem = unsafe { MappedFlash::new(image.as_ptr() as usize) };
        assert_eq!(mem.read_byte(crate::geometry::FMC_START_ADDRESS), 0x11);
        assert_eq!(mem.read_byte(crate::geometry::FMC_START_ADDRESS + 3), 0x44);
    }

    #[test]
    fn test_on_chip_maps_flash_start() {
        let mem = unsafe { MappedFlash::on_chip() };
        assert_eq!(mem.base, crate::geometry::FMC_START_ADDRESS as usize);
    }

    #[test]
    fn test_timeout_raises_no_flag() {
        assert_eq!(FmcState::Timeout.flag(), FmcFlags::empty());
        assert!(!FmcState::Timeout.is_ready());
    }
}

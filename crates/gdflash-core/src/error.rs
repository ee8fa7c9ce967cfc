//! Error types for gdflash-core
//!
//! Every failure in this crate is unrecoverable. The only soft outcome,
//! an address outside the flash region, is reported through
//! [`SectorInfo::INVALID`](crate::geometry::SectorInfo::INVALID) instead.

use core::fmt;

use crate::fmc::FmcState;

/// Unrecoverable flash fault
///
/// A `Fatal` must never be retried or ignored: the flash may be left in a
/// partially erased or partially programmed state, and the controller may
/// still be unlocked. Callers either propagate it to something that stops
/// the process, or call [`Fatal::halt`].
#[must_use = "a flash fault must stop execution"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fatal {
    /// Sector name outside `0..=0x1B`
    InvalidSectorName {
        /// The rejected name
        name: u32,
    },
    /// Erase requested for an address outside the flash region
    InvalidAddress {
        /// The rejected address
        address: u32,
    },
    /// The controller did not report ready after a sector erase
    EraseFailed {
        /// Controller sector number that was being erased
        sector: u32,
        /// State reported by the controller
        state: FmcState,
    },
    /// The controller did not report ready after a byte program
    ProgramFailed {
        /// Address of the byte that failed
        address: u32,
        /// State reported by the controller
        state: FmcState,
    },
}

impl Fatal {
    /// Stop execution permanently.
    ///
    /// Logs the fault and panics. Firmware is expected to build with
    /// `panic = "abort"` or a halting panic handler.
    pub fn halt(self) -> ! {
        log::error!("unrecoverable flash fault: {}", self);
        panic!("unrecoverable flash fault: {}", self)
    }
}

impl fmt::Display for Fatal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSectorName { name } => {
                write!(f, "sector name 0x{:X} out of range", name)
            }
            Self::InvalidAddress { address } => {
                write!(f, "address 0x{:08X} is outside the flash region", address)
            }
            Self::EraseFailed { sector, state } => {
                write!(f, "erase of sector number 0x{:02X} failed: {}", sector, state)
            }
            Self::ProgramFailed { address, state } => {
                write!(f, "program at 0x{:08X} failed: {}", address, state)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Fatal {}

/// Result type alias using [`Fatal`]
pub type Result<T> = core::result::Result<T, Fatal>;

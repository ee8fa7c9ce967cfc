//! gdflash-core - Sector geometry and program/erase driver for GD32F4xx flash
//!
//! This crate maps any address of the 3 MiB dual-bank flash to the erase
//! sector containing it, and drives sector erase and byte programming
//! through a flash memory controller. It is `no_std` and allocation free.
//!
//! # Features
//!
//! - `std` - Implement `std::error::Error` for [`Fatal`]
//!
//! # Example
//!
//! ```ignore
//! use gdflash_core::{flash, fmc::FmcController};
//!
//! fn update<C: FmcController>(fmc: &mut C, image: &[u8]) {
//!     flash::erase_by_address(fmc, 0x0808_0000).unwrap_or_else(|f| f.halt());
//!     flash::write_bytes(fmc, 0x0808_0000, image).unwrap_or_else(|f| f.halt());
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(feature = "std")]
extern crate std;

pub mod error;
pub mod flash;
pub mod fmc;
pub mod geometry;

pub use error::{Fatal, Result};
pub use flash::{erase_by_address, read_bytes, write_bytes};
pub use geometry::{resolve_sector, sector_name_to_number, SectorInfo};

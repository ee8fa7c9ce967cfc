//! Flash image files
//!
//! An image is a raw dump of the whole flash region, `FMC_START_ADDRESS`
//! at file offset 0. A missing file stands for a fully erased chip.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use gdflash_core::geometry::{FMC_END_ADDRESS, FMC_START_ADDRESS};
use gdflash_dummy::{DummyFmc, FLASH_SIZE};

use crate::error::{CliError, Result};

/// Load an image into an emulated controller
pub fn load(path: &Path) -> Result<DummyFmc> {
    match fs::read(path) {
        Ok(data) => {
            if data.len() != FLASH_SIZE {
                return Err(CliError::ImageSize {
                    path: path.to_path_buf(),
                    actual: data.len(),
                    expected: FLASH_SIZE,
                });
            }
            log::debug!("Loaded image {}", path.display());
            Ok(DummyFmc::with_image(&data))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::info!("{} does not exist, starting from an erased chip", path.display());
            Ok(DummyFmc::new())
        }
        Err(source) => Err(CliError::ReadFailed {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Write the emulated flash contents back to `path`
pub fn save(fmc: &DummyFmc, path: &Path) -> Result<()> {
    fs::write(path, fmc.data()).map_err(|source| CliError::WriteFailed {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("Saved image {}", path.display());
    Ok(())
}

/// Check that `len` bytes starting at `address` stay inside the flash region
pub fn check_range(address: u32, len: usize) -> Result<()> {
    let end = address as u64 + len as u64;
    if address < FMC_START_ADDRESS || end > FMC_END_ADDRESS as u64 + 1 {
        return Err(CliError::OutOfRange { address, len });
    }
    Ok(())
}

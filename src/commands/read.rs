//! Read command implementation

use std::fs;
use std::path::Path;

use gdflash_core::flash;

use crate::error::{CliError, Result};
use crate::image;

/// Copy `length` bytes starting at `address` out of the image
pub fn run_read(path: &Path, output: &Path, address: u32, length: u32) -> Result<()> {
    image::check_range(address, length as usize)?;
    let fmc = image::load(path)?;

    let mut data = vec![0u8; length as usize];
    flash::read_bytes(&fmc, address, &mut data);

    fs::write(output, &data).map_err(|source| CliError::WriteFailed {
        path: output.to_path_buf(),
        source,
    })?;

    println!("Wrote {} bytes to {:?}", data.len(), output);
    Ok(())
}

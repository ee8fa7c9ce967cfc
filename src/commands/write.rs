//! Write command implementation

use std::fs;
use std::path::Path;

use gdflash_core::flash;
use gdflash_dummy::DummyFmc;
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::{CliError, Result};
use crate::image;

/// Bytes programmed per unlock/lock sequence
const WRITE_CHUNK_SIZE: usize = 4096;

/// Program the contents of `input` into the image at `address`
pub fn run_write(path: &Path, input: &Path, address: u32, verify: bool) -> Result<()> {
    let data = fs::read(input).map_err(|source| CliError::ReadFailed {
        path: input.to_path_buf(),
        source,
    })?;
    println!("Read {} bytes from {:?}", data.len(), input);

    image::check_range(address, data.len())?;
    let mut fmc = image::load(path)?;

    write_with_progress(&mut fmc, address, &data)?;

    if verify {
        verify_written(&fmc, address, &data)?;
        println!("Verification passed!");
    }

    image::save(&fmc, path)
}

/// Program `data` in chunks with a progress bar
pub fn write_with_progress(fmc: &mut DummyFmc, address: u32, data: &[u8]) -> Result<()> {
    let pb = ProgressBar::new(data.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta}) Writing")?
            .progress_chars("#>-"),
    );

    let mut current_addr = address;
    for chunk in data.chunks(WRITE_CHUNK_SIZE) {
        flash::write_bytes(fmc, current_addr, chunk).unwrap_or_else(|f| f.halt());
        current_addr += chunk.len() as u32;
        pb.inc(chunk.len() as u64);
    }

    pb.finish_with_message("Write complete");
    Ok(())
}

/// Read back what was programmed and compare
///
/// NOR programming only clears bits, so writing over non-erased bytes shows
/// up here rather than in the driver.
pub fn verify_written(fmc: &DummyFmc, address: u32, expected: &[u8]) -> Result<()> {
    let mut actual = vec![0u8; expected.len()];
    flash::read_bytes(fmc, address, &mut actual);

    match expected.iter().zip(&actual).position(|(e, a)| e != a) {
        Some(i) => Err(CliError::VerifyFailed {
            address: address + i as u32,
            expected: expected[i],
            found: actual[i],
        }),
        None => Ok(()),
    }
}

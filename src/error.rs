//! Error types for the gdflash command line tool
//!
//! These cover host-side failures only. Flash faults from the driver are
//! [`gdflash_core::Fatal`] and are never turned into a `CliError`.

use std::path::PathBuf;

use thiserror::Error;

/// Command line errors
#[derive(Debug, Error)]
pub enum CliError {
    /// Failed to read a file
    #[error("Failed to read {}: {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("Failed to write {}: {source}", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Image file does not match the flash size
    #[error("Image {} is {actual} bytes, expected {expected}", .path.display())]
    ImageSize {
        path: PathBuf,
        actual: usize,
        expected: usize,
    },

    /// Requested range leaves the flash region
    #[error("Range 0x{address:08X}+0x{len:X} is outside the flash region")]
    OutOfRange { address: u32, len: usize },

    /// Read-back after write did not match
    #[error("Verify failed at 0x{address:08X}: expected 0x{expected:02X}, found 0x{found:02X}")]
    VerifyFailed { address: u32, expected: u8, found: u8 },

    /// Bad progress bar template
    #[error("Progress bar template: {0}")]
    Template(#[from] indicatif::style::TemplateError),
}

/// Result type for command line operations
pub type Result<T> = std::result::Result<T, CliError>;

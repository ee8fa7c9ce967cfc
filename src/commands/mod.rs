//! CLI command implementations
//!
//! Every command that touches flash contents loads the image into a
//! [`DummyFmc`](gdflash_dummy::DummyFmc), runs the driver from
//! `gdflash-core` against it and saves the image again. A flash fault halts
//! the tool before anything is saved.

mod erase;
mod map;
mod read;
mod write;

pub use erase::run_erase;
pub use map::{run_map, run_resolve};
pub use read::run_read;
pub use write::run_write;

/// Format a byte count the way the sector map prints it
pub(crate) fn format_size(bytes: u32) -> String {
    if bytes >= 1024 * 1024 {
        format!("{} MiB", bytes / (1024 * 1024))
    } else if bytes >= 1024 {
        format!("{} KiB", bytes / 1024)
    } else {
        format!("{} B", bytes)
    }
}

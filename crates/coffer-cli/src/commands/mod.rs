//! Subcommand implementations.

pub mod completion;
pub mod tar;
pub mod unzip;
pub mod zip;

use std::env;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;

/// Extraction root: the given directory or the working directory.
fn output_dir(dir: Option<&Path>) -> Result<PathBuf> {
    match dir {
        Some(dir) => Ok(dir.to_path_buf()),
        None => env::current_dir().context("failed to get current directory"),
    }
}

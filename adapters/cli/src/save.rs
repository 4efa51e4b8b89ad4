//! Single-slot persistence for the inheritance bonus.
//!
//! The slot mirrors the browser-storage behavior of the original portal: a
//! game over writes the inheritance value, the next session consumes it and
//! the slot is cleared either way.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while reading or writing the save slot.
#[derive(Debug, Error)]
pub(crate) enum SaveError {
    /// The slot file could not be read or written.
    #[error("save slot I/O failed: {0}")]
    Io(#[from] io::Error),
    /// The slot file exists but does not decode.
    #[error("save slot is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct SaveSlot {
    inheritance: u64,
}

/// Consumes the stored inheritance, clearing the slot.
///
/// A missing slot is a fresh install, not an error.
pub(crate) fn take_inheritance(path: &Path) -> Result<Option<u64>, SaveError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(error) => return Err(error.into()),
    };

    let slot: SaveSlot = serde_json::from_str(&contents)?;
    fs::remove_file(path)?;
    Ok(Some(slot.inheritance))
}

/// Stores the inheritance for the next session; `None` clears the slot.
pub(crate) fn store_inheritance(path: &Path, inheritance: Option<u64>) -> Result<(), SaveError> {
    match inheritance {
        Some(value) => {
            let contents = serde_json::to_string_pretty(&SaveSlot { inheritance: value })?;
            fs::write(path, contents)?;
        }
        None => match fs::remove_file(path) {
            Ok(()) => {}
            Err(error) if error.kind() == io::ErrorKind::NotFound => {}
            Err(error) => return Err(error.into()),
        },
    }
    Ok(())
}

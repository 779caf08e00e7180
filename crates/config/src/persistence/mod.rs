//! Preference persistence for the browsing surface.
//!
//! Responsibilities:
//! - Define the key-value `PreferenceStore` contract the state core reads at
//!   startup and writes on layout/sort changes.
//! - Provide a file-backed store (JSON object on disk) and an in-memory store.
//! - Back up corrupt preference files before overwriting them.
//!
//! Does NOT handle:
//! - Loading runtime configuration (see `loader`).
//! - Interpreting preference values (the state core parses them).
//!
//! Invariants:
//! - Writes are atomic (temp file + rename); readers never see a torn file.
//! - Concurrent writers are last-write-wins at whole-file granularity.
//! - A corrupt preference file never blocks startup.

use std::path::{Path, PathBuf};

mod path;
mod store;

pub use path::{default_config_path, default_preferences_path};
pub use store::{FilePreferenceStore, MemoryPreferenceStore, PreferenceError, PreferenceStore};

/// Creates a backup of a corrupt file before it is overwritten.
///
/// The backup is created by renaming the original file to a path with a
/// `.corrupt.{timestamp}` extension. This preserves the original file contents
/// for potential recovery while preventing the corrupt file from blocking
/// application startup.
pub(crate) fn create_corrupt_backup(path: &Path) -> Result<PathBuf, std::io::Error> {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    // with_extension replaces the last extension
    let backup_path = path.with_extension(format!("corrupt.{}", timestamp));

    std::fs::rename(path, &backup_path)?;

    Ok(backup_path)
}
